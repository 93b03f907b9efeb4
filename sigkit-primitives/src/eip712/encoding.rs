// SPDX-License-Identifier: Apache-2.0

//! EIP-712 `encodeType` / `encodeData` / `hashStruct` and the final signing hash

use log::debug;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::One;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeSet;

use super::converter::{Eip712Converter, EIP712_DOMAIN_TYPE};
use crate::constants::length::WORD_SIZE;
use crate::errors::{TypedDataError, TypedDataResult};
use crate::hashing::{keccak256, typed_data_digest};
use crate::types::{
    EthAddress, Eip712ArrayLevel, Eip712FieldType, Eip712Struct, Eip712TypedData,
};

type Word = [u8; WORD_SIZE];

impl Eip712TypedData {
    /// Look up a struct definition. `EIP712Domain` falls back to the type
    /// implied by the domain fields that are set.
    pub fn struct_definition(&self, name: &str) -> TypedDataResult<Cow<'_, Eip712Struct>> {
        match self.types.get(name) {
            Some(def) => Ok(Cow::Borrowed(def)),
            None if name == EIP712_DOMAIN_TYPE => Ok(Cow::Owned(self.domain.implicit_type())),
            None => Err(TypedDataError::UnknownType(name.to_string())),
        }
    }

    /// Struct types referenced (transitively) by `name`, excluding `name` itself
    fn dependencies(&self, name: &str) -> TypedDataResult<BTreeSet<String>> {
        let mut found = BTreeSet::new();
        let mut pending = vec![name.to_string()];

        while let Some(current) = pending.pop() {
            for field in &self.struct_definition(&current)?.fields {
                let def = Eip712Converter::parse_field_type(&field.r#type)?;
                if let Some(dep) = def.field_type.type_name() {
                    if !self.types.contains_key(dep) {
                        return Err(TypedDataError::UnknownType(dep.to_string()));
                    }
                    if dep != name && found.insert(dep.to_string()) {
                        pending.push(dep.to_string());
                    }
                }
            }
        }

        Ok(found)
    }

    fn encode_single_type(name: &str, def: &Eip712Struct) -> String {
        let members: Vec<String> = def
            .fields
            .iter()
            .map(|f| format!("{} {}", f.r#type.trim(), f.name))
            .collect();
        format!("{}({})", name, members.join(","))
    }

    /// `encodeType`: the primary struct followed by its dependencies sorted by name
    pub fn encode_type(&self, name: &str) -> TypedDataResult<String> {
        let primary = self.struct_definition(name)?;
        let mut encoded = Self::encode_single_type(name, &primary);
        for dep in self.dependencies(name)? {
            let def = self.struct_definition(&dep)?;
            encoded.push_str(&Self::encode_single_type(&dep, &def));
        }
        Ok(encoded)
    }

    /// `typeHash = keccak256(encodeType(name))`
    pub fn type_hash(&self, name: &str) -> TypedDataResult<[u8; 32]> {
        Ok(keccak256(self.encode_type(name)?))
    }

    /// `encodeData`: type hash followed by one 32-byte word per member
    pub fn encode_data(&self, name: &str, value: &Value) -> TypedDataResult<Vec<u8>> {
        let def = self.struct_definition(name)?;
        let obj = value.as_object().ok_or_else(|| {
            TypedDataError::invalid_value(name, "expected an object for struct value")
        })?;

        let mut encoded = Vec::with_capacity(WORD_SIZE * (def.fields.len() + 1));
        encoded.extend_from_slice(&self.type_hash(name)?);

        for field in &def.fields {
            let field_value = obj.get(&field.name).ok_or_else(|| TypedDataError::MissingField {
                struct_name: name.to_string(),
                field: field.name.clone(),
            })?;
            let field_def = Eip712Converter::parse_field_type(&field.r#type)?;
            let word = self.encode_value(
                &field.name,
                &field_def.field_type,
                &field_def.array_levels,
                field_value,
            )?;
            encoded.extend_from_slice(&word);
        }

        Ok(encoded)
    }

    /// `hashStruct = keccak256(encodeData(name, value))`
    pub fn hash_struct(&self, name: &str, value: &Value) -> TypedDataResult<[u8; 32]> {
        Ok(keccak256(self.encode_data(name, value)?))
    }

    /// `hashStruct(EIP712Domain, domain)`
    pub fn domain_separator(&self) -> TypedDataResult<[u8; 32]> {
        self.hash_struct(EIP712_DOMAIN_TYPE, &self.domain.to_json())
    }

    /// `hashStruct(primaryType, message)`
    pub fn message_hash(&self) -> TypedDataResult<[u8; 32]> {
        self.hash_struct(&self.primary_type, &self.message)
    }

    /// Digest that is actually signed: `keccak256(0x1901 || domainSeparator || hashStruct(message))`
    pub fn signing_hash(&self) -> TypedDataResult<[u8; 32]> {
        let domain_separator = self.domain_separator()?;
        let message_hash = self.message_hash()?;
        let digest = typed_data_digest(&domain_separator, &message_hash);
        debug!(
            "eip712 {}: domain=0x{} message=0x{} digest=0x{}",
            self.primary_type,
            hex::encode(domain_separator),
            hex::encode(message_hash),
            hex::encode(digest)
        );
        Ok(digest)
    }

    fn encode_value(
        &self,
        field: &str,
        field_type: &Eip712FieldType,
        levels: &[Eip712ArrayLevel],
        value: &Value,
    ) -> TypedDataResult<Word> {
        // Arrays hash the concatenation of their encoded elements
        if let Some((outer, inner)) = levels.split_last() {
            let items = value
                .as_array()
                .ok_or_else(|| TypedDataError::invalid_value(field, "expected an array"))?;
            if let Some(expected) = outer.size() {
                if items.len() != expected {
                    return Err(TypedDataError::ArrayLengthMismatch {
                        field: field.to_string(),
                        expected,
                        actual: items.len(),
                    });
                }
            }
            let mut concatenated = Vec::with_capacity(items.len() * WORD_SIZE);
            for item in items {
                concatenated.extend_from_slice(&self.encode_value(field, field_type, inner, item)?);
            }
            return Ok(keccak256(&concatenated));
        }

        match field_type {
            Eip712FieldType::Bool => {
                let flag = value
                    .as_bool()
                    .ok_or_else(|| TypedDataError::invalid_value(field, "expected boolean"))?;
                let mut word = [0u8; WORD_SIZE];
                word[WORD_SIZE - 1] = flag as u8;
                Ok(word)
            }
            Eip712FieldType::Address => {
                let address = value
                    .as_str()
                    .ok_or_else(|| TypedDataError::invalid_value(field, "expected address string"))?;
                let bytes = EthAddress::new(address.to_string())?.to_bytes()?;
                left_pad(field, &bytes)
            }
            Eip712FieldType::String => {
                let text = value
                    .as_str()
                    .ok_or_else(|| TypedDataError::invalid_value(field, "expected string"))?;
                Ok(keccak256(text.as_bytes()))
            }
            Eip712FieldType::DynamicBytes => Ok(keccak256(decode_hex_value(field, value)?)),
            Eip712FieldType::FixedBytes(size) => {
                let bytes = decode_hex_value(field, value)?;
                if bytes.len() != *size as usize {
                    return Err(TypedDataError::invalid_value(
                        field,
                        format!("expected {} bytes, got {}", size, bytes.len()),
                    ));
                }
                let mut word = [0u8; WORD_SIZE];
                word[..bytes.len()].copy_from_slice(&bytes);
                Ok(word)
            }
            Eip712FieldType::Uint(size) => encode_uint(field, value, *size),
            Eip712FieldType::Int(size) => encode_int(field, value, *size),
            Eip712FieldType::Custom(name) => self.hash_struct(name, value),
        }
    }
}

fn decode_hex_value(field: &str, value: &Value) -> TypedDataResult<Vec<u8>> {
    let hex_str = value
        .as_str()
        .ok_or_else(|| TypedDataError::invalid_value(field, "expected hex string"))?;
    let hex_str = hex_str
        .strip_prefix("0x")
        .or_else(|| hex_str.strip_prefix("0X"))
        .unwrap_or(hex_str);
    Ok(hex::decode(hex_str)?)
}

fn left_pad(field: &str, bytes: &[u8]) -> TypedDataResult<Word> {
    if bytes.len() > WORD_SIZE {
        return Err(TypedDataError::invalid_value(
            field,
            format!("{} bytes do not fit in a word", bytes.len()),
        ));
    }
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - bytes.len()..].copy_from_slice(bytes);
    Ok(word)
}

/// Parse a JSON number, decimal string or `0x` hex string (optionally negative) into a BigInt
fn parse_big_int(field: &str, value: &Value) -> TypedDataResult<BigInt> {
    if let Some(u) = value.as_u64() {
        return Ok(BigInt::from(u));
    }
    if let Some(i) = value.as_i64() {
        return Ok(BigInt::from(i));
    }

    let s = value
        .as_str()
        .ok_or_else(|| {
            TypedDataError::invalid_value(field, "expected integer or numeric string")
        })?
        .trim();

    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex_digits) => BigUint::parse_bytes(hex_digits.as_bytes(), 16),
        None => BigUint::parse_bytes(digits.as_bytes(), 10),
    }
    .ok_or_else(|| TypedDataError::invalid_value(field, format!("invalid number '{}'", s)))?;

    let sign = if negative { Sign::Minus } else { Sign::Plus };
    Ok(BigInt::from_biguint(sign, magnitude))
}

fn encode_uint(field: &str, value: &Value, size_bytes: u8) -> TypedDataResult<Word> {
    let bits = size_bytes as usize * 8;
    let big = parse_big_int(field, value)?;

    let unsigned = big
        .to_biguint()
        .ok_or_else(|| TypedDataError::invalid_value(field, format!("uint{} cannot be negative", bits)))?;
    if unsigned >= (BigUint::one() << bits) {
        return Err(TypedDataError::invalid_value(
            field,
            format!("uint{} value out of range", bits),
        ));
    }

    left_pad(field, &unsigned.to_bytes_be())
}

fn encode_int(field: &str, value: &Value, size_bytes: u8) -> TypedDataResult<Word> {
    let bits = size_bytes as usize * 8;
    let big = parse_big_int(field, value)?;

    // Range: -(2^(bits-1)) ..= 2^(bits-1)-1
    let half = BigInt::one() << (bits - 1);
    if big < -half.clone() || big >= half {
        return Err(TypedDataError::invalid_value(
            field,
            format!("int{} value out of range", bits),
        ));
    }

    // Two's complement, sign-extended to the full 256-bit word
    let word_value = if big.sign() == Sign::Minus {
        (BigInt::one() << (WORD_SIZE * 8)) + big
    } else {
        big
    };
    let (_, bytes) = word_value.to_bytes_be();
    left_pad(field, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// The "Mail" example from EIP-712
    pub(crate) fn mail_typed_data() -> Eip712TypedData {
        Eip712Converter::parse_value_to_typed_data(&json!({
            "types": {
                "EIP712Domain": [
                    { "name": "name", "type": "string" },
                    { "name": "version", "type": "string" },
                    { "name": "chainId", "type": "uint256" },
                    { "name": "verifyingContract", "type": "address" }
                ],
                "Person": [
                    { "name": "name", "type": "string" },
                    { "name": "wallet", "type": "address" }
                ],
                "Mail": [
                    { "name": "from", "type": "Person" },
                    { "name": "to", "type": "Person" },
                    { "name": "contents", "type": "string" }
                ]
            },
            "primaryType": "Mail",
            "domain": {
                "name": "Ether Mail",
                "version": "1",
                "chainId": 1,
                "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
            },
            "message": {
                "from": { "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" },
                "to": { "name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" },
                "contents": "Hello, Bob!"
            }
        }))
        .unwrap()
    }

    fn word_hex(field_type: &str, value: Value) -> TypedDataResult<String> {
        let data = mail_typed_data();
        let def = Eip712Converter::parse_field_type(field_type).unwrap();
        data.encode_value("v", &def.field_type, &def.array_levels, &value)
            .map(hex::encode)
    }

    #[test]
    fn test_mail_encode_type() {
        let data = mail_typed_data();
        assert_eq!(
            data.encode_type("Mail").unwrap(),
            "Mail(Person from,Person to,string contents)Person(string name,address wallet)"
        );
        assert_eq!(
            hex::encode(data.type_hash("Mail").unwrap()),
            "a0cedeb2dc280ba39b857546d74f5549c3a1d7bdc2dd96bf881f76108e23dac2"
        );
    }

    #[test]
    fn test_encode_type_for_implicit_domain() {
        let mut data = mail_typed_data();
        let explicit = data.encode_type(EIP712_DOMAIN_TYPE).unwrap();
        assert_eq!(
            explicit,
            "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)"
        );

        data.types.remove(EIP712_DOMAIN_TYPE);
        assert_eq!(data.encode_type(EIP712_DOMAIN_TYPE).unwrap(), explicit);
    }

    #[test]
    fn test_mail_hashes() {
        let data = mail_typed_data();
        assert_eq!(
            hex::encode(data.domain_separator().unwrap()),
            "f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f"
        );
        assert_eq!(
            hex::encode(data.message_hash().unwrap()),
            "c52c0ee5d84264471806290a3f2c4cecfc5490626bf912d01f240d7a274b371e"
        );
        assert_eq!(
            hex::encode(data.signing_hash().unwrap()),
            "be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2"
        );
    }

    #[test]
    fn test_implicit_domain_matches_explicit() {
        let mut data = mail_typed_data();
        let explicit = data.domain_separator().unwrap();
        data.types.remove(EIP712_DOMAIN_TYPE);
        assert_eq!(data.domain_separator().unwrap(), explicit);
    }

    #[test]
    fn test_missing_message_field() {
        let mut data = mail_typed_data();
        data.message.as_object_mut().unwrap().remove("contents");
        assert_eq!(
            data.message_hash().unwrap_err(),
            TypedDataError::MissingField {
                struct_name: "Mail".to_string(),
                field: "contents".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_struct_reference() {
        let mut data = mail_typed_data();
        data.types.remove("Person");
        assert_eq!(
            data.encode_type("Mail").unwrap_err(),
            TypedDataError::UnknownType("Person".to_string())
        );
    }

    #[test]
    fn test_encode_integers() {
        assert_eq!(
            word_hex("uint256", json!(500)).unwrap(),
            format!("{:0>64}", "1f4")
        );
        assert_eq!(
            word_hex("uint256", json!("0x1f4")).unwrap(),
            word_hex("uint256", json!("500")).unwrap()
        );
        assert_eq!(word_hex("int8", json!(-1)).unwrap(), "ff".repeat(32));
        assert_eq!(
            word_hex("int16", json!("-0x100")).unwrap(),
            format!("{}ff00", "ff".repeat(30))
        );
        assert_eq!(
            word_hex("int8", json!(127)).unwrap(),
            format!("{:0>64}", "7f")
        );
    }

    #[test]
    fn test_integer_range_checks() {
        assert!(word_hex("uint8", json!(256)).is_err());
        assert!(word_hex("uint8", json!(-1)).is_err());
        assert!(word_hex("int8", json!(128)).is_err());
        assert!(word_hex("int8", json!(-129)).is_err());
        assert!(word_hex("uint256", json!("12abc")).is_err());
        assert!(word_hex("uint256", json!(1.5)).is_err());
    }

    #[test]
    fn test_encode_fixed_bytes_and_bool() {
        assert_eq!(
            word_hex("bytes2", json!("0xabcd")).unwrap(),
            format!("abcd{}", "00".repeat(30))
        );
        assert!(word_hex("bytes2", json!("0xab")).is_err());
        assert_eq!(word_hex("bool", json!(true)).unwrap(), format!("{:0>64}", "1"));
        assert!(word_hex("bool", json!("true")).is_err());
    }

    #[test]
    fn test_encode_arrays() {
        let expected = {
            let mut concatenated = Vec::new();
            for n in [1u8, 2, 3] {
                let mut word = [0u8; 32];
                word[31] = n;
                concatenated.extend_from_slice(&word);
            }
            hex::encode(keccak256(&concatenated))
        };
        assert_eq!(word_hex("uint8[]", json!([1, 2, 3])).unwrap(), expected);
        assert_eq!(word_hex("uint8[3]", json!([1, 2, 3])).unwrap(), expected);
        assert!(matches!(
            word_hex("uint8[2]", json!([1, 2, 3])),
            Err(TypedDataError::ArrayLengthMismatch {
                expected: 2,
                actual: 3,
                ..
            })
        ));
        assert_eq!(word_hex("uint8[]", json!([])).unwrap(), hex::encode(keccak256(b"")));
    }
}
