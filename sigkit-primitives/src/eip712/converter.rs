// SPDX-License-Identifier: Apache-2.0

//! Parsing of EIP-712 type strings and `eth_signTypedData_v4` JSON payloads

use serde_json::{from_str, Value};
use std::collections::BTreeSet;

use crate::errors::{TypedDataError, TypedDataResult};
use crate::types::{
    Eip712ArrayLevel, Eip712Domain, Eip712Field, Eip712FieldDefinition, Eip712FieldType,
    Eip712Struct, Eip712TypedData, Eip712Types,
};

/// Name of the domain struct type
pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";

/// Converts between JSON / type strings and the typed EIP-712 model
pub struct Eip712Converter;

impl Eip712Converter {
    /// Parse a field type string such as `uint256`, `Person[]` or `bytes32[2][]`
    pub fn parse_field_type(type_str: &str) -> TypedDataResult<Eip712FieldDefinition> {
        let mut base = type_str.trim();
        let mut levels = Vec::new();

        // Peel array suffixes from the outside in
        while base.ends_with(']') {
            let (inner, array_spec) = base.rsplit_once('[').ok_or_else(|| {
                TypedDataError::InvalidFieldType(format!("Invalid array type format: {}", type_str))
            })?;

            let array_spec = array_spec.trim_end_matches(']');
            let level = if array_spec.is_empty() {
                Eip712ArrayLevel::Dynamic
            } else {
                let size = Self::parse_size(array_spec).ok_or_else(|| {
                    TypedDataError::InvalidFieldType(format!("Invalid array size: {}", array_spec))
                })?;
                Eip712ArrayLevel::Fixed(size)
            };
            levels.push(level);
            base = inner;
        }
        levels.reverse();

        Ok(Eip712FieldDefinition {
            field_type: Self::parse_base_field_type(base)?,
            array_levels: levels,
        })
    }

    /// Parse base field type (non-array)
    fn parse_base_field_type(type_str: &str) -> TypedDataResult<Eip712FieldType> {
        match type_str {
            "bool" => Ok(Eip712FieldType::Bool),
            "address" => Ok(Eip712FieldType::Address),
            "string" => Ok(Eip712FieldType::String),
            "bytes" => Ok(Eip712FieldType::DynamicBytes),
            "" => Err(TypedDataError::InvalidFieldType("Empty type".to_string())),
            _ => {
                if let Some(size_str) = type_str.strip_prefix("bytes") {
                    return match Self::parse_size(size_str) {
                        Some(size) if (1..=32).contains(&size) => {
                            Ok(Eip712FieldType::FixedBytes(size as u8))
                        }
                        _ => Err(TypedDataError::InvalidFieldType(format!(
                            "Invalid bytes size: {}",
                            size_str
                        ))),
                    };
                }

                if let Some(size_str) = type_str.strip_prefix("uint") {
                    return Self::parse_int_bits(size_str)
                        .map(Eip712FieldType::Uint)
                        .ok_or_else(|| {
                            TypedDataError::InvalidFieldType(format!(
                                "Invalid uint size: {}",
                                size_str
                            ))
                        });
                }

                if let Some(size_str) = type_str.strip_prefix("int") {
                    return Self::parse_int_bits(size_str)
                        .map(Eip712FieldType::Int)
                        .ok_or_else(|| {
                            TypedDataError::InvalidFieldType(format!(
                                "Invalid int size: {}",
                                size_str
                            ))
                        });
                }

                if !type_str
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
                {
                    return Err(TypedDataError::InvalidFieldType(type_str.to_string()));
                }

                Ok(Eip712FieldType::Custom(type_str.to_string()))
            }
        }
    }

    /// Integer width in bytes from a bit-size suffix; `uint` alone means 256
    fn parse_int_bits(size_str: &str) -> Option<u8> {
        if size_str.is_empty() {
            return Some(32);
        }
        let bits = Self::parse_size(size_str)?;
        if bits > 0 && bits <= 256 && bits % 8 == 0 {
            Some((bits / 8) as u8)
        } else {
            None
        }
    }

    /// Canonical decimal size: ASCII digits only, no sign, no leading zero
    fn parse_size(size_str: &str) -> Option<usize> {
        if size_str.is_empty()
            || !size_str.bytes().all(|b| b.is_ascii_digit())
            || (size_str.len() > 1 && size_str.starts_with('0'))
        {
            return None;
        }
        size_str.parse().ok()
    }

    /// Parse and validate JSON string to EIP-712 typed data
    pub fn parse_json_to_typed_data(json_str: &str) -> TypedDataResult<Eip712TypedData> {
        let json_value: Value = from_str(json_str)?;
        Self::parse_value_to_typed_data(&json_value)
    }

    /// Parse an already-decoded JSON value to EIP-712 typed data
    pub fn parse_value_to_typed_data(json_value: &Value) -> TypedDataResult<Eip712TypedData> {
        let obj = json_value
            .as_object()
            .ok_or_else(|| TypedDataError::InvalidJson("JSON must be an object".to_string()))?;

        let domain = match obj.get("domain") {
            Some(domain_value) => Self::parse_domain(domain_value)?,
            None => return Err(TypedDataError::InvalidJson("Missing 'domain' field".to_string())),
        };

        let types = obj
            .get("types")
            .ok_or_else(|| TypedDataError::InvalidJson("Missing 'types' field".to_string()))
            .and_then(Self::parse_types)?;

        let message = obj
            .get("message")
            .ok_or_else(|| TypedDataError::InvalidJson("Missing 'message' field".to_string()))?
            .clone();

        let primary_type = match obj.get("primaryType") {
            Some(Value::String(primary_type)) => primary_type.clone(),
            Some(_) => {
                return Err(TypedDataError::InvalidPrimaryType(
                    "primaryType must be a string".to_string(),
                ))
            }
            None => Self::infer_primary_type(&types)?,
        };

        if !types.contains_key(&primary_type) {
            return Err(TypedDataError::InvalidPrimaryType(format!(
                "Primary type '{}' not found in types",
                primary_type
            )));
        }

        Ok(Eip712TypedData::new(domain, types, primary_type, message))
    }

    /// Parse domain from JSON value
    pub fn parse_domain(domain_value: &Value) -> TypedDataResult<Eip712Domain> {
        let domain_obj = domain_value
            .as_object()
            .ok_or_else(|| TypedDataError::InvalidJson("Domain must be an object".to_string()))?;
        let mut domain = Eip712Domain::new();

        if let Some(name) = Self::domain_string(domain_obj, "name")? {
            domain = domain.with_name(name.to_string());
        }

        if let Some(version) = Self::domain_string(domain_obj, "version")? {
            domain = domain.with_version(version.to_string());
        }

        if let Some(chain_id) = domain_obj.get("chainId") {
            let chain_id = match chain_id {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => match s.strip_prefix("0x") {
                    Some(hex_str) => u64::from_str_radix(hex_str, 16).ok(),
                    None => s.parse().ok(),
                },
                _ => None,
            }
            .ok_or_else(|| TypedDataError::invalid_value("chainId", chain_id.to_string()))?;
            domain = domain.with_chain_id(chain_id);
        }

        if let Some(contract) = Self::domain_string(domain_obj, "verifyingContract")? {
            domain = domain.with_verifying_contract(contract.to_string());
        }

        if let Some(salt) = Self::domain_string(domain_obj, "salt")? {
            let salt_bytes = hex::decode(salt.strip_prefix("0x").unwrap_or(salt))?;
            if salt_bytes.len() != 32 {
                return Err(TypedDataError::invalid_value(
                    "salt",
                    format!("expected 32 bytes, got {}", salt_bytes.len()),
                ));
            }
            domain = domain.with_salt(salt_bytes);
        }

        Ok(domain)
    }

    /// A string-valued domain member. Present with any other JSON type is an
    /// error, since dropping it would change the implicit domain type.
    fn domain_string<'a>(
        domain_obj: &'a serde_json::Map<String, Value>,
        key: &str,
    ) -> TypedDataResult<Option<&'a str>> {
        match domain_obj.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(TypedDataError::invalid_value(
                key,
                format!("expected string, got {}", other),
            )),
        }
    }

    /// Parse types from JSON value
    pub fn parse_types(types_value: &Value) -> TypedDataResult<Eip712Types> {
        let types_obj = types_value
            .as_object()
            .ok_or_else(|| TypedDataError::InvalidJson("Types must be an object".to_string()))?;
        let mut types = Eip712Types::new();

        for (type_name, type_def) in types_obj {
            let fields_array = type_def.as_array().ok_or_else(|| {
                TypedDataError::InvalidJson(format!(
                    "Type '{}' definition must be an array",
                    type_name
                ))
            })?;

            let mut fields = Vec::with_capacity(fields_array.len());
            for field_value in fields_array {
                let field: Eip712Field =
                    serde_json::from_value(field_value.clone()).map_err(|e| {
                        TypedDataError::InvalidJson(format!(
                            "Invalid field in type '{}': {}",
                            type_name, e
                        ))
                    })?;
                fields.push(field);
            }

            types.insert(type_name.clone(), Eip712Struct { fields });
        }

        Ok(types)
    }

    /// Infer the primary type: the only struct no other struct references.
    pub fn infer_primary_type(types: &Eip712Types) -> TypedDataResult<String> {
        let mut referenced = BTreeSet::new();
        for struct_def in types.values() {
            for field in &struct_def.fields {
                let def = Self::parse_field_type(&field.r#type)?;
                if let Some(name) = def.field_type.type_name() {
                    referenced.insert(name.to_string());
                }
            }
        }

        let candidates: Vec<&String> = types
            .keys()
            .filter(|name| name.as_str() != EIP712_DOMAIN_TYPE && !referenced.contains(*name))
            .collect();

        match candidates.as_slice() {
            [primary] => Ok((*primary).clone()),
            [] => Err(TypedDataError::InvalidPrimaryType(
                "No primary type candidate found".to_string(),
            )),
            many => Err(TypedDataError::InvalidPrimaryType(format!(
                "Ambiguous primary type: {}",
                many.iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}
