// SPDX-License-Identifier: Apache-2.0

//! Core data types: Ethereum addresses and the EIP-712 typed data model

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{length, prefix};
use crate::errors::{TypedDataError, TypedDataResult};
use crate::hashing::keccak256;

/// Ethereum address information
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthAddress {
    /// Hex-encoded Ethereum address (with 0x prefix)
    pub address: String,
}

impl EthAddress {
    /// Create a new Ethereum address from hex string
    pub fn new(address: String) -> TypedDataResult<Self> {
        if !address.starts_with("0x") {
            return Err(TypedDataError::InvalidAddress(
                "Address must start with 0x".to_string(),
            ));
        }
        if address.len() != length::ETH_ADDRESS_STR_LEN {
            return Err(TypedDataError::InvalidAddress(format!(
                "Address must be {} characters long, got {}",
                length::ETH_ADDRESS_STR_LEN,
                address.len()
            )));
        }
        if let Some((i, c)) = address[2..]
            .chars()
            .enumerate()
            .find(|(_, c)| !c.is_ascii_hexdigit())
        {
            return Err(TypedDataError::InvalidAddress(format!(
                "Invalid character '{}' at position {}",
                c,
                i + 2
            )));
        }
        Ok(EthAddress { address })
    }

    /// Convert raw address bytes to EthAddress
    pub fn from_bytes(bytes: &[u8]) -> TypedDataResult<Self> {
        if bytes.len() != length::ETH_ADDRESS_SIZE {
            return Err(TypedDataError::InvalidAddress(format!(
                "Invalid address length: {} bytes (expected {})",
                bytes.len(),
                length::ETH_ADDRESS_SIZE
            )));
        }
        let mut raw = [0u8; length::ETH_ADDRESS_SIZE];
        raw.copy_from_slice(bytes);
        Ok(Self::from_raw(raw))
    }

    /// Build an address from its 20 raw bytes (lowercase hex)
    pub fn from_raw(bytes: [u8; 20]) -> Self {
        EthAddress {
            address: format!("0x{}", hex::encode(bytes)),
        }
    }

    /// Derive the address from public key coordinates `X || Y`:
    /// the last 20 bytes of `keccak256(X || Y)`
    pub fn from_coordinates(coordinates: &[u8; 64]) -> Self {
        let hash = keccak256(coordinates);
        let mut raw = [0u8; length::ETH_ADDRESS_SIZE];
        raw.copy_from_slice(&hash[12..]);
        Self::from_raw(raw)
    }

    /// Derive the address of an uncompressed public key.
    ///
    /// Accepts either the 65-byte SEC1 form (`0x04 || X || Y`) or the bare
    /// 64-byte `X || Y` concatenation.
    pub fn from_public_key(public_key: &[u8]) -> TypedDataResult<Self> {
        let coordinates = match public_key.len() {
            length::UNCOMPRESSED_PUBLIC_KEY_SIZE if public_key[0] == prefix::UNCOMPRESSED_POINT => {
                &public_key[1..]
            }
            64 => public_key,
            other => {
                return Err(TypedDataError::InvalidAddress(format!(
                    "Invalid public key length: {} (expected 64 or 65 uncompressed)",
                    other
                )))
            }
        };
        let coordinates: &[u8; 64] = coordinates
            .try_into()
            .map_err(|_| TypedDataError::InvalidAddress("Invalid public key".to_string()))?;
        Ok(Self::from_coordinates(coordinates))
    }

    /// Get the address without 0x prefix
    pub fn without_prefix(&self) -> &str {
        &self.address[2..]
    }

    /// Get the raw bytes of the address
    pub fn to_bytes(&self) -> Result<[u8; 20], hex::FromHexError> {
        let mut out = [0u8; length::ETH_ADDRESS_SIZE];
        hex::decode_to_slice(self.without_prefix(), &mut out)?;
        Ok(out)
    }

    /// Compare two addresses ignoring checksum casing
    pub fn eq_ignore_case(&self, other: &EthAddress) -> bool {
        self.address.eq_ignore_ascii_case(&other.address)
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

impl std::str::FromStr for EthAddress {
    type Err = TypedDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EthAddress::new(s.trim().to_string())
    }
}

/// EIP-712 domain. All fields are optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eip712Domain {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(rename = "chainId")]
    pub chain_id: Option<u64>,
    #[serde(rename = "verifyingContract")]
    pub verifying_contract: Option<String>,
    /// 32-byte salt
    pub salt: Option<Vec<u8>>,
}

impl Eip712Domain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_version(mut self, version: String) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_verifying_contract(mut self, verifying_contract: String) -> Self {
        self.verifying_contract = Some(verifying_contract);
        self
    }

    pub fn with_salt(mut self, salt: Vec<u8>) -> Self {
        self.salt = Some(salt);
        self
    }

    /// Field list of the implicit `EIP712Domain` struct, in canonical order,
    /// containing only the members that are set.
    pub fn implicit_type(&self) -> Eip712Struct {
        let mut domain_type = Eip712Struct::new();
        if self.name.is_some() {
            domain_type = domain_type.with_field(Eip712Field::new("name", "string"));
        }
        if self.version.is_some() {
            domain_type = domain_type.with_field(Eip712Field::new("version", "string"));
        }
        if self.chain_id.is_some() {
            domain_type = domain_type.with_field(Eip712Field::new("chainId", "uint256"));
        }
        if self.verifying_contract.is_some() {
            domain_type = domain_type.with_field(Eip712Field::new("verifyingContract", "address"));
        }
        if self.salt.is_some() {
            domain_type = domain_type.with_field(Eip712Field::new("salt", "bytes32"));
        }
        domain_type
    }

    /// Build a JSON object for the domain, as it appears in typed data
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        if let Some(name) = &self.name {
            map.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(version) = &self.version {
            map.insert("version".to_string(), Value::String(version.clone()));
        }
        if let Some(chain_id) = self.chain_id {
            map.insert("chainId".to_string(), Value::Number(chain_id.into()));
        }
        if let Some(addr) = &self.verifying_contract {
            map.insert("verifyingContract".to_string(), Value::String(addr.clone()));
        }
        if let Some(salt) = &self.salt {
            map.insert(
                "salt".to_string(),
                Value::String(format!("0x{}", hex::encode(salt))),
            );
        }
        Value::Object(map)
    }
}

/// A named, typed member of an EIP-712 struct
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eip712Field {
    pub name: String,
    pub r#type: String,
}

impl Eip712Field {
    pub fn new(name: impl Into<String>, r#type: impl Into<String>) -> Self {
        Eip712Field {
            name: name.into(),
            r#type: r#type.into(),
        }
    }
}

/// Ordered member list of an EIP-712 struct type
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Eip712Struct {
    pub fields: Vec<Eip712Field>,
}

impl Eip712Struct {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: Eip712Field) -> Self {
        self.fields.push(field);
        self
    }
}

/// Struct name to struct definition. Sorted, so iteration is deterministic.
pub type Eip712Types = BTreeMap<String, Eip712Struct>;

/// Complete EIP-712 typed data payload (`eth_signTypedData_v4` shape)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Eip712TypedData {
    pub domain: Eip712Domain,
    pub types: Eip712Types,
    #[serde(rename = "primaryType")]
    pub primary_type: String,
    pub message: Value,
}

impl Eip712TypedData {
    pub fn new(
        domain: Eip712Domain,
        types: Eip712Types,
        primary_type: String,
        message: Value,
    ) -> Self {
        Eip712TypedData {
            domain,
            types,
            primary_type,
            message,
        }
    }
}

/// Base (non-array) EIP-712 field type
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Eip712FieldType {
    Bool,
    Address,
    String,
    DynamicBytes,
    /// `bytesN`, size in bytes (1..=32)
    FixedBytes(u8),
    /// `uintN`, size in bytes (1..=32)
    Uint(u8),
    /// `intN`, size in bytes (1..=32)
    Int(u8),
    /// Reference to another struct type
    Custom(String),
}

impl Eip712FieldType {
    /// Struct name for custom types
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Eip712FieldType::Custom(name) => Some(name),
            _ => None,
        }
    }
}

/// One array dimension of a field type
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Eip712ArrayLevel {
    /// `T[]`
    Dynamic,
    /// `T[n]`
    Fixed(usize),
}

impl Eip712ArrayLevel {
    pub fn size(&self) -> Option<usize> {
        match self {
            Eip712ArrayLevel::Dynamic => None,
            Eip712ArrayLevel::Fixed(size) => Some(*size),
        }
    }
}

/// Parsed field type: base type plus array dimensions.
///
/// `array_levels` are in written order, so for `uint8[2][]` the levels are
/// `[Fixed(2), Dynamic]` and the last level is the outermost array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip712FieldDefinition {
    pub field_type: Eip712FieldType,
    pub array_levels: Vec<Eip712ArrayLevel>,
}
