// SPDX-License-Identifier: Apache-2.0

//! Error types for Ethereum primitives and EIP-712 typed data

use thiserror::Error;

/// Errors raised while parsing or hashing EIP-712 typed data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypedDataError {
    /// Typed data JSON could not be parsed
    #[error("Invalid typed data JSON: {0}")]
    InvalidJson(String),

    /// A field type string is not a valid EIP-712 type
    #[error("Invalid field type: {0}")]
    InvalidFieldType(String),

    /// A struct type is referenced but not defined
    #[error("Unknown struct type: {0}")]
    UnknownType(String),

    /// The primary type is missing or cannot be inferred
    #[error("Invalid primary type: {0}")]
    InvalidPrimaryType(String),

    /// A struct field has no value in the message
    #[error("Missing value for field '{field}' of type '{struct_name}'")]
    MissingField { struct_name: String, field: String },

    /// A value does not match its declared type
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// Fixed-size array has the wrong number of elements
    #[error("Array length mismatch for '{field}': {actual} (expected {expected})")]
    ArrayLengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// Invalid Ethereum address
    #[error("Invalid Ethereum address: {0}")]
    InvalidAddress(String),

    /// Hex encoding/decoding error
    #[error("Hex error: {0}")]
    HexError(String),
}

impl TypedDataError {
    /// Build an `InvalidValue` error for the given field
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TypedDataError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Check if error comes from the type definitions rather than the message values
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            TypedDataError::InvalidFieldType(_)
                | TypedDataError::UnknownType(_)
                | TypedDataError::InvalidPrimaryType(_)
        )
    }
}

impl From<hex::FromHexError> for TypedDataError {
    fn from(err: hex::FromHexError) -> Self {
        TypedDataError::HexError(err.to_string())
    }
}

impl From<serde_json::Error> for TypedDataError {
    fn from(err: serde_json::Error) -> Self {
        TypedDataError::InvalidJson(err.to_string())
    }
}

/// Result type alias for typed data operations
pub type TypedDataResult<T> = Result<T, TypedDataError>;
