// SPDX-License-Identifier: Apache-2.0

//! Error types for signers

use sigkit_primitives::TypedDataError;
use thiserror::Error;

/// Errors raised by the bundled signers
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SignerError {
    /// Private key bytes are not a valid secp256k1 scalar
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Hex encoding/decoding error
    #[error("Hex error: {0}")]
    HexError(String),

    /// Typed data could not be hashed
    #[error("Invalid typed data: {0}")]
    TypedData(#[from] TypedDataError),

    /// The ECDSA signing primitive failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

impl From<hex::FromHexError> for SignerError {
    fn from(err: hex::FromHexError) -> Self {
        SignerError::HexError(err.to_string())
    }
}

/// Result type alias for signer operations
pub type SignerResult<T> = Result<T, SignerError>;
