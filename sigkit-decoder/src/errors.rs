// SPDX-License-Identifier: Apache-2.0

//! Error types for signature decoding

use sigkit_primitives::{EthAddress, TypedDataError};
use thiserror::Error;

/// The single error type surfaced by decode and export operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// Signature is not valid hex
    #[error("Hex error: {0}")]
    HexError(String),

    /// Signature does not decode to 65 bytes
    #[error("Invalid signature length: {actual} bytes (expected {expected})")]
    InvalidSignatureLength { actual: usize, expected: usize },

    /// r or s is not a valid secp256k1 scalar
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// The trailing v byte does not encode a recovery id
    #[error("Invalid recovery value: v = {0}")]
    InvalidRecoveryId(u8),

    /// The signed payload could not be hashed
    #[error("Invalid typed data: {0}")]
    TypedData(#[from] TypedDataError),

    /// Public key recovery failed: the signature does not correspond to the digest
    #[error("Public key recovery failed: {0}")]
    RecoveryFailed(String),

    /// Recovered key belongs to a different account than expected
    #[error("Recovered signer {recovered} does not match expected {expected}")]
    SignerMismatch {
        expected: EthAddress,
        recovered: EthAddress,
    },

    /// Writing the artifact failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl DecodeError {
    /// Check if error is due to a malformed signature string
    pub fn is_malformed_signature(&self) -> bool {
        matches!(
            self,
            DecodeError::HexError(_)
                | DecodeError::InvalidSignatureLength { .. }
                | DecodeError::InvalidSignature(_)
                | DecodeError::InvalidRecoveryId(_)
        )
    }

    /// Check if error is due to the signature not matching the digest or signer
    pub fn is_recovery_failure(&self) -> bool {
        matches!(
            self,
            DecodeError::RecoveryFailed(_) | DecodeError::SignerMismatch { .. }
        )
    }
}

impl From<hex::FromHexError> for DecodeError {
    fn from(err: hex::FromHexError) -> Self {
        DecodeError::HexError(err.to_string())
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::Io(err.to_string())
    }
}

/// Result type alias for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;
