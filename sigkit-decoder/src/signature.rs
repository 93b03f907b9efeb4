// SPDX-License-Identifier: Apache-2.0

//! Recoverable ECDSA signature `r || s || v`

use serde::{Deserialize, Serialize};
use sigkit_primitives::constants::{length, recovery};
use std::fmt;
use std::str::FromStr;

use crate::errors::{DecodeError, DecodeResult};

/// Signature as returned by wallets: 32-byte r, 32-byte s, 1-byte v
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Recovery value (0/1, 27/28 or EIP-155 encoded)
    pub v: u8,
    /// Signature component r (32 bytes)
    pub r: [u8; 32],
    /// Signature component s (32 bytes)
    pub s: [u8; 32],
}

impl Signature {
    /// Create a new signature from components
    pub fn new(v: u8, r: &[u8], s: &[u8]) -> DecodeResult<Self> {
        let r: [u8; 32] = r.try_into().map_err(|_| {
            DecodeError::InvalidSignature(format!("Invalid r length: {} (expected 32)", r.len()))
        })?;
        let s: [u8; 32] = s.try_into().map_err(|_| {
            DecodeError::InvalidSignature(format!("Invalid s length: {} (expected 32)", s.len()))
        })?;
        Ok(Signature { v, r, s })
    }

    /// Parse `r || s || v` bytes
    pub fn from_bytes(data: &[u8]) -> DecodeResult<Self> {
        if data.len() != length::SIGNATURE_SIZE {
            return Err(DecodeError::InvalidSignatureLength {
                actual: data.len(),
                expected: length::SIGNATURE_SIZE,
            });
        }

        let r = &data[0..32];
        let s = &data[32..64];
        let v = data[64];

        Self::new(v, r, s)
    }

    /// Parse a hex-encoded signature (0x prefix optional)
    pub fn from_hex(signature: &str) -> DecodeResult<Self> {
        let trimmed = signature.trim();
        let hex_str = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize back to `r || s || v`
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; length::SIGNATURE_SIZE];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// `0x`-prefixed hex of `r || s || v`
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// `r || s` with the recovery byte dropped
    pub fn rs(&self) -> [u8; 64] {
        let mut out = [0u8; 2 * length::SIGNATURE_COMPONENT_SIZE];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    /// Recovery id (0 or 1) encoded by `v`
    pub fn recovery_id(&self) -> DecodeResult<u8> {
        match self.v {
            0 | 1 => Ok(self.v),
            27 | 28 => Ok(self.v - recovery::LEGACY_V_OFFSET),
            v if v as u64 >= recovery::EIP155_V_OFFSET => {
                Ok(((v as u64 - recovery::EIP155_V_OFFSET) % 2) as u8)
            }
            v => Err(DecodeError::InvalidRecoveryId(v)),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Signature {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
