// SPDX-License-Identifier: Apache-2.0

//! Keccak-256 and EIP-191 personal message hashing

use sha3::{Digest, Keccak256};

use crate::constants::prefix;

/// Compute the Keccak-256 hash of `data`
pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    Keccak256::digest(data.as_ref()).into()
}

/// Build the EIP-191 personal message preimage:
/// `"\x19Ethereum Signed Message:\n" || len(message) || message`
pub fn personal_message_preimage(message: &[u8]) -> Vec<u8> {
    let len = message.len().to_string();
    let mut preimage =
        Vec::with_capacity(prefix::PERSONAL_MESSAGE.len() + len.len() + message.len());
    preimage.extend_from_slice(prefix::PERSONAL_MESSAGE.as_bytes());
    preimage.extend_from_slice(len.as_bytes());
    preimage.extend_from_slice(message);
    preimage
}

/// Hash a message the way `personal_sign` does before signing
pub fn hash_personal_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(prefix::PERSONAL_MESSAGE.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Final EIP-712 digest: `keccak256(0x19 0x01 || domain_separator || struct_hash)`
pub fn typed_data_digest(domain_separator: &[u8; 32], struct_hash: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(prefix::TYPED_DATA);
    hasher.update(domain_separator);
    hasher.update(struct_hash);
    hasher.finalize().into()
}
