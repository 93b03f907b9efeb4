// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use log::debug;
use sigkit_primitives::constants::{length, recovery};
use sigkit_primitives::{hash_personal_message, EthAddress, Eip712TypedData};

use crate::errors::{SignerError, SignerResult};
use crate::Signer;

/// In-memory secp256k1 signer.
///
/// Signs with RFC 6979 deterministic nonces, so the same key and digest
/// always produce the same low-s signature.
#[derive(Clone)]
pub struct LocalSigner {
    key: SigningKey,
    address: EthAddress,
}

impl LocalSigner {
    /// Create a signer from a 32-byte private key
    pub fn from_bytes(bytes: &[u8]) -> SignerResult<Self> {
        // from_slice zero-pads short input
        if bytes.len() != length::PRIVATE_KEY_SIZE {
            return Err(SignerError::InvalidKey(format!(
                "expected {} bytes, got {}",
                length::PRIVATE_KEY_SIZE,
                bytes.len()
            )));
        }
        let key =
            SigningKey::from_slice(bytes).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        let point = key.verifying_key().to_encoded_point(false);
        let address = EthAddress::from_public_key(point.as_bytes())?;
        Ok(LocalSigner { key, address })
    }

    /// Create a signer from a hex private key (0x prefix optional)
    pub fn from_hex(private_key: &str) -> SignerResult<Self> {
        let trimmed = private_key.trim();
        let bytes = hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))?;
        Self::from_bytes(&bytes)
    }

    /// Uncompressed SEC1 public key (`0x04 || X || Y`)
    pub fn public_key(&self) -> [u8; 65] {
        let mut out = [0u8; length::UNCOMPRESSED_PUBLIC_KEY_SIZE];
        out.copy_from_slice(self.key.verifying_key().to_encoded_point(false).as_bytes());
        out
    }

    /// Address of the signing account
    pub fn eth_address(&self) -> &EthAddress {
        &self.address
    }

    /// Sign a 32-byte digest, returning `r || s || v` with `v = 27 + recovery_id`
    pub fn sign_digest(&self, digest: &[u8; 32]) -> SignerResult<[u8; 65]> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest)
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;

        let mut out = [0u8; length::SIGNATURE_SIZE];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery::LEGACY_V_OFFSET + recovery_id.to_byte();

        debug!(
            "signed digest 0x{} as {} (v={})",
            hex::encode(digest),
            self.address,
            out[64]
        );
        Ok(out)
    }

    fn sign_digest_hex(&self, digest: &[u8; 32]) -> SignerResult<String> {
        Ok(format!("0x{}", hex::encode(self.sign_digest(digest)?)))
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Signer for LocalSigner {
    type Error = SignerError;

    async fn address(&self) -> Result<EthAddress, Self::Error> {
        Ok(self.address.clone())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, Self::Error> {
        self.sign_digest_hex(&hash_personal_message(message))
    }

    async fn sign_typed_data(&self, typed_data: &Eip712TypedData) -> Result<String, Self::Error> {
        self.sign_digest_hex(&typed_data.signing_hash()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigkit_primitives::keccak256;

    // keccak256("cow"), the key of the EIP-712 reference example
    const COW_KEY: &str = "c85ef7d79691fe79573b1a7064c19c1a9819ebdbd1faaab1a8ec92344438aaf4";

    #[test]
    fn test_cow_key_matches_keccak() {
        assert_eq!(hex::encode(keccak256(b"cow")), COW_KEY);
    }

    #[test]
    fn test_local_signer_address() {
        let signer = LocalSigner::from_hex(&format!("0x{COW_KEY}")).unwrap();
        assert!(signer.eth_address().eq_ignore_case(
            &"0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826".parse().unwrap()
        ));
        assert_eq!(signer.public_key()[0], 0x04);
    }

    #[test]
    fn test_invalid_private_keys() {
        assert!(matches!(
            LocalSigner::from_bytes(&[0u8; 32]),
            Err(SignerError::InvalidKey(_))
        ));
        assert!(matches!(
            LocalSigner::from_hex("zz"),
            Err(SignerError::HexError(_))
        ));
    }

    #[test]
    fn test_private_key_length_enforced() {
        assert_eq!(
            LocalSigner::from_bytes(&[1u8; 31]).unwrap_err(),
            SignerError::InvalidKey("expected 32 bytes, got 31".to_string())
        );
        assert!(matches!(
            LocalSigner::from_bytes(&[1u8; 33]),
            Err(SignerError::InvalidKey(_))
        ));
        // a truncated hex key must not be padded into a different key
        let truncated = &COW_KEY[..62];
        assert!(matches!(
            LocalSigner::from_hex(truncated),
            Err(SignerError::InvalidKey(_))
        ));
        assert!(LocalSigner::from_bytes(&[1u8; 32]).is_ok());
    }

    #[test]
    fn test_sign_digest_is_deterministic() {
        let signer = LocalSigner::from_hex(COW_KEY).unwrap();
        let digest = keccak256(b"digest");
        let first = signer.sign_digest(&digest).unwrap();
        let second = signer.sign_digest(&digest).unwrap();
        assert_eq!(first, second);
        assert!(first[64] == 27 || first[64] == 28);
    }

    #[tokio::test]
    async fn test_sign_message_format() {
        let signer = LocalSigner::from_hex(COW_KEY).unwrap();
        let signature = signer.sign_message(b"Hello World").await.unwrap();
        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 2 + 130);
        assert_eq!(
            signer.address().await.unwrap(),
            signer.eth_address().clone()
        );
    }
}
