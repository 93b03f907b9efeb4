// SPDX-License-Identifier: Apache-2.0

//! Digest computation, public key recovery and component splitting

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use log::debug;
use sigkit_primitives::constants::{length, prefix};
use sigkit_primitives::{hash_personal_message, EthAddress, Eip712TypedData};

use crate::errors::{DecodeError, DecodeResult};
use crate::signature::Signature;

/// What was signed, which determines how the digest is computed
#[derive(Clone, Debug, PartialEq)]
pub enum SignedPayload {
    /// EIP-191 personal message (`personal_sign`)
    PersonalMessage(Vec<u8>),
    /// EIP-712 typed data (`eth_signTypedData_v4`)
    TypedData(Eip712TypedData),
    /// Digest computed elsewhere
    Digest([u8; 32]),
}

impl SignedPayload {
    /// Domain-separated digest of the payload
    pub fn digest(&self) -> DecodeResult<[u8; 32]> {
        match self {
            SignedPayload::PersonalMessage(message) => Ok(hash_personal_message(message)),
            SignedPayload::TypedData(typed_data) => Ok(typed_data.signing_hash()?),
            SignedPayload::Digest(digest) => Ok(*digest),
        }
    }
}

impl From<&str> for SignedPayload {
    fn from(message: &str) -> Self {
        SignedPayload::PersonalMessage(message.as_bytes().to_vec())
    }
}

impl From<Eip712TypedData> for SignedPayload {
    fn from(typed_data: Eip712TypedData) -> Self {
        SignedPayload::TypedData(typed_data)
    }
}

/// Parameters for a decode call
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeParams {
    /// Signed payload
    pub payload: SignedPayload,
    /// Hex-encoded 65-byte signature
    pub signature: String,
    /// Optional account the signature must recover to
    pub expected_signer: Option<EthAddress>,
}

impl DecodeParams {
    /// Create new parameters for decoding a signature over `payload`
    pub fn new(payload: impl Into<SignedPayload>, signature: impl Into<String>) -> Self {
        DecodeParams {
            payload: payload.into(),
            signature: signature.into(),
            expected_signer: None,
        }
    }

    /// Require the recovered key to belong to `address`
    pub fn with_expected_signer(mut self, address: EthAddress) -> Self {
        self.expected_signer = Some(address);
        self
    }
}

/// Raw components of a decoded signature
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedSignature {
    /// Digest the signature was verified against
    pub digest: [u8; 32],
    /// X coordinate of the recovered public key
    pub public_key_x: [u8; 32],
    /// Y coordinate of the recovered public key
    pub public_key_y: [u8; 32],
    /// `r || s`
    pub signature_rs: [u8; 64],
}

impl DecodedSignature {
    /// Uncompressed SEC1 public key (`0x04 || X || Y`)
    pub fn public_key(&self) -> [u8; 65] {
        let mut out = [0u8; length::UNCOMPRESSED_PUBLIC_KEY_SIZE];
        out[0] = prefix::UNCOMPRESSED_POINT;
        out[1..33].copy_from_slice(&self.public_key_x);
        out[33..].copy_from_slice(&self.public_key_y);
        out
    }

    /// Ethereum address of the recovered public key
    pub fn signer_address(&self) -> EthAddress {
        let mut coordinates = [0u8; 64];
        coordinates[..32].copy_from_slice(&self.public_key_x);
        coordinates[32..].copy_from_slice(&self.public_key_y);
        EthAddress::from_coordinates(&coordinates)
    }
}

/// Stateless signature decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureDecoder;

impl SignatureDecoder {
    /// Decode a signature: compute the digest, recover the public key and
    /// split both into fixed-size byte arrays.
    pub fn decode(params: DecodeParams) -> DecodeResult<DecodedSignature> {
        let signature = Signature::from_hex(&params.signature)?;
        let digest = params.payload.digest()?;
        let decoded = Self::decode_digest(&digest, &signature)?;

        if let Some(expected) = params.expected_signer {
            let recovered = decoded.signer_address();
            if !recovered.eq_ignore_case(&expected) {
                return Err(DecodeError::SignerMismatch {
                    expected,
                    recovered,
                });
            }
        }

        Ok(decoded)
    }

    /// Decode a signature over an already computed digest
    pub fn decode_digest(
        digest: &[u8; 32],
        signature: &Signature,
    ) -> DecodeResult<DecodedSignature> {
        debug!("decoding signature over digest 0x{}", hex::encode(digest));

        let public_key = Self::recover_public_key(digest, signature)?;

        let mut public_key_x = [0u8; length::PUBLIC_KEY_COORDINATE_SIZE];
        let mut public_key_y = [0u8; length::PUBLIC_KEY_COORDINATE_SIZE];
        public_key_x.copy_from_slice(&public_key[1..33]);
        public_key_y.copy_from_slice(&public_key[33..65]);

        Ok(DecodedSignature {
            digest: *digest,
            public_key_x,
            public_key_y,
            signature_rs: signature.rs(),
        })
    }

    /// Recover the uncompressed public key that produced `signature` over `digest`.
    ///
    /// High-s signatures are normalized (flipping the recovery parity) before
    /// recovery, so both forms of a malleable signature recover the same key.
    pub fn recover_public_key(digest: &[u8; 32], signature: &Signature) -> DecodeResult<[u8; 65]> {
        let recovery_byte = signature.recovery_id()?;
        let mut recovery_id = RecoveryId::from_byte(recovery_byte)
            .ok_or(DecodeError::InvalidRecoveryId(signature.v))?;

        let mut ecdsa_signature = EcdsaSignature::from_slice(&signature.rs())
            .map_err(|e| DecodeError::InvalidSignature(e.to_string()))?;

        if let Some(normalized) = ecdsa_signature.normalize_s() {
            debug!("normalizing high-s signature before recovery");
            ecdsa_signature = normalized;
            recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
        }

        let verifying_key =
            VerifyingKey::recover_from_prehash(digest, &ecdsa_signature, recovery_id)
                .map_err(|e| DecodeError::RecoveryFailed(e.to_string()))?;

        let point = verifying_key.to_encoded_point(false);
        let mut public_key = [0u8; length::UNCOMPRESSED_PUBLIC_KEY_SIZE];
        public_key.copy_from_slice(point.as_bytes());

        debug!("recovered public key 0x{}", hex::encode(public_key));
        Ok(public_key)
    }
}

/// Decode a `personal_sign` signature over `message`
pub fn decode_personal_message(message: &str, signature: &str) -> DecodeResult<DecodedSignature> {
    SignatureDecoder::decode(DecodeParams::new(message, signature))
}

/// Decode an `eth_signTypedData_v4` signature over `typed_data`
pub fn decode_typed_data(
    typed_data: &Eip712TypedData,
    signature: &str,
) -> DecodeResult<DecodedSignature> {
    SignatureDecoder::decode(DecodeParams::new(typed_data.clone(), signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigkit_primitives::Eip712Converter;

    // Reference signature of the EIP-712 "Mail" example, signed with keccak256("cow")
    const MAIL_R: &str = "4355c47d63924e8a72e509b65029052eb6c299d53a04e167c5775fd466751c9d";
    const MAIL_S: &str = "07299936d304c153f6443dfa05f40ff007d72911b6f72307f996231605b91562";
    const MAIL_DIGEST: &str = "be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2";
    const COW_ADDRESS: &str = "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826";

    // secp256k1 group order
    const CURVE_ORDER: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    fn mail_signature(v: u8) -> String {
        format!("0x{}{}{:02x}", MAIL_R, MAIL_S, v)
    }

    fn mail_digest() -> [u8; 32] {
        let mut digest = [0u8; 32];
        hex::decode_to_slice(MAIL_DIGEST, &mut digest).unwrap();
        digest
    }

    fn mail_typed_data() -> Eip712TypedData {
        Eip712Converter::parse_json_to_typed_data(
            r#"{
                "types": {
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
            }"#,
        )
        .unwrap()
    }

    /// `n - s` as hex, to build the high-s twin of a signature
    fn negate_s(s: &[u8; 32]) -> [u8; 32] {
        let mut order = [0u8; 32];
        hex::decode_to_slice(CURVE_ORDER, &mut order).unwrap();
        let mut out = [0u8; 32];
        let mut borrow = 0i16;
        for i in (0..32).rev() {
            let mut diff = order[i] as i16 - s[i] as i16 - borrow;
            borrow = if diff < 0 {
                diff += 256;
                1
            } else {
                0
            };
            out[i] = diff as u8;
        }
        out
    }

    #[test]
    fn test_decode_reference_mail_signature() {
        let decoded = decode_typed_data(&mail_typed_data(), &mail_signature(28)).unwrap();

        assert_eq!(hex::encode(decoded.digest), MAIL_DIGEST);
        assert_eq!(hex::encode(&decoded.signature_rs[..32]), MAIL_R);
        assert_eq!(hex::encode(&decoded.signature_rs[32..]), MAIL_S);
        assert!(decoded
            .signer_address()
            .eq_ignore_case(&COW_ADDRESS.parse().unwrap()));
        assert_eq!(decoded.public_key()[0], 0x04);
    }

    #[test]
    fn test_wrong_recovery_parity_recovers_other_key() {
        let right = decode_typed_data(&mail_typed_data(), &mail_signature(28)).unwrap();
        let wrong = decode_typed_data(&mail_typed_data(), &mail_signature(27)).unwrap();
        assert_ne!(right.public_key(), wrong.public_key());
    }

    #[test]
    fn test_expected_signer_check() {
        let params = DecodeParams::new(mail_typed_data(), mail_signature(28))
            .with_expected_signer(COW_ADDRESS.to_lowercase().parse().unwrap());
        assert!(SignatureDecoder::decode(params).is_ok());

        let params = DecodeParams::new(mail_typed_data(), mail_signature(28))
            .with_expected_signer("0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB".parse().unwrap());
        let err = SignatureDecoder::decode(params).unwrap_err();
        assert!(matches!(err, DecodeError::SignerMismatch { .. }));
        assert!(err.is_recovery_failure());
    }

    #[test]
    fn test_high_s_signature_recovers_same_key() {
        let low = Signature::from_hex(&mail_signature(28)).unwrap();
        let high = Signature::new(27, &low.r, &negate_s(&low.s)).unwrap();

        let digest = mail_digest();
        let from_low = SignatureDecoder::decode_digest(&digest, &low).unwrap();
        let from_high = SignatureDecoder::decode_digest(&digest, &high).unwrap();

        assert_eq!(from_low.public_key(), from_high.public_key());
        // components are reported as given
        assert_eq!(&from_high.signature_rs[32..], &high.s[..]);
    }

    #[test]
    fn test_zero_scalars_rejected() {
        let zero = format!("0x{}1b", "00".repeat(64));
        let err = decode_personal_message("hello", &zero).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidSignature(_)));
        assert!(err.is_malformed_signature());
    }

    #[test]
    fn test_r_not_on_curve_fails_recovery() {
        // x = 5 has no point on secp256k1 (5^3 + 7 = 132 is not a square mod p)
        let r = format!("{:0>64}", "5");
        let signature = format!("0x{}{}1b", r, MAIL_S);
        let err = decode_personal_message("hello", &signature).unwrap_err();
        assert!(matches!(err, DecodeError::RecoveryFailed(_)));
    }

    #[test]
    fn test_invalid_v_rejected() {
        let err = decode_typed_data(&mail_typed_data(), &mail_signature(5)).unwrap_err();
        assert_eq!(err, DecodeError::InvalidRecoveryId(5));
    }

    #[test]
    fn test_digest_payload_passthrough() {
        let payload = SignedPayload::Digest(mail_digest());
        assert_eq!(payload.digest().unwrap(), mail_digest());

        let decoded =
            SignatureDecoder::decode(DecodeParams::new(payload, mail_signature(28))).unwrap();
        assert!(decoded
            .signer_address()
            .eq_ignore_case(&COW_ADDRESS.parse().unwrap()));
    }

    #[test]
    fn test_decode_is_deterministic() {
        let first = decode_typed_data(&mail_typed_data(), &mail_signature(28)).unwrap();
        let second = decode_typed_data(&mail_typed_data(), &mail_signature(28)).unwrap();
        assert_eq!(first, second);
    }
}
