// SPDX-License-Identifier: Apache-2.0

//! Signer abstraction
//!
//! A [`Signer`] is whatever holds the key: a browser wallet extension, a
//! hardware device, or the in-memory [`LocalSigner`]. It returns signatures
//! the way wallets do, as an opaque `0x`-prefixed hex string of
//! `r || s || v` with `v` in `{27, 28}`.

mod errors;
mod local;

pub use async_trait::async_trait;
pub use errors::*;
pub use local::LocalSigner;

use sigkit_primitives::{EthAddress, Eip712TypedData};

/// Use to obtain signatures from a key holder
#[async_trait]
pub trait Signer {
    /// Error defined by the signer implementation
    type Error;

    /// Address of the signing account
    async fn address(&self) -> Result<EthAddress, Self::Error>;

    /// Sign `message` with EIP-191 personal message hashing (`personal_sign`)
    async fn sign_message(&self, message: &[u8]) -> Result<String, Self::Error>;

    /// Sign EIP-712 typed data (`eth_signTypedData_v4`)
    async fn sign_typed_data(&self, typed_data: &Eip712TypedData) -> Result<String, Self::Error>;
}
