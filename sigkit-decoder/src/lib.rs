// SPDX-License-Identifier: Apache-2.0

//! Ethereum signature decoder
//!
//! Turns a signed payload and a wallet signature into the raw components a
//! verifier circuit or contract consumes:
//!
//! - **Digest**: the 32-byte EIP-191 or EIP-712 hash that was signed
//! - **Public key**: recovered from the digest and signature, split into X and Y
//! - **Signature**: r and s concatenated, with the recovery byte dropped
//!
//! The result can be rendered as a plain-text artifact with one labeled line
//! per field and written to disk.
//!

pub mod decoder;
pub mod errors;
pub mod export;
pub mod signature;

pub use decoder::*;
pub use errors::*;
pub use export::{write_artifact, DEFAULT_ARTIFACT_NAME};
pub use signature::Signature;
