// SPDX-License-Identifier: Apache-2.0

//! Ethereum signing primitives
//!
//! Everything needed to reproduce the digest an Ethereum wallet signs:
//!
//! - **Keccak-256** hashing
//! - **EIP-191** personal message hashing (`personal_sign`)
//! - **EIP-712** typed structured data parsing and hashing (`eth_signTypedData_v4`)
//! - **Addresses**: validation and derivation from uncompressed public keys
//!

pub mod constants;
pub mod eip712;
pub mod errors;
pub mod hashing;
pub mod types;

pub use eip712::*;
pub use errors::*;
pub use hashing::*;
pub use types::*;
