// SPDX-License-Identifier: Apache-2.0

//! EIP-712 typed structured data
//!
//! Parsing of `eth_signTypedData_v4` payloads and the hashing rules that
//! produce the digest a wallet signs.

pub mod converter;
pub mod encoding;

pub use converter::*;
