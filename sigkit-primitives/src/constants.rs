// SPDX-License-Identifier: Apache-2.0

//! Size and prefix constants shared by the sigkit crates

/// Data length constants
pub mod length {
    /// Size of an Ethereum address
    pub const ETH_ADDRESS_SIZE: usize = 20;
    /// Size of a `0x`-prefixed address string
    pub const ETH_ADDRESS_STR_LEN: usize = 42;
    /// Size of an EIP-712 encoded word
    pub const WORD_SIZE: usize = 32;
    /// Size of signature component (r or s)
    pub const SIGNATURE_COMPONENT_SIZE: usize = 32;
    /// Size of signature recovery value (v)
    pub const SIGNATURE_V_SIZE: usize = 1;
    /// Size of a full recoverable signature (r || s || v)
    pub const SIGNATURE_SIZE: usize = 2 * SIGNATURE_COMPONENT_SIZE + SIGNATURE_V_SIZE;
    /// Size of a secp256k1 private key
    pub const PRIVATE_KEY_SIZE: usize = 32;
    /// Size of an uncompressed SEC1 public key
    pub const UNCOMPRESSED_PUBLIC_KEY_SIZE: usize = 65;
    /// Size of a public key coordinate (X or Y)
    pub const PUBLIC_KEY_COORDINATE_SIZE: usize = 32;
}

/// EIP-191 / EIP-712 prefixes
pub mod prefix {
    /// EIP-191 version 0x45 personal message prefix
    pub const PERSONAL_MESSAGE: &str = "\x19Ethereum Signed Message:\n";
    /// EIP-712 signing prefix (EIP-191 version 0x01)
    pub const TYPED_DATA: [u8; 2] = [0x19, 0x01];
    /// SEC1 tag byte of an uncompressed point
    pub const UNCOMPRESSED_POINT: u8 = 0x04;
}

/// Legacy Ethereum recovery value offsets
pub mod recovery {
    /// `v = 27 + recovery_id`
    pub const LEGACY_V_OFFSET: u8 = 27;
    /// `v = chain_id * 2 + 35 + recovery_id` (EIP-155)
    pub const EIP155_V_OFFSET: u64 = 35;
}
