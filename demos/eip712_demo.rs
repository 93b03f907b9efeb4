// SPDX-License-Identifier: Apache-2.0

//! EIP-712 signing example
//!
//! Builds a `Challenge` typed-data payload, prints its encoding steps, signs it
//! and decodes the signature.

use std::error::Error;

use serde_json::json;
use sigkit_decoder::{DecodeParams, SignatureDecoder};
use sigkit_primitives::{Eip712Converter, Eip712TypedData};
use sigkit_signer::{LocalSigner, Signer};

// Well-known development key, never use it for real funds
const DEV_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

fn challenge() -> Result<Eip712TypedData, Box<dyn Error>> {
    let typed_data = json!({
        "domain": {
            "name": "IncognitoInsight",
            "version": "0.0.1",
            "chainId": 11155111,
            "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC",
            "salt": format!("0x{}", "00".repeat(32))
        },
        "types": {
            "Challenge": [
                { "name": "challengerAddress", "type": "address" },
                { "name": "platform", "type": "address" },
                { "name": "holdings", "type": "Holdings" },
                { "name": "expectedProfitPercentage", "type": "uint256" },
                { "name": "actualProfitPercentage", "type": "uint256" },
                { "name": "solverAddress", "type": "address" },
                { "name": "solverNickname", "type": "string" }
            ],
            "Holdings": [
                { "name": "tokenHeld1", "type": "address" },
                { "name": "tokenHeld2", "type": "address" },
                { "name": "tokenHeld3", "type": "address" },
                { "name": "tokenHeld4", "type": "address" },
                { "name": "tokenHeld5", "type": "address" }
            ]
        },
        "primaryType": "Challenge",
        "message": {
            "challengerAddress": ZERO_ADDRESS,
            "platform": ZERO_ADDRESS,
            "holdings": {
                "tokenHeld1": ZERO_ADDRESS,
                "tokenHeld2": ZERO_ADDRESS,
                "tokenHeld3": ZERO_ADDRESS,
                "tokenHeld4": ZERO_ADDRESS,
                "tokenHeld5": ZERO_ADDRESS
            },
            "expectedProfitPercentage": 500,
            "actualProfitPercentage": 600,
            "solverAddress": ZERO_ADDRESS,
            "solverNickname": "############################test"
        }
    });

    Ok(Eip712Converter::parse_value_to_typed_data(&typed_data)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::init();

    let typed_data = challenge()?;
    let signer = LocalSigner::from_hex(DEV_KEY)?;

    println!("📋 Typed data encoding:");
    println!("  encodeType: {}", typed_data.encode_type(&typed_data.primary_type)?);
    println!(
        "  typeHash: 0x{}",
        hex::encode(typed_data.type_hash(&typed_data.primary_type)?)
    );
    println!(
        "  Domain separator: 0x{}",
        hex::encode(typed_data.domain_separator()?)
    );
    println!("  Message hash: 0x{}", hex::encode(typed_data.message_hash()?));
    println!("  Signing hash: 0x{}", hex::encode(typed_data.signing_hash()?));

    let signature = signer.sign_typed_data(&typed_data).await?;
    println!("\n✍️  Signature: {}", signature);

    let params = DecodeParams::new(typed_data, signature)
        .with_expected_signer(signer.address().await?);

    match SignatureDecoder::decode(params) {
        Ok(decoded) => {
            println!("✅ Decoded signature:");
            println!("{}", decoded.to_artifact());
            println!("  Signer: {}", decoded.signer_address());
        }
        Err(e) if e.is_recovery_failure() => {
            eprintln!("❌ Signature does not match the signer: {}", e);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
