// SPDX-License-Identifier: Apache-2.0

//! Personal message signing example
//!
//! Signs "Hello World" with an in-memory key, decodes the signature back into
//! its digest, public key and `r || s` components, and writes the artifact.

use std::error::Error;

use sigkit_decoder::{decode_personal_message, write_artifact, DEFAULT_ARTIFACT_NAME};
use sigkit_signer::{LocalSigner, Signer};

// Well-known development key, never use it for real funds
const DEV_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::init();

    let signer = LocalSigner::from_hex(DEV_KEY)?;
    let message = "Hello World";

    println!("🔑 Signer: {}", signer.address().await?);

    let signature = signer.sign_message(message.as_bytes()).await?;
    println!("✍️  Signature: {}", signature);

    let decoded = decode_personal_message(message, &signature)?;
    println!("✅ Decoded signature:");
    println!("  Digest: 0x{}", hex::encode(decoded.digest));
    println!("  Public key X: 0x{}", hex::encode(decoded.public_key_x));
    println!("  Public key Y: 0x{}", hex::encode(decoded.public_key_y));
    println!("  Signature r||s: 0x{}", hex::encode(decoded.signature_rs));

    if decoded.public_key() == signer.public_key() {
        println!("✅ Recovered public key matches the signer");
    } else {
        eprintln!("❌ Recovered public key does not match the signer");
    }

    write_artifact(&decoded, DEFAULT_ARTIFACT_NAME)?;
    println!("📄 Wrote {}", DEFAULT_ARTIFACT_NAME);

    Ok(())
}
