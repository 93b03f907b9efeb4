// SPDX-License-Identifier: Apache-2.0

//! Decode an externally produced signature into its raw components
//!
//! ```text
//! decode_signature --message "Hello World" --signature 0x...
//! decode_signature --typed-data challenge.json --signature 0x... --json
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use log::debug;
use sigkit_decoder::{write_artifact, DecodeParams, SignatureDecoder, SignedPayload};
use sigkit_primitives::{EthAddress, Eip712Converter};

/// Recover the signer of an EIP-191 or EIP-712 signature and export the
/// digest, public key and `r || s` components.
#[derive(Parser)]
#[command(name = "decode_signature")]
#[command(group(ArgGroup::new("payload").required(true).args(["message", "typed_data"])))]
struct Cli {
    /// Personal message that was signed (EIP-191).
    #[arg(short, long)]
    message: Option<String>,

    /// JSON file holding the typed data that was signed (EIP-712).
    #[arg(short, long)]
    typed_data: Option<PathBuf>,

    /// 65-byte signature as hex, `r || s || v`.
    #[arg(short, long)]
    signature: String,

    /// Fail unless the signature recovers to this address.
    #[arg(short, long)]
    expected_signer: Option<String>,

    /// Artifact output path.
    #[arg(short, long, default_value = sigkit_decoder::DEFAULT_ARTIFACT_NAME)]
    out: PathBuf,

    /// Print the JSON rendering to stdout.
    #[arg(long)]
    json: bool,
}

fn payload(cli: &Cli) -> Result<SignedPayload> {
    if let Some(message) = &cli.message {
        return Ok(SignedPayload::from(message.as_str()));
    }
    let Some(path) = &cli.typed_data else {
        bail!("either --message or --typed-data is required");
    };

    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let typed_data = match Eip712Converter::parse_json_to_typed_data(&json) {
        Ok(typed_data) => typed_data,
        Err(e) if e.is_schema_error() => {
            bail!("invalid type definitions in {}: {}", path.display(), e)
        }
        Err(e) => {
            return Err(e).with_context(|| format!("invalid typed data in {}", path.display()))
        }
    };
    debug!("primary type: {}", typed_data.primary_type);
    Ok(SignedPayload::TypedData(typed_data))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut params = DecodeParams::new(payload(&cli)?, cli.signature.clone());
    if let Some(expected) = &cli.expected_signer {
        let address: EthAddress = expected
            .parse()
            .with_context(|| format!("invalid expected signer {expected}"))?;
        params = params.with_expected_signer(address);
    }

    let decoded = SignatureDecoder::decode(params).context("failed to decode signature")?;

    println!("Signer: {}", decoded.signer_address());
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&decoded.to_json())?);
    }

    write_artifact(&decoded, &cli.out)
        .with_context(|| format!("failed to write {}", cli.out.display()))?;
    println!("Wrote {}", cli.out.display());

    Ok(())
}
