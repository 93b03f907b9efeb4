// SPDX-License-Identifier: Apache-2.0

//! Plain-text and JSON renderings of a decoded signature

use log::info;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use crate::decoder::DecodedSignature;
use crate::errors::DecodeResult;

/// File name offered when the caller does not choose one
pub const DEFAULT_ARTIFACT_NAME: &str = "signature_components.txt";

/// Artifact line labels, in output order
pub mod labels {
    pub const DIGEST: &str = "digest";
    pub const PUBLIC_KEY_X: &str = "public_key_x";
    pub const PUBLIC_KEY_Y: &str = "public_key_y";
    pub const SIGNATURE_RS: &str = "signature_rs";
}

fn byte_list(bytes: &[u8]) -> String {
    let items: Vec<String> = bytes.iter().map(u8::to_string).collect();
    format!("[{}]", items.join(", "))
}

impl DecodedSignature {
    /// One labeled line per field, values as decimal byte lists:
    ///
    /// ```text
    /// digest = [190, 96, ...]
    /// public_key_x = [...]
    /// public_key_y = [...]
    /// signature_rs = [...]
    /// ```
    pub fn to_artifact(&self) -> String {
        let fields: [(&str, &[u8]); 4] = [
            (labels::DIGEST, &self.digest[..]),
            (labels::PUBLIC_KEY_X, &self.public_key_x[..]),
            (labels::PUBLIC_KEY_Y, &self.public_key_y[..]),
            (labels::SIGNATURE_RS, &self.signature_rs[..]),
        ];

        fields
            .iter()
            .map(|(label, bytes)| format!("{} = {}\n", label, byte_list(bytes)))
            .collect()
    }

    /// Hex rendering of the same fields plus the recovered address
    pub fn to_json(&self) -> Value {
        json!({
            "digest": format!("0x{}", hex::encode(self.digest)),
            "public_key_x": format!("0x{}", hex::encode(self.public_key_x)),
            "public_key_y": format!("0x{}", hex::encode(self.public_key_y)),
            "signature_rs": format!("0x{}", hex::encode(self.signature_rs)),
            "address": self.signer_address().to_string(),
        })
    }
}

/// Write the plain-text artifact to `path`
pub fn write_artifact(decoded: &DecodedSignature, path: impl AsRef<Path>) -> DecodeResult<()> {
    let path = path.as_ref();
    fs::write(path, decoded.to_artifact())?;
    info!("wrote signature components to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DecodedSignature {
        DecodedSignature {
            digest: [1u8; 32],
            public_key_x: [2u8; 32],
            public_key_y: [3u8; 32],
            signature_rs: [255u8; 64],
        }
    }

    #[test]
    fn test_artifact_has_one_line_per_field() {
        let artifact = sample().to_artifact();
        let lines: Vec<&str> = artifact.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("digest = [1, 1, "));
        assert!(lines[1].starts_with("public_key_x = [2, "));
        assert!(lines[2].starts_with("public_key_y = [3, "));
        assert!(lines[3].starts_with("signature_rs = [255, "));
        assert!(artifact.ends_with("]\n"));
    }

    #[test]
    fn test_artifact_value_counts() {
        let artifact = sample().to_artifact();
        let counts: Vec<usize> = artifact
            .lines()
            .map(|line| line.split(',').count())
            .collect();
        assert_eq!(counts, vec![32, 32, 32, 64]);
    }

    #[test]
    fn test_json_rendering() {
        let value = sample().to_json();
        assert_eq!(value["digest"], format!("0x{}", "01".repeat(32)));
        assert_eq!(value["signature_rs"], format!("0x{}", "ff".repeat(64)));
        assert!(value["address"].as_str().unwrap().starts_with("0x"));
    }

    #[test]
    fn test_write_artifact() {
        let path = std::env::temp_dir().join(format!(
            "sigkit-artifact-{}.txt",
            std::process::id()
        ));
        write_artifact(&sample(), &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(written, sample().to_artifact());
    }
}
