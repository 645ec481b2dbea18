pub mod retry;

use std::path::Path;

use alloy_primitives::hex;
use anyhow::{Context, Result};

use crate::config::ClientConfig;
use crate::models::errors::DecodeError;

/// Render bytes as a `0x`-prefixed lowercase hex string.
pub fn encode_prefix_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a hex string, with or without the `0x` prefix.
pub fn decode_prefix_hex(value: &str, field: &str) -> std::result::Result<Vec<u8>, DecodeError> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(stripped).map_err(|_| DecodeError::InvalidHex {
        field: field.to_owned(),
    })
}

/// Load client configuration from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ClientConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path.as_ref()))
        .build()
        .context("Failed to read config file")?;

    settings
        .try_deserialize()
        .context("Failed to parse config file")
}
