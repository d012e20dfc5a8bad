// SPDX-License-Identifier: MIT
//! Conversion settings, read from the environment

use crate::compression::{CompressionConfig, DEFAULT_COMPRESSION_LEVEL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    /// Zstd level used when packing
    pub compression_level: i32,
    /// Indent unpacked JSON documents
    pub pretty_json: bool,
    /// Keep going after a failed file in batch runs
    pub continue_on_error: bool,
}

impl ConvertConfig {
    pub fn from_env() -> Self {
        Self {
            compression_level: std::env::var("SERUM_PRESET_ZSTD_LEVEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_COMPRESSION_LEVEL),
            pretty_json: std::env::var("SERUM_PRESET_PRETTY_JSON")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(true),
            continue_on_error: std::env::var("SERUM_PRESET_CONTINUE_ON_ERROR")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(false),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.compression().validate()
    }

    pub fn compression(&self) -> CompressionConfig {
        CompressionConfig::with_level(self.compression_level)
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            pretty_json: true,
            continue_on_error: false,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
