// SPDX-License-Identifier: MIT
//! Zstd block compression for the payload section
//!
//! Compression runs at a fixed level so that packing the same document twice
//! yields identical bytes. Level 3 matches the reference producer.

use std::io::Read;

use zstd::stream::read::Decoder;

use crate::error::PresetError;

/// Zstd level used for every container written by default
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Compression configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionConfig {
    /// Zstd compression level
    pub level: i32,
}

impl CompressionConfig {
    /// Config matching the reference producer (level 3)
    pub fn reference() -> Self {
        Self {
            level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    pub fn with_level(level: i32) -> Self {
        Self { level }
    }

    /// Check the level against the range the linked zstd supports
    pub fn validate(&self) -> Result<(), String> {
        let range = zstd::compression_level_range();
        if !range.contains(&self.level) {
            return Err(format!(
                "Compression level {} outside supported range {}..={}",
                self.level,
                range.start(),
                range.end()
            ));
        }
        Ok(())
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self::reference()
    }
}

/// Compress `data` into a single zstd frame
pub fn compress(data: &[u8], level: i32) -> Result<Vec<u8>, PresetError> {
    zstd::bulk::compress(data, level).map_err(|e| PresetError::Codec(e.to_string()))
}

/// Decompress every zstd frame in `data`
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, PresetError> {
    zstd::stream::decode_all(data).map_err(|e| PresetError::Codec(e.to_string()))
}

/// Decompress every zstd frame in `data`, stopping after `limit` bytes
///
/// A result of exactly `limit` bytes means the stream may hold more.
pub fn decompress_limited(data: &[u8], limit: usize) -> Result<Vec<u8>, PresetError> {
    let decoder = Decoder::with_buffer(data).map_err(|e| PresetError::Codec(e.to_string()))?;
    let mut output = Vec::new();
    decoder
        .take(limit as u64)
        .read_to_end(&mut output)
        .map_err(|e| PresetError::Codec(e.to_string()))?;
    Ok(output)
}
