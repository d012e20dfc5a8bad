// SPDX-License-Identifier: MIT
//! Error type shared by the reader, writer and file helpers

/// Errors that can occur while converting presets
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("Not a valid .SerumPreset file (magic mismatch, found {found})")]
    FormatMismatch { found: String },

    #[error("Truncated container: {section} needs {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        section: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Metadata decode error: {0}")]
    MetadataDecode(String),

    #[error("Metadata encode error: {0}")]
    MetadataEncode(String),

    /// `actual` stops at `declared + 1` when the payload runs long
    #[error("Decompressed length mismatch: header declares {declared} bytes, got {actual}")]
    LengthMismatch { declared: u32, actual: usize },

    #[error("Payload decode error: {0}")]
    PayloadDecode(String),

    #[error("Payload encode error: {0}")]
    PayloadEncode(String),

    #[error("Invalid preset document: {0}")]
    InvalidDocument(String),

    #[error("Section {section} is {len} bytes, larger than a u32 length field allows")]
    SectionTooLarge { section: &'static str, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Compression error: {0}")]
    Codec(String),
}

impl PresetError {
    /// Whether the error means the input bytes are not a well-formed container
    pub fn is_corrupt_input(&self) -> bool {
        matches!(
            self,
            PresetError::FormatMismatch { .. }
                | PresetError::Truncated { .. }
                | PresetError::MetadataDecode(_)
                | PresetError::LengthMismatch { .. }
                | PresetError::PayloadDecode(_)
        )
    }
}
