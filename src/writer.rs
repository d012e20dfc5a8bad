// SPDX-License-Identifier: MIT
//! Container writer: [`PresetDocument`] to SerumPreset bytes

use serde_json::Value;
use tracing::debug;

use crate::cbor;
use crate::compression::{self, CompressionConfig};
use crate::document::PresetDocument;
use crate::error::PresetError;
use crate::format::{
    flags, section_len, SectionHeader, PRESET_MAGIC, RESERVED, SECTION_HEADER_SIZE,
};

/// Writer for SerumPreset containers
///
/// Output is deterministic for a given document and compression level.
#[derive(Debug, Clone, Default)]
pub struct ContainerWriter {
    compression: CompressionConfig,
}

impl ContainerWriter {
    /// Create a writer using the reference compression level (3)
    pub fn new() -> Self {
        Self {
            compression: CompressionConfig::reference(),
        }
    }

    /// Create a writer with custom compression config
    pub fn with_config(config: CompressionConfig) -> Self {
        Self {
            compression: config,
        }
    }

    pub fn compression(&self) -> CompressionConfig {
        self.compression
    }

    /// Serialize a document into container bytes
    pub fn write(&self, document: &PresetDocument) -> Result<Vec<u8>, PresetError> {
        self.write_parts(&document.metadata, &document.data)
    }

    /// Serialize metadata and payload values into container bytes
    pub fn write_parts(&self, metadata: &Value, data: &Value) -> Result<Vec<u8>, PresetError> {
        let metadata_bytes =
            serde_json::to_vec(metadata).map_err(|e| PresetError::MetadataEncode(e.to_string()))?;
        let cbor_bytes = cbor::encode(data)?;
        let compressed = compression::compress(&cbor_bytes, self.compression.level)?;

        let metadata_header =
            SectionHeader::new(section_len("metadata", metadata_bytes.len())?, RESERVED);
        let payload_header = SectionHeader::new(
            section_len("payload", cbor_bytes.len())?,
            flags::COMPRESSED,
        );

        let total_size = PRESET_MAGIC
            .len()
            .checked_add(2 * SECTION_HEADER_SIZE)
            .and_then(|s| s.checked_add(metadata_bytes.len()))
            .and_then(|s| s.checked_add(compressed.len()))
            .ok_or(PresetError::SectionTooLarge {
                section: "container",
                len: usize::MAX,
            })?;

        let mut buffer = Vec::with_capacity(total_size);
        buffer.extend_from_slice(PRESET_MAGIC);
        metadata_header.write_to_buffer(&mut buffer);
        buffer.extend_from_slice(&metadata_bytes);
        payload_header.write_to_buffer(&mut buffer);
        buffer.extend_from_slice(&compressed);

        debug_assert_eq!(buffer.len(), total_size);
        debug!(
            metadata_len = metadata_bytes.len(),
            payload_len = cbor_bytes.len(),
            compressed_len = compressed.len(),
            level = self.compression.level,
            "Wrote preset container"
        );
        Ok(buffer)
    }
}

/// Encode a document with the reference compression level
pub fn write_preset(document: &PresetDocument) -> Result<Vec<u8>, PresetError> {
    ContainerWriter::new().write(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{read_u32_le, MAGIC_LEN, METADATA_OFFSET};
    use crate::reader::read_preset;
    use serde_json::json;

    fn sample() -> PresetDocument {
        PresetDocument::new(
            json!({"name": "Test"}),
            json!({"osc1": 0.5, "notes": ["a", "b"]}),
        )
    }

    #[test]
    fn test_default_level() {
        assert_eq!(ContainerWriter::new().compression().level, 3);
        assert_eq!(ContainerWriter::default().compression().level, 3);
    }

    #[test]
    fn test_layout() {
        let bytes = write_preset(&sample()).unwrap();
        let metadata = br#"{"name":"Test"}"#;

        assert_eq!(&bytes[..MAGIC_LEN], PRESET_MAGIC);
        assert_eq!(read_u32_le(&bytes, MAGIC_LEN), Some(metadata.len() as u32));
        assert_eq!(read_u32_le(&bytes, MAGIC_LEN + 4), Some(RESERVED));
        assert_eq!(
            &bytes[METADATA_OFFSET..METADATA_OFFSET + metadata.len()],
            metadata
        );

        let payload_header = METADATA_OFFSET + metadata.len();
        let expected_cbor = cbor::encode(&sample().data).unwrap();
        assert_eq!(
            read_u32_le(&bytes, payload_header),
            Some(expected_cbor.len() as u32)
        );
        assert_eq!(read_u32_le(&bytes, payload_header + 4), Some(flags::COMPRESSED));

        let compressed = &bytes[payload_header + SECTION_HEADER_SIZE..];
        assert_eq!(compression::decompress(compressed).unwrap(), expected_cbor);
    }

    #[test]
    fn test_deterministic_output() {
        let first = write_preset(&sample()).unwrap();
        let second = write_preset(&sample()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_level_still_readable() {
        let writer = ContainerWriter::with_config(CompressionConfig::with_level(19));
        let bytes = writer.write(&sample()).unwrap();
        assert_eq!(read_preset(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_escape_lookalike_data_round_trips() {
        let doc = PresetDocument::new(
            json!({}),
            json!({
                "label": {"$bytes": "hello world"},
                "big": {"$tag": 2, "$value": {"$bytes": "AQ=="}}
            }),
        );
        let bytes = write_preset(&doc).unwrap();
        assert_eq!(read_preset(&bytes).unwrap(), doc);
    }
}
