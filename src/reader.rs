// SPDX-License-Identifier: MIT
//! Container reader: SerumPreset bytes to [`PresetDocument`]

use serde_json::Value;
use tracing::{debug, warn};

use crate::cbor;
use crate::compression;
use crate::container::PresetFrame;
use crate::document::PresetDocument;
use crate::error::PresetError;
use crate::format::{PayloadFlags, MAGIC_LEN, SECTION_HEADER_SIZE};

/// Reader for SerumPreset containers
pub struct ContainerReader<'a> {
    frame: PresetFrame<'a>,
}

impl<'a> ContainerReader<'a> {
    /// Create a reader from borrowed data
    ///
    /// Validates the magic and section framing. Decoding happens on demand.
    pub fn from_slice(data: &'a [u8]) -> Result<Self, PresetError> {
        let frame = PresetFrame::parse(data)?;
        debug!(
            metadata_len = frame.metadata.len(),
            declared_payload_len = frame.declared_payload_len(),
            compressed_len = frame.payload.len(),
            "Parsed preset framing"
        );
        Ok(Self { frame })
    }

    pub fn frame(&self) -> &PresetFrame<'a> {
        &self.frame
    }

    /// Raw metadata JSON text
    pub fn metadata_raw(&self) -> &'a [u8] {
        self.frame.metadata
    }

    /// Raw compressed payload
    pub fn payload_raw(&self) -> &'a [u8] {
        self.frame.payload
    }

    /// Decode the metadata section as UTF-8 JSON
    pub fn metadata(&self) -> Result<Value, PresetError> {
        let text = std::str::from_utf8(self.frame.metadata)
            .map_err(|e| PresetError::MetadataDecode(format!("invalid UTF-8: {e}")))?;
        serde_json::from_str(text).map_err(|e| PresetError::MetadataDecode(e.to_string()))
    }

    /// Decompressed CBOR payload, checked against the declared length
    pub fn payload(&self) -> Result<Vec<u8>, PresetError> {
        if let PayloadFlags::Unknown(bits) = self.frame.payload_flags() {
            warn!(flags = bits, "Unknown payload flags, decompressing anyway");
        }

        // one byte past the declared length is enough to detect an overrun
        let declared = self.frame.declared_payload_len();
        let limit = (declared as usize).saturating_add(1);
        let decompressed = compression::decompress_limited(self.frame.payload, limit)?;
        if decompressed.len() != declared as usize {
            return Err(PresetError::LengthMismatch {
                declared,
                actual: decompressed.len(),
            });
        }
        Ok(decompressed)
    }

    /// Decode the payload section into the synth state value
    pub fn data(&self) -> Result<Value, PresetError> {
        let payload = self.payload()?;
        cbor::decode(&payload)
    }

    /// Decode both sections, metadata first
    pub fn document(&self) -> Result<PresetDocument, PresetError> {
        let metadata = self.metadata()?;
        let data = self.data()?;
        Ok(PresetDocument { metadata, data })
    }

    /// Get container statistics
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            total_size: self.frame.total_size,
            header_size: MAGIC_LEN + 2 * SECTION_HEADER_SIZE,
            metadata_size: self.frame.metadata.len(),
            declared_payload_size: self.frame.declared_payload_len() as usize,
            compressed_payload_size: self.frame.payload.len(),
            reserved: self.frame.reserved(),
            flags: self.frame.payload_flags(),
        }
    }
}

/// Decode a whole container into a document
///
/// All-or-nothing: the first inconsistency aborts the read.
pub fn read_preset(data: &[u8]) -> Result<PresetDocument, PresetError> {
    ContainerReader::from_slice(data)?.document()
}

/// Container statistics
#[derive(Debug, Clone)]
pub struct ContainerStats {
    pub total_size: usize,
    /// Magic plus both section headers
    pub header_size: usize,
    pub metadata_size: usize,
    pub declared_payload_size: usize,
    pub compressed_payload_size: usize,
    pub reserved: u32,
    pub flags: PayloadFlags,
}

impl ContainerStats {
    /// Compression ratio of the payload (compressed / declared)
    pub fn compression_ratio(&self) -> f64 {
        if self.declared_payload_size == 0 {
            return 1.0;
        }
        self.compressed_payload_size as f64 / self.declared_payload_size as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{put_u32_le, PRESET_MAGIC};
    use crate::writer::ContainerWriter;
    use serde_json::json;

    fn create_test_data() -> Vec<u8> {
        let doc = PresetDocument::new(
            json!({"name": "Test"}),
            json!({"osc1": 0.5, "notes": ["a", "b"]}),
        );
        ContainerWriter::new().write(&doc).unwrap()
    }

    /// Build a container by hand from already-compressed payload bytes
    fn assemble(metadata: &[u8], declared: u32, flags: u32, payload: &[u8]) -> Vec<u8> {
        let mut bytes = PRESET_MAGIC.to_vec();
        put_u32_le(&mut bytes, metadata.len() as u32);
        put_u32_le(&mut bytes, 0);
        bytes.extend_from_slice(metadata);
        put_u32_le(&mut bytes, declared);
        put_u32_le(&mut bytes, flags);
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_reader_from_slice() {
        let data = create_test_data();
        assert!(ContainerReader::from_slice(&data).is_ok());
    }

    #[test]
    fn test_sections() {
        let data = create_test_data();
        let reader = ContainerReader::from_slice(&data).unwrap();

        assert_eq!(reader.metadata_raw(), br#"{"name":"Test"}"#);
        assert_eq!(reader.metadata().unwrap(), json!({"name": "Test"}));
        assert_eq!(
            reader.data().unwrap(),
            json!({"osc1": 0.5, "notes": ["a", "b"]})
        );
    }

    #[test]
    fn test_stats() {
        let data = create_test_data();
        let reader = ContainerReader::from_slice(&data).unwrap();

        let stats = reader.stats();
        assert_eq!(stats.header_size, 25);
        assert_eq!(stats.total_size, data.len());
        assert_eq!(stats.metadata_size, 15);
        assert_eq!(stats.flags, PayloadFlags::Compressed);
        assert_eq!(
            stats.header_size + stats.metadata_size + stats.compressed_payload_size,
            stats.total_size
        );
        assert!(stats.compression_ratio() > 0.0);
    }

    #[test]
    fn test_invalid_data() {
        let data = vec![0; 16];
        let err = ContainerReader::from_slice(&data).err().unwrap();
        assert!(matches!(err, PresetError::FormatMismatch { .. }));
    }

    #[test]
    fn test_invalid_utf8_metadata() {
        let payload = compression::compress(&[0xa0], 3).unwrap();
        let data = assemble(&[b'"', 0xff, b'"'], 1, 2, &payload);
        let err = read_preset(&data).unwrap_err();
        assert!(matches!(err, PresetError::MetadataDecode(_)));
    }

    #[test]
    fn test_invalid_json_metadata() {
        let payload = compression::compress(&[0xa0], 3).unwrap();
        let data = assemble(b"{not json", 1, 2, &payload);
        let err = read_preset(&data).unwrap_err();
        assert!(matches!(err, PresetError::MetadataDecode(_)));
    }

    #[test]
    fn test_declared_length_too_large() {
        let payload = compression::compress(&[0xa0], 3).unwrap();
        let data = assemble(b"{}", 2, 2, &payload);
        match read_preset(&data).unwrap_err() {
            PresetError::LengthMismatch { declared, actual } => {
                assert_eq!(declared, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_oversized_payload_stops_past_declared_length() {
        let body = vec![0u8; 16 << 20];
        let payload = compression::compress(&body, 3).unwrap();
        let data = assemble(b"{}", 10, 2, &payload);
        match read_preset(&data).unwrap_err() {
            PresetError::LengthMismatch { declared, actual } => {
                assert_eq!(declared, 10);
                assert_eq!(actual, 11);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_flags_still_decompress() {
        let payload = compression::compress(&[0xa0], 3).unwrap();
        let data = assemble(b"{}", 1, 0, &payload);
        let reader = ContainerReader::from_slice(&data).unwrap();
        assert_eq!(reader.stats().flags, PayloadFlags::Unknown(0));
        assert_eq!(reader.data().unwrap(), json!({}));
    }

    #[test]
    fn test_payload_not_zstd() {
        let data = assemble(b"{}", 1, 2, &[0xa0]);
        let err = read_preset(&data).unwrap_err();
        assert!(matches!(err, PresetError::Codec(_)));
    }

    #[test]
    fn test_payload_not_cbor() {
        let body = [0xff, 0xff];
        let payload = compression::compress(&body, 3).unwrap();
        let data = assemble(b"{}", body.len() as u32, 2, &payload);
        let err = read_preset(&data).unwrap_err();
        assert!(matches!(err, PresetError::PayloadDecode(_)));
    }

    #[test]
    fn test_metadata_decoded_before_payload() {
        // both sections are broken; the metadata error wins
        let data = assemble(b"{", 1, 2, &[1, 2, 3]);
        let err = read_preset(&data).unwrap_err();
        assert!(matches!(err, PresetError::MetadataDecode(_)));
    }
}
