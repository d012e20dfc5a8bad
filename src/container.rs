// SPDX-License-Identifier: MIT
//! Zero-copy view over the framing of a SerumPreset container

use crate::error::PresetError;
use crate::format::{
    check_magic, PayloadFlags, SectionHeader, MAGIC_LEN, METADATA_OFFSET, SECTION_HEADER_SIZE,
};

/// Framing of a container, borrowed from the input bytes
///
/// Parsing only checks the magic and that every length-prefixed section fits
/// in the buffer. Nothing is decoded or decompressed.
#[derive(Debug, Clone, Copy)]
pub struct PresetFrame<'a> {
    /// Metadata length + reserved word
    pub metadata_header: SectionHeader,

    /// Raw metadata JSON text
    pub metadata: &'a [u8],

    /// Declared decompressed payload length + flags
    pub payload_header: SectionHeader,

    /// Compressed payload, runs to the end of the container
    pub payload: &'a [u8],

    /// Total container size
    pub total_size: usize,
}

impl<'a> PresetFrame<'a> {
    /// Parse the section framing of `data`
    pub fn parse(data: &'a [u8]) -> Result<Self, PresetError> {
        check_magic(data)?;

        let metadata_header = SectionHeader::read_at(data, MAGIC_LEN, "metadata header")?;

        let metadata_len = metadata_header.length as usize;
        let metadata_end = METADATA_OFFSET
            .checked_add(metadata_len)
            .filter(|end| *end <= data.len())
            .ok_or(PresetError::Truncated {
                section: "metadata",
                offset: METADATA_OFFSET,
                needed: metadata_len,
                available: data.len() - METADATA_OFFSET,
            })?;
        let metadata = &data[METADATA_OFFSET..metadata_end];

        let payload_header = SectionHeader::read_at(data, metadata_end, "payload header")?;
        let payload = &data[metadata_end + SECTION_HEADER_SIZE..];

        Ok(Self {
            metadata_header,
            metadata,
            payload_header,
            payload,
            total_size: data.len(),
        })
    }

    /// Payload length the header declares (decompressed CBOR bytes)
    #[inline]
    pub fn declared_payload_len(&self) -> u32 {
        self.payload_header.length
    }

    #[inline]
    pub fn payload_flags(&self) -> PayloadFlags {
        self.payload_header.flags()
    }

    /// Reserved word after the metadata length (never validated)
    #[inline]
    pub fn reserved(&self) -> u32 {
        self.metadata_header.word
    }

    /// Offset of the compressed payload from the start of the container
    pub fn payload_offset(&self) -> usize {
        self.total_size - self.payload.len()
    }
}
