// SPDX-License-Identifier: MIT
//! SerumPreset container format constants and framing primitives
//!
//! Every multi-byte integer in the container is little-endian.

use crate::error::PresetError;

/// Magic bytes that open every container: "XferJson\0"
pub const PRESET_MAGIC: &[u8; 9] = b"XferJson\0";

/// Magic length in bytes
pub const MAGIC_LEN: usize = PRESET_MAGIC.len();

/// Size of a section header (length word + second word)
pub const SECTION_HEADER_SIZE: usize = 8;

/// Offset of the metadata JSON text (0x11)
pub const METADATA_OFFSET: usize = MAGIC_LEN + SECTION_HEADER_SIZE;

/// Value written into the reserved word after the metadata length
pub const RESERVED: u32 = 0;

/// Raw payload flag values
pub mod flags {
    /// Payload is zstd compressed
    pub const COMPRESSED: u32 = 2;
}

/// Payload flags word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFlags {
    /// Zstd-compressed CBOR, the only value ever written
    Compressed,

    /// Any other value; the payload is still treated as compressed
    Unknown(u32),
}

impl PayloadFlags {
    #[inline]
    pub fn bits(self) -> u32 {
        match self {
            PayloadFlags::Compressed => flags::COMPRESSED,
            PayloadFlags::Unknown(bits) => bits,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, PayloadFlags::Unknown(_))
    }
}

impl From<u32> for PayloadFlags {
    fn from(bits: u32) -> Self {
        match bits {
            flags::COMPRESSED => PayloadFlags::Compressed,
            other => PayloadFlags::Unknown(other),
        }
    }
}

/// Read a u32 little-endian value at `offset`, if four bytes are available
#[inline]
pub fn read_u32_le(bytes: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let word: [u8; 4] = bytes.get(offset..end)?.try_into().ok()?;
    Some(u32::from_le_bytes(word))
}

/// Append a u32 little-endian value to `buffer`
#[inline]
pub fn put_u32_le(buffer: &mut Vec<u8>, value: u32) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

/// Convert a section length to its u32 header field
pub fn section_len(section: &'static str, len: usize) -> Result<u32, PresetError> {
    u32::try_from(len).map_err(|_| PresetError::SectionTooLarge { section, len })
}

/// Validate the 9-byte magic at the start of `bytes`
///
/// Inputs shorter than the magic are a mismatch too.
pub fn check_magic(bytes: &[u8]) -> Result<(), PresetError> {
    match bytes.get(..MAGIC_LEN) {
        Some(magic) if magic == PRESET_MAGIC => Ok(()),
        _ => {
            let shown = &bytes[..bytes.len().min(MAGIC_LEN)];
            Err(PresetError::FormatMismatch {
                found: hex::encode(shown),
            })
        }
    }
}

/// Section header: a length word followed by a second word
///
/// For the metadata section the second word is reserved; for the payload
/// section it carries the [`PayloadFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    /// Section length in bytes (decompressed length for the payload)
    pub length: u32,

    /// Reserved word or flags
    pub word: u32,
}

impl SectionHeader {
    pub fn new(length: u32, word: u32) -> Self {
        Self { length, word }
    }

    /// Parse a header at `offset`
    ///
    /// `section` names the header in the truncation error.
    pub fn read_at(
        bytes: &[u8],
        offset: usize,
        section: &'static str,
    ) -> Result<Self, PresetError> {
        let truncated = || PresetError::Truncated {
            section,
            offset,
            needed: SECTION_HEADER_SIZE,
            available: bytes.len().saturating_sub(offset),
        };
        let length = read_u32_le(bytes, offset).ok_or_else(truncated)?;
        let word = read_u32_le(bytes, offset + 4).ok_or_else(truncated)?;
        Ok(Self { length, word })
    }

    /// Write header directly to buffer
    #[inline]
    pub fn write_to_buffer(&self, buffer: &mut Vec<u8>) {
        buffer.reserve(SECTION_HEADER_SIZE);
        put_u32_le(buffer, self.length);
        put_u32_le(buffer, self.word);
    }

    pub fn to_bytes(&self) -> [u8; SECTION_HEADER_SIZE] {
        let mut bytes = [0u8; SECTION_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.length.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.word.to_le_bytes());
        bytes
    }

    /// Payload flags view of the second word
    #[inline]
    pub fn flags(&self) -> PayloadFlags {
        PayloadFlags::from(self.word)
    }
}
