// SPDX-License-Identifier: MIT
//! # SerumPreset converter
//!
//! Lossless conversion between Xfer Serum `*.SerumPreset` containers and an
//! editable JSON document.
//!
//! ## Format Layout
//!
//! ```text
//! SerumPreset container (all integers little-endian)
//! =================================================
//!
//! 0x00      9  Magic: "XferJson\0"
//! 0x09      4  Metadata length N
//! 0x0D      4  Reserved (0)
//! 0x11      N  Metadata: UTF-8 JSON
//! 0x11+N    4  Decompressed payload length
//! +4        4  Flags (2 = zstd compressed)
//! +4     rest  Payload: zstd-compressed CBOR, runs to end of file
//! ```
//!
//! The unpacked form is `{"metadata": <json>, "data": <json>}`, where `data`
//! is the CBOR payload mapped onto JSON (see [`cbor`] for byte strings and
//! tags).
//!
//! ## Usage
//!
//! ```rust
//! use serum_preset::{pack, unpack, PresetDocument};
//! use serde_json::json;
//!
//! let doc = PresetDocument::new(json!({"name": "Test"}), json!({"osc1": 0.5}));
//! let bytes = pack(&doc).unwrap();
//! assert!(bytes.starts_with(b"XferJson\0"));
//!
//! let back = unpack(&bytes).unwrap();
//! assert_eq!(back, doc);
//! ```

pub mod cbor;
pub mod compression;
pub mod config;
pub mod container;
pub mod document;
pub mod error;
pub mod files;
pub mod format;
pub mod reader;
pub mod writer;

// Re-export main types
pub use compression::{CompressionConfig, DEFAULT_COMPRESSION_LEVEL};
pub use config::ConvertConfig;
pub use container::PresetFrame;
pub use document::PresetDocument;
pub use error::PresetError;
pub use files::{batch, pack_file, unpack_file, BatchReport, Direction};
pub use format::{PayloadFlags, PRESET_MAGIC};
pub use reader::{read_preset, ContainerReader, ContainerStats};
pub use writer::{write_preset, ContainerWriter};

/// Convert container bytes into a logical document
pub fn unpack(bytes: &[u8]) -> Result<PresetDocument, PresetError> {
    read_preset(bytes)
}

/// Convert a logical document into container bytes
pub fn pack(document: &PresetDocument) -> Result<Vec<u8>, PresetError> {
    write_preset(document)
}
