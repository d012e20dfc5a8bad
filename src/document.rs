// SPDX-License-Identifier: MIT
//! The unpacked JSON form of a preset

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PresetError;

/// Logical preset document: `{"metadata": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetDocument {
    /// Metadata section, kept as plain JSON
    pub metadata: Value,

    /// Synth state decoded from the CBOR payload
    pub data: Value,
}

impl PresetDocument {
    pub fn new(metadata: Value, data: Value) -> Self {
        Self { metadata, data }
    }

    /// Parse a document from JSON text
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, PresetError> {
        serde_json::from_slice(bytes).map_err(|e| PresetError::InvalidDocument(e.to_string()))
    }

    /// Render the document as JSON text
    ///
    /// Pretty output uses a two-space indent.
    pub fn to_json_vec(&self, pretty: bool) -> Result<Vec<u8>, PresetError> {
        let rendered = if pretty {
            serde_json::to_vec_pretty(self)
        } else {
            serde_json::to_vec(self)
        };
        rendered.map_err(|e| PresetError::InvalidDocument(e.to_string()))
    }
}
