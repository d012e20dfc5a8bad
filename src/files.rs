// SPDX-License-Identifier: MIT
//! File-level pack/unpack and folder batch conversion

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::ConvertConfig;
use crate::document::PresetDocument;
use crate::error::PresetError;
use crate::reader::read_preset;
use crate::writer::ContainerWriter;

/// Extension of binary preset files
pub const PRESET_EXTENSION: &str = "SerumPreset";

/// Extension of unpacked JSON documents
pub const JSON_EXTENSION: &str = "json";

/// Conversion direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Container to JSON
    Unpack,
    /// JSON to container
    Pack,
}

impl Direction {
    pub fn source_extension(self) -> &'static str {
        match self {
            Direction::Unpack => PRESET_EXTENSION,
            Direction::Pack => JSON_EXTENSION,
        }
    }

    pub fn target_extension(self) -> &'static str {
        match self {
            Direction::Unpack => JSON_EXTENSION,
            Direction::Pack => PRESET_EXTENSION,
        }
    }
}

/// Unpack a container file into a JSON document file
pub fn unpack_file(src: &Path, dst: &Path, config: &ConvertConfig) -> Result<(), PresetError> {
    let bytes = fs::read(src)?;
    let document = read_preset(&bytes)?;
    fs::write(dst, document.to_json_vec(config.pretty_json)?)?;
    Ok(())
}

/// Pack a JSON document file into a container file
pub fn pack_file(src: &Path, dst: &Path, config: &ConvertConfig) -> Result<(), PresetError> {
    let text = fs::read(src)?;
    let document = PresetDocument::from_json_slice(&text)?;
    let bytes = ContainerWriter::with_config(config.compression()).write(&document)?;
    fs::write(dst, bytes)?;
    Ok(())
}

/// Convert one file in the given direction
pub fn convert_file(
    src: &Path,
    dst: &Path,
    direction: Direction,
    config: &ConvertConfig,
) -> Result<(), PresetError> {
    match direction {
        Direction::Unpack => unpack_file(src, dst, config),
        Direction::Pack => pack_file(src, dst, config),
    }
}

/// Files in `dir` whose name ends with `.{ext}`, sorted by path
pub fn collect_files(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, PresetError> {
    let suffix = format!(".{ext}");
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(&suffix));
        if matches {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Output path for `file` inside `out_dir`, with the target extension
pub fn output_path(file: &Path, out_dir: &Path, direction: Direction) -> PathBuf {
    let stem = file.file_stem().unwrap_or(file.as_os_str());
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(direction.target_extension());
    out_dir.join(name)
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// (source, output) pairs that converted
    pub converted: Vec<(PathBuf, PathBuf)>,
    /// Sources that failed, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Convert every matching file in `dir` into `out_dir`
///
/// Stops at the first failure unless `config.continue_on_error` is set.
pub fn batch(
    dir: &Path,
    out_dir: &Path,
    direction: Direction,
    config: &ConvertConfig,
) -> Result<BatchReport, PresetError> {
    let files = collect_files(dir, direction.source_extension())?;
    fs::create_dir_all(out_dir)?;

    let mut report = BatchReport::default();
    for file in files {
        let out = output_path(&file, out_dir, direction);
        info!(file = %file.display(), "Processing");
        match convert_file(&file, &out, direction, config) {
            Ok(()) => {
                info!(output = %out.display(), "Written");
                report.converted.push((file, out));
            }
            Err(e) if config.continue_on_error => {
                if e.is_corrupt_input() {
                    warn!(file = %file.display(), error = %e, "Skipping corrupt file");
                } else {
                    error!(file = %file.display(), error = %e, "Conversion failed");
                }
                report.failed.push((file, e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(report)
}
