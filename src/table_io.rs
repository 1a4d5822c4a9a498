//! Reference record source/sink and output-name derivation.
//!
//! The engines treat the particle table as "ordered records in, ordered
//! records out"; the on-disk schema of the upstream refinement package is
//! somebody else's business. This module supplies the seam: a two-block
//! document type (an opaque optics/metadata block plus the particle
//! records), `RecordSource`/`RecordSink` traits, and a JSON-backed
//! implementation used by the CLI tools. Any other backend can be
//! substituted behind the traits without touching the engines.

use crate::error::Error;
use crate::records::RecordTable;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the operator text report written next to the unified table.
pub const REPORT_FILE_NAME: &str = "class_unification_report.txt";

/// Two-block particle table: acquisition metadata carried opaquely, plus
/// the per-segment records the engines operate on.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TableDocument {
    /// Optics/acquisition block, passed through untouched.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub optics: serde_json::Value,
    pub particles: RecordTable,
}

/// Yields one table per run.
pub trait RecordSource {
    fn load(&self) -> Result<TableDocument, Error>;
}

/// Receives the corrected table.
pub trait RecordSink {
    fn store(&self, document: &TableDocument) -> Result<(), Error>;
}

/// JSON-backed table file implementing both seam traits.
#[derive(Clone, Debug)]
pub struct JsonTableFile {
    path: PathBuf,
}

impl JsonTableFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonTableFile {
    fn load(&self) -> Result<TableDocument, Error> {
        let contents = fs::read_to_string(&self.path).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| Error::Format {
            path: self.path.clone(),
            source,
        })
    }
}

impl RecordSink for JsonTableFile {
    fn store(&self, document: &TableDocument) -> Result<(), Error> {
        ensure_parent_dir(&self.path)?;
        let json = serde_json::to_string_pretty(document).map_err(|source| Error::Format {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Writes the operator text report.
pub fn write_text_report(path: &Path, report: &str) -> Result<(), Error> {
    ensure_parent_dir(path)?;
    fs::write(path, report).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Derives an output file name by appending a suffix to the input's stem:
/// `run_it001_data.star` + `smoothened_shifts` →
/// `run_it001_data_smoothened_shifts.star`. The file lands in `output_dir`.
pub fn derive_output_name(input: &Path, suffix: &str, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("output");
    let name = match input.extension().and_then(OsStr::to_str) {
        Some(ext) => format!("{stem}_{suffix}.{ext}"),
        None => format!("{stem}_{suffix}"),
    };
    output_dir.join(name)
}

fn ensure_parent_dir(path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_keeps_extension_and_directory() {
        let derived = derive_output_name(
            Path::new("/data/run_it001_data.star"),
            "smoothened_shifts",
            Path::new("/out"),
        );
        assert_eq!(
            derived,
            PathBuf::from("/out/run_it001_data_smoothened_shifts.star")
        );
    }

    #[test]
    fn output_name_without_extension() {
        let derived = derive_output_name(Path::new("particles"), "class_corrected", Path::new("."));
        assert_eq!(derived, PathBuf::from("./particles_class_corrected"));
    }
}
