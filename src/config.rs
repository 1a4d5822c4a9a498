//! Runtime configuration for the CLI tools.
//!
//! Both tools take one argument, a JSON config file. Smoothing:
//!
//! ```json
//! {
//!     "input": "run_it023_data.json",
//!     "target": "shifts",
//!     "smoother": { "angle_cutoff": 8.0, "min_segments": 6 },
//!     "output": { "directory": "smoothing_out" }
//! }
//! ```
//!
//! Class unification:
//!
//! ```json
//! {
//!     "reference": "run_it000_data.json",
//!     "classified": "run_it001_data.json",
//!     "cutoff": 0.6,
//!     "output": { "directory": "unification_out" }
//! }
//! ```

use crate::smoother::SmootherParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What the smoothing tool operates on: one rotation angle, or both shift
/// axes in sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothTarget {
    Rot,
    Psi,
    Shifts,
}

impl SmoothTarget {
    /// Suffix appended to the input file name for the corrected table.
    pub fn suffix(self) -> &'static str {
        match self {
            SmoothTarget::Rot => "smoothened_rot",
            SmoothTarget::Psi => "smoothened_psi",
            SmoothTarget::Shifts => "smoothened_shifts",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SmoothToolConfig {
    pub input: PathBuf,
    pub target: SmoothTarget,
    #[serde(default)]
    pub smoother: SmootherParams,
    pub output: OutputConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UnifyToolConfig {
    /// Pose-naive table whose pose fields the unified output inherits.
    pub reference: PathBuf,
    /// Table carrying the per-segment class labels to vote over.
    pub classified: PathBuf,
    #[serde(default = "default_cutoff")]
    pub cutoff: f64,
    pub output: OutputConfig,
}

fn default_cutoff() -> f64 {
    0.5
}

pub fn load_smooth_config(path: &Path) -> Result<SmoothToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

pub fn load_unify_config(path: &Path) -> Result<UnifyToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
