//! Attribute selectors and smoothing parameters.

use crate::records::SegmentRecord;
use serde::{Deserialize, Serialize};

/// Pose attribute a smoothing pass operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseAttribute {
    AngleRot,
    AnglePsi,
    ShiftX,
    ShiftY,
}

/// Whether an attribute is periodic (degrees) or translational (Ångström).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    Angle,
    Shift,
}

impl PoseAttribute {
    pub fn kind(self) -> AttributeKind {
        match self {
            PoseAttribute::AngleRot | PoseAttribute::AnglePsi => AttributeKind::Angle,
            PoseAttribute::ShiftX | PoseAttribute::ShiftY => AttributeKind::Shift,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PoseAttribute::AngleRot => "angle_rot",
            PoseAttribute::AnglePsi => "angle_psi",
            PoseAttribute::ShiftX => "shift_x",
            PoseAttribute::ShiftY => "shift_y",
        }
    }

    pub(crate) fn get(self, record: &SegmentRecord) -> f64 {
        match self {
            PoseAttribute::AngleRot => record.angle_rot,
            PoseAttribute::AnglePsi => record.angle_psi,
            PoseAttribute::ShiftX => record.shift_x,
            PoseAttribute::ShiftY => record.shift_y,
        }
    }

    pub(crate) fn set(self, record: &mut SegmentRecord, value: f64) {
        match self {
            PoseAttribute::AngleRot => record.angle_rot = value,
            PoseAttribute::AnglePsi => record.angle_psi = value,
            PoseAttribute::ShiftX => record.shift_x = value,
            PoseAttribute::ShiftY => record.shift_y = value,
        }
    }
}

/// Tuning knobs of the trajectory smoother.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherParams {
    /// Maximum pairwise angular difference (degrees) for two segments to
    /// belong to the same trend.
    pub angle_cutoff: f64,
    /// Half-width of the slope grid scanned by the shift flattening search.
    pub shift_search_range: f64,
    /// Optional minimum segment count per filament; shorter filaments are
    /// dropped before smoothing.
    pub min_segments: Option<usize>,
}

impl Default for SmootherParams {
    fn default() -> Self {
        Self {
            angle_cutoff: 8.0,
            shift_search_range: crate::cluster::flatten::DEFAULT_SEARCH_RANGE,
            min_segments: None,
        }
    }
}
