//! Builders for synthetic particle tables.

use filament_smoother::records::{RecordTable, SegmentRecord};
use std::collections::BTreeMap;

pub fn segment(micrograph: &str, tube_id: i64) -> SegmentRecord {
    SegmentRecord {
        micrograph: micrograph.to_string(),
        tube_id,
        angle_rot: 0.0,
        angle_psi: 0.0,
        shift_x: 0.0,
        shift_y: 0.0,
        class_number: None,
        extra: BTreeMap::new(),
    }
}

/// One filament whose rotation angles follow `angles` in order.
pub fn angle_filament(micrograph: &str, tube_id: i64, angles: &[f64]) -> Vec<SegmentRecord> {
    angles
        .iter()
        .map(|&angle| SegmentRecord {
            angle_rot: angle,
            ..segment(micrograph, tube_id)
        })
        .collect()
}

/// One filament with paired X/Y shifts.
pub fn shift_filament(
    micrograph: &str,
    tube_id: i64,
    xs: &[f64],
    ys: &[f64],
) -> Vec<SegmentRecord> {
    assert_eq!(xs.len(), ys.len());
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| SegmentRecord {
            shift_x: x,
            shift_y: y,
            ..segment(micrograph, tube_id)
        })
        .collect()
}

/// One filament with per-segment class labels.
pub fn classified_filament(micrograph: &str, tube_id: i64, classes: &[i64]) -> Vec<SegmentRecord> {
    classes
        .iter()
        .map(|&class| SegmentRecord {
            class_number: Some(class),
            ..segment(micrograph, tube_id)
        })
        .collect()
}

pub fn table(filaments: Vec<Vec<SegmentRecord>>) -> RecordTable {
    RecordTable::new(filaments.into_iter().flatten().collect())
}
