//! Segment records and filament-level partitioning.
//!
//! A record is one measurement for one segment of one filament. Records
//! arrive as a flat table whose row order already reflects physical position
//! along each filament, so partitioning never sorts: filaments are visited
//! in order of first appearance and rows keep their table order within each
//! filament. Both properties make output and diagnostics reproducible.
//!
//! The table is owned and index-addressable. Per-filament results are
//! applied as explicit patches (value overwrites plus a deletion mask) in a
//! single pass after all filaments have been analysed, so no mutation
//! happens while the grouping is being iterated.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// One pose/classification measurement for one segment.
///
/// Angles are in degrees in (−180, 180]; shifts are in Ångström with no
/// inherent bound. `class_number` is present only on tables produced by a
/// classification run. Upstream columns this crate does not interpret are
/// carried opaquely in `extra` so a sink can round-trip them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub micrograph: String,
    pub tube_id: i64,
    pub angle_rot: f64,
    pub angle_psi: f64,
    pub shift_x: f64,
    pub shift_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_number: Option<i64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Identity of one filament: parent micrograph plus helical tube id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FilamentKey {
    pub micrograph: String,
    pub tube_id: i64,
}

impl FilamentKey {
    pub fn of(record: &SegmentRecord) -> Self {
        Self {
            micrograph: record.micrograph.clone(),
            tube_id: record.tube_id,
        }
    }
}

impl fmt::Display for FilamentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MT {} in micrograph {}", self.tube_id, self.micrograph)
    }
}

/// Owned particle table the engines operate on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordTable {
    pub records: Vec<SegmentRecord>,
}

impl RecordTable {
    pub fn new(records: Vec<SegmentRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Groups row indices by filament, preserving first-appearance order of
    /// filaments and table order within each filament. Every row lands in
    /// exactly one group; a key never maps to an empty group.
    pub fn partition_by_filament(&self) -> Vec<(FilamentKey, Vec<usize>)> {
        let mut groups: Vec<(FilamentKey, Vec<usize>)> = Vec::new();
        let mut positions: HashMap<FilamentKey, usize> = HashMap::new();
        for (row, record) in self.records.iter().enumerate() {
            let key = FilamentKey::of(record);
            match positions.entry(key) {
                Entry::Occupied(slot) => groups[*slot.get()].1.push(row),
                Entry::Vacant(slot) => {
                    let key = slot.key().clone();
                    slot.insert(groups.len());
                    groups.push((key, vec![row]));
                }
            }
        }
        groups
    }

    /// Drops every filament with fewer than `min_segments` rows. Returns the
    /// number of rows removed.
    pub fn filter_short_filaments(&mut self, min_segments: usize) -> usize {
        let mut counts: HashMap<FilamentKey, usize> = HashMap::new();
        for record in &self.records {
            *counts.entry(FilamentKey::of(record)).or_insert(0) += 1;
        }
        let before = self.records.len();
        self.records
            .retain(|r| counts[&FilamentKey::of(r)] >= min_segments);
        before - self.records.len()
    }

    /// Removes the rows flagged in `doomed` in one pass. The mask must have
    /// one entry per row.
    pub fn apply_deletion_mask(&mut self, doomed: &[bool]) {
        debug_assert_eq!(doomed.len(), self.records.len());
        let mut row = 0;
        self.records.retain(|_| {
            let keep = !doomed[row];
            row += 1;
            keep
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(micrograph: &str, tube_id: i64) -> SegmentRecord {
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

    #[test]
    fn partition_preserves_first_appearance_order() {
        let table = RecordTable::new(vec![
            record("mg_b", 2),
            record("mg_a", 1),
            record("mg_b", 2),
            record("mg_a", 7),
            record("mg_b", 2),
        ]);
        let groups = table.partition_by_filament();
        let keys: Vec<(&str, i64)> = groups
            .iter()
            .map(|(k, _)| (k.micrograph.as_str(), k.tube_id))
            .collect();
        assert_eq!(keys, vec![("mg_b", 2), ("mg_a", 1), ("mg_a", 7)]);
        assert_eq!(groups[0].1, vec![0, 2, 4]);
    }

    #[test]
    fn partition_covers_every_row_exactly_once() {
        let table = RecordTable::new(vec![
            record("mg", 1),
            record("mg", 2),
            record("mg", 1),
            record("other", 1),
        ]);
        let groups = table.partition_by_filament();
        let total: usize = groups.iter().map(|(_, rows)| rows.len()).sum();
        assert_eq!(total, table.len());
        assert!(groups.iter().all(|(_, rows)| !rows.is_empty()));
    }

    #[test]
    fn short_filaments_are_filtered_out() {
        let mut table = RecordTable::new(vec![
            record("mg", 1),
            record("mg", 1),
            record("mg", 1),
            record("mg", 2),
        ]);
        let removed = table.filter_short_filaments(2);
        assert_eq!(removed, 1);
        assert!(table.records.iter().all(|r| r.tube_id == 1));
    }

    #[test]
    fn deletion_mask_removes_flagged_rows() {
        let mut table = RecordTable::new(vec![
            record("mg", 1),
            record("mg", 2),
            record("mg", 3),
        ]);
        table.apply_deletion_mask(&[false, true, false]);
        let ids: Vec<i64> = table.records.iter().map(|r| r.tube_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
