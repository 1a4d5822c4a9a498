//! Majority-class voting across filament segments.
//!
//! After 3-D classification every segment of a filament carries its own
//! class label, but a filament is one physical object: all of its segments
//! share one protofilament number and one seam hypothesis. The unifier
//! takes the majority vote over each filament's labels and stamps the
//! winning class onto a pose-naive reference table: the unified output
//! inherits the reference table's pose fields, which resets angles and
//! shifts to their prior values. Filaments whose agreement proportion falls
//! below the cutoff are removed from the reference table entirely.
//!
//! The vote is deterministic: the most frequent label wins, and a tie
//! between labels goes to the lowest label.

mod report;

pub use report::{ClassBreakdown, RejectedFilament, UnificationReport};

use crate::cancel::CancelToken;
use crate::error::Error;
use crate::records::{FilamentKey, RecordTable};
use log::info;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Per-filament majority vote over one partitioned group.
struct FilamentVote {
    mode: i64,
    mode_count: usize,
    segments: usize,
}

impl FilamentVote {
    fn proportion(&self) -> f64 {
        self.mode_count as f64 / self.segments as f64
    }
}

/// Majority-class unifier with an agreement-proportion cutoff.
pub struct MajorityClassUnifier {
    cutoff: f64,
}

impl MajorityClassUnifier {
    /// Creates a unifier; the cutoff must lie in `[0, 1]`.
    pub fn new(cutoff: f64) -> Result<Self, Error> {
        if !cutoff.is_finite() || !(0.0..=1.0).contains(&cutoff) {
            return Err(Error::InvalidCutoff { value: cutoff });
        }
        Ok(Self { cutoff })
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Votes over `classified`, then rewrites `reference`: accepted
    /// filaments get the winning class on every segment, rejected filaments
    /// are removed. Segments of `reference` whose filament never appears in
    /// `classified` pass through untouched.
    pub fn unify(
        &self,
        reference: &RecordTable,
        classified: &RecordTable,
        cancel: &CancelToken,
    ) -> Result<(RecordTable, UnificationReport), Error> {
        if classified.records.iter().any(|r| r.class_number.is_none()) {
            return Err(Error::MissingColumn {
                column: "class_number",
            });
        }

        let groups = classified.partition_by_filament();
        let votes: Vec<Option<FilamentVote>> = groups
            .par_iter()
            .map(|(_, rows)| {
                if cancel.is_cancelled() {
                    return None;
                }
                let labels = rows
                    .iter()
                    .map(|&row| classified.records[row].class_number.expect("validated above"));
                Some(majority_vote(labels))
            })
            .collect();
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut accepted: HashMap<FilamentKey, i64> = HashMap::new();
        let mut accepted_modes: Vec<i64> = Vec::new();
        let mut rejected_keys: HashSet<FilamentKey> = HashSet::new();
        let mut rejected: Vec<RejectedFilament> = Vec::new();
        for ((key, _), vote) in groups.iter().zip(votes) {
            let vote = vote.expect("cancellation handled above");
            let proportion = vote.proportion();
            if proportion >= self.cutoff {
                info!(
                    "For {key}, the most common class is {}: {} of {} segments",
                    vote.mode, vote.mode_count, vote.segments
                );
                accepted.insert(key.clone(), vote.mode);
                accepted_modes.push(vote.mode);
            } else {
                info!(
                    "{key} fails the agreement cutoff ({proportion:.2} < {}) and is discarded",
                    self.cutoff
                );
                rejected_keys.insert(key.clone());
                rejected.push(RejectedFilament {
                    filament: key.clone(),
                    proportion,
                });
            }
        }

        let segments_before = reference.len();
        let mut unified = RecordTable::default();
        for record in &reference.records {
            let key = FilamentKey::of(record);
            if rejected_keys.contains(&key) {
                continue;
            }
            let mut out = record.clone();
            if let Some(&mode) = accepted.get(&key) {
                out.class_number = Some(mode);
            }
            unified.records.push(out);
        }

        let report = self.build_report(
            &unified,
            classified,
            segments_before,
            groups.len(),
            &accepted_modes,
            rejected,
        );
        Ok((unified, report))
    }

    fn build_report(
        &self,
        unified: &RecordTable,
        classified: &RecordTable,
        segments_before: usize,
        filaments_before: usize,
        accepted_modes: &[i64],
        rejected: Vec<RejectedFilament>,
    ) -> UnificationReport {
        // The class universe covers every label seen anywhere, so a class
        // wiped out by the cutoff still shows up with zero counts.
        let mut universe: BTreeSet<i64> = classified
            .records
            .iter()
            .filter_map(|r| r.class_number)
            .collect();
        universe.extend(unified.records.iter().filter_map(|r| r.class_number));

        let mut segment_counts: BTreeMap<i64, usize> = BTreeMap::new();
        for record in &unified.records {
            if let Some(class) = record.class_number {
                *segment_counts.entry(class).or_insert(0) += 1;
            }
        }
        let mut filament_counts: BTreeMap<i64, usize> = BTreeMap::new();
        for &mode in accepted_modes {
            *filament_counts.entry(mode).or_insert(0) += 1;
        }

        let filaments_after = accepted_modes.len();
        let classes = universe
            .into_iter()
            .map(|class_number| {
                let filaments = filament_counts.get(&class_number).copied().unwrap_or(0);
                let filament_percent = if filaments_after > 0 {
                    filaments as f64 / filaments_after as f64 * 100.0
                } else {
                    0.0
                };
                ClassBreakdown {
                    class_number,
                    segments: segment_counts.get(&class_number).copied().unwrap_or(0),
                    filaments,
                    filament_percent,
                }
            })
            .collect();

        UnificationReport {
            cutoff: self.cutoff,
            filaments_before,
            filaments_after,
            segments_before,
            total_segments: unified.len(),
            classes,
            rejected,
        }
    }
}

/// Most frequent label; ties break toward the lowest label.
fn majority_vote(labels: impl Iterator<Item = i64>) -> FilamentVote {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    let mut segments = 0;
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
        segments += 1;
    }
    let (&mode, &mode_count) = counts
        .iter()
        .max_by_key(|(label, count)| (**count, std::cmp::Reverse(**label)))
        .expect("partition groups are never empty");
    FilamentVote {
        mode,
        mode_count,
        segments,
    }
}

/// Splits a table into one table per class label, classes ascending.
/// Records without a label are not placed in any split.
pub fn split_by_class(table: &RecordTable) -> Vec<(i64, RecordTable)> {
    let mut splits: BTreeMap<i64, RecordTable> = BTreeMap::new();
    for record in &table.records {
        if let Some(class) = record.class_number {
            splits
                .entry(class)
                .or_default()
                .records
                .push(record.clone());
        }
    }
    splits.into_iter().collect()
}

/// Per-filament majority-agreement proportions, filaments in first-
/// appearance order. The distribution behind the operator's confidence
/// histogram.
pub fn class_confidences(table: &RecordTable) -> Result<Vec<f64>, Error> {
    if table.records.iter().any(|r| r.class_number.is_none()) {
        return Err(Error::MissingColumn {
            column: "class_number",
        });
    }
    Ok(table
        .partition_by_filament()
        .iter()
        .map(|(_, rows)| {
            let vote = majority_vote(
                rows.iter()
                    .map(|&row| table.records[row].class_number.expect("validated above")),
            );
            vote.proportion()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SegmentRecord;
    use std::collections::BTreeMap as Map;

    fn record(tube_id: i64, class: Option<i64>) -> SegmentRecord {
        SegmentRecord {
            micrograph: "mg_0001".to_string(),
            tube_id,
            angle_rot: 0.0,
            angle_psi: 0.0,
            shift_x: 0.0,
            shift_y: 0.0,
            class_number: class,
            extra: Map::new(),
        }
    }

    #[test]
    fn cutoff_outside_unit_interval_is_rejected() {
        assert!(matches!(
            MajorityClassUnifier::new(1.5),
            Err(Error::InvalidCutoff { .. })
        ));
        assert!(matches!(
            MajorityClassUnifier::new(-0.1),
            Err(Error::InvalidCutoff { .. })
        ));
        assert!(MajorityClassUnifier::new(0.0).is_ok());
        assert!(MajorityClassUnifier::new(1.0).is_ok());
    }

    #[test]
    fn vote_ties_break_toward_lowest_label() {
        let vote = majority_vote([14, 12, 14, 12].into_iter());
        assert_eq!(vote.mode, 12);
        assert_eq!(vote.mode_count, 2);
    }

    #[test]
    fn missing_class_column_is_fatal() {
        let reference = RecordTable::new(vec![record(1, None)]);
        let classified = RecordTable::new(vec![record(1, Some(13)), record(1, None)]);
        let unifier = MajorityClassUnifier::new(0.5).unwrap();
        let err = unifier
            .unify(&reference, &classified, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, Error::MissingColumn { .. }));
    }

    #[test]
    fn split_by_class_groups_ascending() {
        let table = RecordTable::new(vec![
            record(1, Some(13)),
            record(2, Some(11)),
            record(3, Some(13)),
            record(4, None),
        ]);
        let splits = split_by_class(&table);
        let classes: Vec<i64> = splits.iter().map(|(c, _)| *c).collect();
        assert_eq!(classes, vec![11, 13]);
        assert_eq!(splits[1].1.len(), 2);
    }

    #[test]
    fn confidences_follow_first_appearance_order() {
        let table = RecordTable::new(vec![
            record(2, Some(11)),
            record(1, Some(13)),
            record(2, Some(11)),
            record(1, Some(12)),
            record(2, Some(12)),
        ]);
        let confidences = class_confidences(&table).unwrap();
        assert_eq!(confidences.len(), 2);
        assert!((confidences[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((confidences[1] - 0.5).abs() < 1e-12);
    }
}
