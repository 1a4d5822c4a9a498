//! Smoothing pipeline driving per-filament analysis end-to-end.
//!
//! Typical usage:
//! ```no_run
//! use filament_smoother::cancel::CancelToken;
//! use filament_smoother::records::RecordTable;
//! use filament_smoother::{PoseAttribute, SmootherParams, TrajectorySmoother};
//!
//! # fn example(mut table: RecordTable) -> Result<(), filament_smoother::Error> {
//! let smoother = TrajectorySmoother::new(SmootherParams::default());
//! let stats = smoother.smooth_attribute(&mut table, PoseAttribute::AngleRot, &CancelToken::new())?;
//! println!("discarded {} filaments", stats.discarded.len());
//! # Ok(())
//! # }
//! ```

use super::params::{AttributeKind, PoseAttribute, SmootherParams};
use crate::cancel::CancelToken;
use crate::cluster::{cluster_within_cutoff, flatten_and_cluster, Clustering};
use crate::error::Error;
use crate::fit::{fit_line, LineFit};
use crate::records::{FilamentKey, RecordTable};
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

/// Outcome counters of one attribute's smoothing pass.
#[derive(Clone, Debug, Serialize)]
pub struct AttributeSmoothingStats {
    pub attribute: PoseAttribute,
    /// Filaments analysed (after the optional short-filament pre-filter).
    pub filaments: usize,
    /// Filaments whose attribute was overwritten with a fitted trend.
    pub fitted: usize,
    /// Filaments removed because no usable cluster exists.
    pub discarded: Vec<FilamentKey>,
    pub segments_before: usize,
    pub segments_after: usize,
}

/// Per-filament robust smoothing of one pose attribute across a table.
pub struct TrajectorySmoother {
    params: SmootherParams,
}

impl TrajectorySmoother {
    pub fn new(params: SmootherParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SmootherParams {
        &self.params
    }

    /// Smooths one attribute over every filament of `table`.
    ///
    /// Filaments without a usable top cluster are removed from the table
    /// wholesale; the discard decision belongs to the filament, not the
    /// segment. All deletions happen in one batch after every filament has
    /// been analysed.
    pub fn smooth_attribute(
        &self,
        table: &mut RecordTable,
        attribute: PoseAttribute,
        cancel: &CancelToken,
    ) -> Result<AttributeSmoothingStats, Error> {
        if let Some(min_segments) = self.params.min_segments {
            let removed = table.filter_short_filaments(min_segments);
            if removed > 0 {
                info!(
                    "dropped {removed} segments from filaments shorter than {min_segments} segments"
                );
            }
        }
        let segments_before = table.len();
        let groups = table.partition_by_filament();
        let filaments = groups.len();

        // Analysis is read-only and embarrassingly parallel; patches are
        // applied sequentially afterwards so the grouping stays valid.
        let fits: Vec<Option<Vec<f64>>> = groups
            .par_iter()
            .map(|(_, rows)| {
                if cancel.is_cancelled() {
                    return None;
                }
                let values: Vec<f64> = rows
                    .iter()
                    .map(|&row| attribute.get(&table.records[row]))
                    .collect();
                self.fit_filament(&values, attribute.kind())
            })
            .collect();
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut stats = AttributeSmoothingStats {
            attribute,
            filaments,
            fitted: 0,
            discarded: Vec::new(),
            segments_before,
            segments_after: segments_before,
        };
        let mut doomed = vec![false; table.len()];
        for ((key, rows), fitted) in groups.iter().zip(fits) {
            match fitted {
                Some(values) => {
                    info!("Now fitting {key} ({})", attribute.label());
                    for (&row, value) in rows.iter().zip(values) {
                        attribute.set(&mut table.records[row], value);
                    }
                    stats.fitted += 1;
                }
                None => {
                    info!("{key}, {} cannot be fit, and is discarded", attribute.label());
                    for &row in rows {
                        doomed[row] = true;
                    }
                    stats.discarded.push(key.clone());
                }
            }
        }
        table.apply_deletion_mask(&doomed);
        stats.segments_after = table.len();
        Ok(stats)
    }

    /// Smooths both shift attributes, X then Y, each pass with its own
    /// clustering and its own discard decisions: a filament dropped by the
    /// X pass never reaches the Y pass, and a filament may survive X yet be
    /// dropped by Y.
    pub fn smooth_shifts(
        &self,
        table: &mut RecordTable,
        cancel: &CancelToken,
    ) -> Result<Vec<AttributeSmoothingStats>, Error> {
        let x = self.smooth_attribute(table, PoseAttribute::ShiftX, cancel)?;
        let y = self.smooth_attribute(table, PoseAttribute::ShiftY, cancel)?;
        Ok(vec![x, y])
    }

    /// Top-cluster line fit for one filament's attribute sequence, already
    /// evaluated over the full segment range. `None` means unfittable.
    fn fit_filament(&self, values: &[f64], kind: AttributeKind) -> Option<Vec<f64>> {
        let clustering = match kind {
            AttributeKind::Angle => cluster_within_cutoff(values, self.params.angle_cutoff)?,
            AttributeKind::Shift => {
                let result = flatten_and_cluster(values, self.params.shift_search_range);
                debug!(
                    "flattening slope {:.2} (score {:.3}), top bin {} of {}",
                    result.slope,
                    result.flatness,
                    result.clustering.top.len(),
                    values.len()
                );
                result.clustering
            }
        };
        // The line fit needs two points; a singleton top bin is as
        // unfittable as no cluster at all.
        if clustering.top.len() < 2 {
            return None;
        }
        Some(extrapolate_top_cluster(values, &clustering))
    }
}

/// Fits a line through `(rank within top cluster, value)` and evaluates it
/// at every segment index. The rank axis is zero-based like the evaluation
/// axis, so a fit over the full index set reproduces itself: smoothing an
/// already-smoothed filament is a fixed point.
fn extrapolate_top_cluster(values: &[f64], clustering: &Clustering) -> Vec<f64> {
    let x: Vec<f64> = (0..clustering.top.len()).map(|rank| rank as f64).collect();
    let y: Vec<f64> = clustering.top.iter().map(|&idx| values[idx]).collect();
    let fit: LineFit = fit_line(&x, &y);
    fit.evaluate((0..values.len()).map(|i| i as f64))
}
