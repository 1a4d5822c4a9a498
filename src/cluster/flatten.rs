//! Flattening-search clustering for shift data.
//!
//! Translational shifts along a filament vary smoothly, near-linearly,
//! with position. Genuine signal is the one linear trend that makes the
//! residual sequence flattest; outlier segments are those whose residual,
//! after detrending by that trend, falls outside the dominant histogram
//! bin.
//!
//! The search scans candidate slopes on a fixed grid (step 0.25 over
//! `[-search_range, +search_range)`), scores each by the sum of absolute
//! first differences of the detrended sequence, keeps the flattest, and
//! bins the detrended residuals. Bin width is selected automatically
//! (maximum of the Freedman–Diaconis and Sturges bin-count estimates); a
//! fixed 5-bin histogram is the fallback when the automatic choice
//! degenerates into a bin-count blow-up. Downstream fit quality is
//! sensitive to the grid density, so both the step and the default range
//! are part of the numeric contract.

use super::{top_cluster_index, Clustering};

/// Grid step of the candidate-slope search.
pub const SLOPE_STEP: f64 = 0.25;

/// Default half-width of the slope grid.
pub const DEFAULT_SEARCH_RANGE: f64 = 8.0;

const FALLBACK_BINS: usize = 5;
const MAX_AUTO_BINS: usize = 4096;

/// Outcome of the flattening search for one shift sequence.
#[derive(Clone, Debug)]
pub struct FlattenResult {
    pub clustering: Clustering,
    /// Slope selected by the search.
    pub slope: f64,
    /// Flatness score of the winning slope (sum of |first differences|).
    pub flatness: f64,
}

/// Detrends `values` with the flattest slope in the grid and clusters the
/// residuals by histogram bin. A top cluster always exists for non-empty
/// input (it may be a singleton; callers decide whether that is fittable).
pub fn flatten_and_cluster(values: &[f64], search_range: f64) -> FlattenResult {
    debug_assert!(!values.is_empty());

    let steps = ((2.0 * search_range) / SLOPE_STEP).ceil().max(1.0) as usize;
    let mut best_slope = -search_range;
    let mut best_score = f64::INFINITY;
    let mut detrended = vec![0.0; values.len()];
    for k in 0..steps {
        let slope = -search_range + k as f64 * SLOPE_STEP;
        let mut score = 0.0;
        let mut prev = 0.0;
        for (i, &v) in values.iter().enumerate() {
            let flattened = v - (i + 1) as f64 * slope;
            if i > 0 {
                score += (flattened - prev).abs();
            }
            prev = flattened;
        }
        if score < best_score {
            best_score = score;
            best_slope = slope;
        }
    }
    for (i, &v) in values.iter().enumerate() {
        detrended[i] = v - (i + 1) as f64 * best_slope;
    }

    let clustering = cluster_by_bins(&detrended);
    FlattenResult {
        clustering,
        slope: best_slope,
        flatness: best_score,
    }
}

fn cluster_by_bins(detrended: &[f64]) -> Clustering {
    let Some(edges) = histogram_edges(detrended) else {
        // Degenerate spread: every residual is the same, one cluster.
        return Clustering {
            top: (0..detrended.len()).collect(),
            rest: Vec::new(),
        };
    };

    // Group indices by bin id, bins in first-appearance order.
    let mut bins: Vec<(usize, Vec<usize>)> = Vec::new();
    for (idx, &v) in detrended.iter().enumerate() {
        let id = digitize(v, &edges);
        match bins.iter_mut().find(|(b, _)| *b == id) {
            Some((_, members)) => members.push(idx),
            None => bins.push((id, vec![idx])),
        }
    }

    let members: Vec<Vec<usize>> = bins.into_iter().map(|(_, m)| m).collect();
    let top_idx = top_cluster_index(&members).expect("non-empty input yields at least one bin");
    let top = members[top_idx].clone();
    let mut others: Vec<&Vec<usize>> = members
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != top_idx)
        .map(|(_, m)| m)
        .collect();
    // Diagnostic ordering only: remaining bins by descending population.
    others.sort_by_key(|m| std::cmp::Reverse(m.len()));
    let rest = others.into_iter().flatten().copied().collect();
    Clustering { top, rest }
}

/// Equally spaced bin edges over the data range, or `None` when the range
/// is degenerate.
fn histogram_edges(data: &[f64]) -> Option<Vec<f64>> {
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if !span.is_finite() || span <= 0.0 {
        return None;
    }

    let width = auto_bin_width(data, span);
    let count = if width > 0.0 {
        let count = (span / width).ceil() as usize;
        if count == 0 || count > MAX_AUTO_BINS {
            FALLBACK_BINS
        } else {
            count
        }
    } else {
        FALLBACK_BINS
    };

    let step = span / count as f64;
    Some((0..=count).map(|i| min + i as f64 * step).collect())
}

/// Automatic bin width: the smaller of the Freedman–Diaconis and Sturges
/// widths (equivalently, the larger bin count); Sturges alone when the IQR
/// collapses to zero.
fn auto_bin_width(data: &[f64], span: f64) -> f64 {
    let n = data.len() as f64;
    let sturges = span / (n.log2() + 1.0);

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let iqr = percentile(&sorted, 0.75) - percentile(&sorted, 0.25);
    let fd = 2.0 * iqr / n.cbrt();
    if fd > 0.0 {
        fd.min(sturges)
    } else {
        sturges
    }
}

/// Linear-interpolation percentile over pre-sorted data.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Number of edges `<=` the value, matching digitize semantics: a residual
/// equal to the last edge sits past the final bin and forms its own group.
fn digitize(v: f64, edges: &[f64]) -> usize {
    edges.partition_point(|e| *e <= v)
}
