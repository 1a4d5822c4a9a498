mod common;

use common::synthetic_table::{angle_filament, shift_filament, table};
use filament_smoother::cancel::CancelToken;
use filament_smoother::cluster::flatten::DEFAULT_SEARCH_RANGE;
use filament_smoother::cluster::{cluster_within_cutoff, flatten_and_cluster};
use filament_smoother::{PoseAttribute, SmootherParams, TrajectorySmoother};

fn smoother() -> TrajectorySmoother {
    TrajectorySmoother::new(SmootherParams::default())
}

#[test]
fn partition_covers_all_records_with_no_empty_group() {
    let table = table(vec![
        angle_filament("mg_0001", 1, &[10.0, 11.0, 12.0]),
        angle_filament("mg_0001", 2, &[20.0, 21.0]),
        angle_filament("mg_0002", 1, &[30.0, 31.0, 32.0, 33.0]),
    ]);
    let groups = table.partition_by_filament();
    let total: usize = groups.iter().map(|(_, rows)| rows.len()).sum();
    assert_eq!(total, table.len());
    assert!(groups.iter().all(|(_, rows)| !rows.is_empty()));
}

#[test]
fn angle_clustering_does_not_wrap_across_180() {
    // 170 and -170 differ by 340 on the real line (20 on the circle); the
    // clusterer works on the real line, so they stay apart and unclustered.
    let clustering = cluster_within_cutoff(&[10.0, 12.0, 14.0, 170.0, -170.0], 8.0)
        .expect("the close triple is clusterable");
    assert_eq!(clustering.top, vec![0, 1, 2]);
    assert!(!clustering.rest.contains(&3));
    assert!(!clustering.rest.contains(&4));
}

#[test]
fn linear_shift_sequence_recovers_slope_within_grid_resolution() {
    let result = flatten_and_cluster(&[0.0, 2.0, 4.0, 6.0, 8.0], DEFAULT_SEARCH_RANGE);
    assert!((result.slope - 2.0).abs() < 0.25);
    assert!(result.flatness < 1e-9);
    assert_eq!(result.clustering.top, vec![0, 1, 2, 3, 4]);
}

#[test]
fn top_and_rest_partition_the_filament_indices() {
    let values = [0.5, 1.0, 1.5, 42.0, 2.0, 2.5];
    let result = flatten_and_cluster(&values, DEFAULT_SEARCH_RANGE);
    let mut all: Vec<usize> = result
        .clustering
        .top
        .iter()
        .chain(result.clustering.rest.iter())
        .copied()
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..values.len()).collect::<Vec<_>>());
    assert!(result
        .clustering
        .top
        .iter()
        .all(|idx| !result.clustering.rest.contains(idx)));
}

#[test]
fn angle_smoothing_is_idempotent() {
    let mut table = table(vec![angle_filament(
        "mg_0001",
        1,
        &[10.0, 11.5, 12.5, 30.0, 14.2, 15.1],
    )]);
    let cancel = CancelToken::new();
    smoother()
        .smooth_attribute(&mut table, PoseAttribute::AngleRot, &cancel)
        .unwrap();
    let once = table.clone();
    smoother()
        .smooth_attribute(&mut table, PoseAttribute::AngleRot, &cancel)
        .unwrap();
    assert_eq!(table.len(), once.len());
    for (a, b) in table.records.iter().zip(&once.records) {
        assert!(
            (a.angle_rot - b.angle_rot).abs() < 1e-6,
            "second pass moved {} to {}",
            b.angle_rot,
            a.angle_rot
        );
    }
}

#[test]
fn shift_smoothing_is_idempotent_once_residuals_collapse() {
    let mut table = table(vec![shift_filament(
        "mg_0001",
        1,
        &[0.0, 2.0, 4.0, 6.0, 50.0],
        &[1.0, 1.0, 1.0, 1.0, 1.0],
    )]);
    let cancel = CancelToken::new();
    smoother().smooth_shifts(&mut table, &cancel).unwrap();
    let once = table.clone();
    smoother().smooth_shifts(&mut table, &cancel).unwrap();
    assert_eq!(table.len(), once.len());
    for (a, b) in table.records.iter().zip(&once.records) {
        assert!((a.shift_x - b.shift_x).abs() < 1e-6);
        assert!((a.shift_y - b.shift_y).abs() < 1e-6);
    }
}

#[test]
fn outliers_are_overwritten_with_the_fitted_trend() {
    let mut table = table(vec![shift_filament(
        "mg_0001",
        1,
        &[0.0, 2.0, 4.0, 6.0, 50.0],
        &[0.0; 5],
    )]);
    smoother()
        .smooth_attribute(&mut table, PoseAttribute::ShiftX, &CancelToken::new())
        .unwrap();
    let xs: Vec<f64> = table.records.iter().map(|r| r.shift_x).collect();
    // Top cluster {0,1,2,3} fits slope 2 through ranks 0..3; the outlier at
    // index 4 is extrapolated onto the line.
    for (i, &x) in xs.iter().enumerate() {
        assert!((x - 2.0 * i as f64).abs() < 1e-9, "index {i}: {x}");
    }
}

#[test]
fn discard_decisions_are_per_attribute() {
    // Filament 1: X fittable, Y residuals split into singleton bins, so the
    // Y pass discards the whole filament. Filament 2 survives both passes.
    let mut table = table(vec![
        shift_filament("mg_0001", 1, &[0.0, 1.0], &[0.0, 100.0]),
        shift_filament("mg_0001", 2, &[5.0, 5.0, 5.0], &[3.0, 3.0, 3.0]),
    ]);
    let stats = smoother()
        .smooth_shifts(&mut table, &CancelToken::new())
        .unwrap();
    assert_eq!(stats[0].attribute, PoseAttribute::ShiftX);
    assert!(stats[0].discarded.is_empty());
    assert_eq!(stats[1].attribute, PoseAttribute::ShiftY);
    assert_eq!(stats[1].discarded.len(), 1);
    assert_eq!(stats[1].discarded[0].tube_id, 1);
    assert!(table.records.iter().all(|r| r.tube_id == 2));
}

#[test]
fn unfittable_angle_filament_is_dropped_others_survive() {
    let mut table = table(vec![
        angle_filament("mg_0001", 1, &[0.0, 60.0, 120.0]),
        angle_filament("mg_0001", 2, &[10.0, 11.0, 12.0]),
    ]);
    let stats = smoother()
        .smooth_attribute(&mut table, PoseAttribute::AngleRot, &CancelToken::new())
        .unwrap();
    assert_eq!(stats.filaments, 2);
    assert_eq!(stats.fitted, 1);
    assert_eq!(stats.discarded.len(), 1);
    assert_eq!(stats.segments_after, 3);
    assert!(table.records.iter().all(|r| r.tube_id == 2));
}

#[test]
fn short_filaments_can_be_prefiltered() {
    let params = SmootherParams {
        min_segments: Some(3),
        ..SmootherParams::default()
    };
    let mut table = table(vec![
        angle_filament("mg_0001", 1, &[10.0, 11.0]),
        angle_filament("mg_0001", 2, &[10.0, 11.0, 12.0]),
    ]);
    let stats = TrajectorySmoother::new(params)
        .smooth_attribute(&mut table, PoseAttribute::AngleRot, &CancelToken::new())
        .unwrap();
    assert_eq!(stats.filaments, 1);
    assert!(table.records.iter().all(|r| r.tube_id == 2));
}

#[test]
fn cancellation_surfaces_as_an_error() {
    let mut table = table(vec![angle_filament("mg_0001", 1, &[10.0, 11.0])]);
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = smoother()
        .smooth_attribute(&mut table, PoseAttribute::AngleRot, &cancel)
        .unwrap_err();
    assert!(matches!(err, filament_smoother::Error::Cancelled));
}
