//! Per-filament trajectory smoothing.
//!
//! Overview
//! - Partitions the particle table by (micrograph, tube id), filaments in
//!   first-appearance order, rows in table order.
//! - Dispatches each filament's attribute sequence to the matching
//!   clusterer: pairwise differences for angles, the flattening slope
//!   search for shifts.
//! - Fits a line through the top cluster and overwrites the attribute of
//!   **every** segment (former outliers included) with the fitted trend.
//! - Marks filaments without a usable top cluster for removal and deletes
//!   them in one batch after the loop, so the grouping iteration never
//!   observes a mutated table.
//!
//! Per-filament analysis is independent and runs on the rayon pool; all
//! table mutation is deferred to a sequential patch pass. A cancellation
//! token is polled per filament.
//!
//! Modules
//! - [`params`] – attribute selectors and tuning knobs.
//! - `pipeline` – the [`TrajectorySmoother`] implementation.

pub mod params;
mod pipeline;

pub use params::{AttributeKind, PoseAttribute, SmootherParams};
pub use pipeline::{AttributeSmoothingStats, TrajectorySmoother};
