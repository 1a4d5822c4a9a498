#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod cancel;
pub mod config;
pub mod error;
pub mod records;
pub mod smoother;
pub mod table_io;
pub mod unify;

// Algorithmic primitives – public for tools and advanced users, but
// considered unstable internals.
pub mod cluster;
pub mod fit;

// --- High-level re-exports -------------------------------------------------

// Main entry points: the two engines and their knobs.
pub use crate::smoother::{
    AttributeSmoothingStats, PoseAttribute, SmootherParams, TrajectorySmoother,
};
pub use crate::unify::{MajorityClassUnifier, UnificationReport};

pub use crate::error::Error;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use filament_smoother::prelude::*;
///
/// # fn main() -> Result<(), Error> {
/// let mut table = RecordTable::default();
/// let smoother = TrajectorySmoother::new(SmootherParams::default());
/// let stats = smoother.smooth_attribute(&mut table, PoseAttribute::AngleRot, &CancelToken::new())?;
/// println!("fitted {} filaments", stats.fitted);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::cancel::CancelToken;
    pub use crate::records::{FilamentKey, RecordTable, SegmentRecord};
    pub use crate::{
        Error, MajorityClassUnifier, PoseAttribute, SmootherParams, TrajectorySmoother,
        UnificationReport,
    };
}
