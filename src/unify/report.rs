//! Structured unification report and its operator-facing text rendering.

use crate::records::FilamentKey;
use serde::Serialize;
use std::fmt::Write;

/// Surviving-segment and filament counts for one class label.
#[derive(Clone, Debug, Serialize)]
pub struct ClassBreakdown {
    pub class_number: i64,
    /// Segments carrying this label in the unified output.
    pub segments: usize,
    /// Accepted filaments whose majority vote chose this label.
    pub filaments: usize,
    /// Share of accepted filaments, in percent.
    pub filament_percent: f64,
}

/// One filament that failed the agreement cutoff.
#[derive(Clone, Debug, Serialize)]
pub struct RejectedFilament {
    pub filament: FilamentKey,
    /// Majority-agreement proportion the filament achieved.
    pub proportion: f64,
}

/// Summary of one class-unification run.
#[derive(Clone, Debug, Serialize)]
pub struct UnificationReport {
    pub cutoff: f64,
    pub filaments_before: usize,
    pub filaments_after: usize,
    pub segments_before: usize,
    /// Segment count of the unified output table.
    pub total_segments: usize,
    /// Per-class breakdown over every observed class, zero-count classes
    /// included.
    pub classes: Vec<ClassBreakdown>,
    pub rejected: Vec<RejectedFilament>,
}

impl UnificationReport {
    /// Renders the report as the text file handed to the operator.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Class unification report");
        let _ = writeln!(out, "========================");
        let _ = writeln!(out, "Agreement cutoff: {:.2}", self.cutoff);
        let _ = writeln!(
            out,
            "Filaments: {} before cutoff, {} after",
            self.filaments_before, self.filaments_after
        );
        let _ = writeln!(
            out,
            "Segments: {} before cutoff, {} after",
            self.segments_before, self.total_segments
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Per-class breakdown");
        for class in &self.classes {
            let _ = writeln!(
                out,
                "  class {:>3}: {:>6} segments, {:>4} filaments ({:.1}%)",
                class.class_number, class.segments, class.filaments, class.filament_percent
            );
        }
        let _ = writeln!(out);
        if self.rejected.is_empty() {
            let _ = writeln!(out, "No filaments fell below the cutoff");
        } else {
            let _ = writeln!(out, "Filaments below the cutoff");
            for entry in &self.rejected {
                let _ = writeln!(
                    out,
                    "  {}: agreement {:.2}",
                    entry.filament, entry.proportion
                );
            }
        }
        out
    }
}
