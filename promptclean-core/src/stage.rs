// promptclean-core/src/stage.rs
//! Defines the `Stage` trait implemented by each step of the pipeline.
//!
//! A stage is a total function from text to text. Stages never fail at call
//! time: everything that can be wrong with a stage is caught when it is
//! built. What a stage did is written into the shared `SanitizeReport`.
//!
//! License: MIT OR APACHE 2.0

use crate::report::SanitizeReport;

/// One transformation pass of the pipeline.
pub trait Stage: Send + Sync {
    /// Stable identifier used in logs ("pii", "code", "gate", ...).
    fn name(&self) -> &'static str;

    /// Transforms `text`, recording what it did in `report`.
    fn apply(&self, text: String, report: &mut SanitizeReport) -> String;
}
