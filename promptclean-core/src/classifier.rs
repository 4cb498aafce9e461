// promptclean-core/src/classifier.rs
//! Defines the `Classifier` capability consumed by the sensitivity gate.
//!
//! The pipeline treats the classifier as opaque: text in, label and score
//! out. Model format, hosting and batching belong to the implementation.
//! Implementations in `crate::classifiers` cover HTTP inference endpoints,
//! deadlines, and fixed verdicts for tests.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ClassifierError;

/// The label and confidence a classifier assigned to one text snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationVerdict {
    pub label: String,
    /// Confidence in [0, 1].
    pub score: f64,
}

impl ClassificationVerdict {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    /// Rejects NaN, infinities and scores outside [0, 1].
    pub fn checked(self) -> Result<Self, ClassifierError> {
        if self.score.is_finite() && (0.0..=1.0).contains(&self.score) {
            Ok(self)
        } else {
            Err(ClassifierError::InvalidVerdict {
                label: self.label,
                score: self.score,
            })
        }
    }
}

impl fmt::Display for ClassificationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3})", self.label, self.score)
    }
}

/// A text classification capability.
///
/// Implementations must be safe to call from several threads at once. A
/// classifier backed by an exclusive resource (a single accelerator, a
/// rate-limited API) serializes access itself; the pipeline does not queue.
///
/// Classifiers may be non-deterministic. When they are, `Pipeline::sanitize`
/// inherits that variance: the same input can be flagged on one call and
/// passed on the next.
pub trait Classifier: Send + Sync {
    /// A short name for logs.
    fn name(&self) -> &str;

    /// Classifies one text. A single synchronous attempt; no retries.
    fn classify(&self, text: &str) -> Result<ClassificationVerdict, ClassifierError>;
}
