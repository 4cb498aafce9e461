// promptclean-core/src/classifiers/mod.rs
//! Concrete `Classifier` implementations.
//!
//! * `http`: calls a hosted text-classification endpoint.
//! * `timeout`: bounds any classifier with a deadline.
//! * [`FixedClassifier`]: always returns the same answer.

pub mod http;
pub mod timeout;

pub use http::HttpClassifier;
pub use timeout::TimeoutClassifier;

use crate::classifier::{ClassificationVerdict, Classifier};
use crate::errors::ClassifierError;

/// Returns a preset verdict or error on every call.
///
/// Useful for offline runs and for exercising the gate deterministically.
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    response: Result<ClassificationVerdict, ClassifierError>,
}

impl FixedClassifier {
    pub fn verdict(label: impl Into<String>, score: f64) -> Self {
        Self {
            response: Ok(ClassificationVerdict::new(label, score)),
        }
    }

    pub fn failing(error: ClassifierError) -> Self {
        Self { response: Err(error) }
    }
}

impl Classifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    fn classify(&self, _text: &str) -> Result<ClassificationVerdict, ClassifierError> {
        self.response.clone()
    }
}
