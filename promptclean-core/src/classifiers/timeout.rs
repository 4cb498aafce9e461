// promptclean-core/src/classifiers/timeout.rs
//! Puts a deadline on any `Classifier`.

use log::warn;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::classifier::{ClassificationVerdict, Classifier};
use crate::errors::ClassifierError;

/// Runs the inner classifier on a worker thread and gives up after `timeout`.
///
/// Every call spawns its own worker thread. A timed-out call does not stop
/// that thread: it stays alive until the inner classifier returns, and its
/// result is discarded. An inner classifier that never returns therefore
/// leaks one thread per call, so the inner classifier must bound its own
/// blocking (as `HttpClassifier` does with its request timeout).
#[derive(Clone)]
pub struct TimeoutClassifier {
    inner: Arc<dyn Classifier>,
    timeout: Duration,
}

impl TimeoutClassifier {
    pub fn new(inner: Arc<dyn Classifier>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl std::fmt::Debug for TimeoutClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutClassifier")
            .field("inner", &self.inner.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Classifier for TimeoutClassifier {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn classify(&self, text: &str) -> Result<ClassificationVerdict, ClassifierError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();

        thread::Builder::new()
            .name("promptclean-classifier".to_string())
            .spawn(move || {
                // The receiver is gone if we already timed out.
                let _ = tx.send(inner.classify(&text));
            })
            .map_err(|e| ClassifierError::Unavailable(format!("failed to spawn worker: {}", e)))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(
                    "Classifier '{}' exceeded {} ms deadline.",
                    self.inner.name(),
                    self.timeout.as_millis()
                );
                Err(ClassifierError::Timeout(self.timeout.as_millis() as u64))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ClassifierError::Unavailable(
                "classifier worker exited without answering".to_string(),
            )),
        }
    }
}
