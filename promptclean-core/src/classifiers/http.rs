// promptclean-core/src/classifiers/http.rs
//! A `Classifier` backed by a hosted text-classification endpoint.
//!
//! The request body is `{"inputs": "<text>"}`. The response may be a single
//! `{label, score}` object, a list of them, or a list of lists (one list per
//! input); the highest-scoring entry wins.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::classifier::{ClassificationVerdict, Classifier};
use crate::errors::{ClassifierError, PromptCleanError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("promptclean/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<ClassificationVerdict>>),
    Flat(Vec<ClassificationVerdict>),
    Single(ClassificationVerdict),
}

impl InferenceResponse {
    fn into_candidates(self) -> Vec<ClassificationVerdict> {
        match self {
            Self::Nested(lists) => lists.into_iter().flatten().collect(),
            Self::Flat(list) => list,
            Self::Single(verdict) => vec![verdict],
        }
    }
}

/// Blocking HTTP client for an inference endpoint.
///
/// `reqwest::blocking::Client` is internally pooled and safe to share across
/// threads, so one `HttpClassifier` can serve concurrent pipelines.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpClassifier {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, PromptCleanError> {
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PromptCleanError::Fatal(format!("Failed to build classifier HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            token: None,
            timeout,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ClassifierError {
        if e.is_timeout() {
            ClassifierError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ClassifierError::Unavailable(e.to_string())
        }
    }
}

impl Classifier for HttpClassifier {
    fn name(&self) -> &str {
        "http"
    }

    fn classify(&self, text: &str) -> Result<ClassificationVerdict, ClassifierError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&InferenceRequest { inputs: text });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| self.map_transport_error(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Unavailable(format!(
                "{} answered HTTP {}",
                self.endpoint, status
            )));
        }

        let body: InferenceResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                self.map_transport_error(e)
            } else {
                ClassifierError::InvalidResponse(e.to_string())
            }
        })?;

        let best = body
            .into_candidates()
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| ClassifierError::InvalidResponse("no labels in response".to_string()))?;
        debug!("Classifier at {} returned {}.", self.endpoint, best);
        best.checked()
    }
}
