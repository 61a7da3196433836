//! Submission of training payloads to the voice-clone backend.
//!
//! The backend trains a LoRA adapter from the payload; this client only
//! delivers it and reports what came back. Nothing is retried here: a
//! failed submission surfaces as [`ChatCloneError::UpstreamSubmission`] and
//! the caller decides whether to try again.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::config::BackendConfig;
use crate::error::{ChatCloneError, Result};
use crate::payload::TrainingPayload;

/// Path of the training endpoint below the backend base URL.
pub const GENERATE_ENDPOINT: &str = "/generate-voice";

/// What the backend answered to a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub status: u16,
    /// Response body, unparsed.
    pub body: String,
}

/// Blocking HTTP client for the training backend.
#[derive(Debug, Clone)]
pub struct TrainingClient {
    http: Client,
    config: BackendConfig,
}

impl TrainingClient {
    /// Builds a client with the configured request timeout.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatCloneError::upstream(None, format!("cannot build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Reads the backend settings from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(BackendConfig::from_env()?)
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// POSTs the payload as JSON to the generate endpoint.
    ///
    /// # Errors
    ///
    /// [`ChatCloneError::UpstreamSubmission`] on transport failure (no
    /// status) or on any non-2xx response (with status and body).
    pub fn submit(&self, payload: &TrainingPayload) -> Result<SubmissionReceipt> {
        let url = self.config.endpoint(GENERATE_ENDPOINT);
        info!(url = %url, lora_id = %payload.lora_id, "submitting training payload");

        let resp = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .map_err(|e| ChatCloneError::upstream(None, format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        let body = match resp.text() {
            Ok(body) => body,
            Err(e) => {
                warn!(status = status.as_u16(), error = %e, "could not read backend response body");
                String::new()
            }
        };
        if !status.is_success() {
            warn!(status = status.as_u16(), "backend rejected training payload");
            return Err(ChatCloneError::upstream(
                Some(status.as_u16()),
                if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            ));
        }

        info!(status = status.as_u16(), "training payload accepted");
        Ok(SubmissionReceipt {
            status: status.as_u16(),
            body,
        })
    }
}
