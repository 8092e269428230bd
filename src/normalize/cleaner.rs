//! Text-normalization capability for messy filenames.
//!
//! The capability is a black box: it receives an instruction and a
//! filename and returns a cleaned "title author" string. The default
//! implementation talks to an HTTP endpoint; tests substitute their own
//! [`NameCleaner`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Instruction sent with every cleanup request.
const CLEAN_INSTRUCTION: &str = "This is a filename, please clean it up. Your output should be \
    in the format of [title] [author name]. Remove any punctuation and symbols except for \
    periods, replace any double spaces with a single space, and remove any non-title or author \
    name words.";

/// Error type for filename cleanup.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    /// The cleanup request failed at the transport level.
    #[error("cleanup request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("cleanup endpoint returned status {status}")]
    Status {
        /// HTTP status code returned.
        status: u16,
    },

    /// The endpoint answered with no usable text.
    #[error("cleanup endpoint returned empty text")]
    EmptyResponse,
}

/// Opaque text-normalization capability.
///
/// One blocking call of arbitrary latency per filename; no retry and no
/// quality check on the result. Callers fall back to sanitizing the raw
/// filename when this fails.
#[async_trait]
pub trait NameCleaner: Send + Sync {
    /// Rewrites a messy filename into "title author" form.
    ///
    /// # Errors
    ///
    /// Returns [`CleanError`] when the capability is unavailable or
    /// produced nothing.
    async fn clean(&self, file_name: &str) -> Result<String, CleanError>;
}

#[derive(Debug, Serialize)]
struct CleanRequest<'a> {
    instruction: &'a str,
    filename: &'a str,
}

#[derive(Debug, Deserialize)]
struct CleanResponse {
    text: String,
}

/// HTTP-backed name cleaner.
///
/// POSTs `{ "instruction": ..., "filename": ... }` to the configured
/// endpoint and reads `{ "text": ... }` back.
#[derive(Debug, Clone)]
pub struct HttpNameCleaner {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNameCleaner {
    /// Creates a cleaner against the given endpoint URL.
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl NameCleaner for HttpNameCleaner {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn clean(&self, file_name: &str) -> Result<String, CleanError> {
        let request = CleanRequest {
            instruction: CLEAN_INSTRUCTION,
            filename: file_name,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CleanError::Status {
                status: status.as_u16(),
            });
        }

        let body: CleanResponse = response.json().await?;
        let text = body.text.trim().to_string();
        if text.is_empty() {
            return Err(CleanError::EmptyResponse);
        }

        debug!(file = %file_name, cleaned = %text, "filename cleanup succeeded");
        Ok(text)
    }
}
