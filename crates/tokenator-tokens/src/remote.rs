//! Remote token counting seam

use async_trait::async_trait;
use thiserror::Error;
use tokenator_core::Credential;

/// Why a remote count could not be obtained
///
/// Never reaches the batch: `TokenCounter` turns every variant into an
/// estimate.
#[derive(Error, Debug)]
pub enum CountingFailure {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Counting request timed out")]
    Timeout,

    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed counting response: {0}")]
    MalformedResponse(String),
}

/// An endpoint that returns exact token counts for a fixed model
#[async_trait]
pub trait RemoteCounter: Send + Sync {
    /// Single attempt, no retries
    async fn count_tokens(
        &self,
        text: &str,
        credential: &Credential,
    ) -> Result<usize, CountingFailure>;

    /// Model identifier, for logs
    fn model(&self) -> &str;
}
