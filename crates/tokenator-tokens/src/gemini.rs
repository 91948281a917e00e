//! Gemini `countTokens` client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokenator_core::Credential;
use tracing::debug;

use crate::remote::{CountingFailure, RemoteCounter};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Model whose context window the budget refers to
pub const MODEL_ID: &str = "gemini-2.5-flash";

#[derive(Serialize, Debug)]
struct CountTokensRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CountTokensResponse {
    total_tokens: Option<u64>,
}

pub struct GeminiCounter {
    client: Client,
    endpoint: String,
}

impl GeminiCounter {
    /// `timeout` bounds the whole request; elapsing it counts as a failure
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent("tokenator/1.0 (token counter)")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:countTokens",
            self.endpoint.trim_end_matches('/'),
            MODEL_ID
        )
    }
}

#[async_trait]
impl RemoteCounter for GeminiCounter {
    async fn count_tokens(
        &self,
        text: &str,
        credential: &Credential,
    ) -> Result<usize, CountingFailure> {
        let url = self.api_url();
        debug!(url = %url, text_len = text.len(), "Sending countTokens request");

        let body = CountTokensRequest {
            contents: vec![Content {
                parts: vec![Part { text }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(request_failure)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CountingFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CountTokensResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                CountingFailure::Timeout
            } else {
                CountingFailure::MalformedResponse(e.to_string())
            }
        })?;

        let total = parsed.total_tokens.ok_or_else(|| {
            CountingFailure::MalformedResponse("missing totalTokens".to_string())
        })?;

        usize::try_from(total)
            .map_err(|_| CountingFailure::MalformedResponse(format!("totalTokens out of range: {}", total)))
    }

    fn model(&self) -> &str {
        MODEL_ID
    }
}

fn request_failure(e: reqwest::Error) -> CountingFailure {
    if e.is_timeout() {
        CountingFailure::Timeout
    } else {
        CountingFailure::Network(e.to_string())
    }
}
