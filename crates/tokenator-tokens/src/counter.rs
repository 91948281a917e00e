//! Exact-or-estimated token counting

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokenator_core::Credential;
use tracing::{debug, warn};

use crate::estimator::TokenEstimator;
use crate::remote::RemoteCounter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCount {
    pub count: usize,
    pub is_exact: bool,
}

impl TokenCount {
    pub fn exact(count: usize) -> Self {
        Self {
            count,
            is_exact: true,
        }
    }

    pub fn estimated(count: usize) -> Self {
        Self {
            count,
            is_exact: false,
        }
    }
}

/// Counts tokens, remotely when possible
///
/// `count` never fails. A missing credential or any remote failure yields the
/// heuristic estimate with `is_exact = false`.
#[derive(Clone)]
pub struct TokenCounter {
    remote: Option<Arc<dyn RemoteCounter>>,
    estimator: TokenEstimator,
}

impl TokenCounter {
    pub fn new(remote: Arc<dyn RemoteCounter>) -> Self {
        Self {
            remote: Some(remote),
            estimator: TokenEstimator::new(),
        }
    }

    /// Counter that only ever estimates
    pub fn offline() -> Self {
        Self {
            remote: None,
            estimator: TokenEstimator::new(),
        }
    }

    pub async fn count(&self, text: &str, credential: Option<&Credential>) -> TokenCount {
        let (remote, credential) = match (&self.remote, credential) {
            (Some(remote), Some(credential)) => (remote, credential),
            (None, Some(_)) => {
                debug!("Credential supplied but no remote counter configured");
                return self.estimate(text);
            }
            (_, None) => return self.estimate(text),
        };

        match remote.count_tokens(text, credential).await {
            Ok(count) => TokenCount::exact(count),
            Err(failure) => {
                warn!(
                    model = remote.model(),
                    error = %failure,
                    "Failed to count tokens with API, falling back to estimate"
                );
                self.estimate(text)
            }
        }
    }

    fn estimate(&self, text: &str) -> TokenCount {
        TokenCount::estimated(self.estimator.estimate(text))
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::offline()
    }
}
