//! Token counting for extracted text
//!
//! Exact counts come from a remote counting endpoint when a credential is
//! supplied; everything else falls back to a fixed character heuristic.

pub mod counter;
pub mod estimator;
pub mod gemini;
pub mod remote;

pub use counter::{TokenCount, TokenCounter};
pub use estimator::{TokenEstimator, estimate_tokens};
pub use gemini::{DEFAULT_ENDPOINT, GeminiCounter, MODEL_ID};
pub use remote::{CountingFailure, RemoteCounter};
