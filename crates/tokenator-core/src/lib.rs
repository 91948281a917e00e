//! Core domain models and logic for tokenator
//!
//! This crate contains:
//! - Domain models (InputFile, Credential, FileResult, BatchTotals)
//! - Error taxonomy shared by extractors and the CLI
//! - Report formatter (pure export artifact generation)

pub mod error;
pub mod file;
pub mod report;
pub mod result;

pub use error::{CoreError, Result};
pub use file::{Credential, InputFile};
pub use report::{Report, ReportFormat};
pub use result::{BatchTotals, FileResult, FileSlot, char_count};

/// Context window of the target model, in tokens.
pub const CONTEXT_WINDOW_TOKENS: usize = 1_000_000;
