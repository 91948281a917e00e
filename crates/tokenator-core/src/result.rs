//! Per-file results and batch totals

use serde::{Deserialize, Serialize};

/// Length of extracted text as reported in `char_count`
///
/// Counted in UTF-16 code units, so a character outside the Basic
/// Multilingual Plane counts as two.
pub fn char_count(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Terminal outcome for one input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    pub file_name: String,
    pub char_count: usize,
    pub token_count: usize,
    pub is_exact: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    pub fn counted(
        file_name: impl Into<String>,
        char_count: usize,
        token_count: usize,
        is_exact: bool,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            char_count,
            token_count,
            is_exact,
            error: None,
        }
    }

    /// Failed files carry zero counts and are never exact
    pub fn failed(file_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            char_count: 0,
            token_count: 0,
            is_exact: false,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Lifecycle of one file within a running batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FileSlot {
    Pending { file_name: String },
    Done(FileResult),
}

impl FileSlot {
    pub fn file_name(&self) -> &str {
        match self {
            FileSlot::Pending { file_name } => file_name,
            FileSlot::Done(result) => &result.file_name,
        }
    }

    pub fn result(&self) -> Option<&FileResult> {
        match self {
            FileSlot::Pending { .. } => None,
            FileSlot::Done(result) => Some(result),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, FileSlot::Pending { .. })
    }
}

/// Sums over the successful results of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTotals {
    pub total_tokens: usize,
    pub total_chars: usize,
}

impl BatchTotals {
    /// Recompute totals from a complete result set
    pub fn from_results(results: &[FileResult]) -> Self {
        results
            .iter()
            .filter(|r| !r.is_error())
            .fold(Self::default(), |acc, r| Self {
                total_tokens: acc.total_tokens + r.token_count,
                total_chars: acc.total_chars + r.char_count,
            })
    }
}
