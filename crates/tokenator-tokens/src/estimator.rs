//! Offline token estimation
//!
//! One token per four characters, rounded up. Characters
//! are counted the same way as `FileResult::char_count`.

use tokenator_core::char_count;

pub const CHARS_PER_TOKEN: usize = 4;

/// `ceil(char_count(text) / 4)`
pub fn estimate_tokens(text: &str) -> usize {
    char_count(text).div_ceil(CHARS_PER_TOKEN)
}

/// Character heuristic estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenEstimator;

impl TokenEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimate token count for a single string
    pub fn estimate(&self, text: &str) -> usize {
        estimate_tokens(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_estimation() {
        let estimator = TokenEstimator::new();

        assert_eq!(estimator.estimate(""), 0);
        assert_eq!(estimator.estimate("a"), 1);
        assert_eq!(estimator.estimate("abcd"), 1);
        assert_eq!(estimator.estimate("abcde"), 2);
        assert_eq!(estimator.estimate("Hello, world!"), 4);
    }

    #[test]
    fn test_matches_formula() {
        for len in 0..64 {
            let text = "x".repeat(len);
            assert_eq!(estimate_tokens(&text), (len as f64 / 4.0).ceil() as usize);
        }
    }

    #[test]
    fn test_counts_utf16_units() {
        // Four emoji are eight UTF-16 units
        assert_eq!(estimate_tokens("😀😀😀😀"), 2);
        // Four accented letters are four units despite being eight bytes
        assert_eq!(estimate_tokens("éééé"), 1);
    }
}
