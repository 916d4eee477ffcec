//! Token estimation backends.

use std::sync::Arc;

/// Maps text to an approximate token count.
///
/// Every budget decision in the chunker goes through this trait, so swapping
/// the estimator changes where chunks split.
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> usize;
}

/// Roughly four characters per token, counted in Unicode scalar values.
///
/// Empty text is 0 tokens; any non-empty text is at least 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEstimator;

impl TokenEstimator for HeuristicEstimator {
    fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

/// Approximate token count via whitespace splitting.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordEstimator;

impl TokenEstimator for WordEstimator {
    fn estimate(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

impl<T: TokenEstimator + ?Sized> TokenEstimator for Box<T> {
    fn estimate(&self, text: &str) -> usize {
        (**self).estimate(text)
    }
}

impl<T: TokenEstimator + ?Sized> TokenEstimator for Arc<T> {
    fn estimate(&self, text: &str) -> usize {
        (**self).estimate(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_rounds_up() {
        let est = HeuristicEstimator;
        assert_eq!(est.estimate(""), 0);
        assert_eq!(est.estimate("a"), 1);
        assert_eq!(est.estimate("abcd"), 1);
        assert_eq!(est.estimate("abcde"), 2);
        assert_eq!(est.estimate("   "), 1);
    }

    #[test]
    fn heuristic_counts_chars_not_bytes() {
        // 4 chars, 8 bytes
        assert_eq!(HeuristicEstimator.estimate("äöüß"), 1);
    }

    #[test]
    fn word_estimator_handles_whitespace() {
        assert_eq!(WordEstimator.estimate("hello world"), 2);
        assert_eq!(WordEstimator.estimate("  spaced   out  "), 2);
        assert_eq!(WordEstimator.estimate(""), 0);
    }

    #[test]
    fn shared_estimator_delegates() {
        let shared: Arc<dyn TokenEstimator> = Arc::new(WordEstimator);
        assert_eq!(shared.estimate("a b c"), 3);
        let boxed: Box<dyn TokenEstimator> = Box::new(HeuristicEstimator);
        assert_eq!(boxed.estimate("abcdefgh"), 2);
    }
}
