//! Chunk configuration, block and error types.

use lernkarten_core::config::ChunkingConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A block whose estimate exceeds `target_tokens × OVERSIZE_FACTOR` is force-split.
pub const OVERSIZE_FACTOR: f64 = 1.3;

// ── Configuration ───────────────────────────────────────────────────────────

/// Budgets for the chunking engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Soft per-chunk token ceiling (default: 600).
    pub target_tokens: usize,
    /// Token budget for the sentences carried over from the previous chunk (default: 60).
    pub overlap_tokens: usize,
    /// Hard per-chunk character ceiling that triggers forced splitting (default: 4000).
    pub max_chars_per_chunk: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            target_tokens: 600,
            overlap_tokens: 60,
            max_chars_per_chunk: 4000,
        }
    }
}

impl ChunkConfig {
    pub fn new(target_tokens: usize, overlap_tokens: usize, max_chars_per_chunk: usize) -> Self {
        Self {
            target_tokens,
            overlap_tokens,
            max_chars_per_chunk,
        }
    }

    /// Zero budgets would make every unit oversized.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.target_tokens == 0 {
            return Err(ChunkError::MalformedBudget {
                field: "target_tokens",
            });
        }
        if self.max_chars_per_chunk == 0 {
            return Err(ChunkError::MalformedBudget {
                field: "max_chars_per_chunk",
            });
        }
        Ok(())
    }

    /// Token count above which a block skips normal packing.
    pub fn oversize_threshold(&self) -> f64 {
        self.target_tokens as f64 * OVERSIZE_FACTOR
    }
}

impl From<&ChunkingConfig> for ChunkConfig {
    fn from(c: &ChunkingConfig) -> Self {
        Self {
            target_tokens: c.target_tokens,
            overlap_tokens: c.overlap_tokens,
            max_chars_per_chunk: c.max_chars_per_chunk,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("malformed budget: {field} must be greater than zero")]
    MalformedBudget { field: &'static str },
}

// ── Blocks ──────────────────────────────────────────────────────────────────

/// Output of heading-based segmentation, before token packing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A single trimmed line recognized as a section title.
    Heading(String),
    /// One or more non-heading lines joined by `\n`, trimmed.
    Body(String),
}

impl Block {
    pub fn text(&self) -> &str {
        match self {
            Block::Heading(t) | Block::Body(t) => t,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading(_))
    }
}
