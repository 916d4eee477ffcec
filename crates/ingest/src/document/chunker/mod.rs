//! Heading-aware chunking engine.
//!
//! Splits extracted study text into token-budgeted chunks for the LLM calls:
//! lines that look like headings become their own blocks, blocks are packed
//! greedily up to `target_tokens`, consecutive chunks share a tail of whole
//! sentences as overlap, and oversized blocks fall back to a
//! paragraph → sentence → midpoint-cut cascade.
//!
//! Everything here is synchronous and allocation-local; a [`Chunker`] can be
//! shared across threads as long as its estimator can.

mod blocks;
mod helpers;
mod split;
mod strategies;
mod tokens;
mod types;

pub use blocks::segment_into_blocks;
pub use helpers::{looks_like_heading, split_paragraphs, split_sentences, take_last_sentences};
pub use strategies::{assemble_chunks, Chunker};
pub use tokens::{HeuristicEstimator, TokenEstimator, WordEstimator};
pub use types::{Block, ChunkConfig, ChunkError, OVERSIZE_FACTOR};
