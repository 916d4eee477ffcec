//! Chunk assembly: pack blocks up to the token budget with sentence overlap.

use tracing::debug;

use super::blocks::segment_into_blocks;
use super::helpers::{char_len, split_sentences, take_last_sentences};
use super::tokens::{HeuristicEstimator, TokenEstimator};
use super::types::{Block, ChunkConfig, ChunkError};

const BLOCK_SEPARATOR: &str = "\n\n";

/// The chunking engine: validated budgets plus the estimator that measures them.
#[derive(Debug, Clone)]
pub struct Chunker<E = HeuristicEstimator> {
    pub(super) config: ChunkConfig,
    pub(super) estimator: E,
}

impl Chunker<HeuristicEstimator> {
    pub fn new(config: ChunkConfig) -> Result<Self, ChunkError> {
        Self::with_estimator(config, HeuristicEstimator)
    }
}

impl<E: TokenEstimator> Chunker<E> {
    pub fn with_estimator(config: ChunkConfig, estimator: E) -> Result<Self, ChunkError> {
        config.validate()?;
        Ok(Self { config, estimator })
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    pub fn estimate_tokens(&self, text: &str) -> usize {
        self.estimator.estimate(text)
    }

    /// Within both the token and the character budget.
    pub(super) fn fits(&self, text: &str) -> bool {
        self.estimate_tokens(text) <= self.config.target_tokens
            && char_len(text) <= self.config.max_chars_per_chunk
    }

    /// A block this large skips packing and goes through [`Chunker::force_split`].
    pub fn needs_forced_split(&self, block: &str) -> bool {
        self.estimate_tokens(block) as f64 > self.config.oversize_threshold()
            || char_len(block) > self.config.max_chars_per_chunk
    }

    /// Segment `text` into heading/body blocks and assemble them into chunks.
    pub fn assemble(&self, text: &str) -> Vec<String> {
        let blocks = segment_into_blocks(text);
        self.assemble_blocks(&blocks)
    }

    /// Pack blocks into chunks in document order.
    ///
    /// When a block no longer fits, the open chunk is emitted and the next one
    /// starts with that chunk's trailing sentences (up to `overlap_tokens`).
    /// Oversized blocks are force-split into standalone chunks; the open chunk
    /// is emitted before them and no overlap is carried out of a forced split.
    pub fn assemble_blocks(&self, blocks: &[Block]) -> Vec<String> {
        let mut state = Assembly::default();

        for block in blocks {
            let text = block.text().trim();
            if text.is_empty() {
                continue;
            }

            if self.needs_forced_split(text) {
                // Emit, not drop, the pending chunk: discarding it would lose
                // the text gathered so far.
                state.flush();
                let parts = self.force_split(text);
                debug!(
                    chars = char_len(text),
                    parts = parts.len(),
                    "force-split oversized block"
                );
                state.chunks.extend(parts);
                continue;
            }

            if state.buffer.is_empty() {
                state.buffer.push_str(text);
                continue;
            }

            let joined = join_blocks(&state.buffer, text);
            if self.fits(&joined) {
                state.buffer = joined;
            } else {
                let previous = state.flush();
                let overlap = self.overlap_for(&previous, text);
                state.buffer = if overlap.is_empty() {
                    text.to_string()
                } else {
                    join_blocks(&overlap, text)
                };
            }
        }
        state.flush();

        let chunks: Vec<String> = state
            .chunks
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect();
        debug!(blocks = blocks.len(), chunks = chunks.len(), "assembled chunks");
        chunks
    }

    /// Trailing sentences of `previous` to repeat before `next`.
    ///
    /// The overlap is a strict suffix: at least the first sentence of
    /// `previous` is never repeated. Leading overlap sentences are also
    /// dropped while the new chunk would not fit, so the result may be empty.
    fn overlap_for(&self, previous: &str, next: &str) -> String {
        let available = split_sentences(previous).len();
        let mut sentences =
            take_last_sentences(previous, self.config.overlap_tokens, &self.estimator);
        if !sentences.is_empty() && sentences.len() >= available {
            sentences.remove(0);
        }
        while !sentences.is_empty() {
            let overlap = sentences.join(" ");
            if self.fits(&join_blocks(&overlap, next)) {
                return overlap;
            }
            sentences.remove(0);
        }
        String::new()
    }
}

/// Accumulator threaded through [`Chunker::assemble_blocks`].
#[derive(Debug, Default)]
struct Assembly {
    chunks: Vec<String>,
    buffer: String,
}

impl Assembly {
    /// Emit the open buffer and return a copy of it (empty if nothing was open).
    fn flush(&mut self) -> String {
        let buffer = std::mem::take(&mut self.buffer);
        if !buffer.is_empty() {
            self.chunks.push(buffer.clone());
        }
        buffer
    }
}

fn join_blocks(head: &str, tail: &str) -> String {
    format!("{head}{BLOCK_SEPARATOR}{tail}")
}

/// Top-level entry point with explicit budgets and the heuristic estimator.
///
/// Defaults used elsewhere in the workspace are 600 / 60 / 4000.
pub fn assemble_chunks(
    text: &str,
    target_tokens: usize,
    overlap_tokens: usize,
    max_chars_per_chunk: usize,
) -> Result<Vec<String>, ChunkError> {
    let chunker = Chunker::new(ChunkConfig::new(
        target_tokens,
        overlap_tokens,
        max_chars_per_chunk,
    ))?;
    Ok(chunker.assemble(text))
}
