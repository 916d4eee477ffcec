//! Recursive sub-splitting of oversized blocks.
//!
//! Paragraphs are packed first. A paragraph that is too big on its own is
//! broken into sentences, and a sentence longer than `max_chars_per_chunk` is
//! cut at its character midpoint until every piece fits. The midpoint cut is
//! meaning-agnostic and may sever a word.

use super::helpers::{char_len, split_at_char_midpoint, split_paragraphs, split_sentences};
use super::strategies::Chunker;
use super::tokens::TokenEstimator;

/// Greedy packer used at every level of the cascade.
///
/// A unit joins the open part only if the joined text still fits both
/// budgets; otherwise the part is closed first. A unit that is oversized on
/// its own becomes a part by itself.
pub(super) struct Packer<'a, E> {
    chunker: &'a Chunker<E>,
    separator: &'static str,
    parts: Vec<String>,
    open: String,
}

impl<'a, E: TokenEstimator> Packer<'a, E> {
    pub(super) fn new(chunker: &'a Chunker<E>, separator: &'static str) -> Self {
        Self {
            chunker,
            separator,
            parts: Vec::new(),
            open: String::new(),
        }
    }

    pub(super) fn push(&mut self, unit: &str) {
        let unit = unit.trim();
        if unit.is_empty() {
            return;
        }
        if self.open.is_empty() {
            self.open.push_str(unit);
            return;
        }
        let joined = format!("{}{}{}", self.open, self.separator, unit);
        if self.chunker.fits(&joined) {
            self.open = joined;
        } else {
            self.close();
            self.open.push_str(unit);
        }
    }

    /// Emit the open part, if any.
    pub(super) fn close(&mut self) {
        if !self.open.is_empty() {
            self.parts.push(std::mem::take(&mut self.open));
        }
    }

    /// Append parts that were already closed elsewhere, keeping order.
    pub(super) fn extend_closed(&mut self, parts: Vec<String>) {
        self.close();
        self.parts.extend(parts);
    }

    pub(super) fn finish(mut self) -> Vec<String> {
        self.close();
        self.parts
    }
}

impl<E: TokenEstimator> Chunker<E> {
    /// Force a block under the budgets: paragraphs, then sentences, then
    /// midpoint cuts. Parts keep document order and are never blank.
    pub fn force_split(&self, block: &str) -> Vec<String> {
        let mut packer = Packer::new(self, "\n\n");
        for para in split_paragraphs(block) {
            let oversized = char_len(para) > self.config.max_chars_per_chunk
                || self.estimate_tokens(para) > self.config.target_tokens;
            if oversized {
                packer.extend_closed(self.split_by_sentences(para));
            } else {
                packer.push(para);
            }
        }
        packer.finish()
    }

    /// Pack sentences into parts joined by single spaces; sentences longer
    /// than `max_chars_per_chunk` are hard-cut first.
    pub(super) fn split_by_sentences(&self, text: &str) -> Vec<String> {
        let mut packer = Packer::new(self, " ");
        for sentence in split_sentences(text) {
            if char_len(&sentence) > self.config.max_chars_per_chunk {
                let mut pieces = Vec::new();
                self.hard_cut(&sentence, &mut pieces);
                tracing::trace!(pieces = pieces.len(), "hard cut oversized sentence");
                for piece in pieces {
                    packer.push(piece);
                }
            } else {
                packer.push(&sentence);
            }
        }
        packer.finish()
    }

    /// Halve at the character midpoint until each piece is within `max_chars_per_chunk`.
    fn hard_cut<'t>(&self, text: &'t str, out: &mut Vec<&'t str>) {
        if char_len(text) <= self.config.max_chars_per_chunk {
            out.push(text);
            return;
        }
        let (left, right) = split_at_char_midpoint(text);
        self.hard_cut(left, out);
        self.hard_cut(right, out);
    }
}
