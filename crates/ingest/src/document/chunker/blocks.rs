//! Heading-based block segmentation.

use super::helpers::looks_like_heading;
use super::types::Block;

/// Split raw text into blocks at heading lines.
///
/// Non-heading lines accumulate into a body block; a heading line flushes the
/// accumulator and is emitted on its own. Blank-only bodies are dropped.
pub fn segment_into_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines() {
        if looks_like_heading(line) {
            flush_body(&mut body, &mut blocks);
            blocks.push(Block::Heading(line.trim().to_string()));
        } else {
            body.push(line);
        }
    }
    flush_body(&mut body, &mut blocks);
    blocks
}

fn flush_body(body: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if body.is_empty() {
        return;
    }
    let text = body.join("\n");
    body.clear();
    let text = text.trim();
    if !text.is_empty() {
        blocks.push(Block::Body(text.to_string()));
    }
}
