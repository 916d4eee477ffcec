//! Document ingestion: text extraction, cleanup, coarse segmentation and the
//! token-budgeted chunking engine.

pub mod document;

pub use document::chunker::{assemble_chunks, ChunkConfig, ChunkError, Chunker};
pub use document::{extract_file, extract_text, ExtractedDocument, ExtractionError};
