use std::path::PathBuf;

use lernkarten_core::ConfigError;
use lernkarten_ingest::{ChunkError, ExtractionError};
use lernkarten_llm::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Chunk(#[from] ChunkError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("no price configured for model '{0}'")]
    UnknownModel(String),

    #[error("processing cancelled")]
    Cancelled,

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}
