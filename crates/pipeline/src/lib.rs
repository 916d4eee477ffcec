//! Orchestration from study document to exported flashcards.

pub mod cost;
pub mod error;
pub mod export;
pub mod pipeline;

pub use cost::{CostEstimate, CostEstimator, PhaseCost};
pub use error::PipelineError;
pub use export::{export_cards, write_csv, write_xlsx, ExportPaths};
pub use pipeline::{segment_document, LernkartenPipeline, ProgressFn, SegmentMode, Stage};
