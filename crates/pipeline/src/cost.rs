//! Rough API cost estimation before a run.

use std::collections::BTreeMap;

use lernkarten_core::config::{EstimateConfig, Price};
use lernkarten_core::Config;
use lernkarten_ingest::document::chunker::{Chunker, TokenEstimator};
use serde::Serialize;

use crate::error::PipelineError;

/// Token and USD totals for one phase of the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseCost {
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Rounded to 4 decimals.
    pub usd: f64,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    /// Number of chunks the estimate is based on.
    pub segments: u64,
    pub classification: PhaseCost,
    pub qa: PhaseCost,
    /// Sum of the rounded phase costs, rounded again.
    pub sum_usd: f64,
}

/// Price table plus per-request overheads.
pub struct CostEstimator<'a> {
    prices: &'a BTreeMap<String, Price>,
    overheads: &'a EstimateConfig,
}

impl<'a> CostEstimator<'a> {
    pub fn new(prices: &'a BTreeMap<String, Price>, overheads: &'a EstimateConfig) -> Self {
        Self { prices, overheads }
    }

    pub fn from_config(config: &'a Config) -> Self {
        Self::new(&config.costs, &config.estimate)
    }

    fn price(&self, model: &str) -> Result<&Price, PipelineError> {
        self.prices
            .get(model)
            .ok_or_else(|| PipelineError::UnknownModel(model.to_string()))
    }

    /// One classification and one Q&A request per segment; each Q&A request
    /// returns `questions_per_chunk` items.
    pub fn estimate_cost(
        &self,
        n_segments: u64,
        avg_tokens: u64,
        questions_per_chunk: u64,
        classify_model: &str,
        qa_model: &str,
    ) -> Result<CostEstimate, PipelineError> {
        let o = self.overheads;

        let cls_in = n_segments * (o.classify_prompt_overhead + avg_tokens);
        let cls_out = n_segments * o.classify_output_tokens;
        let qa_in = n_segments * (o.qa_prompt_overhead + avg_tokens);
        let qa_out = n_segments * questions_per_chunk * o.qa_per_item_output;

        let classification = self.phase(classify_model, cls_in, cls_out)?;
        let qa = self.phase(qa_model, qa_in, qa_out)?;
        let sum_usd = round4(classification.usd + qa.usd);

        Ok(CostEstimate {
            segments: n_segments,
            classification,
            qa,
            sum_usd,
        })
    }

    /// Chunk `text` first and estimate from the resulting chunk statistics.
    pub fn estimate_cost_for_text<E: TokenEstimator>(
        &self,
        text: &str,
        chunker: &Chunker<E>,
        questions_per_chunk: u64,
        classify_model: &str,
        qa_model: &str,
    ) -> Result<CostEstimate, PipelineError> {
        let chunks = chunker.assemble(text);
        let total: usize = chunks.iter().map(|c| chunker.estimate_tokens(c)).sum();
        let avg = if chunks.is_empty() {
            0
        } else {
            total / chunks.len()
        };
        tracing::debug!(chunks = chunks.len(), avg_tokens = avg, "estimating cost");
        self.estimate_cost(
            chunks.len() as u64,
            avg as u64,
            questions_per_chunk,
            classify_model,
            qa_model,
        )
    }

    fn phase(&self, model: &str, input: u64, output: u64) -> Result<PhaseCost, PipelineError> {
        let price = self.price(model)?;
        let usd = (input as f64 / 1e6) * price.input_per_mtok_usd
            + (output as f64 / 1e6) * price.output_per_mtok_usd;
        Ok(PhaseCost {
            input_tokens: input,
            output_tokens: output,
            usd: round4(usd),
            model: model.to_string(),
        })
    }
}

/// Round to 4 decimals from the exact binary value. Scaling by 10^4 first
/// turns 0.014149999… into the tie 141.5 and rounds the wrong way.
fn round4(value: f64) -> f64 {
    format!("{value:.4}").parse().unwrap_or(value)
}
