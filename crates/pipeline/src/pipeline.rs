//! `LernkartenPipeline`: document → segments → classification → cards.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use lernkarten_core::{CardRow, Config, Segment};
use lernkarten_ingest::document::chunker::{Chunker, TokenEstimator};
use lernkarten_ingest::document::{
    extract_file, is_outline_segment, looks_like_outline_list, normalize_whitespace, segment_text,
    SegmentOptions,
};
use lernkarten_ingest::ChunkConfig;
use lernkarten_llm::{
    create_provider, questions_for_tokens, Classifier, LlmProvider, QaGenerator, RetryPolicy,
};
use tracing::{debug, info};

use crate::error::PipelineError;

/// Progress callback receiving `(stage, done, total)`.
pub type ProgressFn<'a> = dyn Fn(Stage, usize, usize) + Send + Sync + 'a;

/// The request-issuing phases of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Classify,
    Cards,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Classify => "classify",
            Stage::Cards => "cards",
        }
    }
}

/// How extracted text is cut into segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SegmentMode {
    /// Heading-aware, token-budgeted chunks with sentence overlap.
    #[default]
    Chunks,
    /// Blank-line paragraphs grouped by character length.
    Paragraphs,
}

pub struct LernkartenPipeline {
    config: Config,
    chunker: Chunker,
    classifier: Classifier,
    generator: QaGenerator,
    cancelled: Arc<AtomicBool>,
}

impl LernkartenPipeline {
    /// Build the pipeline with providers created from `config.llm`.
    pub fn from_config(config: Config) -> Result<Self, PipelineError> {
        let classify: Arc<dyn LlmProvider> =
            Arc::from(create_provider(&config.llm, &config.models.classify_model)?);
        let qa: Arc<dyn LlmProvider> =
            Arc::from(create_provider(&config.llm, &config.models.qa_model)?);
        Self::new(config, classify, qa)
    }

    pub fn new(
        config: Config,
        classify_provider: Arc<dyn LlmProvider>,
        qa_provider: Arc<dyn LlmProvider>,
    ) -> Result<Self, PipelineError> {
        let chunker = Chunker::new(ChunkConfig::from(&config.chunking))?;
        let retry = RetryPolicy::from(&config.llm.retry);
        let classifier = Classifier::new(
            classify_provider,
            retry,
            config.pipeline.classify_char_limit,
        );
        let generator = QaGenerator::new(
            qa_provider,
            retry,
            config.pipeline.qa_char_limit,
            config.llm.temperature,
            config.llm.max_output_tokens,
        );
        Ok(Self {
            config,
            chunker,
            classifier,
            generator,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Shared flag; setting it stops the pipeline before its next request.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn check_cancelled(&self) -> Result<(), PipelineError> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }

    fn concurrency(&self) -> usize {
        self.config.pipeline.concurrency.max(1)
    }

    // ── Segmentation ───────────────────────────────────────────────

    /// Extract `path` and cut its text into segments.
    pub fn load_and_segment(
        &self,
        path: &Path,
        mode: SegmentMode,
    ) -> Result<Vec<Segment>, PipelineError> {
        let doc = extract_file(path, &self.config.ingest.footer_patterns)?;
        info!(
            file = %doc.filename,
            pages = doc.pages.len(),
            chars = doc.total_chars(),
            "extracted document"
        );
        Ok(self.segment(&doc.full_text(), mode))
    }

    pub fn segment(&self, text: &str, mode: SegmentMode) -> Vec<Segment> {
        segment_document(text, mode, &self.chunker)
    }

    // ── Classification ─────────────────────────────────────────────

    /// Classify every segment and drop outline material. Output order matches
    /// input order regardless of completion order.
    pub async fn classify(
        &self,
        segments: Vec<Segment>,
        progress: Option<&ProgressFn<'_>>,
    ) -> Result<Vec<Segment>, PipelineError> {
        let total = segments.len();
        let done = AtomicUsize::new(0);

        let mut classified: Vec<(usize, Segment)> = stream::iter(segments.into_iter().enumerate())
            .map(|(index, mut segment)| {
                let done = &done;
                async move {
                    self.check_cancelled()?;
                    let verdict = self.classifier.classify(&segment.text).await?;
                    let outline = is_outline_segment(&segment.text)
                        || looks_like_outline_list(&segment.text, &verdict.label);
                    if outline {
                        debug!(index, "dropping outline segment");
                    }
                    segment.keep = verdict.keep && !outline;
                    segment.label = Some(verdict.label);
                    report(progress, Stage::Classify, done, total);
                    Ok::<_, PipelineError>((index, segment))
                }
            })
            .buffer_unordered(self.concurrency())
            .try_collect()
            .await?;

        classified.sort_by_key(|(index, _)| *index);
        let segments: Vec<Segment> = classified.into_iter().map(|(_, s)| s).collect();
        info!(
            total,
            kept = segments.iter().filter(|s| s.keep).count(),
            "classification finished"
        );
        Ok(segments)
    }

    // ── Card generation ────────────────────────────────────────────

    /// Generate cards for every kept segment. Segments without cards produce
    /// no row; rows come back in segment order.
    pub async fn generate_cards(
        &self,
        segments: &[Segment],
        source: &str,
        progress: Option<&ProgressFn<'_>>,
    ) -> Result<Vec<CardRow>, PipelineError> {
        let kept: Vec<(usize, &Segment)> =
            segments.iter().enumerate().filter(|(_, s)| s.keep).collect();
        let total = kept.len();
        let done = AtomicUsize::new(0);
        let max_questions = self.config.pipeline.max_questions_per_chunk;
        let language = self.config.models.language.as_str();

        let mut rows: Vec<(usize, Option<CardRow>)> = stream::iter(kept)
            .map(|(index, segment)| {
                let done = &done;
                async move {
                    self.check_cancelled()?;
                    let tokens = self.chunker.estimate_tokens(&segment.text);
                    let n = questions_for_tokens(tokens, max_questions);
                    let items = self.generator.generate(&segment.text, n, language).await?;
                    report(progress, Stage::Cards, done, total);
                    let row = (!items.is_empty())
                        .then(|| CardRow::from_items(segment, items, source));
                    Ok::<_, PipelineError>((index, row))
                }
            })
            .buffer_unordered(self.concurrency())
            .try_collect()
            .await?;

        rows.sort_by_key(|(index, _)| *index);
        let rows: Vec<CardRow> = rows.into_iter().filter_map(|(_, row)| row).collect();
        info!(
            rows = rows.len(),
            cards = rows.iter().map(CardRow::card_count).sum::<usize>(),
            "card generation finished"
        );
        Ok(rows)
    }

    /// Extract, segment, classify and generate cards for one file.
    pub async fn process_file(
        &self,
        path: &Path,
        mode: SegmentMode,
        progress: Option<&ProgressFn<'_>>,
    ) -> Result<Vec<CardRow>, PipelineError> {
        let segments = self.load_and_segment(path, mode)?;
        let segments = self.classify(segments, progress).await?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.generate_cards(&segments, &source, progress).await
    }
}

/// Normalize `text` and cut it into segments without touching any provider.
pub fn segment_document<E: TokenEstimator>(
    text: &str,
    mode: SegmentMode,
    chunker: &Chunker<E>,
) -> Vec<Segment> {
    let text = normalize_whitespace(text);
    let pieces = match mode {
        SegmentMode::Chunks => chunker.assemble(&text),
        SegmentMode::Paragraphs => segment_text(&text, SegmentOptions::default()),
    };
    debug!(?mode, segments = pieces.len(), "segmented text");
    pieces.into_iter().map(Segment::new).collect()
}

fn report(progress: Option<&ProgressFn<'_>>, stage: Stage, done: &AtomicUsize, total: usize) {
    let n = done.fetch_add(1, Ordering::SeqCst) + 1;
    if let Some(cb) = progress {
        cb(stage, n, total);
    }
}
