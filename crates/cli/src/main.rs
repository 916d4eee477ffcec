mod cli;
mod config;
mod terminal;

use std::path::Path;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use clap::Parser;
use lernkarten_core::config::load_dotenv;
use lernkarten_core::{CardRow, Config};
use lernkarten_ingest::document::normalize_whitespace;
use lernkarten_ingest::{extract_file, ChunkConfig, Chunker};
use lernkarten_llm::questions_for_tokens;
use lernkarten_pipeline::{
    export_cards, segment_document, CostEstimator, LernkartenPipeline, SegmentMode, Stage,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, Command, InputArgs};
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let mut config =
        Config::load(args.config.as_deref()).context("failed to load configuration")?;
    args.overrides.apply(&mut config);
    config.validate().context("invalid command-line settings")?;
    config.log_summary();

    let terminal = Terminal::new();
    let outcome = match args.command {
        Command::Chunk { input, json } => chunk(&config, &input, json, &terminal),
        Command::Estimate {
            input,
            questions,
            json,
        } => estimate(&config, &input, questions, json, &terminal),
        Command::Run {
            input,
            out_dir,
            base_name,
        } => run(config, &input, &out_dir, base_name, &terminal).await,
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config.redacted_summary())?);
            Ok(())
        }
    };

    if let Err(e) = outcome {
        terminal.print_error(&format!("{e:#}"))?;
        std::process::exit(1);
    }
    Ok(())
}

/// Extract `path` and return its normalized text.
fn load_text(config: &Config, path: &Path) -> Result<String> {
    let doc = extract_file(path, &config.ingest.footer_patterns)
        .with_context(|| format!("failed to extract {}", path.display()))?;
    if doc.is_empty() {
        warn!(file = %doc.filename, "document has no extractable text");
    }
    Ok(normalize_whitespace(&doc.full_text()))
}

fn chunker(config: &Config) -> Result<Chunker> {
    Chunker::new(ChunkConfig::from(&config.chunking)).context("invalid chunk budget")
}

fn chunk(config: &Config, input: &InputArgs, json: bool, terminal: &Terminal) -> Result<()> {
    let text = load_text(config, &input.file)?;
    let chunker = chunker(config)?;
    let segments = segment_document(&text, input.mode.into(), &chunker);

    if json {
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        println!("{}", serde_json::to_string_pretty(&texts)?);
        return Ok(());
    }

    let tokens: Vec<usize> = segments
        .iter()
        .map(|s| chunker.estimate_tokens(&s.text))
        .collect();
    terminal.print_header(
        "lernkarten",
        &format!("{} segments from {}", segments.len(), input.file.display()),
    )?;
    terminal.print_segments(&segments, &tokens)?;
    Ok(())
}

fn estimate(
    config: &Config,
    input: &InputArgs,
    questions: Option<u64>,
    json: bool,
    terminal: &Terminal,
) -> Result<()> {
    let text = load_text(config, &input.file)?;
    let chunker = chunker(config)?;
    let segments = segment_document(&text, input.mode.into(), &chunker);

    let total: usize = segments
        .iter()
        .map(|s| chunker.estimate_tokens(&s.text))
        .sum();
    let avg = if segments.is_empty() {
        0
    } else {
        total / segments.len()
    };
    let questions = questions.unwrap_or_else(|| {
        questions_for_tokens(avg, config.pipeline.max_questions_per_chunk) as u64
    });

    let estimate = CostEstimator::from_config(config).estimate_cost(
        segments.len() as u64,
        avg as u64,
        questions,
        &config.models.classify_model,
        &config.models.qa_model,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
        return Ok(());
    }

    terminal.print_header(
        "lernkarten",
        &format!(
            "{} segments, ~{avg} tokens each, {questions} questions per chunk",
            segments.len()
        ),
    )?;
    terminal.print_estimate(&estimate)?;
    Ok(())
}

async fn run(
    config: Config,
    input: &InputArgs,
    out_dir: &Path,
    base_name: Option<String>,
    terminal: &Terminal,
) -> Result<()> {
    let mode: SegmentMode = input.mode.into();
    let pipeline =
        LernkartenPipeline::from_config(config).context("failed to set up LLM providers")?;

    let flag = pipeline.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing in-flight requests");
            flag.store(true, Ordering::SeqCst);
        }
    });

    terminal.print_header("lernkarten", &format!("processing {}", input.file.display()))?;
    let progress = |stage: Stage, done: usize, total: usize| {
        terminal.print_progress(stage.as_str(), done, total).ok();
    };
    let rows = pipeline
        .process_file(&input.file, mode, Some(&progress))
        .await?;
    if rows.is_empty() {
        terminal.print_info("no cards generated")?;
    }

    let base_name = base_name.unwrap_or_else(|| {
        input
            .file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "lernkarten".to_string())
    });
    let paths = export_cards(&rows, out_dir, &base_name)?;
    let cards = rows.iter().map(CardRow::card_count).sum::<usize>();
    info!(csv = %paths.csv.display(), xlsx = %paths.xlsx.display(), cards, "run finished");
    terminal.print_export(&paths, rows.len(), cards)?;
    Ok(())
}
