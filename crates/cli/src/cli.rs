use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use lernkarten_pipeline::SegmentMode;

use crate::config::Overrides;

/// Turn lecture notes into flashcards.
///
/// Extracts text from a PDF or plain-text file, cuts it into heading-aware
/// chunks, classifies each chunk and asks an LLM for question/answer pairs.
#[derive(Parser, Debug)]
#[command(name = "lernkarten", version, about = "Turn lecture notes into flashcards")]
pub struct CliArgs {
    /// Path to config file (default: ~/.config/lernkarten/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the segments a document is cut into
    Chunk {
        #[command(flatten)]
        input: InputArgs,

        /// Emit the segments as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Estimate API cost for processing a document
    Estimate {
        #[command(flatten)]
        input: InputArgs,

        /// Questions per chunk (default: pipeline.max_questions_per_chunk)
        #[arg(long)]
        questions: Option<u64>,

        /// Emit the estimate as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify, generate cards and export them as CSV
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Output directory for the CSV and summary files
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,

        /// File name prefix (default: input file stem)
        #[arg(long)]
        base_name: Option<String>,
    },

    /// Print the effective configuration with secrets redacted
    Config,
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// PDF, TXT or Markdown file
    pub file: PathBuf,

    /// Segmentation strategy
    #[arg(long, value_enum, default_value_t = ModeArg::Chunks)]
    pub mode: ModeArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Heading-aware chunks within the token budget
    Chunks,
    /// Blank-line paragraphs grouped by length
    Paragraphs,
}

impl From<ModeArg> for SegmentMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Chunks => SegmentMode::Chunks,
            ModeArg::Paragraphs => SegmentMode::Paragraphs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_overrides() {
        let args = CliArgs::try_parse_from([
            "lernkarten",
            "--target-tokens",
            "400",
            "run",
            "skript.pdf",
            "--mode",
            "paragraphs",
            "--base-name",
            "bio",
        ])
        .unwrap();

        assert_eq!(args.overrides.target_tokens, Some(400));
        match args.command {
            Command::Run {
                input,
                out_dir,
                base_name,
            } => {
                assert_eq!(input.file, PathBuf::from("skript.pdf"));
                assert_eq!(SegmentMode::from(input.mode), SegmentMode::Paragraphs);
                assert_eq!(out_dir, PathBuf::from("output"));
                assert_eq!(base_name.as_deref(), Some("bio"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let args =
            CliArgs::try_parse_from(["lernkarten", "chunk", "notes.txt", "--json", "-v"]).unwrap();
        assert!(args.verbose);
        assert!(matches!(args.command, Command::Chunk { json: true, .. }));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(CliArgs::try_parse_from(["lernkarten", "chunk", "a.txt", "--mode", "pages"]).is_err());
    }
}
