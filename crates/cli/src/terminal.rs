use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use lernkarten_core::Segment;
use lernkarten_pipeline::{CostEstimate, ExportPaths, PhaseCost};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const HEADER: Color = Color::Magenta;
    const INDEX: Color = Color::Yellow;
    const SUCCESS: Color = Color::Green;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
}

/// Longest segment preview printed by `print_segments`.
const PREVIEW_CHARS: usize = 160;

/// Human-readable output on stdout. Logs go to stderr via tracing.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    pub fn print_header(&self, title: &str, detail: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(title),
            ResetColor,
            SetForegroundColor(Colors::DIM),
            Print(format!(" {detail}\n")),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print one line per segment with its token estimate and a preview.
    pub fn print_segments(&self, segments: &[Segment], tokens: &[usize]) -> Result<()> {
        let mut stdout = io::stdout();
        for (i, (segment, tokens)) in segments.iter().zip(tokens).enumerate() {
            execute!(
                stdout,
                SetForegroundColor(Colors::INDEX),
                Print(format!("[{:>3}] ", i + 1)),
                SetForegroundColor(Colors::DIM),
                Print(format!(
                    "{tokens:>5} tok {:>6} chars  ",
                    segment.text.chars().count()
                )),
                ResetColor,
                Print(format!("{}\n", preview(&segment.text))),
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_estimate(&self, estimate: &CostEstimate) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!(
                "{:<16} {:<12} {:>10} {:>10} {:>10}\n",
                "PHASE", "MODEL", "INPUT", "OUTPUT", "USD"
            )),
            Print(format!("{}\n", "-".repeat(62))),
            ResetColor,
            Print(phase_line("classification", &estimate.classification)),
            Print(phase_line("questions", &estimate.qa)),
            SetForegroundColor(Colors::SUCCESS),
            Print(format!(
                "{:<16} {:<12} {:>10} {:>10} {:>10.4}\n",
                "total",
                format!("{} chunks", estimate.segments),
                "",
                "",
                estimate.sum_usd
            )),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Overwrite the current line with a progress counter.
    pub fn print_progress(&self, stage: &str, done: usize, total: usize) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("\r{stage}: {done}/{total}")),
            ResetColor,
        )?;
        if done == total {
            execute!(stdout, Print("\n"))?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_export(&self, paths: &ExportPaths, rows: usize, cards: usize) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::SUCCESS),
            Print(format!("{cards} cards from {rows} chunks\n")),
            ResetColor,
            SetForegroundColor(Colors::DIM),
            Print(format!("  csv:  {}\n", paths.csv.display())),
            Print(format!("  xlsx: {}\n", paths.xlsx.display())),
            Print(format!("  meta: {}\n", paths.meta.display())),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stderr = io::stderr();
        execute!(
            stderr,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {msg}\n")),
            ResetColor,
        )?;
        stderr.flush()?;
        Ok(())
    }

    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{msg}\n")),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

fn phase_line(name: &str, phase: &PhaseCost) -> String {
    format!(
        "{:<16} {:<12} {:>10} {:>10} {:>10.4}\n",
        name, phase.model, phase.input_tokens, phase.output_tokens, phase.usd
    )
}

/// First line of `text`, cut to `PREVIEW_CHARS` characters.
fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    let mut out: String = line.chars().take(PREVIEW_CHARS).collect();
    if line.chars().count() > PREVIEW_CHARS || text.lines().nth(1).is_some() {
        out.push_str(" ...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_single_lines() {
        assert_eq!(preview("Kurzer Satz."), "Kurzer Satz.");
    }

    #[test]
    fn preview_marks_more_content() {
        assert_eq!(preview("KAPITEL 1\n\nText."), "KAPITEL 1 ...");
        let long = "ä".repeat(PREVIEW_CHARS + 5);
        let out = preview(&long);
        assert_eq!(out.chars().count(), PREVIEW_CHARS + 4);
        assert!(out.ends_with(" ..."));
    }

    #[test]
    fn phase_line_rounds_to_four_decimals() {
        let phase = PhaseCost {
            input_tokens: 3200,
            output_tokens: 240,
            usd: 0.0003,
            model: "gpt-5-nano".into(),
        };
        let line = phase_line("classification", &phase);
        assert!(line.contains("gpt-5-nano"));
        assert!(line.trim_end().ends_with("0.0003"));
    }
}
