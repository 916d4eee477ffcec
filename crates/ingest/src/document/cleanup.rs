//! Page-level cleanup of extracted text.

use once_cell::sync::Lazy;
use regex::Regex;

static HYPHENATED_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)-\n(\w+)").expect("valid regex"));
static PAGE_NUMBER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\s*$").expect("valid regex"));
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));
static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("valid regex"));
static BLANK_LINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Clean the text of a single PDF page.
///
/// Joins words hyphenated across a line break, drops lines that hold only a
/// page number or contain one of `footer_patterns`, trims every line and
/// collapses runs of spaces and tabs.
pub fn cleanup_page_text(text: &str, footer_patterns: &[String]) -> String {
    let text = HYPHENATED_BREAK.replace_all(text, "${1}${2}");
    let text = text.replace('\r', "");

    let lines: Vec<&str> = text
        .split('\n')
        .filter(|line| !PAGE_NUMBER_LINE.is_match(line))
        .filter(|line| !footer_patterns.iter().any(|p| line.contains(p.as_str())))
        .map(str::trim)
        .collect();

    SPACE_RUN.replace_all(&lines.join("\n"), " ").into_owned()
}

/// Normalize line endings and whitespace: `\r` becomes `\n`, horizontal
/// whitespace runs collapse to one space, at most one blank line is kept.
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace('\r', "\n");
    let text = HORIZONTAL_WS.replace_all(&text, " ");
    let text = BLANK_LINE_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}
