//! Text heuristics shared by the block segmenter, the sub-splitter and the
//! overlap builder.

use once_cell::sync::Lazy;
use regex::Regex;

use super::tokens::TokenEstimator;

/// Leading outline number such as `2` or `2.1.3`, followed by whitespace.
static OUTLINE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)*\s").expect("valid outline regex"));

/// Ellipses and other stacked terminators mark prose, not headings.
static STACKED_TERMINATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]{2,}").expect("valid terminator regex"));

static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.?!]\s+").expect("valid sentence regex"));

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("valid paragraph regex"));

/// Heading lines are shorter than this many characters.
const MAX_HEADING_CHARS: usize = 80;

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// True when every cased character is upper-case and there is at least one.
fn is_all_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Heuristic: does this line look like a section title?
///
/// Short upper-case lines, outline-numbered lines (`2.1 Methodik`) and lines
/// ending in `:` qualify, unless they contain `..`, `?!` and the like.
pub fn looks_like_heading(line: &str) -> bool {
    let l = line.trim();
    if l.is_empty() || char_len(l) >= MAX_HEADING_CHARS {
        return false;
    }
    let shaped = is_all_upper(l) || OUTLINE_NUMBER.is_match(l) || l.ends_with(':');
    shaped && !STACKED_TERMINATORS.is_match(l)
}

/// Split after `.`, `?` or `!` followed by whitespace. The terminator stays
/// with its sentence; the whitespace run is dropped. Never returns empty items.
///
/// Abbreviations and decimals ("z. B.", "3. Auflage") are mis-split; that is
/// accepted.
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = text.trim();
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_BREAK.find_iter(text) {
        // Terminators are ASCII, so the sentence ends one byte into the match.
        let end = m.start() + 1;
        let s = text[start..end].trim();
        if !s.is_empty() {
            sentences.push(s.to_string());
        }
        start = m.end();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Split on runs of two or more newlines; paragraphs are trimmed, blanks dropped.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Longest run of trailing whole sentences whose summed estimate stays within
/// `budget`. Walks backwards and stops at the first sentence that would
/// overflow, so the result is always a suffix.
pub fn take_last_sentences<E>(text: &str, budget: usize, estimator: &E) -> Vec<String>
where
    E: TokenEstimator + ?Sized,
{
    let mut sentences = split_sentences(text);
    let mut used = 0;
    let mut keep = 0;
    for s in sentences.iter().rev() {
        let t = estimator.estimate(s);
        if used + t > budget {
            break;
        }
        used += t;
        keep += 1;
    }
    sentences.split_off(sentences.len() - keep)
}

/// Cut at the character midpoint. Only call with at least two characters.
pub(crate) fn split_at_char_midpoint(text: &str) -> (&str, &str) {
    let mid = char_len(text) / 2;
    let idx = text
        .char_indices()
        .nth(mid)
        .map_or(text.len(), |(i, _)| i);
    text.split_at(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::chunker::tokens::HeuristicEstimator;

    #[test]
    fn heading_shapes() {
        assert!(looks_like_heading("EINLEITUNG"));
        assert!(looks_like_heading("1 Einleitung"));
        assert!(looks_like_heading("2.1 Methodik"));
        assert!(looks_like_heading("  Lernziele:  "));
        assert!(looks_like_heading("HEAD1."));
    }

    #[test]
    fn heading_rejections() {
        assert!(!looks_like_heading(""));
        assert!(!looks_like_heading("   "));
        assert!(!looks_like_heading("Dies ist ein normaler Satz."));
        assert!(!looks_like_heading("WIRKLICH?!"));
        assert!(!looks_like_heading("ACHTUNG..."));
        // Outline number must be followed by whitespace.
        assert!(!looks_like_heading("2.1Methodik"));
        assert!(!looks_like_heading("12345"));
        let long = format!("{}:", "a".repeat(80));
        assert!(!looks_like_heading(&long));
    }

    #[test]
    fn heading_length_limit_is_exclusive() {
        assert!(looks_like_heading(&"A".repeat(79)));
        assert!(!looks_like_heading(&"A".repeat(80)));
    }

    #[test]
    fn sentences_keep_terminators() {
        let s = split_sentences("Erster Satz. Zweiter Satz? Dritter!  Vierter");
        assert_eq!(s, vec!["Erster Satz.", "Zweiter Satz?", "Dritter!", "Vierter"]);
    }

    #[test]
    fn sentences_need_following_whitespace() {
        assert_eq!(split_sentences("Version 2.5 ist da."), vec!["Version 2.5 ist da."]);
        assert_eq!(split_sentences("a.b.c"), vec!["a.b.c"]);
    }

    #[test]
    fn sentences_split_across_newlines() {
        let s = split_sentences("Satz eins.\n\nSatz zwei.");
        assert_eq!(s, vec!["Satz eins.", "Satz zwei."]);
    }

    #[test]
    fn sentences_reconstruct_normalized_text() {
        let text = "  Eins. Zwei!   Drei?\nVier  ";
        let joined = split_sentences(text).join(" ");
        assert_eq!(joined, "Eins. Zwei! Drei? Vier");
    }

    #[test]
    fn sentences_of_blank_text() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences(" \n\t ").is_empty());
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let p = split_paragraphs("A\nB\n\nC\n\n\n\nD\n\n");
        assert_eq!(p, vec!["A\nB", "C", "D"]);
    }

    #[test]
    fn last_sentences_respect_budget() {
        // 12 chars -> 3 tokens each
        let text = "Satz Numme1. Satz Numme2. Satz Numme3.";
        let est = HeuristicEstimator;
        assert_eq!(
            take_last_sentences(text, 6, &est),
            vec!["Satz Numme2.", "Satz Numme3."]
        );
        assert_eq!(take_last_sentences(text, 3, &est), vec!["Satz Numme3."]);
        assert!(take_last_sentences(text, 2, &est).is_empty());
        assert!(take_last_sentences("", 100, &est).is_empty());
    }

    #[test]
    fn last_sentences_stop_at_first_overflow() {
        // The middle sentence is too large; the first one must not be skipped to.
        let text = "Kurz. Ein deutlich laengerer Satz in der Mitte. Kurz.";
        let out = take_last_sentences(text, 4, &HeuristicEstimator);
        assert_eq!(out, vec!["Kurz."]);
    }

    #[test]
    fn midpoint_respects_char_boundaries() {
        let (a, b) = split_at_char_midpoint("äöüß");
        assert_eq!(a, "äö");
        assert_eq!(b, "üß");
        let (a, b) = split_at_char_midpoint("abc");
        assert_eq!((a, b), ("a", "bc"));
    }
}
