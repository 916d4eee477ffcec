//! Coarse paragraph segmentation ahead of token-budgeted chunking.

use once_cell::sync::Lazy;
use regex::Regex;

use super::cleanup::normalize_whitespace;

/// Paragraphs opening with one of these section keywords stand on their own.
static SECTION_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(inhalt|einleitung|vorwort|ueberblick|herzlich willkommen|literaturverzeichnis|anhang|uebergeordnete lernziele|lernziele)\b",
    )
    .expect("valid section keyword regex")
});

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOptions {
    /// A segment is emitted once it holds at least this many characters.
    pub min_len: usize,
    /// A segment that already reached `min_len` is not grown past this.
    pub max_len: usize,
    /// Emit keyword paragraphs as their own segment instead of dropping them.
    pub keep_headings: bool,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            min_len: 300,
            max_len: 1200,
            keep_headings: true,
        }
    }
}

/// Split raw text into paragraph groups of roughly `min_len..=max_len` chars.
pub fn segment_text(text: &str, opts: SegmentOptions) -> Vec<String> {
    let text = normalize_whitespace(text);

    let mut segments = Vec::new();
    let mut buf: Vec<&str> = Vec::new();
    let mut cur_len = 0;

    for para in BLANK_LINE.split(&text).map(str::trim).filter(|p| !p.is_empty()) {
        if SECTION_KEYWORD.is_match(para) {
            flush(&mut buf, &mut cur_len, &mut segments);
            if opts.keep_headings {
                segments.push(para.to_string());
            }
            continue;
        }

        let len = para.chars().count();
        if cur_len + len > opts.max_len && cur_len >= opts.min_len {
            flush(&mut buf, &mut cur_len, &mut segments);
        }
        buf.push(para);
        cur_len += len;
        if cur_len >= opts.min_len {
            flush(&mut buf, &mut cur_len, &mut segments);
        }
    }
    flush(&mut buf, &mut cur_len, &mut segments);

    tracing::debug!(segments = segments.len(), "coarse segmentation");
    segments
}

fn flush(buf: &mut Vec<&str>, cur_len: &mut usize, segments: &mut Vec<String>) {
    let joined = buf.join("\n\n");
    let joined = joined.trim();
    if !joined.is_empty() {
        segments.push(joined.to_string());
    }
    buf.clear();
    *cur_len = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(min_len: usize, max_len: usize) -> SegmentOptions {
        SegmentOptions {
            min_len,
            max_len,
            keep_headings: true,
        }
    }

    #[test]
    fn keyword_paragraphs_stand_alone() {
        let text = "EINLEITUNG\nDies ist Absatz 1.\n\n\nANHANG\nAbsatz 2.";
        assert_eq!(
            segment_text(text, opts(10, 100)),
            vec!["EINLEITUNG\nDies ist Absatz 1.", "ANHANG\nAbsatz 2."]
        );
    }

    #[test]
    fn keyword_paragraphs_can_be_dropped() {
        let text = "Vorwort\n\nEin normaler Absatz mit Text.";
        let segments = segment_text(
            text,
            SegmentOptions {
                keep_headings: false,
                ..opts(5, 100)
            },
        );
        assert_eq!(segments, vec!["Ein normaler Absatz mit Text."]);
    }

    #[test]
    fn keyword_must_be_a_whole_word() {
        // "Inhalte" is not the keyword "inhalt".
        let text = "Inhalte des Kurses sind vielfaeltig.";
        assert_eq!(segment_text(text, opts(5, 100)), vec![text]);
        assert_eq!(
            segment_text(text, SegmentOptions { keep_headings: false, ..opts(5, 100) }),
            vec![text]
        );
    }

    #[test]
    fn respects_min_and_max_length() {
        let text = ["A".repeat(50), "B".repeat(50), "C".repeat(50)].join("\n\n");
        let segments = segment_text(&text, opts(100, 120));
        assert_eq!(segments.len(), 2);
        let first_len = segments[0].chars().count();
        assert!((100..=120).contains(&first_len));
        assert_eq!(segments[1], "C".repeat(50));
    }

    #[test]
    fn keyword_flushes_pending_paragraphs() {
        let text = "kurz\n\nLernziele\n\nnoch kurz";
        assert_eq!(
            segment_text(text, opts(100, 200)),
            vec!["kurz", "Lernziele", "noch kurz"]
        );
    }

    #[test]
    fn empty_text_has_no_segments() {
        assert!(segment_text("  \n\n ", SegmentOptions::default()).is_empty());
    }
}
