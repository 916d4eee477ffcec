//! Detection of table-of-contents style segments that make poor flashcards.

/// Lower-case prefixes of outline sections.
pub const OUTLINE_PREFIXES: &[&str] = &[
    "inhalt",
    "inhaltsverzeichnis",
    "literaturverzeichnis",
    "glossar",
];

/// Classifier label for bullet lists.
const LIST_LABEL: &str = "Aufzaehlung";

/// True if `text` starts with a typical outline heading (case-insensitive,
/// leading whitespace ignored).
pub fn is_outline_segment(text: &str) -> bool {
    let lowered = text.trim_start().to_lowercase();
    OUTLINE_PREFIXES.iter().any(|p| lowered.starts_with(p))
}

/// True for a list-labelled segment made mostly of short lines, i.e. a table
/// of contents that the classifier mistook for a bullet list.
pub fn looks_like_outline_list(text: &str, label: &str) -> bool {
    if label != LIST_LABEL {
        return false;
    }
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() <= 3 {
        return false;
    }
    let short = lines.iter().filter(|l| l.chars().count() < 50).count();
    short as f64 / lines.len() as f64 > 0.8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_prefixes() {
        assert!(is_outline_segment("Inhaltsverzeichnis\n1 Einleitung"));
        assert!(is_outline_segment("  GLOSSAR\nBegriff A"));
        assert!(!is_outline_segment("Einleitung\nDies ist Text"));
    }

    #[test]
    fn outline_list_needs_list_label() {
        let text = "1 Einleitung\n2 Methodik\n3 Ergebnisse\n4 Diskussion";
        assert!(looks_like_outline_list(text, "Aufzaehlung"));
        assert!(!looks_like_outline_list(text, "Fakt"));
    }

    #[test]
    fn outline_list_needs_more_than_three_lines() {
        assert!(!looks_like_outline_list("Nur ein Satz", "Aufzaehlung"));
        assert!(!looks_like_outline_list("a\nb\n\nc", "Aufzaehlung"));
    }

    #[test]
    fn long_lines_are_not_an_outline() {
        let long = "x".repeat(60);
        let text = format!("{long}\n{long}\nkurz\nkurz\nkurz");
        // 3 of 5 short lines is below the 80 % threshold.
        assert!(!looks_like_outline_list(&text, "Aufzaehlung"));
    }
}
