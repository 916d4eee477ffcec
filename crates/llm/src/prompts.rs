//! Prompt texts for segment classification and flashcard generation.

use crate::provider::Message;

/// Labels the classifier may assign.
pub const LABELS: &[&str] = &[
    "Definition",
    "Fakt",
    "Beispiel",
    "Aufzaehlung",
    "Ueberschrift/Vorwort",
];

const CLASSIFY_SYSTEM: &str = "Du bist ein strenger Klassifizierer. \
Gib eine kompakte JSON-Antwort mit Schluesseln: label, keep, reason. \
Erlaubte label: Definition, Fakt, Beispiel, Aufzaehlung, Ueberschrift/Vorwort";

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn classify_messages(text: &str) -> Vec<Message> {
    let user = format!(
        "Klassifiziere den folgenden deutschen Textausschnitt nach seinem Hauptzweck. \
Falls es sich um Gliederung, Kapitelueberschrift, Vorwort, Inhaltsverzeichnis, \
Literaturverzeichnis oder aehnliches handelt, setze keep=false. Sonst keep=true.\n\n\
---\n{text}\n---"
    );
    vec![Message::system(CLASSIFY_SYSTEM), Message::user(user)]
}

pub fn qa_messages(text: &str, n_questions: usize, language: &str) -> Vec<Message> {
    let system = format!(
        "Du erstellst pruefungsreife Lernkarten ({language}). \
Sehr praezise, faktenbasiert, konsistent mit dem Eingangstext. \
Beziehe dich NICHT auf Quellenangaben im Fliesstext; extrahiere nur den Kerninhalt."
    );
    let user = format!(
        "Erzeuge {n_questions} Lernkarten (Frage/Antwort) zum folgenden Text. \
Gib ein JSON-Objekt {{\"items\": [{{\"frage\": ..., \"antwort\": ...}}]}} zurueck. \
Jede Frage sollte atomar sein (ein Fakt pro Frage). \
Antworten moeglichst kurz, klar und eindeutig.\n\n\
=== TEXT BEGINN ===\n{text}\n=== TEXT ENDE ==="
    );
    vec![Message::system(system), Message::user(user)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Role;

    #[test]
    fn truncation_counts_chars() {
        assert_eq!(truncate_chars("Größe", 3), "Grö");
        assert_eq!(truncate_chars("kurz", 10), "kurz");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn classify_prompt_embeds_text_and_labels() {
        let msgs = classify_messages("Ein Atom ist ...");
        assert_eq!(msgs[0].role, Role::System);
        for label in LABELS {
            assert!(msgs[0].content.contains(label));
        }
        assert!(msgs[1].content.contains("---\nEin Atom ist ...\n---"));
    }

    #[test]
    fn qa_prompt_mentions_count_and_language() {
        let msgs = qa_messages("Inhalt", 4, "de");
        assert!(msgs[0].content.contains("(de)"));
        assert!(msgs[1].content.starts_with("Erzeuge 4 Lernkarten"));
        assert!(msgs[1].content.contains(r#"{"items": [{"frage": ..., "antwort": ...}]}"#));
        assert!(msgs[1].content.ends_with("=== TEXT BEGINN ===\nInhalt\n=== TEXT ENDE ==="));
    }
}
