use serde::{Deserialize, Serialize};

/// One chunk of study text on its way through classification and card generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub text: String,
    /// Content type assigned by the classifier ("Definition", "Fakt", ...).
    pub label: Option<String>,
    /// False once the classifier or an outline filter rejected the segment.
    pub keep: bool,
}

impl Segment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: None,
            keep: true,
        }
    }
}

/// Classifier verdict for a single segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub label: String,
    pub keep: bool,
    #[serde(default)]
    pub reason: String,
}

impl Classification {
    /// Verdict used when the model answer cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            label: "Fakt".to_string(),
            keep: true,
            reason: "fallback".to_string(),
        }
    }
}

/// A single question/answer flashcard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaItem {
    pub question: String,
    pub answer: String,
}

/// All cards generated from one segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardRow {
    pub original: String,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub labels: Vec<String>,
    /// Source document name, empty when unknown.
    #[serde(default)]
    pub source: String,
}

impl CardRow {
    pub fn from_items(segment: &Segment, items: Vec<QaItem>, source: &str) -> Self {
        let (questions, answers) = items.into_iter().map(|i| (i.question, i.answer)).unzip();
        Self {
            original: segment.text.clone(),
            questions,
            answers,
            labels: segment.label.iter().cloned().collect(),
            source: source.to_string(),
        }
    }

    /// Iterate question/answer pairs; unmatched trailing entries are ignored.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.questions
            .iter()
            .zip(&self.answers)
            .map(|(q, a)| (q.as_str(), a.as_str()))
    }

    pub fn card_count(&self) -> usize {
        self.questions.len().min(self.answers.len())
    }
}
