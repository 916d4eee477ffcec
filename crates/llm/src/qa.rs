//! Flashcard (question/answer) generation for a single segment.

use std::sync::Arc;

use lernkarten_core::QaItem;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::json::parse_json;
use crate::prompts::{qa_messages, truncate_chars};
use crate::provider::{LlmError, LlmProvider};
use crate::retry::{retry_with_backoff, RetryPolicy};

/// Roughly one question per hundred tokens, at least one and at most
/// `max_questions`.
pub fn questions_for_tokens(tokens: usize, max_questions: usize) -> usize {
    (tokens / 100).min(max_questions).max(1)
}

pub struct QaGenerator {
    provider: Arc<dyn LlmProvider>,
    retry: RetryPolicy,
    char_limit: usize,
    temperature: f32,
    max_tokens: u32,
}

impl QaGenerator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        retry: RetryPolicy,
        char_limit: usize,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            retry,
            char_limit,
            temperature,
            max_tokens,
        }
    }

    /// Ask for `n_questions` cards about `text`. A reply that cannot be
    /// parsed produces no cards rather than an error.
    pub async fn generate(
        &self,
        text: &str,
        n_questions: usize,
        language: &str,
    ) -> Result<Vec<QaItem>, LlmError> {
        let text = truncate_chars(text, self.char_limit);
        let reply = retry_with_backoff(&self.retry, || {
            self.provider.complete(
                qa_messages(text, n_questions, language),
                self.temperature,
                self.max_tokens,
                true,
            )
        })
        .await?;

        let items = parse_qa_items(&reply);
        debug!(
            model = self.provider.model(),
            requested = n_questions,
            received = items.len(),
            "generated cards"
        );
        Ok(items)
    }
}

/// Accept a bare list or an object wrapping it under `items`, `questions`
/// or `cards`.
pub fn parse_qa_items(reply: &str) -> Vec<QaItem> {
    let list = match parse_json(reply) {
        Some(Value::Array(list)) => list,
        Some(Value::Object(mut map)) => ["items", "questions", "cards"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(list)) => Some(list),
                _ => None,
            })
            .unwrap_or_default(),
        _ => {
            warn!("unparsable card reply, no cards produced");
            return Vec::new();
        }
    };

    list.iter()
        .filter_map(Value::as_object)
        .filter_map(|obj| {
            let question = first_text(obj, &["frage", "question", "q"])?;
            let answer = first_text(obj, &["antwort", "answer", "a"])?;
            Some(QaItem { question, answer })
        })
        .collect()
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
