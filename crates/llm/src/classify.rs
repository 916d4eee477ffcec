//! Content-type classification of study segments.

use std::sync::Arc;

use lernkarten_core::Classification;
use serde_json::Value;
use tracing::{debug, warn};

use crate::json::parse_json;
use crate::prompts::{classify_messages, truncate_chars};
use crate::provider::{LlmError, LlmProvider};
use crate::retry::{retry_with_backoff, RetryPolicy};

/// Classification answers are a short JSON object.
const CLASSIFY_MAX_TOKENS: u32 = 300;

pub struct Classifier {
    provider: Arc<dyn LlmProvider>,
    retry: RetryPolicy,
    char_limit: usize,
}

impl Classifier {
    pub fn new(provider: Arc<dyn LlmProvider>, retry: RetryPolicy, char_limit: usize) -> Self {
        Self {
            provider,
            retry,
            char_limit,
        }
    }

    /// Ask the model what kind of content `text` is and whether it is worth
    /// turning into flashcards. Unparsable answers yield
    /// [`Classification::fallback`]; transport failures are errors.
    pub async fn classify(&self, text: &str) -> Result<Classification, LlmError> {
        let text = truncate_chars(text, self.char_limit);
        let reply = retry_with_backoff(&self.retry, || {
            self.provider
                .complete(classify_messages(text), 0.0, CLASSIFY_MAX_TOKENS, true)
        })
        .await?;

        let classification = parse_classification(&reply);
        debug!(
            model = self.provider.model(),
            label = %classification.label,
            keep = classification.keep,
            "classified segment"
        );
        Ok(classification)
    }
}

/// Read `{label, keep, reason}` from a model reply.
pub fn parse_classification(reply: &str) -> Classification {
    let Some(Value::Object(map)) = parse_json(reply) else {
        warn!("unparsable classification reply, using fallback");
        return Classification::fallback();
    };

    let label = map
        .get("label")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("Fakt")
        .to_string();
    let keep = match map.get("keep") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.trim().eq_ignore_ascii_case("false"),
        _ => true,
    };
    let reason = map
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Classification {
        label,
        keep,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;

    #[test]
    fn parses_complete_answer() {
        let c = parse_classification(
            r#"{"label": "Definition", "keep": true, "reason": "erklaert Begriff"}"#,
        );
        assert_eq!(c.label, "Definition");
        assert!(c.keep);
        assert_eq!(c.reason, "erklaert Begriff");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let c = parse_classification(r#"{"keep": false}"#);
        assert_eq!(c.label, "Fakt");
        assert!(!c.keep);
        assert_eq!(c.reason, "");
    }

    #[test]
    fn string_keep_is_understood() {
        let c = parse_classification(r#"{"label": "Ueberschrift/Vorwort", "keep": "false"}"#);
        assert!(!c.keep);
    }

    #[test]
    fn garbage_falls_back() {
        assert_eq!(parse_classification("Das ist ein Fakt."), Classification::fallback());
        assert_eq!(parse_classification("[1, 2]"), Classification::fallback());
    }

    #[tokio::test]
    async fn classify_sends_truncated_text_in_json_mode() {
        let provider = Arc::new(ScriptedProvider::replying(
            r#"{"label": "Beispiel", "keep": true, "reason": "z.B."}"#,
        ));
        let classifier = Classifier::new(provider.clone(), RetryPolicy::immediate(3), 10);

        let c = classifier.classify("0123456789ABCDEF").await.unwrap();
        assert_eq!(c.label, "Beispiel");

        let requests = provider.requests.lock().unwrap();
        let (messages, json_mode) = &requests[0];
        assert!(*json_mode);
        assert!(messages[1].content.contains("---\n0123456789\n---"));
    }

    #[tokio::test]
    async fn classify_retries_transient_failures() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(LlmError::ApiError {
                status: 429,
                body: "slow down".into(),
            }),
            Ok(r#"{"label": "Fakt", "keep": true}"#.into()),
        ]));
        let classifier = Classifier::new(provider.clone(), RetryPolicy::immediate(3), 5000);

        let c = classifier.classify("Text").await.unwrap();
        assert_eq!(c.label, "Fakt");
        assert_eq!(provider.request_count(), 2);
    }
}
