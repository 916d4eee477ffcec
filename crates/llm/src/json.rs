//! Pulling a JSON value out of a free-form model reply.

use serde_json::Value;

/// Extract JSON from an LLM response, handling markdown code blocks and
/// leading or trailing prose.
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    // Handle ```json ... ``` blocks
    if let Some(start) = trimmed.find("```json") {
        let json_start = start + 7;
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    // Handle ``` ... ``` blocks
    if let Some(start) = trimmed.find("```") {
        let json_start = start + 3;
        // Skip past any language identifier on the same line
        let after_tick = &trimmed[json_start..];
        let content_start = after_tick.find('\n').map_or(0, |n| n + 1);
        if let Some(end) = after_tick[content_start..].find("```") {
            return after_tick[content_start..content_start + end].trim();
        }
    }

    // Raw object or array, whichever opens first.
    let open = trimmed.find(['{', '[']);
    if let Some(start) = open {
        let close = if trimmed[start..].starts_with('{') { '}' } else { ']' };
        if let Some(end) = trimmed.rfind(close) {
            if end > start {
                return &trimmed[start..=end];
            }
        }
    }

    trimmed
}

/// Parse the JSON value embedded in `response`, if any.
pub fn parse_json(response: &str) -> Option<Value> {
    serde_json::from_str(extract_json(response)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_raw() {
        let input = r#"{"label": "Fakt"}"#;
        assert_eq!(extract_json(input), r#"{"label": "Fakt"}"#);
    }

    #[test]
    fn extract_json_code_block() {
        let input = "Hier ist das Ergebnis:\n```json\n{\"keep\": true}\n```\nFertig.";
        assert_eq!(extract_json(input), r#"{"keep": true}"#);
    }

    #[test]
    fn extract_json_plain_code_block() {
        let input = "```\n[1, 2]\n```";
        assert_eq!(extract_json(input), "[1, 2]");
    }

    #[test]
    fn extract_json_with_prefix() {
        let input = "Gerne! {\"label\": \"Beispiel\"} Viel Erfolg.";
        assert_eq!(extract_json(input), r#"{"label": "Beispiel"}"#);
    }

    #[test]
    fn extract_json_array() {
        let input = r#"Karten: [{"frage": "A?", "antwort": "B"}]"#;
        assert_eq!(extract_json(input), r#"[{"frage": "A?", "antwort": "B"}]"#);
    }

    #[test]
    fn parse_json_rejects_prose() {
        assert!(parse_json("keine Ahnung").is_none());
        assert_eq!(parse_json("[]"), Some(Value::Array(vec![])));
    }
}
