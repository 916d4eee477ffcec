use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::provider::{LlmError, LlmProvider, Message};

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the request body for the chat completions API.
    fn build_request_body(
        model: &str,
        messages: &[Message],
        temperature: f32,
        max_tokens: u32,
        json_mode: bool,
    ) -> serde_json::Value {
        let api_messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();

        let mut body = json!({
            "model": model,
            "messages": api_messages,
            "max_completion_tokens": max_tokens,
        });

        // The gpt-5 family only accepts its default temperature.
        if !model.starts_with("gpt-5") {
            body["temperature"] = json!(temperature);
        }
        if json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
        json_mode: bool,
    ) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body =
            Self::build_request_body(&self.model, &messages, temperature, max_tokens, json_mode);

        debug!(model = %self.model, json_mode, "OpenAI request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        let content = resp["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::ParseError("missing choices[0].message.content".into()))?
            .to_string();

        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages() -> Vec<Message> {
        vec![Message::system("Du bist streng."), Message::user("Text")]
    }

    #[test]
    fn test_request_body_structure() {
        let body = OpenAiProvider::build_request_body("gpt-4o-mini", &messages(), 0.2, 512, false);

        let msgs = body["messages"].as_array().unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0]["role"], "system");
        assert_eq!(msgs[1]["role"], "user");
        assert_eq!(msgs[1]["content"], "Text");

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_completion_tokens"], 512);
        let temp = body["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 1e-6);
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_json_mode_sets_response_format() {
        let body = OpenAiProvider::build_request_body("gpt-4o", &messages(), 0.0, 100, true);
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_gpt5_omits_temperature() {
        let body = OpenAiProvider::build_request_body("gpt-5-nano", &messages(), 0.0, 100, true);
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let provider = OpenAiProvider::new(
            "sk-test".into(),
            "gpt-5-mini".into(),
            "https://api.openai.com/".into(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(provider.base_url, "https://api.openai.com");
        assert_eq!(provider.model(), "gpt-5-mini");
    }
}
