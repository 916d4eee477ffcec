pub mod ollama;
pub mod openai;

use std::time::Duration;

use lernkarten_core::config::LlmConfig;

use crate::provider::{LlmError, LlmProvider};

/// Create the configured LLM provider for `model`.
pub fn create_provider(
    llm_config: &LlmConfig,
    model: &str,
) -> Result<Box<dyn LlmProvider>, LlmError> {
    let timeout = Duration::from_secs(llm_config.request_timeout_secs);
    match llm_config.provider.as_str() {
        "openai" => {
            let api_key = llm_config
                .openai_api_key
                .as_ref()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            Ok(Box::new(openai::OpenAiProvider::new(
                api_key.clone(),
                model.to_string(),
                llm_config.openai_base_url.clone(),
                timeout,
            )?))
        }
        "ollama" => Ok(Box::new(ollama::OllamaProvider::new(
            llm_config.ollama_url.clone(),
            model.to_string(),
            timeout,
        )?)),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_requires_api_key() {
        let config = LlmConfig {
            openai_api_key: None,
            ..LlmConfig::default()
        };
        let err = create_provider(&config, "gpt-5-nano").err().unwrap();
        assert!(matches!(err, LlmError::NotConfigured(_)));

        let config = LlmConfig {
            openai_api_key: Some("  ".into()),
            ..LlmConfig::default()
        };
        assert!(create_provider(&config, "gpt-5-nano").is_err());
    }

    #[test]
    fn openai_with_key() {
        let config = LlmConfig {
            openai_api_key: Some("sk-test".into()),
            ..LlmConfig::default()
        };
        let provider = create_provider(&config, "gpt-5-mini").unwrap();
        assert_eq!(provider.model(), "gpt-5-mini");
    }

    #[test]
    fn ollama_needs_no_key() {
        let config = LlmConfig {
            provider: "ollama".into(),
            ..LlmConfig::default()
        };
        let provider = create_provider(&config, "llama3").unwrap();
        assert_eq!(provider.model(), "llama3");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = LlmConfig {
            provider: "gemini".into(),
            ..LlmConfig::default()
        };
        let err = create_provider(&config, "x").err().unwrap();
        assert!(err.to_string().contains("gemini"));
    }
}
