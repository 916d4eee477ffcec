use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Model names are configurable; these are the shipped defaults.
pub const GPT5: &str = "gpt-5";
pub const GPT5_MINI: &str = "gpt-5-mini";
pub const GPT5_NANO: &str = "gpt-5-nano";

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub chunking: ChunkingConfig,
    pub models: ModelsConfig,
    pub llm: LlmConfig,
    pub pipeline: PipelineConfig,
    pub ingest: IngestConfig,
    pub estimate: EstimateConfig,
    /// USD prices per million tokens, keyed by model name.
    pub costs: BTreeMap<String, Price>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            models: ModelsConfig::default(),
            llm: LlmConfig::default(),
            pipeline: PipelineConfig::default(),
            ingest: IngestConfig::default(),
            estimate: EstimateConfig::default(),
            costs: default_prices(),
        }
    }
}

impl Config {
    /// Return the default config file path: ~/.config/lernkarten/config.toml
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lernkarten").join("config.toml"))
    }

    /// Load config from the given path, or the default path, then overlay
    /// environment variables. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_config_path(),
        };

        let mut config = match config_path {
            Some(ref p) if p.exists() => {
                tracing::debug!(path = %p.display(), "loading config");
                let content = std::fs::read_to_string(p).map_err(|source| ConfigError::Io {
                    path: p.clone(),
                    source,
                })?;
                toml::from_str(&content).map_err(|source| ConfigError::Parse {
                    path: p.clone(),
                    source,
                })?
            }
            Some(ref p) if path.is_some() => {
                // An explicitly requested file must exist.
                return Err(ConfigError::Io {
                    path: p.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
                });
            }
            _ => {
                tracing::debug!("config file not found, using defaults");
                Self::default()
            }
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document without touching the environment.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Overlay process environment variables (call `load_dotenv()` first).
    pub fn apply_env(&mut self) {
        self.apply_env_from(env_opt);
    }

    /// Overlay values from an arbitrary key lookup. Unparsable numbers are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_usize = |key: &str| lookup(key).and_then(|v| v.parse::<usize>().ok());

        if let Some(v) = lookup("OPENAI_API_KEY") {
            self.llm.openai_api_key = Some(v);
        }
        if let Some(v) = lookup("OPENAI_BASE_URL") {
            self.llm.openai_base_url = v;
        }
        if let Some(v) = lookup("OLLAMA_URL") {
            self.llm.ollama_url = v;
        }
        if let Some(v) = lookup("LERNKARTEN_LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Some(v) = lookup("LERNKARTEN_CLASSIFY_MODEL") {
            self.models.classify_model = v;
        }
        if let Some(v) = lookup("LERNKARTEN_QA_MODEL") {
            self.models.qa_model = v;
        }
        if let Some(v) = lookup("LERNKARTEN_LANGUAGE") {
            self.models.language = v;
        }
        if let Some(v) = parse_usize("LERNKARTEN_TARGET_TOKENS") {
            self.chunking.target_tokens = v;
        }
        if let Some(v) = parse_usize("LERNKARTEN_OVERLAP_TOKENS") {
            self.chunking.overlap_tokens = v;
        }
        if let Some(v) = parse_usize("LERNKARTEN_MAX_CHARS_PER_CHUNK") {
            self.chunking.max_chars_per_chunk = v;
        }
        if let Some(v) = parse_usize("LERNKARTEN_CONCURRENCY") {
            self.pipeline.concurrency = v;
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunking.target_tokens == 0 {
            return Err(ConfigError::Invalid("chunking.target_tokens must be > 0".into()));
        }
        if self.chunking.max_chars_per_chunk == 0 {
            return Err(ConfigError::Invalid(
                "chunking.max_chars_per_chunk must be > 0".into(),
            ));
        }
        if self.pipeline.concurrency == 0 {
            return Err(ConfigError::Invalid("pipeline.concurrency must be >= 1".into()));
        }
        for model in [&self.models.classify_model, &self.models.qa_model] {
            if !self.costs.contains_key(model.as_str()) {
                return Err(ConfigError::Invalid(format!("costs.{model} missing")));
            }
        }
        Ok(())
    }

    pub fn price(&self, model: &str) -> Option<&Price> {
        self.costs.get(model)
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  chunking:  target={} overlap={} max_chars={}",
            self.chunking.target_tokens,
            self.chunking.overlap_tokens,
            self.chunking.max_chars_per_chunk
        );
        tracing::info!(
            "  models:    classify={} qa={} language={}",
            self.models.classify_model,
            self.models.qa_model,
            self.models.language
        );
        tracing::info!(
            "  llm:       provider={} configured={}",
            self.llm.provider,
            self.llm.is_configured()
        );
        tracing::info!("  pipeline:  concurrency={}", self.pipeline.concurrency);
    }

    /// Return a redacted view safe for printing (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "chunking": {
                "target_tokens": self.chunking.target_tokens,
                "overlap_tokens": self.chunking.overlap_tokens,
                "max_chars_per_chunk": self.chunking.max_chars_per_chunk,
            },
            "models": {
                "classify_model": self.models.classify_model,
                "qa_model": self.models.qa_model,
                "language": self.models.language,
            },
            "llm": {
                "provider": self.llm.provider,
                "openai_base_url": self.llm.openai_base_url,
                "ollama_url": self.llm.ollama_url,
                "configured": self.llm.is_configured(),
            },
            "pipeline": {
                "concurrency": self.pipeline.concurrency,
                "max_questions_per_chunk": self.pipeline.max_questions_per_chunk,
            },
        })
    }
}

// ── Chunking ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub target_tokens: usize,
    pub overlap_tokens: usize,
    pub max_chars_per_chunk: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_tokens: 600,
            overlap_tokens: 60,
            max_chars_per_chunk: 4000,
        }
    }
}

// ── Models ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelsConfig {
    pub classify_model: String,
    pub qa_model: String,
    /// Language the cards are written in.
    pub language: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            classify_model: GPT5_NANO.to_string(),
            qa_model: GPT5_MINI.to_string(),
            language: "de".to_string(),
        }
    }
}

// ── LLM transport ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// "openai" or "ollama"
    pub provider: String,
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub ollama_url: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub request_timeout_secs: u64,
    pub retry: RetryConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            openai_api_key: None,
            openai_base_url: "https://api.openai.com".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            temperature: 0.2,
            max_output_tokens: 2048,
            request_timeout_secs: 120,
            retry: RetryConfig::default(),
        }
    }
}

impl LlmConfig {
    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_factor: u32,
    /// Upper bound of the uniform random jitter added to each pause.
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            backoff_factor: 2,
            max_jitter_ms: 1000,
        }
    }
}

// ── Pipeline ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Concurrent LLM requests.
    pub concurrency: usize,
    pub max_questions_per_chunk: usize,
    /// Characters of a segment sent to the classifier.
    pub classify_char_limit: usize,
    /// Characters of a segment sent to card generation.
    pub qa_char_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_questions_per_chunk: 8,
            classify_char_limit: 5000,
            qa_char_limit: 8000,
        }
    }
}

// ── Ingest ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    /// Lines matching any of these patterns are dropped as running headers/footers.
    pub footer_patterns: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            footer_patterns: vec![
                "IU Internationale Hochschule".to_string(),
                "Inhaltsverzeichnis".to_string(),
                "Abbildungsverzeichnis".to_string(),
            ],
        }
    }
}

// ── Cost estimation ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Price {
    pub input_per_mtok_usd: f64,
    pub cached_input_per_mtok_usd: f64,
    pub output_per_mtok_usd: f64,
}

impl Price {
    pub const fn new(input: f64, cached_input: f64, output: f64) -> Self {
        Self {
            input_per_mtok_usd: input,
            cached_input_per_mtok_usd: cached_input,
            output_per_mtok_usd: output,
        }
    }
}

fn default_prices() -> BTreeMap<String, Price> {
    BTreeMap::from([
        (GPT5.to_string(), Price::new(1.250, 0.125, 10.000)),
        (GPT5_MINI.to_string(), Price::new(0.250, 0.025, 2.000)),
        (GPT5_NANO.to_string(), Price::new(0.050, 0.005, 0.400)),
    ])
}

/// Token overheads assumed by the cost estimate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EstimateConfig {
    /// Prompt tokens per classification request, excluding the segment.
    pub classify_prompt_overhead: u64,
    pub classify_output_tokens: u64,
    pub qa_prompt_overhead: u64,
    /// Output tokens per generated question and answer.
    pub qa_per_item_output: u64,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            classify_prompt_overhead: 120,
            classify_output_tokens: 24,
            qa_prompt_overhead: 180,
            qa_per_item_output: 220,
        }
    }
}
