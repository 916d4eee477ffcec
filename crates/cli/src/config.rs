use clap::Args;
use lernkarten_core::Config;
use tracing::debug;

/// Command-line settings that take precedence over file and environment.
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// LLM provider: openai or ollama
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model used for classification
    #[arg(long, global = true)]
    pub classify_model: Option<String>,

    /// Model used for question generation
    #[arg(long, global = true)]
    pub qa_model: Option<String>,

    /// Target chunk size in estimated tokens
    #[arg(long, global = true)]
    pub target_tokens: Option<usize>,

    /// Sentence overlap between chunks in estimated tokens
    #[arg(long, global = true)]
    pub overlap_tokens: Option<usize>,

    /// Hard character ceiling per chunk
    #[arg(long, global = true)]
    pub max_chars: Option<usize>,

    /// Concurrent LLM requests
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,
}

impl Overrides {
    /// Overlay the set flags onto `config`. Callers re-validate afterwards.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref provider) = self.provider {
            config.llm.provider = provider.clone();
        }
        if let Some(ref model) = self.classify_model {
            config.models.classify_model = model.clone();
        }
        if let Some(ref model) = self.qa_model {
            config.models.qa_model = model.clone();
        }
        if let Some(n) = self.target_tokens {
            config.chunking.target_tokens = n;
        }
        if let Some(n) = self.overlap_tokens {
            config.chunking.overlap_tokens = n;
        }
        if let Some(n) = self.max_chars {
            config.chunking.max_chars_per_chunk = n;
        }
        if let Some(n) = self.concurrency {
            config.pipeline.concurrency = n;
        }
        debug!(?self, "applied command-line overrides");
    }
}
