//! LLM access for flashcard generation: provider backends, retry with
//! backoff, segment classification and Q&A generation.

pub mod classify;
pub mod json;
pub mod prompts;
pub mod provider;
pub mod providers;
pub mod qa;
pub mod retry;

#[cfg(test)]
mod testing;

pub use classify::Classifier;
pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::create_provider;
pub use qa::{questions_for_tokens, QaGenerator};
pub use retry::{retry_with_backoff, RetryPolicy};
