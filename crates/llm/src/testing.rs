//! Scripted provider for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::provider::{LlmError, LlmProvider, Message};

/// Replays canned replies in order and records every request.
pub(crate) struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    pub(crate) requests: Mutex<Vec<(Vec<Message>, bool)>>,
}

impl ScriptedProvider {
    pub(crate) fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn replying(reply: &str) -> Self {
        Self::new(vec![Ok(reply.to_string())])
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        _temperature: f32,
        _max_tokens: u32,
        json_mode: bool,
    ) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push((messages, json_mode));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::ParseError("no scripted reply left".into())))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
