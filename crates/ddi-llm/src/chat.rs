//! Conversational drug interaction assistant.
//!
//! The session keeps the conversation in order and sends all of it with
//! every turn, so follow-up questions can refer to earlier answers.

use tracing::{debug, warn};

use crate::client::{LlmError, LlmResult, TextGenerator};
use crate::prompts::make_chat_prompt;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Speaker label used in prompts.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A chat with an ordered message history.
pub struct ChatSession<G> {
    generator: G,
    history: Vec<ChatMessage>,
}

impl<G: TextGenerator> ChatSession<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            history: Vec::new(),
        }
    }

    /// Messages exchanged so far, oldest first.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Send one user message and return the assistant's reply.
    ///
    /// A failed turn leaves the history as it was before the call.
    pub fn send(&mut self, input: &str) -> LlmResult<String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(LlmError::EmptyPrompt);
        }

        self.history.push(ChatMessage::new(Role::User, input));
        let prompt = make_chat_prompt(&self.history);
        debug!(turns = self.history.len(), "sending chat turn");

        let reply = self
            .generator
            .generate(&prompt)
            .and_then(|text| match text.trim() {
                "" => Err(LlmError::EmptyResponse),
                reply => Ok(reply.to_string()),
            });

        match reply {
            Ok(reply) => {
                self.history
                    .push(ChatMessage::new(Role::Assistant, reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                warn!(error = %e, "chat turn failed");
                self.history.pop();
                Err(e)
            }
        }
    }
}
