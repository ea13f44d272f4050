//! The dialogue handle: an opaque, owned reference to one ongoing
//! conversation with a generative backend.

use std::fmt;
use std::sync::Arc;

use crate::backend::GenerativeBackend;
use crate::error::{Error, Result};
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Model, UsageMetadata};

/// One ongoing dialogue with a backend.
///
/// The handle is the only holder of the prior turns and never hands them
/// out. It is deliberately not `Clone`: two copies would fork the dialogue.
pub struct DialogueHandle {
    backend: Arc<dyn GenerativeBackend>,
    model: Model,
    system_instruction: Content,
    generation_config: GenerationConfig,
    history: Vec<Content>,
    usage: UsageMetadata,
}

impl DialogueHandle {
    /// Open a dialogue. Nothing is sent until the first turn.
    pub fn open(
        backend: Arc<dyn GenerativeBackend>,
        model: Model,
        system_instruction: impl Into<String>,
        generation_config: GenerationConfig,
    ) -> Self {
        Self {
            backend,
            model,
            system_instruction: Content::system(system_instruction),
            generation_config,
            history: Vec::new(),
            usage: UsageMetadata::default(),
        }
    }

    /// Append `text` as the next user turn and return the model's reply.
    ///
    /// The turn is recorded only when a reply with text comes back. History
    /// is not touched until then, so an error or a dropped future (for
    /// example under `tokio::time::timeout`) leaves the dialogue exactly as
    /// it was.
    pub async fn send_message(&mut self, text: &str) -> Result<String> {
        let turn = Content::user(text);
        let mut contents = self.history.clone();
        contents.push(turn.clone());

        let reply = self.exchange(contents).await?;
        self.history.push(turn);
        self.history.push(Content::model(reply.clone()));
        Ok(reply)
    }

    async fn exchange(&mut self, contents: Vec<Content>) -> Result<String> {
        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(self.system_instruction.clone()),
            generation_config: Some(self.generation_config),
        };
        let response = self
            .backend
            .generate_content(&self.model, &request)
            .await?;
        if let Some(usage) = response.usage_metadata {
            self.usage.prompt_token_count += usage.prompt_token_count;
            self.usage.candidates_token_count += usage.candidates_token_count;
            self.usage.total_token_count += usage.total_token_count;
        }
        if let Some(reason) = response.block_reason() {
            return Err(Error::empty_completion(format!("prompt blocked: {reason}")));
        }
        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(Error::empty_completion("response carried no text")),
        }
    }

    /// Number of completed exchanges.
    pub fn turn_count(&self) -> usize {
        self.history.len() / 2
    }

    /// Token usage accumulated across every request of this dialogue.
    pub fn usage(&self) -> UsageMetadata {
        self.usage
    }
}

impl fmt::Debug for DialogueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogueHandle")
            .field("model", &self.model)
            .field("turns", &self.turn_count())
            .finish_non_exhaustive()
    }
}
