//! The conversation session.
//!
//! A [`ConversationSession`] mediates exactly one dialogue with a generative
//! backend. It is constructed uninitialized, becomes ready after a single
//! successful [`ConversationSession::initialize`], and from then on turns
//! every [`ConversationSession::send`] into a non-empty reply. Backend
//! failures never escape: they are logged and replaced by the configured
//! fallback reply.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::backend::GenerativeBackend;
use crate::dialogue::DialogueHandle;
use crate::error::{Error, Result};
use crate::observability::{
    SESSION_FALLBACKS, SESSION_TIMEOUTS, SESSION_TURN_DURATION, SESSION_TURNS,
};
use crate::types::{GenerationConfig, Model};

/// Everything that stays fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Model to converse with.
    pub model: Model,

    /// Standing instruction for the model.
    pub system_prompt: String,

    /// Sampling parameters applied to every turn.
    pub generation: GenerationConfig,

    /// Reply substituted whenever the backend fails to produce one.
    pub fallback_reply: String,

    /// Upper bound on a single turn; `None` waits for the backend's own
    /// timeout.
    pub timeout: Option<Duration>,
}

impl SessionConfig {
    /// Create a config with no per-turn timeout.
    pub fn new(
        model: Model,
        system_prompt: impl Into<String>,
        generation: GenerationConfig,
        fallback_reply: impl Into<String>,
    ) -> Self {
        Self {
            model,
            system_prompt: system_prompt.into(),
            generation,
            fallback_reply: fallback_reply.into(),
            timeout: None,
        }
    }

    /// Sets the per-turn timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the config before a session is opened with it.
    pub fn validate(&self) -> Result<()> {
        if self.system_prompt.trim().is_empty() {
            return Err(Error::validation(
                "system prompt must not be empty",
                Some("system_prompt".to_string()),
            ));
        }
        if self.fallback_reply.trim().is_empty() {
            return Err(Error::validation(
                "fallback reply must not be empty",
                Some("fallback_reply".to_string()),
            ));
        }
        if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(Error::validation(
                "timeout must be greater than zero",
                Some("timeout".to_string()),
            ));
        }
        self.generation.validate()
    }
}

enum SessionState {
    Uninitialized,
    Ready {
        config: SessionConfig,
        handle: DialogueHandle,
    },
}

/// Counters for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Calls to `send` that reached the backend.
    pub turns: u64,
    /// Turns answered with the fallback reply.
    pub fallbacks: u64,
    /// Turns that hit the per-turn timeout.
    pub timeouts: u64,
    /// Exchanges recorded in the dialogue.
    pub recorded_turns: usize,
    /// Tokens billed across the session.
    pub total_tokens: u64,
}

/// One conversation with a generative backend.
pub struct ConversationSession {
    backend: Arc<dyn GenerativeBackend>,
    state: SessionState,
    stats: SessionStats,
}

impl ConversationSession {
    /// Creates an uninitialized session over `backend`.
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend,
            state: SessionState::Uninitialized,
            stats: SessionStats::default(),
        }
    }

    /// Fix the configuration and open the dialogue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInitialized`] if the session is already ready
    /// and a validation error if `config` is out of range. A failed call
    /// leaves the session uninitialized.
    pub fn initialize(&mut self, config: SessionConfig) -> Result<()> {
        if self.is_ready() {
            return Err(Error::AlreadyInitialized);
        }
        config.validate()?;
        let handle = DialogueHandle::open(
            Arc::clone(&self.backend),
            config.model.clone(),
            config.system_prompt.clone(),
            config.generation,
        );
        log::info!("conversation session ready (model {})", config.model);
        self.state = SessionState::Ready { config, handle };
        Ok(())
    }

    /// Returns true once `initialize` has succeeded.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready { .. })
    }

    /// Send `text` as the next turn and return the reply.
    ///
    /// The reply is never empty. When the backend fails, times out or returns
    /// no usable text, the configured fallback is returned instead and the
    /// failure is logged.
    ///
    /// # Errors
    ///
    /// Only contract violations are reported: [`Error::NotInitialized`]
    /// before `initialize`, and a validation error for blank `text`.
    pub async fn send(&mut self, text: &str) -> Result<String> {
        let SessionState::Ready { config, handle } = &mut self.state else {
            return Err(Error::NotInitialized);
        };
        if text.trim().is_empty() {
            return Err(Error::validation(
                "message text must not be blank",
                Some("text".to_string()),
            ));
        }

        SESSION_TURNS.click();
        self.stats.turns += 1;
        let start = Instant::now();
        let outcome = match config.timeout {
            Some(limit) => match tokio::time::timeout(limit, handle.send_message(text)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(Error::timeout(
                    "turn exceeded session timeout",
                    Some(limit.as_secs_f64()),
                )),
            },
            None => handle.send_message(text).await,
        };
        SESSION_TURN_DURATION.add(start.elapsed().as_secs_f64());

        match outcome {
            Ok(reply) => Ok(reply),
            Err(err) => {
                SESSION_FALLBACKS.click();
                self.stats.fallbacks += 1;
                if err.is_timeout() {
                    SESSION_TIMEOUTS.click();
                    self.stats.timeouts += 1;
                }
                if err.is_rate_limit() {
                    log::warn!("rate limited by backend, answering with fallback: {err}");
                } else {
                    log::warn!("service unavailable, answering with fallback: {err}");
                }
                Ok(config.fallback_reply.clone())
            }
        }
    }

    /// The fixed configuration, once initialized.
    pub fn config(&self) -> Option<&SessionConfig> {
        match &self.state {
            SessionState::Ready { config, .. } => Some(config),
            SessionState::Uninitialized => None,
        }
    }

    /// The standing instruction, once initialized.
    pub fn system_prompt(&self) -> Option<&str> {
        self.config().map(|config| config.system_prompt.as_str())
    }

    /// Returns a snapshot of the session counters.
    pub fn stats(&self) -> SessionStats {
        let mut stats = self.stats.clone();
        if let SessionState::Ready { handle, .. } = &self.state {
            stats.recorded_turns = handle.turn_count();
            stats.total_tokens = handle.usage().total_token_count;
        }
        stats
    }
}
