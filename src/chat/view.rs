//! The chat view model.
//!
//! [`ChatView`] owns the transcript, the pending input and the busy flag, and
//! drives its own [`ConversationSession`]. Every submission runs start to
//! finish inside one `async fn`: append the user message, await the reply,
//! append the agent message. Because every entry point takes `&mut self`,
//! submissions can never overlap.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::GenerativeBackend;
use crate::chat::render::Renderer;
use crate::chat::transcript::{Message, Sender, Transcript};
use crate::error::{Error, Result};
use crate::observability::{VIEW_BLANK_SUBMISSIONS, VIEW_SUBMISSIONS};
use crate::profile::SalesProfile;
use crate::session::{ConversationSession, SessionStats};
use crate::types::Model;

/// View state for one chat.
pub struct ChatView {
    backend: Arc<dyn GenerativeBackend>,
    profile: SalesProfile,
    model: Model,
    timeout: Option<Duration>,
    session: ConversationSession,
    transcript: Transcript,
    input: String,
    busy: bool,
    started: bool,
}

impl ChatView {
    /// Build a view and initialize its session from `profile`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the profile produces an invalid session
    /// configuration.
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        profile: SalesProfile,
        model: Model,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let session = open_session(&backend, &profile, &model, timeout)?;
        Ok(Self {
            backend,
            profile,
            model,
            timeout,
            session,
            transcript: Transcript::new(),
            input: String::new(),
            busy: false,
            started: false,
        })
    }

    /// Open the conversation: send the startup directive and show the reply
    /// as the first agent message. Later calls return that same message.
    pub async fn start(&mut self, renderer: &mut dyn Renderer) -> Result<&Message> {
        if !self.started {
            let directive = self.profile.render_startup_directive();
            let reply = self.exchange(&directive, renderer).await?;
            self.started = true;
            let message = self.transcript.push(Sender::Agent, reply);
            renderer.print_message(message);
        }
        self.transcript
            .messages()
            .first()
            .ok_or(Error::NotInitialized)
    }

    /// Submit `text` as the user.
    ///
    /// Blank text is ignored and yields `Ok(None)`. Otherwise returns the
    /// agent's reply message. The conversation is opened first if `start`
    /// has not run yet, so the opener always precedes user input.
    pub async fn submit(
        &mut self,
        text: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<Option<&Message>> {
        if text.trim().is_empty() {
            VIEW_BLANK_SUBMISSIONS.click();
            return Ok(None);
        }
        if !self.started {
            self.start(renderer).await?;
        }
        VIEW_SUBMISSIONS.click();

        let message = self.transcript.push(Sender::User, text);
        renderer.print_message(message);

        let reply = self.exchange(text, renderer).await?;
        let message = self.transcript.push(Sender::Agent, reply);
        renderer.print_message(message);
        Ok(Some(message))
    }

    /// Replace the pending input.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// The pending input.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Submit the pending input and clear it.
    pub async fn submit_input(&mut self, renderer: &mut dyn Renderer) -> Result<Option<&Message>> {
        let text = std::mem::take(&mut self.input);
        self.submit(&text, renderer).await
    }

    /// Submit the predefined quick reply at `index` (zero-based).
    ///
    /// # Errors
    ///
    /// Returns a validation error if there is no quick reply at `index`.
    pub async fn quick_reply(
        &mut self,
        index: usize,
        renderer: &mut dyn Renderer,
    ) -> Result<Option<&Message>> {
        let Some(text) = self.profile.quick_replies.get(index).cloned() else {
            return Err(Error::validation(
                format!(
                    "no quick reply {} (have {})",
                    index + 1,
                    self.profile.quick_replies.len()
                ),
                Some("index".to_string()),
            ));
        };
        self.submit(&text, renderer).await
    }

    /// Start over: drop the session and transcript, open a fresh session and
    /// run the opener again.
    pub async fn reset(&mut self, renderer: &mut dyn Renderer) -> Result<&Message> {
        self.session = open_session(&self.backend, &self.profile, &self.model, self.timeout)?;
        self.transcript = Transcript::new();
        self.input.clear();
        self.started = false;
        log::info!("chat reset");
        self.start(renderer).await
    }

    async fn exchange(&mut self, text: &str, renderer: &mut dyn Renderer) -> Result<String> {
        self.busy = true;
        renderer.print_typing(&self.profile.typing_label);
        let reply = self.session.send(text).await;
        renderer.clear_typing();
        self.busy = false;
        reply
    }

    /// The transcript so far.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// True while a reply is pending.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The persona in use.
    pub fn profile(&self) -> &SalesProfile {
        &self.profile
    }

    /// The model in use.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The per-turn timeout in use.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The instruction the session was opened with.
    pub fn system_prompt(&self) -> Option<&str> {
        self.session.system_prompt()
    }

    /// Session counters.
    pub fn session_stats(&self) -> SessionStats {
        self.session.stats()
    }
}

fn open_session(
    backend: &Arc<dyn GenerativeBackend>,
    profile: &SalesProfile,
    model: &Model,
    timeout: Option<Duration>,
) -> Result<ConversationSession> {
    let mut session = ConversationSession::new(Arc::clone(backend));
    session.initialize(profile.session_config(model.clone(), timeout))?;
    Ok(session)
}
