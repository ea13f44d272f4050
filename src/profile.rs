//! Sales personas.
//!
//! A [`SalesProfile`] bundles everything product-specific about the agent:
//! the instruction template handed to the model, the directive that opens the
//! conversation, the in-character fallback reply, and the predefined quick
//! replies. One persona is built in; others are loaded from YAML:
//!
//! ```yaml
//! agent_name: "Elite Consultant"
//! product: "Ozenvita"
//! checkout_url: "https://shop.example.com/ozenvita"
//! startup_directive: "Open the conversation focused on Ozenvita and free shipping."
//! quick_replies:
//!   - "How much is it?"
//!   - "Send me the official link!"
//! ```
//!
//! Fields left out of the file keep their built-in values.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::session::SessionConfig;
use crate::types::{GenerationConfig, Model};

const DEFAULT_SYSTEM_PROMPT: &str = "\
You are {agent_name}, an elite sales agent for {product}, chatting with a prospect in a \
messaging app. Your goal is conversion.

KEY BENEFIT: FREE SHIPPING
- {product} ships free nationwide today. Use it as a closer: \"On top of everything, if you \
order now, shipping is on me, 100% free.\"

COMMUNICATION
- Natural, warm and engaging language. Use emojis sparingly and deliberately.
- Build rapport right away: use the prospect's name if you know it and acknowledge their pain.
- Find the blocker: low energy, trouble losing weight, low drive, lack of focus?
- Present {product} as the answer that unblocks body and mind.

CLOSING
1. Do not lead with the link. Build desire first.
2. When the prospect asks about price or how to buy, or shows they see the value, close.
3. When closing you MUST send the official checkout page: {checkout_url}
4. Mention that shipping is FREE when you send the link.

RULES
- Never leave an objection unanswered. If price comes up, talk about the cost of doing nothing.
- Be confident and polished, never pushy.
- Steer toward the link whenever the prospect is ready.";

/// Everything product-specific about the sales agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesProfile {
    /// Display name of the agent.
    pub agent_name: String,
    /// Product being sold.
    pub product: String,
    /// Official checkout page handed out when closing.
    pub checkout_url: String,
    /// Instruction template; `{agent_name}`, `{product}` and
    /// `{checkout_url}` are substituted.
    pub system_prompt: String,
    /// Sent once, before any user input, to produce the opening message.
    pub startup_directive: String,
    /// In-character reply used whenever the service fails.
    pub fallback_reply: String,
    /// Predefined replies the user can send with one command.
    pub quick_replies: Vec<String>,
    /// Shown while a reply is pending.
    pub typing_label: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus-sampling threshold.
    pub top_p: f32,
}

impl Default for SalesProfile {
    fn default() -> Self {
        Self {
            agent_name: "Elite Consultant".to_string(),
            product: "Ozenvita".to_string(),
            checkout_url: "https://shop.example.com/ozenvita".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            startup_directive: "Start the conversation focused on {product} and free shipping."
                .to_string(),
            fallback_reply: "We're experiencing very high demand right now, but my focus is on \
                             you. How can I help you secure your kit?"
                .to_string(),
            quick_replies: vec![
                "How much is it?".to_string(),
                "I want the official link!".to_string(),
                "Is shipping really free?".to_string(),
                "Do you have testimonials?".to_string(),
            ],
            typing_label: "Consultant is typing...".to_string(),
            temperature: 0.8,
            top_p: 0.95,
        }
    }
}

impl SalesProfile {
    /// Load a profile from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or
    /// describes an invalid profile.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            Error::io(format!("failed to read profile {}", path.display()), err)
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a profile from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let profile: Self = serde_yaml::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check the profile for values that would make a broken agent.
    pub fn validate(&self) -> Result<()> {
        for (param, value) in [
            ("product", &self.product),
            ("system_prompt", &self.system_prompt),
            ("startup_directive", &self.startup_directive),
            ("fallback_reply", &self.fallback_reply),
        ] {
            if value.trim().is_empty() {
                return Err(Error::validation(
                    format!("{param} must not be empty"),
                    Some(param.to_string()),
                ));
            }
        }
        if let Some(index) = self.quick_replies.iter().position(|r| r.trim().is_empty()) {
            return Err(Error::validation(
                format!("quick reply {} is blank", index + 1),
                Some("quick_replies".to_string()),
            ));
        }
        if !self.checkout_url.is_empty() {
            Url::parse(&self.checkout_url)?;
        }
        self.generation().validate()
    }

    fn fill(&self, template: &str) -> String {
        template
            .replace("{agent_name}", &self.agent_name)
            .replace("{product}", &self.product)
            .replace("{checkout_url}", &self.checkout_url)
    }

    /// The instruction handed to the model.
    pub fn render_system_prompt(&self) -> String {
        self.fill(&self.system_prompt)
    }

    /// The directive that produces the opening message.
    pub fn render_startup_directive(&self) -> String {
        self.fill(&self.startup_directive)
    }

    /// Sampling parameters of this persona.
    pub fn generation(&self) -> GenerationConfig {
        GenerationConfig::new(self.temperature, self.top_p)
    }

    /// Build the fixed session configuration for this persona.
    pub fn session_config(&self, model: Model, timeout: Option<Duration>) -> SessionConfig {
        SessionConfig::new(
            model,
            self.render_system_prompt(),
            self.generation(),
            self.fallback_reply.clone(),
        )
        .with_timeout(timeout)
    }
}
