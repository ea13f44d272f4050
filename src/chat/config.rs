//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::error::{Error, Result};
use crate::profile::SalesProfile;
use crate::types::Model;

/// Default upper bound on a single reply.
const DEFAULT_TIMEOUT_SECS: u64 = 45;

/// Command-line arguments for the salesbot-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-3-flash-preview)", "MODEL")]
    pub model: Option<String>,

    /// YAML file describing the sales persona.
    #[arrrg(optional, "Sales profile YAML (default: built-in persona)", "FILE")]
    pub profile: Option<String>,

    /// Override the persona's sampling temperature.
    #[arrrg(optional, "Sampling temperature 0.0-2.0", "TEMP")]
    pub temperature: Option<String>,

    /// Override the persona's nucleus-sampling threshold.
    #[arrrg(optional, "Top-p 0.0-1.0", "TOP_P")]
    pub top_p: Option<String>,

    /// Per-reply timeout in seconds; 0 disables it.
    #[arrrg(optional, "Seconds to wait for a reply (default: 45, 0 = no limit)", "SECS")]
    pub timeout: Option<u64>,

    /// Alternate API base URL.
    #[arrrg(optional, "API base URL (for proxies)", "URL")]
    pub base_url: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// The sales persona.
    pub profile: SalesProfile,

    /// Upper bound on a single reply.
    pub timeout: Option<Duration>,

    /// Alternate API base URL.
    pub base_url: Option<String>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-3-flash-preview
    /// - Profile: built-in persona
    /// - Timeout: 45 seconds
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            profile: SalesProfile::default(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            base_url: None,
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the persona.
    pub fn with_profile(mut self, profile: SalesProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Sets the per-reply timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    fn try_from(args: ChatArgs) -> Result<Self> {
        let model = args
            .model
            .map(|s| s.parse::<Model>().unwrap_or(Model::Custom(s)))
            .unwrap_or_default();

        let mut profile = match args.profile {
            Some(path) => SalesProfile::from_file(path)?,
            None => SalesProfile::default(),
        };
        if let Some(temperature) = args.temperature {
            profile.temperature = parse_f32(&temperature, "temperature")?;
        }
        if let Some(top_p) = args.top_p {
            profile.top_p = parse_f32(&top_p, "top_p")?;
        }
        profile.validate()?;

        let timeout = match args.timeout {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        };

        Ok(ChatConfig {
            model,
            profile,
            timeout,
            base_url: args.base_url,
            use_color: !args.no_color,
        })
    }
}

fn parse_f32(value: &str, param: &str) -> Result<f32> {
    value.trim().parse::<f32>().map_err(|_| {
        Error::validation(
            format!("expected a number, got {value:?}"),
            Some(param.to_string()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.model, Model::Known(KnownModel::Gemini3FlashPreview));
        assert_eq!(config.profile, SalesProfile::default());
        assert_eq!(config.timeout, Some(Duration::from_secs(45)));
        assert!(config.base_url.is_none());
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::try_from(ChatArgs::default()).unwrap();
        assert_eq!(config.model, Model::default());
        assert_eq!(config.timeout, Some(Duration::from_secs(45)));
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            model: Some("gemini-2.5-flash".to_string()),
            temperature: Some("0.3".to_string()),
            top_p: Some("0.5".to_string()),
            timeout: Some(0),
            base_url: Some("http://localhost:8080/v1beta/".to_string()),
            no_color: true,
            ..ChatArgs::default()
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(config.model, Model::Known(KnownModel::Gemini25Flash));
        assert_eq!(config.profile.temperature, 0.3);
        assert_eq!(config.profile.top_p, 0.5);
        assert_eq!(config.timeout, None);
        assert_eq!(
            config.base_url.as_deref(),
            Some("http://localhost:8080/v1beta/")
        );
        assert!(!config.use_color);
    }

    #[test]
    fn unknown_model_is_custom() {
        let args = ChatArgs {
            model: Some("tunedModels/closer-v2".to_string()),
            ..ChatArgs::default()
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(config.model, Model::Custom("tunedModels/closer-v2".to_string()));
    }

    #[test]
    fn bad_sampling_values_are_rejected() {
        let args = ChatArgs {
            temperature: Some("hot".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).unwrap_err().is_validation());

        let args = ChatArgs {
            top_p: Some("1.7".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).unwrap_err().is_validation());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_model(Model::Known(KnownModel::Gemini25Pro))
            .with_profile(SalesProfile {
                product: "Vitamax".to_string(),
                ..SalesProfile::default()
            })
            .with_timeout(None)
            .without_color();
        assert_eq!(config.model, Model::Known(KnownModel::Gemini25Pro));
        assert_eq!(config.profile.product, "Vitamax");
        assert_eq!(config.timeout, None);
        assert!(!config.use_color);
    }
}
