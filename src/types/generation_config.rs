use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sampling parameters sent with every request of a dialogue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus-sampling threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl GenerationConfig {
    /// Create a config with both parameters set.
    pub fn new(temperature: f32, top_p: f32) -> Self {
        Self {
            temperature: Some(temperature),
            top_p: Some(top_p),
        }
    }

    /// Check that every set parameter is within the range the API accepts.
    pub fn validate(&self) -> Result<()> {
        if let Some(temperature) = self.temperature
            && !(temperature.is_finite() && (0.0..=2.0).contains(&temperature))
        {
            return Err(Error::validation(
                format!("temperature must be between 0.0 and 2.0, got {temperature}"),
                Some("temperature".to_string()),
            ));
        }
        if let Some(top_p) = self.top_p
            && !(top_p.is_finite() && (0.0..=1.0).contains(&top_p))
        {
            return Err(Error::validation(
                format!("top_p must be between 0.0 and 1.0, got {top_p}"),
                Some("top_p".to_string()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn serializes_camel_case() {
        let config = GenerationConfig::new(0.8, 0.95);
        assert_eq!(
            to_value(config).unwrap(),
            json!({"temperature": 0.8f32, "topP": 0.95f32})
        );
        assert_eq!(to_value(GenerationConfig::default()).unwrap(), json!({}));
    }

    #[test]
    fn validate_ranges() {
        assert!(GenerationConfig::new(0.8, 0.95).validate().is_ok());
        assert!(GenerationConfig::new(2.5, 0.95).validate().is_err());
        assert!(GenerationConfig::new(0.8, 1.5).validate().is_err());
        assert!(GenerationConfig::new(f32::NAN, 0.5).validate().is_err());
        assert!(GenerationConfig::default().validate().is_ok());
    }
}
