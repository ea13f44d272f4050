use serde::{Deserialize, Serialize};

/// Who produced a piece of content in the dialogue.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person talking to the agent.
    User,

    /// The model.
    Model,
}

/// One part of a content entry.
///
/// Only text parts are produced by this crate. Parts of any other kind that
/// come back from the API deserialize with `text` unset and are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text of the part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Set on parts that carry the model's internal reasoning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            thought: None,
        }
    }

    /// Returns true when this part carries reasoning rather than reply text.
    pub fn is_thought(&self) -> bool {
        self.thought.unwrap_or(false)
    }
}

/// A single turn (or the system instruction) in Gemini's wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Role of the producer. Absent on system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// The parts making up this content.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a single-part text content with the given role.
    pub fn new_with_text(text: impl Into<String>, role: Role) -> Self {
        Self {
            role: Some(role),
            parts: vec![Part::text(text)],
        }
    }

    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new_with_text(text, Role::User)
    }

    /// Create a model turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self::new_with_text(text, Role::Model)
    }

    /// Create a system instruction, which carries no role.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text of all non-thought parts, if any carry text.
    pub fn text(&self) -> Option<String> {
        let mut out: Option<String> = None;
        for part in self.parts.iter().filter(|part| !part.is_thought()) {
            if let Some(text) = &part.text {
                out.get_or_insert_with(String::new).push_str(text);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn user_content_wire_format() {
        let content = Content::user("Qual o valor?");
        assert_eq!(
            to_value(&content).unwrap(),
            json!({"role": "user", "parts": [{"text": "Qual o valor?"}]})
        );
    }

    #[test]
    fn system_content_has_no_role() {
        let content = Content::system("Be persuasive.");
        assert_eq!(
            to_value(&content).unwrap(),
            json!({"parts": [{"text": "Be persuasive."}]})
        );
    }

    #[test]
    fn text_skips_thoughts_and_non_text_parts() {
        let content: Content = serde_json::from_value(json!({
            "role": "model",
            "parts": [
                {"text": "planning...", "thought": true},
                {"text": "Hello "},
                {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                {"text": "there"}
            ]
        }))
        .unwrap();
        assert_eq!(content.text(), Some("Hello there".to_string()));
    }

    #[test]
    fn text_is_none_without_text_parts() {
        let content = Content {
            role: Some(Role::Model),
            parts: vec![],
        };
        assert_eq!(content.text(), None);
    }
}
