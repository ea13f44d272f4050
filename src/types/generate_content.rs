use serde::{Deserialize, Serialize};

use crate::types::{Content, GenerationConfig};

/// Body of a `models/{model}:generateContent` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Every turn of the dialogue so far, oldest first, ending with the new
    /// user turn.
    pub contents: Vec<Content>,

    /// Standing instruction for the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    /// Sampling parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Why the model stopped producing a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Natural stop point.
    Stop,
    /// The token limit was reached.
    MaxTokens,
    /// Flagged by safety filters.
    Safety,
    /// Flagged for recitation.
    Recitation,
    /// Any other reason.
    #[serde(other)]
    Other,
}

/// One generated alternative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The generated content.
    #[serde(default)]
    pub content: Option<Content>,

    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

/// Feedback on the prompt itself, set when the prompt was blocked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Reason the prompt was blocked.
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Token accounting for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt, including history and system instruction.
    #[serde(default)]
    pub prompt_token_count: u64,

    /// Tokens across all candidates.
    #[serde(default)]
    pub candidates_token_count: u64,

    /// Total tokens billed.
    #[serde(default)]
    pub total_token_count: u64,
}

/// Response to a `generateContent` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates; the first one is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Set when the prompt was rejected.
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,

    /// Token accounting.
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Build a response holding a single model turn. Handy for backends that
    /// are not HTTP.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content::model(text)),
                finish_reason: Some(FinishReason::Stop),
            }],
            prompt_feedback: None,
            usage_metadata: None,
        }
    }

    /// The reply text of the first candidate.
    ///
    /// Returns `None` when the prompt was blocked or when the first
    /// candidate carries no text.
    pub fn text(&self) -> Option<String> {
        if self
            .prompt_feedback
            .as_ref()
            .is_some_and(|feedback| feedback.block_reason.is_some())
        {
            return None;
        }
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(Content::text)
    }

    /// The block reason, if the prompt was blocked.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use serde_json::{json, to_value};

    #[test]
    fn request_wire_format() {
        let request = GenerateContentRequest {
            contents: vec![Content::user("hi")],
            system_instruction: Some(Content::system("sell")),
            generation_config: Some(GenerationConfig::new(0.5, 0.5)),
        };
        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "systemInstruction": {"parts": [{"text": "sell"}]},
                "generationConfig": {"temperature": 0.5, "topP": 0.5}
            })
        );
    }

    #[test]
    fn response_text_from_api_payload() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Olá! "}, {"text": "Tudo bem?"}]},
                "finishReason": "STOP",
                "index": 0
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16},
            "modelVersion": "gemini-3-flash-preview"
        }))
        .unwrap();
        assert_eq!(response.text(), Some("Olá! Tudo bem?".to_string()));
        assert_eq!(response.usage_metadata.unwrap().total_token_count, 16);
        assert_eq!(
            response.candidates[0].content.as_ref().unwrap().role,
            Some(Role::Model)
        );
    }

    #[test]
    fn unknown_finish_reason_is_other() {
        let candidate: Candidate =
            serde_json::from_value(json!({"finishReason": "MALFORMED_FUNCTION_CALL"})).unwrap();
        assert_eq!(candidate.finish_reason, Some(FinishReason::Other));
        assert_eq!(candidate.content, None);
    }

    #[test]
    fn blocked_prompt_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert_eq!(response.text(), None);
        assert_eq!(response.block_reason(), Some("SAFETY"));
    }

    #[test]
    fn empty_response_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.text(), None);
    }
}
