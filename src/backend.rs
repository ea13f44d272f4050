//! The outbound seam to a generative-text service.

use crate::error::Result;
use crate::types::{GenerateContentRequest, GenerateContentResponse, Model};

/// A service that appends a turn to a dialogue and returns the completion.
///
/// [`Gemini`](crate::Gemini) is the production implementation. The
/// conversation session only ever talks to this trait, which keeps it
/// independent of HTTP.
#[async_trait::async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Generate the next model turn for `request` using `model`.
    async fn generate_content(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}
