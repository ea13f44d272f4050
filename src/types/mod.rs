// Public modules
pub mod content;
pub mod generate_content;
pub mod generation_config;
pub mod model;

// Re-exports
pub use content::{Content, Part, Role};
pub use generate_content::{
    Candidate, FinishReason, GenerateContentRequest, GenerateContentResponse, PromptFeedback,
    UsageMetadata,
};
pub use generation_config::GenerationConfig;
pub use model::{KnownModel, Model, UnknownModel};
