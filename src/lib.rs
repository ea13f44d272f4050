// Public modules
pub mod backend;
pub mod chat;
pub mod client;
pub mod dialogue;
pub mod error;
pub mod observability;
pub mod profile;
pub mod session;
pub mod types;

// Re-exports
pub use backend::GenerativeBackend;
pub use client::Gemini;
pub use dialogue::DialogueHandle;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use profile::SalesProfile;
pub use session::{ConversationSession, SessionConfig, SessionStats};
pub use types::*;
