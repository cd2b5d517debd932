//! Prompt construction for Google models (PaLM2, Codey, Gemini)

pub mod model;
pub mod options;
pub mod payload;
pub mod prompt;
pub mod session;

pub use options::GoogleClientOptions;
pub use payload::{ChatInstance, ChatMessage, ChatPayload, ChatRole, Example, PromptPayload};
pub use prompt::PromptWindowBuilder;
pub use session::PromptSession;
