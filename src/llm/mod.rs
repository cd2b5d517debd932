//! Prompt construction layer
//!
//! Turns a conversation branch into a request payload that fits the model's
//! context window, leaving room for the response.

pub mod core;
pub mod google;
pub mod tokenizer;

// Re-export commonly used types
pub use self::core::{
    budget::PromptBudget,
    config::ModelOptions,
    error::PromptError,
    types::{BuildResult, METADATA_TOKENS},
};

pub use google::{GoogleClientOptions, PromptPayload, PromptSession, PromptWindowBuilder};
pub use tokenizer::{Encoding, TokenCounter, TokenizerError, TokenizerProvider};
