//! Error types for prompt construction

use thiserror::Error;

use crate::conversation::StoreError;
use crate::llm::tokenizer::TokenizerError;

/// Errors that can occur while configuring or building a prompt
#[derive(Debug, Error)]
pub enum PromptError {
    /// Budget does not fit the model's context window
    #[error(
        "maxPromptTokens + maxOutputTokens ({max_prompt_tokens} + {max_response_tokens} = {}) must be less than or equal to maxContextTokens ({max_context_tokens})",
        token_sum(.max_prompt_tokens, .max_response_tokens)
    )]
    Configuration {
        max_prompt_tokens: u32,
        max_response_tokens: u32,
        max_context_tokens: u32,
    },

    /// No context size is known for the model
    #[error("Unknown context size for model: {0}")]
    UnknownModel(String),

    /// The most recent turn alone does not fit the budget
    #[error("Prompt is too long. Max token count is {max_tokens}, but prompt is {prompt_tokens} tokens long.")]
    PromptTooLong { max_tokens: u32, prompt_tokens: u32 },

    /// Tokenizer failures are passed through unchanged
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    /// Conversation could not be loaded
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn token_sum(a: &u32, b: &u32) -> u64 {
    u64::from(*a) + u64::from(*b)
}
