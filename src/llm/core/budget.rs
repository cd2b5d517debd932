//! Token ceilings for a model's context window

use serde::{Deserialize, Serialize};

use super::error::PromptError;

/// Context windows above this size reserve the response cap up front
const LARGE_CONTEXT_THRESHOLD: u32 = 32_000;

/// How much of the context window the prompt and the response may use.
///
/// Always satisfies `max_prompt_tokens + max_response_tokens <= max_context_tokens`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptBudget {
    pub max_context_tokens: u32,
    pub max_response_tokens: u32,
    pub max_prompt_tokens: u32,
}

impl PromptBudget {
    /// Validate an explicit budget
    pub fn new(
        max_context_tokens: u32,
        max_response_tokens: u32,
        max_prompt_tokens: u32,
    ) -> Result<Self, PromptError> {
        let fits = u64::from(max_prompt_tokens) + u64::from(max_response_tokens)
            <= u64::from(max_context_tokens);
        if !fits {
            return Err(PromptError::Configuration {
                max_prompt_tokens,
                max_response_tokens,
                max_context_tokens,
            });
        }

        Ok(Self {
            max_context_tokens,
            max_response_tokens,
            max_prompt_tokens,
        })
    }

    /// Derive a budget from a model's context size.
    ///
    /// Large windows (over 32k) have the response cap taken off the context
    /// size first. Without an explicit prompt ceiling the prompt gets whatever
    /// the response leaves over.
    pub fn derive(
        model_context_tokens: u32,
        max_response_tokens: u32,
        max_prompt_tokens: Option<u32>,
    ) -> Result<Self, PromptError> {
        let max_context_tokens = if model_context_tokens > LARGE_CONTEXT_THRESHOLD {
            model_context_tokens.saturating_sub(max_response_tokens)
        } else {
            model_context_tokens
        };

        let max_prompt_tokens = match max_prompt_tokens.filter(|tokens| *tokens > 0) {
            Some(tokens) => tokens,
            None => max_context_tokens.checked_sub(max_response_tokens).ok_or(
                PromptError::Configuration {
                    max_prompt_tokens: 0,
                    max_response_tokens,
                    max_context_tokens,
                },
            )?,
        };

        Self::new(max_context_tokens, max_response_tokens, max_prompt_tokens)
    }

    /// Tokens left for the response once the prompt has used `prompt_tokens`,
    /// never more than the response cap.
    pub fn resolve_max_output_tokens(&self, prompt_tokens: u32) -> u32 {
        self.max_context_tokens
            .saturating_sub(prompt_tokens)
            .min(self.max_response_tokens)
    }
}
