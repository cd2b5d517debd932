//! Per-conversation client options

use serde::{Deserialize, Serialize};

use super::payload::Example;
use crate::llm::core::config::ModelOptions;

/// Options a prompt session is configured from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleClientOptions {
    pub model_options: ModelOptions,
    /// System or context text
    pub prompt_prefix: Option<String>,
    /// Name of the model persona
    pub model_label: Option<String>,
    /// Name of the human
    pub user_label: Option<String>,
    /// Display name override for responses
    pub sender: Option<String>,
    /// Few-shot examples for chat models
    pub examples: Vec<Example>,
    /// Prompt ceiling; defaults to what the response cap leaves over
    pub max_prompt_tokens: Option<u32>,
    /// Context window override for models missing from the lookup
    pub max_context_tokens: Option<u32>,
    /// The request carries image attachments
    pub has_attachments: bool,
}

impl GoogleClientOptions {
    pub fn new(model_options: ModelOptions) -> Self {
        Self {
            model_options,
            ..Self::default()
        }
    }

    pub fn with_prompt_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prompt_prefix = Some(prefix.into());
        self
    }

    pub fn with_model_label(mut self, label: impl Into<String>) -> Self {
        self.model_label = Some(label.into());
        self
    }

    pub fn with_user_label(mut self, label: impl Into<String>) -> Self {
        self.user_label = Some(label.into());
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_examples(mut self, examples: Vec<Example>) -> Self {
        self.examples = examples;
        self
    }

    pub fn with_max_prompt_tokens(mut self, tokens: u32) -> Self {
        self.max_prompt_tokens = Some(tokens);
        self
    }

    pub fn with_max_context_tokens(mut self, tokens: u32) -> Self {
        self.max_context_tokens = Some(tokens);
        self
    }

    pub fn with_attachments(mut self, has_attachments: bool) -> Self {
        self.has_attachments = has_attachments;
        self
    }
}
