//! Environment configuration for the `chatwin` binary

use std::env;

use thiserror::Error;

use crate::llm::{GoogleClientOptions, ModelOptions};

pub const MODEL_VAR: &str = "CHATWIN_MODEL";
pub const MAX_OUTPUT_TOKENS_VAR: &str = "CHATWIN_MAX_OUTPUT_TOKENS";
pub const MAX_PROMPT_TOKENS_VAR: &str = "CHATWIN_MAX_PROMPT_TOKENS";
pub const PROMPT_PREFIX_VAR: &str = "CHATWIN_PROMPT_PREFIX";
pub const MODEL_LABEL_VAR: &str = "CHATWIN_MODEL_LABEL";
pub const USER_LABEL_VAR: &str = "CHATWIN_USER_LABEL";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: String, value: String },
}

/// Settings read from `CHATWIN_*` variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub model: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub max_prompt_tokens: Option<u32>,
    pub prompt_prefix: Option<String>,
    pub model_label: Option<String>,
    pub user_label: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let number = |key: &str| -> Result<Option<u32>, SettingsError> {
            text(key)
                .map(|value| {
                    value
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|tokens| *tokens > 0)
                        .ok_or_else(|| SettingsError::InvalidNumber {
                            key: key.to_string(),
                            value: value.clone(),
                        })
                })
                .transpose()
        };

        Ok(Self {
            model: text(MODEL_VAR),
            max_output_tokens: number(MAX_OUTPUT_TOKENS_VAR)?,
            max_prompt_tokens: number(MAX_PROMPT_TOKENS_VAR)?,
            prompt_prefix: text(PROMPT_PREFIX_VAR),
            model_label: text(MODEL_LABEL_VAR),
            user_label: text(USER_LABEL_VAR),
        })
    }

    pub fn into_options(self) -> GoogleClientOptions {
        let mut model_options = match self.model {
            Some(model) => ModelOptions::new(model),
            None => ModelOptions::default(),
        };
        model_options.max_output_tokens = self.max_output_tokens;

        GoogleClientOptions {
            model_options,
            prompt_prefix: self.prompt_prefix,
            model_label: self.model_label,
            user_label: self.user_label,
            max_prompt_tokens: self.max_prompt_tokens,
            ..GoogleClientOptions::default()
        }
    }
}
