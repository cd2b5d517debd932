//! Google model capabilities: context sizes, families and tokenizer choice

use std::sync::Arc;

use tracing::warn;

use crate::llm::tokenizer::{BpeCounter, Encoding, TokenizerError, TokenizerProvider};

/// Model substituted when a request carries attachments
pub const VISION_MODEL: &str = "gemini-pro-vision";
/// Model used for a vision request that has nothing to look at
pub const VISION_FALLBACK_MODEL: &str = "gemini-pro";

/// Model whose encoding stands in for PaLM2 text and unknown models
const TEXT_TOKENIZER_MODEL: &str = "text-davinci-003";

/// Context sizes by model name pattern
const CONTEXT_SIZES: &[(&str, u32)] = &[
    ("gemini", 32750),
    ("text-bison-32k", 32758),
    ("chat-bison-32k", 32758),
    ("code-bison-32k", 32758),
    ("codechat-bison-32k", 32758),
    ("code-", 6139),
    ("codechat-", 6139),
    ("text-", 8187),
    ("chat-", 8187),
];

/// Context window for `model`, `None` if no pattern matches.
///
/// An exact name match wins; otherwise the longest pattern contained in the name.
pub fn max_context_tokens(model: &str) -> Option<u32> {
    CONTEXT_SIZES
        .iter()
        .find(|(pattern, _)| *pattern == model)
        .or_else(|| {
            CONTEXT_SIZES
                .iter()
                .filter(|(pattern, _)| model.contains(pattern))
                .max_by_key(|(pattern, _)| pattern.len())
        })
        .map(|(_, tokens)| *tokens)
}

/// What kind of API a model name implies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelCapabilities {
    /// Generative Language API model (Gemini)
    pub is_generative: bool,
    pub is_vision: bool,
    /// Vertex AI chat model (e.g. chat-bison, codechat-bison)
    pub is_chat: bool,
    /// Vertex AI completion model (e.g. text-bison, code-bison)
    pub is_text: bool,
}

impl ModelCapabilities {
    pub fn detect(model: &str) -> Self {
        let is_generative = model.contains("gemini");
        let is_chat = !is_generative && model.contains("chat");
        let is_text =
            !is_generative && !is_chat && (model.contains("code") || model.contains("text"));

        Self {
            is_generative,
            is_vision: model.contains(VISION_MODEL),
            is_chat,
            is_text,
        }
    }

    /// Whether the request is sent as a flat prompt string
    pub fn uses_prompt_window(&self) -> bool {
        self.is_text
    }
}

/// Model to actually call, given whether the request has attachments
pub fn resolve_model(model: &str, has_attachments: bool) -> String {
    if has_attachments {
        return VISION_MODEL.to_string();
    }
    if ModelCapabilities::detect(model).is_vision {
        return VISION_FALLBACK_MODEL.to_string();
    }
    model.to_string()
}

/// Display name of the responding model
pub fn response_sender(model: &str, model_label: Option<&str>) -> String {
    if let Some(label) = model_label.filter(|label| !label.is_empty()) {
        return label.to_string();
    }
    if model.contains("gemini") {
        "Gemini".to_string()
    } else if model.contains("code") {
        "Codey".to_string()
    } else {
        "PaLM2".to_string()
    }
}

/// Pick the tokenizer used to budget prompts for `model`
pub fn select_counter(
    model: &str,
    capabilities: &ModelCapabilities,
    tokenizers: &TokenizerProvider,
) -> Result<Arc<BpeCounter>, TokenizerError> {
    if capabilities.is_chat || capabilities.is_generative {
        return tokenizers.encoding(Encoding::Cl100kBase);
    }
    if capabilities.is_text {
        return tokenizers.for_model(TEXT_TOKENIZER_MODEL);
    }

    tokenizers.for_model(model).or_else(|err| {
        warn!(model, %err, "Falling back to {TEXT_TOKENIZER_MODEL} tokenizer");
        tokenizers.for_model(TEXT_TOKENIZER_MODEL)
    })
}
