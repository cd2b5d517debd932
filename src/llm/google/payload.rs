//! Request payloads handed to the dispatching layer
//!
//! These types follow the Vertex AI `instances`/`parameters` request shape.

use serde::{Deserialize, Serialize};

use crate::llm::core::{config::ModelOptions, types::BuildResult};
use crate::models::Author;

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl From<Author> for ChatRole {
    fn from(author: Author) -> Self {
        match author {
            Author::User => ChatRole::User,
            Author::Model => ChatRole::Assistant,
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: ChatRole,
    /// Display label of the author
    pub author: String,
    pub content: String,
    /// Pre-encoded images sent along with the message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
}

/// One side of a few-shot example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleContent {
    pub content: String,
}

/// Few-shot input/output pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub input: ExampleContent,
    pub output: ExampleContent,
}

impl Example {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: ExampleContent {
                content: input.into(),
            },
            output: ExampleContent {
                content: output.into(),
            },
        }
    }

    /// Both sides carry content
    pub fn is_complete(&self) -> bool {
        !self.input.content.is_empty() && !self.output.content.is_empty()
    }
}

/// A chat request instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatInstance {
    pub messages: Vec<ChatMessage>,
    /// System context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
}

/// Chat request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPayload {
    pub instances: Vec<ChatInstance>,
    pub parameters: ModelOptions,
}

/// What a session produces for one request, depending on the model family
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptPayload {
    /// Flat prompt for completion models
    Prompt {
        build: BuildResult,
        parameters: ModelOptions,
    },
    /// Structured history for chat models
    Chat { payload: ChatPayload },
    /// Prompt window wrapped as a single user message with images
    Vision {
        payload: ChatPayload,
        build: BuildResult,
    },
}

impl PromptPayload {
    /// Response cap to send with the request
    pub fn max_output_tokens(&self) -> Option<u32> {
        match self {
            PromptPayload::Prompt { parameters, .. } => parameters.max_output_tokens,
            PromptPayload::Chat { payload } | PromptPayload::Vision { payload, .. } => {
                payload.parameters.max_output_tokens
            }
        }
    }

    /// Build result, for the variants that run the prompt window
    pub fn build_result(&self) -> Option<&BuildResult> {
        match self {
            PromptPayload::Prompt { build, .. } | PromptPayload::Vision { build, .. } => Some(build),
            PromptPayload::Chat { .. } => None,
        }
    }
}
