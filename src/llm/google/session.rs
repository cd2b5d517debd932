//! Prompt session for a configured Google model

use std::sync::Arc;

use tracing::{debug, info};

use super::model::{self, resolve_model, response_sender, select_counter, ModelCapabilities};
use super::options::GoogleClientOptions;
use super::payload::{ChatInstance, ChatMessage, ChatPayload, ChatRole, Example, PromptPayload};
use super::prompt::{PromptWindowBuilder, DEFAULT_USER_LABEL};
use crate::conversation::{ConversationStore, ConversationTree};
use crate::llm::core::{
    budget::PromptBudget, config::ModelOptions, error::PromptError, types::BuildResult,
};
use crate::llm::tokenizer::{TokenCounter, TokenizerProvider};
use crate::models::{Author, Message};

/// Marks the start of a turn in flat prompts
pub const START_TOKEN: &str = "||>";
/// Marks the end of a turn in flat prompts
pub const END_TOKEN: &str = "";
const DIFF_MARKER: &str = "<|diff_marker|>";

/// A validated model configuration that turns conversation history into
/// request payloads.
///
/// Construction fails if the token budget does not fit the model's context
/// window, so no build is ever attempted with an invalid budget.
#[derive(Debug)]
pub struct PromptSession {
    model_options: ModelOptions,
    capabilities: ModelCapabilities,
    prompt_prefix: Option<String>,
    examples: Vec<Example>,
    has_attachments: bool,
    sender: String,
    builder: PromptWindowBuilder,
}

impl PromptSession {
    /// Configure a session, counting tokens with the model's tokenizer
    pub fn new(
        options: GoogleClientOptions,
        tokenizers: &TokenizerProvider,
    ) -> Result<Self, PromptError> {
        let model_name = resolve_model(&options.model_options.model, options.has_attachments);
        let capabilities = ModelCapabilities::detect(&model_name);
        let counter = select_counter(&model_name, &capabilities, tokenizers)?;
        Self::with_counter(options, counter)
    }

    /// Configure a session with a caller-supplied token counter
    pub fn with_counter(
        options: GoogleClientOptions,
        counter: Arc<dyn TokenCounter>,
    ) -> Result<Self, PromptError> {
        let GoogleClientOptions {
            mut model_options,
            prompt_prefix,
            model_label,
            user_label,
            sender,
            examples,
            max_prompt_tokens,
            max_context_tokens,
            has_attachments,
        } = options;

        model_options.model = resolve_model(&model_options.model, has_attachments);
        let model_name = model_options.model.clone();
        let capabilities = ModelCapabilities::detect(&model_name);

        let context_tokens = max_context_tokens
            .filter(|tokens| *tokens > 0)
            .or_else(|| model::max_context_tokens(&model_name))
            .ok_or_else(|| PromptError::UnknownModel(model_name.clone()))?;
        let budget = PromptBudget::derive(
            context_tokens,
            model_options.max_response_tokens(),
            max_prompt_tokens,
        )?;

        let model_label = model_label.filter(|label| !label.is_empty());
        let user_label = user_label.filter(|label| !label.is_empty());

        if model_options.stop.is_none() {
            let label = user_label.as_deref().unwrap_or(DEFAULT_USER_LABEL);
            model_options.stop = Some(default_stop_sequences(label));
        }

        let sender = sender.unwrap_or_else(|| response_sender(&model_name, model_label.as_deref()));

        let mut builder = PromptWindowBuilder::new(budget, counter).with_end_token(END_TOKEN);
        if let Some(label) = user_label {
            builder = builder.with_user_label(label);
        }
        if let Some(label) = model_label {
            builder = builder.with_model_label(label);
        }
        if let Some(prefix) = &prompt_prefix {
            builder = builder.with_prompt_prefix(prefix.clone());
        }

        let examples: Vec<Example> = examples.into_iter().filter(Example::is_complete).collect();

        info!(
            model = %model_name,
            max_context_tokens = budget.max_context_tokens,
            max_prompt_tokens = budget.max_prompt_tokens,
            max_response_tokens = budget.max_response_tokens,
            "Configured prompt session"
        );

        Ok(Self {
            model_options,
            capabilities,
            prompt_prefix,
            examples,
            has_attachments,
            sender,
            builder,
        })
    }

    pub fn budget(&self) -> &PromptBudget {
        self.builder.budget()
    }

    pub fn model_options(&self) -> &ModelOptions {
        &self.model_options
    }

    pub fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }

    /// Display name for the model's replies
    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn builder(&self) -> &PromptWindowBuilder {
        &self.builder
    }

    /// Build the request payload for the branch ending at `parent_message_id`.
    ///
    /// `image_urls` are only used when the session was configured with
    /// attachments.
    pub async fn build_messages(
        &self,
        messages: &[Message],
        parent_message_id: &str,
        image_urls: Vec<String>,
    ) -> Result<PromptPayload, PromptError> {
        if self.has_attachments {
            return self
                .build_vision_messages(messages, parent_message_id, image_urls)
                .await;
        }

        if self.capabilities.uses_prompt_window() {
            let build = self.builder.build(messages, parent_message_id).await?;
            let parameters = self.parameters_for(&build);
            return Ok(PromptPayload::Prompt { build, parameters });
        }

        Ok(PromptPayload::Chat {
            payload: self.chat_payload(messages, parent_message_id),
        })
    }

    /// Fetch a conversation from `store` and build its payload
    pub async fn build_for_conversation(
        &self,
        store: &dyn ConversationStore,
        conversation_id: &str,
        parent_message_id: &str,
        image_urls: Vec<String>,
    ) -> Result<PromptPayload, PromptError> {
        let messages = store.messages(conversation_id).await?;
        debug!(conversation_id, messages = messages.len(), "Loaded conversation");
        self.build_messages(&messages, parent_message_id, image_urls)
            .await
    }

    async fn build_vision_messages(
        &self,
        messages: &[Message],
        parent_message_id: &str,
        image_urls: Vec<String>,
    ) -> Result<PromptPayload, PromptError> {
        let build = self.builder.build(messages, parent_message_id).await?;

        let message = ChatMessage {
            role: ChatRole::User,
            author: self.builder.user_label().to_string(),
            content: build.prompt_text.clone(),
            image_urls,
        };
        let payload = ChatPayload {
            instances: vec![ChatInstance {
                messages: vec![message],
                context: None,
                examples: Vec::new(),
            }],
            parameters: self.parameters_for(&build),
        };

        Ok(PromptPayload::Vision { payload, build })
    }

    fn chat_payload(&self, messages: &[Message], parent_message_id: &str) -> ChatPayload {
        let tree = ConversationTree::new(messages);
        let messages = tree
            .path_to(parent_message_id)
            .into_iter()
            .map(|message| ChatMessage {
                role: message.author.into(),
                author: match message.author {
                    Author::User => self.builder.user_label().to_string(),
                    Author::Model => self.builder.model_label().to_string(),
                },
                content: message.body().to_string(),
                image_urls: Vec::new(),
            })
            .collect::<Vec<_>>();

        let context = self
            .prompt_prefix
            .clone()
            .filter(|prefix| !prefix.trim().is_empty());

        debug!(
            messages = messages.len(),
            has_context = context.is_some(),
            examples = self.examples.len(),
            "Built chat payload"
        );

        ChatPayload {
            instances: vec![ChatInstance {
                messages,
                context,
                examples: self.examples.clone(),
            }],
            parameters: self.model_options.clone(),
        }
    }

    fn parameters_for(&self, build: &BuildResult) -> ModelOptions {
        let mut parameters = self.model_options.clone();
        parameters.max_output_tokens = Some(build.resolved_max_output_tokens);
        parameters
    }
}

fn default_stop_sequences(user_label: &str) -> Vec<String> {
    let mut stop = vec![START_TOKEN.to_string()];
    if !END_TOKEN.is_empty() && END_TOKEN != START_TOKEN {
        stop.push(END_TOKEN.to_string());
    }
    stop.push(format!("\n{user_label}:"));
    stop.push(DIFF_MARKER.to_string());
    stop
}
