//! Prompt window construction
//!
//! Linearizes the branch that ends at a message, folds it into author turns and
//! packs those turns newest-first into the prompt token budget. What does not
//! fit is dropped from the old end, so the most recent turns always survive.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info};

use crate::conversation::{group_messages, ConversationTree, MessageGroup};
use crate::llm::core::{
    budget::PromptBudget,
    error::PromptError,
    types::{BuildResult, METADATA_TOKENS},
};
use crate::llm::tokenizer::TokenCounter;
use crate::models::{Author, Message};

pub const DEFAULT_USER_LABEL: &str = "User";
pub const DEFAULT_MODEL_LABEL: &str = "Assistant";

/// A turn that made it into the prompt body
struct PackedGroup {
    group: MessageGroup,
    rendered: String,
    tokens: u32,
}

/// Builds budget-bounded prompts from conversation history
#[derive(Clone)]
pub struct PromptWindowBuilder {
    budget: PromptBudget,
    counter: Arc<dyn TokenCounter>,
    user_label: String,
    model_label: String,
    /// Names announced in the preamble; only set when configured explicitly
    user_name: Option<String>,
    model_name: Option<String>,
    prompt_prefix: Option<String>,
    end_token: String,
}

impl PromptWindowBuilder {
    pub fn new(budget: PromptBudget, counter: Arc<dyn TokenCounter>) -> Self {
        Self {
            budget,
            counter,
            user_label: DEFAULT_USER_LABEL.to_string(),
            model_label: DEFAULT_MODEL_LABEL.to_string(),
            user_name: None,
            model_name: None,
            prompt_prefix: None,
            end_token: String::new(),
        }
    }

    /// Label the user's turns and introduce the user by name
    pub fn with_user_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.user_name = Some(label.clone());
        self.user_label = label;
        self
    }

    /// Label the model's turns and tell the model its name
    pub fn with_model_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.model_name = Some(label.clone());
        self.model_label = label;
        self
    }

    /// System or context text placed in the preamble
    pub fn with_prompt_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prompt_prefix = Some(prefix.into());
        self
    }

    /// Marker closing each turn and the context block
    pub fn with_end_token(mut self, end_token: impl Into<String>) -> Self {
        self.end_token = end_token.into();
        self
    }

    pub fn budget(&self) -> &PromptBudget {
        &self.budget
    }

    pub fn user_label(&self) -> &str {
        &self.user_label
    }

    pub fn model_label(&self) -> &str {
        &self.model_label
    }

    /// Identity lines followed by the context block
    pub fn preamble(&self) -> String {
        let mut identity = String::new();
        if let Some(name) = &self.user_name {
            identity.push_str(&format!("\nHuman's name: {name}"));
        }
        if let Some(name) = &self.model_name {
            identity.push_str(&format!("\nYou are {name}"));
        }

        let mut context = self.prompt_prefix.as_deref().unwrap_or("").trim().to_string();
        if !context.is_empty() {
            if !context.ends_with(&self.end_token) {
                context = format!("{context}{}\n\n", self.end_token);
            }
            context = format!("\nContext:\n{context}");
        }

        format!("{identity}{context}")
    }

    /// Build the prompt for the branch ending at `parent_message_id`
    pub async fn build(
        &self,
        messages: &[Message],
        parent_message_id: &str,
    ) -> Result<BuildResult, PromptError> {
        let tree = ConversationTree::new(messages);
        let path = tree.path_to(parent_message_id);
        let groups = group_messages(&path, &self.user_label, &self.model_label);
        debug!(
            parent_message_id,
            messages = path.len(),
            turns = groups.len(),
            "Grouped conversation turns"
        );

        self.pack(groups).await
    }

    /// Pack turns newest-first until the budget is spent.
    ///
    /// Yields to the runtime after every packed turn.
    pub async fn pack(&self, mut groups: Vec<MessageGroup>) -> Result<BuildResult, PromptError> {
        let max_tokens = self.budget.max_prompt_tokens;
        let preamble = self.preamble();

        // The model spoke last: continue its turn instead of cueing a new one.
        let mut is_edited = groups.last().is_some_and(|group| group.author == Author::Model);
        let suffix = if is_edited {
            String::new()
        } else {
            format!("{preamble}\n\n{}:\n", self.model_label)
        };
        let mut current_tokens = if is_edited {
            self.counter.count_tokens(&preamble)
        } else {
            self.counter.count_tokens(&suffix)
        };

        // Nothing can be packed under an overrunning suffix or preamble.
        if current_tokens > max_tokens {
            return Err(PromptError::PromptTooLong {
                max_tokens,
                prompt_tokens: current_tokens,
            });
        }

        let mut body: VecDeque<PackedGroup> = VecDeque::new();

        // The newest turn is always weighed, even when the seed fills the budget
        // exactly, so it is never dropped without an error.
        while current_tokens < max_tokens || body.is_empty() {
            let Some(group) = groups.pop() else {
                break;
            };
            let is_user = group.author == Author::User;

            let header = if is_user || !is_edited {
                format!("\n\n{}:", group.label)
            } else {
                format!("{preamble}\n\n{}:", group.label)
            };
            let rendered = format!("{header}\n{}{}\n", group.content(), self.end_token);
            let tokens = self.counter.count_tokens(&rendered);
            let next_tokens = current_tokens.saturating_add(tokens);

            if next_tokens > max_tokens {
                if body.is_empty() {
                    return Err(PromptError::PromptTooLong {
                        max_tokens,
                        prompt_tokens: next_tokens,
                    });
                }

                // A transcript must not open on a model turn, so a user turn that
                // does not fit takes its reply with it. One step only.
                let reply_packed = body
                    .front()
                    .is_some_and(|packed| packed.group.author == Author::Model);
                if is_user && reply_packed {
                    if let Some(removed) = body.pop_front() {
                        current_tokens -= removed.tokens;
                        debug!(tokens = removed.tokens, "Dropped reply to truncated user turn");
                    }
                }

                debug!(
                    author = ?group.author,
                    tokens,
                    remaining_turns = groups.len(),
                    "Turn exceeds prompt budget, truncating history"
                );
                break;
            }

            current_tokens = next_tokens;
            body.push_front(PackedGroup {
                group,
                rendered,
                tokens,
            });
            is_edited = false;

            tokio::task::yield_now().await;
        }

        let prompt_body: String = body.iter().map(|packed| packed.rendered.as_str()).collect();
        let prompt_text = format!("{prompt_body}{suffix}").trim().to_string();

        current_tokens = current_tokens.saturating_add(METADATA_TOKENS);
        let resolved_max_output_tokens = self.budget.resolve_max_output_tokens(current_tokens);

        info!(
            turns = body.len(),
            prompt_tokens = current_tokens,
            max_prompt_tokens = max_tokens,
            max_output_tokens = resolved_max_output_tokens,
            "Built prompt window"
        );

        Ok(BuildResult {
            prompt_text,
            included_context: body.into_iter().map(|packed| packed.group).collect(),
            prompt_tokens: current_tokens,
            resolved_max_output_tokens,
        })
    }
}

impl std::fmt::Debug for PromptWindowBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptWindowBuilder")
            .field("budget", &self.budget)
            .field("user_label", &self.user_label)
            .field("model_label", &self.model_label)
            .field("prompt_prefix", &self.prompt_prefix)
            .finish_non_exhaustive()
    }
}
