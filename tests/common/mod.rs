#![allow(dead_code)]

use std::sync::Arc;

use chatwin::llm::{PromptBudget, PromptWindowBuilder, TokenCounter};
use chatwin::models::Message;

/// Counts one token per `#`, so labels and separators are free
pub fn hash_counter() -> Arc<dyn TokenCounter> {
    Arc::new(|text: &str| text.matches('#').count() as u32)
}

/// A message body worth `tokens` under [`hash_counter`]
pub fn body(tokens: usize) -> String {
    "#".repeat(tokens)
}

/// Builder with a prompt ceiling of `max_prompt_tokens` and room for a
/// 1000 token response
pub fn builder(max_prompt_tokens: u32) -> PromptWindowBuilder {
    let budget = PromptBudget::new(max_prompt_tokens + 1000, 1000, max_prompt_tokens)
        .expect("valid budget");
    PromptWindowBuilder::new(budget, hash_counter())
}

/// Chain `messages` into a single branch with ids "1", "2", ...
pub fn chain(messages: Vec<Message>) -> Vec<Message> {
    messages
        .into_iter()
        .enumerate()
        .map(|(i, message)| {
            let message = message.with_id((i + 1).to_string());
            if i == 0 {
                message
            } else {
                message.with_parent(i.to_string())
            }
        })
        .collect()
}

/// Id of the last message of a chain of `len` messages
pub fn leaf(len: usize) -> String {
    len.to_string()
}
