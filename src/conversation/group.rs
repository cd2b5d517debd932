//! Folding a path into author turns

use serde::{Deserialize, Serialize};

use crate::models::{Author, Message};

/// A run of consecutive messages by the same author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageGroup {
    pub author: Author,
    /// Display label rendered in front of the turn
    pub label: String,
    /// Message bodies in chronological order
    pub parts: Vec<String>,
}

impl MessageGroup {
    fn new(author: Author, label: &str, part: &str) -> Self {
        Self {
            author,
            label: label.to_string(),
            parts: vec![part.to_string()],
        }
    }

    /// Concatenated turn text, one message per line
    pub fn content(&self) -> String {
        self.parts.join("\n")
    }
}

/// Group consecutive same-author messages without reordering.
pub fn group_messages(path: &[&Message], user_label: &str, model_label: &str) -> Vec<MessageGroup> {
    let mut groups: Vec<MessageGroup> = Vec::new();

    for message in path {
        match groups.last_mut() {
            Some(group) if group.author == message.author => {
                group.parts.push(message.body().to_string());
            }
            _ => {
                let label = match message.author {
                    Author::User => user_label,
                    Author::Model => model_label,
                };
                groups.push(MessageGroup::new(message.author, label, message.body()));
            }
        }
    }

    groups
}
