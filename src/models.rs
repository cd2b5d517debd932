// Data structures (Message, Author)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Parent id the conversation store uses for messages with no parent.
pub const NO_PARENT: &str = "00000000-0000-0000-0000-000000000000";

// Author of a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Model,
}

// Message Struct
//
// Mirrors the stored record: authorship is persisted as `isCreatedByUser`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "messageId")]
    pub id: String,
    #[serde(rename = "parentMessageId", default)]
    pub parent_id: Option<String>,
    #[serde(rename = "isCreatedByUser", with = "author_flag", default = "default_author")]
    pub author: Author,
    #[serde(default)]
    pub text: String,
    /// Structured content; takes precedence over `text` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new root message written by the user
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Author::User, text)
    }

    /// Create a new root message written by the model
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Author::Model, text)
    }

    fn new(author: Author, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            parent_id: None,
            author,
            text: text.into(),
            content: None,
            sender: None,
            created_at: Utc::now(),
        }
    }

    /// Set the message id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Attach this message under `parent_id`
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// The parent id, or `None` for a root (missing, empty or nil parent)
    pub fn parent(&self) -> Option<&str> {
        match self.parent_id.as_deref() {
            None | Some("") | Some(NO_PARENT) => None,
            Some(id) => Some(id),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// The text that goes into a prompt
    pub fn body(&self) -> &str {
        self.content.as_deref().unwrap_or(&self.text)
    }
}

fn default_author() -> Author {
    Author::Model
}

mod author_flag {
    use super::Author;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(author: &Author, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(*author == Author::User)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Author, D::Error> {
        // null is treated like a missing flag
        let is_user = Option::<bool>::deserialize(deserializer)?.unwrap_or(false);
        Ok(if is_user { Author::User } else { Author::Model })
    }
}
