//! Conversation store interface

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::Message;

/// Errors raised while loading conversation messages
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Invalid message data: {0}")]
    InvalidMessages(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::InvalidMessages(err.to_string())
    }
}

/// Source of the flat message collection for a conversation
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// All messages belonging to `conversation_id`, in any order
    async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>, StoreError>;
}

/// Store backed by a map, used by the binary and in tests
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<String, Vec<Message>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the messages of a conversation
    pub async fn insert(&self, conversation_id: impl Into<String>, messages: Vec<Message>) {
        self.conversations
            .write()
            .await
            .insert(conversation_id.into(), messages);
    }

    /// Load a conversation from a JSON array of stored message records
    pub async fn insert_json(
        &self,
        conversation_id: impl Into<String>,
        json: &str,
    ) -> Result<usize, StoreError> {
        let messages: Vec<Message> = serde_json::from_str(json)?;
        let count = messages.len();
        self.insert(conversation_id, messages).await;
        Ok(count)
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>, StoreError> {
        self.conversations
            .read()
            .await
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| StoreError::ConversationNotFound(conversation_id.to_string()))
    }
}
