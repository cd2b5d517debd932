//! Conversation history access
//!
//! Conversations are stored as a tree of messages linked by parent ids so that
//! edits and regenerations can branch. This module resolves the single branch
//! that leads to a given message and folds it into author turns.

mod group;
mod path;
mod store;

pub use group::{group_messages, MessageGroup};
pub use path::ConversationTree;
pub use store::{ConversationStore, InMemoryConversationStore, StoreError};
