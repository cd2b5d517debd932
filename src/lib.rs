// Conversation data
pub mod conversation;
pub mod models;

// Prompt construction
pub mod llm;

// Binary configuration
pub mod settings;
