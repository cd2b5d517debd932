//! End to end tests for prompt sessions
//!
//! These use the real BPE tokenizers, so token counts are only checked
//! against the budget rather than exact values.

mod common;

use chatwin::conversation::{InMemoryConversationStore, StoreError};
use chatwin::llm::google::{ChatRole, Example};
use chatwin::llm::{
    GoogleClientOptions, ModelOptions, PromptError, PromptPayload, PromptSession,
    TokenizerProvider,
};
use chatwin::models::Message;
use common::{chain, leaf};

const CONVERSATION_JSON: &str = r#"[
    {
        "messageId": "b",
        "parentMessageId": "a",
        "isCreatedByUser": false,
        "text": "The capital of France is Paris.",
        "sender": "PaLM2"
    },
    {
        "messageId": "a",
        "parentMessageId": "00000000-0000-0000-0000-000000000000",
        "isCreatedByUser": true,
        "text": "What is the capital of France?"
    },
    {
        "messageId": "c",
        "parentMessageId": "b",
        "isCreatedByUser": true,
        "text": "And of Italy?"
    }
]"#;

fn history() -> Vec<Message> {
    chain(vec![
        Message::user("What is the capital of France?"),
        Message::model("The capital of France is Paris."),
        Message::user("And of Italy?"),
    ])
}

#[tokio::test]
async fn test_text_model_gets_flat_prompt() {
    let tokenizers = TokenizerProvider::new();
    let options = GoogleClientOptions::new(ModelOptions::new("text-bison"))
        .with_prompt_prefix("Answer in one word.");
    let session = PromptSession::new(options, &tokenizers).unwrap();

    let payload = session
        .build_messages(&history(), &leaf(3), Vec::new())
        .await
        .unwrap();

    let PromptPayload::Prompt { build, parameters } = &payload else {
        panic!("expected a flat prompt, got {payload:?}");
    };
    assert!(build.prompt_text.starts_with("User:\nWhat is the capital of France?"));
    assert!(build.prompt_text.contains("Context:\nAnswer in one word."));
    assert!(build.prompt_text.ends_with("Assistant:"));
    assert_eq!(build.included_context.len(), 3);
    assert!(build.packed_tokens() <= session.budget().max_prompt_tokens);
    assert_eq!(parameters.max_output_tokens, Some(build.resolved_max_output_tokens));
    assert_eq!(build.resolved_max_output_tokens, 1024);
}

#[tokio::test]
async fn test_chat_model_gets_structured_history() {
    let tokenizers = TokenizerProvider::new();
    let options = GoogleClientOptions::new(ModelOptions::new("chat-bison"))
        .with_prompt_prefix("Be helpful.")
        .with_model_label("Guide")
        .with_examples(vec![Example::new("Capital of Spain?", "Madrid")]);
    let session = PromptSession::new(options, &tokenizers).unwrap();

    let payload = session
        .build_messages(&history(), &leaf(3), Vec::new())
        .await
        .unwrap();

    assert!(payload.build_result().is_none());
    let PromptPayload::Chat { payload } = payload else {
        panic!("expected a chat payload");
    };
    let instance = &payload.instances[0];
    let roles: Vec<ChatRole> = instance.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant, ChatRole::User]);
    assert_eq!(instance.messages[1].author, "Guide");
    assert_eq!(instance.context.as_deref(), Some("Be helpful."));
    assert_eq!(instance.examples.len(), 1);
    assert_eq!(session.sender(), "Guide");
}

#[tokio::test]
async fn test_attachments_wrap_prompt_with_images() {
    let tokenizers = TokenizerProvider::new();
    let options = GoogleClientOptions::new(ModelOptions::new("gemini-pro")).with_attachments(true);
    let session = PromptSession::new(options, &tokenizers).unwrap();
    let images = vec!["data:image/png;base64,AAAA".to_string()];

    let payload = session
        .build_messages(&history(), &leaf(3), images.clone())
        .await
        .unwrap();

    let PromptPayload::Vision { payload, build } = payload else {
        panic!("expected a vision payload");
    };
    let message = &payload.instances[0].messages[0];
    assert_eq!(message.role, ChatRole::User);
    assert_eq!(message.content, build.prompt_text);
    assert_eq!(message.image_urls, images);
    assert_eq!(payload.parameters.model, "gemini-pro-vision");
    assert_eq!(
        payload.parameters.max_output_tokens,
        Some(build.resolved_max_output_tokens)
    );
}

#[tokio::test]
async fn test_build_from_store() {
    let tokenizers = TokenizerProvider::new();
    let session =
        PromptSession::new(GoogleClientOptions::new(ModelOptions::new("text-bison")), &tokenizers)
            .unwrap();
    let store = InMemoryConversationStore::new();
    let count = store.insert_json("conv-1", CONVERSATION_JSON).await.unwrap();
    assert_eq!(count, 3);

    let payload = session
        .build_for_conversation(&store, "conv-1", "c", Vec::new())
        .await
        .unwrap();

    let build = payload.build_result().unwrap();
    assert_eq!(build.included_context.len(), 3);
    assert!(build.prompt_text.contains("And of Italy?"));
}

#[tokio::test]
async fn test_missing_conversation() {
    let tokenizers = TokenizerProvider::new();
    let session =
        PromptSession::new(GoogleClientOptions::new(ModelOptions::new("text-bison")), &tokenizers)
            .unwrap();
    let store = InMemoryConversationStore::new();

    let err = session
        .build_for_conversation(&store, "nope", "c", Vec::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PromptError::Store(StoreError::ConversationNotFound(id)) if id == "nope"
    ));
}

#[tokio::test]
async fn test_prompt_too_long_surfaces() {
    let tokenizers = TokenizerProvider::new();
    let options =
        GoogleClientOptions::new(ModelOptions::new("text-bison")).with_max_prompt_tokens(20);
    let session = PromptSession::new(options, &tokenizers).unwrap();
    let messages = chain(vec![Message::user("word ".repeat(200))]);

    let err = session
        .build_messages(&messages, &leaf(1), Vec::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PromptError::PromptTooLong { max_tokens: 20, .. }));
    assert!(err.to_string().starts_with("Prompt is too long. Max token count is 20"));
}

#[test]
fn test_invalid_budget_is_rejected() {
    let tokenizers = TokenizerProvider::new();
    let model_options = ModelOptions::new("text-bison").with_max_output_tokens(4096);
    let options = GoogleClientOptions::new(model_options).with_max_prompt_tokens(5000);

    let err = PromptSession::new(options, &tokenizers).unwrap_err();

    assert!(matches!(err, PromptError::Configuration { .. }));
}
