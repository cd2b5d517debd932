use std::path::PathBuf;
use std::process::ExitCode;

use chatwin::conversation::InMemoryConversationStore;
use chatwin::llm::{PromptSession, TokenizerProvider};
use chatwin::settings::Settings;
use clap::Parser;
use tracing::{error, info};

/// Build a token-bounded prompt from a stored conversation and print the
/// request payload as JSON
#[derive(Debug, Parser)]
#[command(name = "chatwin", about, version)]
struct Args {
    /// JSON array of stored message records
    conversation: PathBuf,

    /// Id of the message the prompt should end at
    parent_message_id: String,

    /// Pre-encoded image URL to attach (repeatable); switches to the vision model
    #[arg(long = "image")]
    images: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "Failed to build prompt");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = Settings::from_env()?.into_options();
    options.has_attachments = !args.images.is_empty();

    let tokenizers = TokenizerProvider::new();
    let session = PromptSession::new(options, &tokenizers)?;

    let conversation_id = args.conversation.display().to_string();
    let store = InMemoryConversationStore::new();
    let raw = tokio::fs::read_to_string(&args.conversation).await?;
    let count = store.insert_json(conversation_id.as_str(), &raw).await?;
    info!(path = %conversation_id, messages = count, "Loaded conversation file");

    let payload = session
        .build_for_conversation(&store, &conversation_id, &args.parent_message_id, args.images)
        .await?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_positional_args() {
        let args = Args::try_parse_from(["chatwin", "convo.json", "msg-3"]).unwrap();
        assert_eq!(args.conversation, PathBuf::from("convo.json"));
        assert_eq!(args.parent_message_id, "msg-3");
        assert!(args.images.is_empty());
    }

    #[test]
    fn test_parse_images() {
        let args = Args::try_parse_from([
            "chatwin",
            "convo.json",
            "msg-3",
            "--image",
            "data:image/png;base64,AAAA",
            "--image",
            "data:image/png;base64,BBBB",
        ])
        .unwrap();
        assert_eq!(args.images.len(), 2);
    }

    #[test]
    fn test_missing_parent_is_rejected() {
        let err = Args::try_parse_from(["chatwin", "convo.json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_help_is_generated() {
        let err = Args::try_parse_from(["chatwin", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
