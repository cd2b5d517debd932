//! Result types for prompt construction

use serde::{Deserialize, Serialize};

use crate::conversation::MessageGroup;

/// Tokens added after packing for message framing the per-turn counts miss
pub const METADATA_TOKENS: u32 = 2;

/// Output of one prompt window build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    /// Prompt text, trimmed
    pub prompt_text: String,
    /// Turns present in the prompt body, oldest first
    pub included_context: Vec<MessageGroup>,
    /// Final token accounting, including [`METADATA_TOKENS`]
    pub prompt_tokens: u32,
    /// Response cap left over after the prompt
    pub resolved_max_output_tokens: u32,
}

impl BuildResult {
    /// Tokens counted while packing, before the metadata allowance
    pub fn packed_tokens(&self) -> u32 {
        self.prompt_tokens.saturating_sub(METADATA_TOKENS)
    }
}
