//! Token counting
//!
//! The prompt window builder only needs a `text -> token count` function,
//! expressed as [`TokenCounter`]. [`TokenizerProvider`] hands out BPE-backed
//! counters and caches one instance per encoding for the life of the provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tiktoken_rs::tokenizer::{get_tokenizer, Tokenizer};
use tiktoken_rs::CoreBPE;
use tracing::debug;

/// Errors raised while resolving or loading a tokenizer
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("No tokenizer encoding known for model: {0}")]
    UnknownModel(String),

    #[error("Failed to load {encoding} encoding: {message}")]
    Load { encoding: String, message: String },
}

/// Deterministic, side-effect free token counting
pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, text: &str) -> u32;
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> u32 + Send + Sync,
{
    fn count_tokens(&self, text: &str) -> u32 {
        self(text)
    }
}

/// BPE encodings available to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    O200kBase,
    Cl100kBase,
    P50kBase,
    R50kBase,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::O200kBase => "o200k_base",
            Encoding::Cl100kBase => "cl100k_base",
            Encoding::P50kBase => "p50k_base",
            Encoding::R50kBase => "r50k_base",
        }
    }

    /// Encoding used by a known model name
    pub fn for_model(model: &str) -> Result<Self, TokenizerError> {
        let tokenizer =
            get_tokenizer(model).ok_or_else(|| TokenizerError::UnknownModel(model.to_string()))?;

        Ok(match tokenizer {
            Tokenizer::O200kBase => Encoding::O200kBase,
            Tokenizer::Cl100kBase => Encoding::Cl100kBase,
            Tokenizer::P50kBase | Tokenizer::P50kEdit => Encoding::P50kBase,
            Tokenizer::R50kBase | Tokenizer::Gpt2 => Encoding::R50kBase,
        })
    }

    fn load(&self) -> Result<CoreBPE, TokenizerError> {
        let loaded = match self {
            Encoding::O200kBase => tiktoken_rs::o200k_base(),
            Encoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            Encoding::P50kBase => tiktoken_rs::p50k_base(),
            Encoding::R50kBase => tiktoken_rs::r50k_base(),
        };

        loaded.map_err(|err| TokenizerError::Load {
            encoding: self.name().to_string(),
            message: err.to_string(),
        })
    }
}

/// Counter backed by a BPE encoding; special tokens are encoded as such
pub struct BpeCounter {
    encoding: Encoding,
    bpe: CoreBPE,
}

impl BpeCounter {
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl std::fmt::Debug for BpeCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpeCounter")
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl TokenCounter for BpeCounter {
    fn count_tokens(&self, text: &str) -> u32 {
        let tokens = self.bpe.encode_with_special_tokens(text).len();
        u32::try_from(tokens).unwrap_or(u32::MAX)
    }
}

/// Lazily loads encodings and keeps them until the provider is dropped.
///
/// Construct one per process and share it; lookups after the first load of
/// an encoding return the cached instance.
#[derive(Debug, Default)]
pub struct TokenizerProvider {
    cache: Mutex<HashMap<Encoding, Arc<BpeCounter>>>,
}

impl TokenizerProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter for an encoding, loading it on first use.
    ///
    /// Loading happens outside the cache lock; if two callers race on the
    /// same encoding the first insert wins and both get that instance.
    pub fn encoding(&self, encoding: Encoding) -> Result<Arc<BpeCounter>, TokenizerError> {
        if let Some(counter) = self.cache().get(&encoding) {
            return Ok(Arc::clone(counter));
        }

        debug!(encoding = encoding.name(), "Loading tokenizer encoding");
        let loaded = Arc::new(BpeCounter {
            encoding,
            bpe: encoding.load()?,
        });

        let mut cache = self.cache();
        let counter = cache.entry(encoding).or_insert(loaded);
        Ok(Arc::clone(counter))
    }

    /// Counter for the encoding a model name maps to
    pub fn for_model(&self, model: &str) -> Result<Arc<BpeCounter>, TokenizerError> {
        self.encoding(Encoding::for_model(model)?)
    }

    /// Encodings loaded so far
    pub fn cached_encodings(&self) -> Vec<Encoding> {
        self.cache().keys().copied().collect()
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<Encoding, Arc<BpeCounter>>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
