//! Document and tokenizer configuration.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Configuration for building and loading a [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Token type used as the id prefix (`word` gives `word_0`, `word_1`, ...).
    pub token_kind: String,
    /// Refuse to open documents with more tokens than this.
    pub max_tokens: Option<usize>,
    /// Whether markables with identical spans may coexist on one level when loading.
    pub allow_duplicate_spans_on_load: bool,
    /// Options for [`TokenStream::tokenize`](crate::TokenStream::tokenize).
    pub tokenizer: TokenizerConfig,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            token_kind: "word".to_string(),
            max_tokens: None,
            allow_duplicate_spans_on_load: false,
            tokenizer: TokenizerConfig::default(),
        }
    }
}

impl DocumentConfig {
    /// Parse a configuration from RON. Missing fields take their defaults.
    pub fn from_ron(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_token_kind(mut self, kind: impl Into<String>) -> Self {
        self.token_kind = kind.into();
        self
    }

    pub fn with_split_digits(mut self, split: bool) -> Self {
        self.tokenizer.split_digits = split;
        self
    }
}

/// Options for the default Unicode-category tokenizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Split words further at every boundary between decimal digits and other characters.
    pub split_digits: bool,
}
