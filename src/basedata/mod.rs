//! The base token stream ("basedata") that every markable level points into.
//!
//! Tokens are append-only. Each token has a stable id (`<kind>_<n>`), its
//! original text, its 0-based ordinal in discourse order, and an optional
//! attribute map. The `spc` attribute records how many whitespace characters
//! precede the token; it defaults to 1 when absent.

mod render;
mod tokenize;

pub use render::{PositionMap, RenderOptions, Rendering};

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpanError, StandoffError};
use crate::Attributes;

/// Attribute key holding the number of spaces rendered before a token.
pub const SPACING_ATTRIBUTE: &str = "spc";

/// Stable identifier of a token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TokenId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for TokenId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One element of the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    id: TokenId,
    text: String,
    ordinal: usize,
    attributes: Option<Attributes>,
}

impl Token {
    pub fn id(&self) -> &TokenId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Position in discourse order, starting at 0.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        self.attributes.as_ref()
    }

    /// Number of spaces rendered before this token.
    ///
    /// A missing or unparsable `spc` attribute counts as one space.
    pub fn spacing(&self) -> usize {
        self.attributes
            .as_ref()
            .and_then(|attrs| attrs.get(SPACING_ATTRIBUTE))
            .and_then(|spc| spc.parse().ok())
            .unwrap_or(1)
    }
}

/// Which side of an anchor token a [`Window`] collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Preceding,
    Following,
}

/// Neighbouring tokens of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a> {
    pub tokens: &'a [Token],
    /// True when the stream boundary was hit before `width` tokens were collected.
    pub padded: bool,
}

/// Ordered, append-only sequence of tokens with an id → ordinal lookup.
#[derive(Debug, Clone)]
pub struct TokenStream {
    kind: String,
    tokens: Vec<Token>,
    ordinals: HashMap<TokenId, usize>,
}

impl Default for TokenStream {
    fn default() -> Self {
        Self::new("word")
    }
}

impl TokenStream {
    /// Create an empty stream whose minted ids look like `<kind>_<n>`.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            tokens: Vec::new(),
            ordinals: HashMap::new(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// All token ids in discourse order.
    pub fn ids(&self) -> impl Iterator<Item = &TokenId> {
        self.tokens.iter().map(|t| &t.id)
    }

    pub fn get(&self, id: &str) -> Option<&Token> {
        self.ordinals.get(id).map(|&ordinal| &self.tokens[ordinal])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ordinals.contains_key(id)
    }

    pub fn ordinal(&self, id: &str) -> Option<usize> {
        self.ordinals.get(id).copied()
    }

    /// Like [`ordinal`](Self::ordinal), but a missing id is a [`SpanError`].
    pub fn require_ordinal(&self, id: &TokenId) -> Result<usize, SpanError> {
        self.ordinal(id.as_str())
            .ok_or_else(|| SpanError::UnknownToken(id.clone()))
    }

    /// Append a token with a freshly minted id.
    pub fn push(&mut self, text: impl Into<String>, attributes: Option<Attributes>) -> TokenId {
        let mut n = self.tokens.len();
        let mut id = TokenId(format!("{}_{}", self.kind, n));
        // Explicit ids loaded earlier may already occupy the natural slot.
        while self.ordinals.contains_key(id.as_str()) {
            n += 1;
            id = TokenId(format!("{}_{}", self.kind, n));
        }
        self.append(id.clone(), text.into(), attributes);
        id
    }

    /// Append a token under an explicit id, as when loading persisted basedata.
    pub fn push_with_id(
        &mut self,
        id: impl Into<TokenId>,
        text: impl Into<String>,
        attributes: Option<Attributes>,
    ) -> Result<TokenId> {
        let id = id.into();
        if self.ordinals.contains_key(id.as_str()) {
            return Err(StandoffError::DuplicateToken(id));
        }
        self.append(id.clone(), text.into(), attributes);
        Ok(id)
    }

    fn append(&mut self, id: TokenId, text: String, attributes: Option<Attributes>) {
        let ordinal = self.tokens.len();
        self.ordinals.insert(id.clone(), ordinal);
        self.tokens.push(Token {
            id,
            text,
            ordinal,
            attributes: attributes.filter(|attrs| !attrs.is_empty()),
        });
    }

    /// Remove every token.
    pub fn clear(&mut self) {
        self.tokens.clear();
        self.ordinals.clear();
    }

    /// All tokens from `first` to `last` inclusive, in discourse order.
    pub fn interpolate(&self, first: &TokenId, last: &TokenId) -> Result<Vec<TokenId>, SpanError> {
        let start = self.require_ordinal(first)?;
        let end = self.require_ordinal(last)?;
        if end < start {
            return Err(SpanError::ReversedRange {
                first: first.clone(),
                last: last.clone(),
            });
        }
        Ok(self.tokens[start..=end].iter().map(|t| t.id.clone()).collect())
    }

    /// Up to `width` tokens before or after `anchor` (the anchor itself excluded).
    pub fn window(
        &self,
        width: usize,
        anchor: &TokenId,
        direction: Direction,
    ) -> Result<Window<'_>, SpanError> {
        let ordinal = self.require_ordinal(anchor)?;
        let window = match direction {
            Direction::Preceding => {
                let start = ordinal.saturating_sub(width);
                Window {
                    tokens: &self.tokens[start..ordinal],
                    padded: ordinal < width,
                }
            }
            Direction::Following => {
                let start = ordinal + 1;
                let end = (start + width).min(self.tokens.len());
                Window {
                    tokens: &self.tokens[start..end],
                    padded: start + width > self.tokens.len(),
                }
            }
        };
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_of(n: usize) -> TokenStream {
        let mut stream = TokenStream::default();
        for i in 0..n {
            stream.push(format!("t{}", i), None);
        }
        stream
    }

    fn ids(values: &[&str]) -> Vec<TokenId> {
        values.iter().map(|&v| TokenId::from(v)).collect()
    }

    #[test]
    fn test_push_mints_sequential_ids() {
        let stream = stream_of(3);
        let minted: Vec<&str> = stream.ids().map(|id| id.as_str()).collect();
        assert_eq!(minted, vec!["word_0", "word_1", "word_2"]);
        assert_eq!(stream.ordinal("word_2"), Some(2));
        assert_eq!(stream.get("word_1").map(|t| t.text()), Some("t1"));
    }

    #[test]
    fn test_push_skips_ids_taken_by_explicit_tokens() {
        let mut stream = TokenStream::default();
        stream.push_with_id("word_1", "a", None).unwrap();
        stream.push_with_id("word_0", "b", None).unwrap();
        let minted = stream.push("c", None);
        assert_eq!(minted.as_str(), "word_2");
    }

    #[test]
    fn test_push_with_duplicate_id_fails() {
        let mut stream = TokenStream::default();
        stream.push_with_id("word_0", "a", None).unwrap();
        let err = stream.push_with_id("word_0", "b", None).unwrap_err();
        assert!(matches!(err, StandoffError::DuplicateToken(_)));
        assert_eq!(stream.len(), 1);
    }

    #[test]
    fn test_spacing_defaults_to_one() {
        let mut stream = TokenStream::default();
        let mut zero = Attributes::new();
        zero.insert(SPACING_ATTRIBUTE.into(), "0".into());
        let a = stream.push("a", None);
        let b = stream.push("b", Some(zero));
        assert_eq!(stream.get(a.as_str()).unwrap().spacing(), 1);
        assert_eq!(stream.get(b.as_str()).unwrap().spacing(), 0);
    }

    #[test]
    fn test_interpolate_inclusive() {
        let stream = stream_of(10);
        let span = stream
            .interpolate(&TokenId::from("word_2"), &TokenId::from("word_5"))
            .unwrap();
        assert_eq!(span, ids(&["word_2", "word_3", "word_4", "word_5"]));
    }

    #[test]
    fn test_interpolate_single_token() {
        let stream = stream_of(3);
        let span = stream
            .interpolate(&TokenId::from("word_1"), &TokenId::from("word_1"))
            .unwrap();
        assert_eq!(span, ids(&["word_1"]));
    }

    #[test]
    fn test_interpolate_errors() {
        let stream = stream_of(4);
        assert_eq!(
            stream.interpolate(&TokenId::from("word_3"), &TokenId::from("word_1")),
            Err(SpanError::ReversedRange {
                first: TokenId::from("word_3"),
                last: TokenId::from("word_1"),
            })
        );
        assert_eq!(
            stream.interpolate(&TokenId::from("word_0"), &TokenId::from("word_9")),
            Err(SpanError::UnknownToken(TokenId::from("word_9")))
        );
    }

    #[test]
    fn test_window_preceding() {
        let stream = stream_of(10);
        let window = stream
            .window(3, &TokenId::from("word_5"), Direction::Preceding)
            .unwrap();
        let texts: Vec<&str> = window.tokens.iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["t2", "t3", "t4"]);
        assert!(!window.padded);

        let window = stream
            .window(3, &TokenId::from("word_1"), Direction::Preceding)
            .unwrap();
        assert_eq!(window.tokens.len(), 1);
        assert!(window.padded);
    }

    #[test]
    fn test_window_following() {
        let stream = stream_of(10);
        let window = stream
            .window(3, &TokenId::from("word_5"), Direction::Following)
            .unwrap();
        let texts: Vec<&str> = window.tokens.iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["t6", "t7", "t8"]);
        assert!(!window.padded);

        let window = stream
            .window(3, &TokenId::from("word_8"), Direction::Following)
            .unwrap();
        assert_eq!(window.tokens.len(), 1);
        assert!(window.padded);

        // Exactly reaching the end is not padding.
        let window = stream
            .window(2, &TokenId::from("word_7"), Direction::Following)
            .unwrap();
        assert_eq!(window.tokens.len(), 2);
        assert!(!window.padded);
    }

    #[test]
    fn test_clear() {
        let mut stream = stream_of(3);
        stream.clear();
        assert!(stream.is_empty());
        assert!(!stream.contains("word_0"));
        assert_eq!(stream.push("again", None).as_str(), "word_0");
    }
}
