//! Error types for the stand-off model.
//!
//! Span problems and precondition failures are fatal to the call that raised
//! them. Attribute validation failures are different: the attributes are
//! committed anyway and the error only reports what was wrong, so that a
//! batch load can keep going and report everything at the end.

use std::fmt;

use thiserror::Error;

use crate::{Attributes, MarkableId, TokenId};

/// A malformed, empty, or out-of-range span.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    /// A comma-separated segment of a span string was empty.
    #[error("empty segment in span '{span}'")]
    EmptySegment { span: String },

    /// A segment did not have the shape `id` or `id..id`.
    #[error("malformed segment '{segment}'")]
    MalformedSegment { segment: String },

    /// A token id that does not exist in the token stream.
    #[error("unknown token '{0}'")]
    UnknownToken(TokenId),

    /// The last token of a range precedes the first one.
    #[error("range '{first}..{last}' runs backwards")]
    ReversedRange { first: TokenId, last: TokenId },

    /// A token occurs more than once in the same span set.
    #[error("token '{0}' occurs more than once in span")]
    RepeatedToken(TokenId),
}

/// Attribute validation failure for one markable.
///
/// Carries the four classified maps; the supplied attributes have already
/// been committed to the markable when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAttributesError {
    pub level: String,
    pub markable: MarkableId,
    pub supplied: Attributes,
    pub valid: Attributes,
    pub invalid: Attributes,
    pub missing: Attributes,
}

impl fmt::Display for InvalidAttributesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "invalid attributes for markable {} on level {}",
            self.markable, self.level
        )?;
        writeln!(f, "  supplied: {}", format_map(&self.supplied))?;
        writeln!(f, "  valid:    {}", format_map(&self.valid))?;
        writeln!(f, "  invalid:  {}", format_map(&self.invalid))?;
        write!(f, "  missing:  {}", format_map(&self.missing))
    }
}

impl std::error::Error for InvalidAttributesError {}

fn format_map(map: &Attributes) -> String {
    let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{}={:?}", k, v)).collect();
    format!("{{{}}}", pairs.join(", "))
}

/// Every attribute validation failure collected during one batch load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipleInvalidAttributesError {
    errors: Vec<InvalidAttributesError>,
}

impl MultipleInvalidAttributesError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: InvalidAttributesError) {
        self.errors.push(error);
    }

    pub fn count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&InvalidAttributesError> {
        self.errors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InvalidAttributesError> {
        self.errors.iter()
    }

    pub fn into_errors(self) -> Vec<InvalidAttributesError> {
        self.errors
    }
}

impl fmt::Display for MultipleInvalidAttributesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} markable(s) with invalid attributes", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for MultipleInvalidAttributesError {}

/// Errors that can occur while building, loading or querying a document.
#[derive(Debug, Error)]
pub enum StandoffError {
    #[error(transparent)]
    Span(#[from] SpanError),

    #[error(transparent)]
    InvalidAttributes(Box<InvalidAttributesError>),

    #[error(transparent)]
    MultipleInvalidAttributes(MultipleInvalidAttributesError),

    #[error("no markable '{id}' on level '{level}'")]
    NoSuchMarkable { level: String, id: MarkableId },

    #[error("no markable level named '{0}'")]
    NoSuchLevel(String),

    #[error("markable level '{0}' already exists")]
    MarkableLevelExists(String),

    #[error("document has {size} tokens, more than the allowed {max}")]
    DocumentSizeExceeded { size: usize, max: usize },

    #[error("token id '{0}' is already in use")]
    DuplicateToken(TokenId),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("format error: {0}")]
    Format(String),
}

impl From<InvalidAttributesError> for StandoffError {
    fn from(error: InvalidAttributesError) -> Self {
        StandoffError::InvalidAttributes(Box::new(error))
    }
}

impl From<MultipleInvalidAttributesError> for StandoffError {
    fn from(error: MultipleInvalidAttributesError) -> Self {
        StandoffError::MultipleInvalidAttributes(error)
    }
}

impl From<ron::error::SpannedError> for StandoffError {
    fn from(error: ron::error::SpannedError) -> Self {
        StandoffError::Format(error.to_string())
    }
}

impl From<ron::Error> for StandoffError {
    fn from(error: ron::Error) -> Self {
        StandoffError::Format(error.to_string())
    }
}

/// Result type for stand-off operations.
pub type Result<T, E = StandoffError> = std::result::Result<T, E>;
