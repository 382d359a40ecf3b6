#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]
//! In-memory stand-off annotation.
//!
//! A [`Document`] holds one base [`TokenStream`] and any number of named
//! [`MarkableLevel`]s. Each level stores [`Markable`]s: annotations over a
//! possibly discontinuous [`SpanSet`] of tokens, carrying string attributes
//! that are validated against the level's [`AnnotationScheme`].
//!
//! ```
//! use layered_standoff::{AddOptions, Document, SpanSet};
//!
//! let mut doc = Document::from_text("Dr. Smith arrived.");
//! doc.add_level("np", None).unwrap();
//! let outcome = doc
//!     .add_markable("np", SpanSet::single(vec!["word_0", "word_1", "word_2"]), None, AddOptions::default())
//!     .unwrap();
//! let id = outcome.created().unwrap();
//! let markable = doc.level("np").unwrap().get(id.as_str()).unwrap();
//! assert_eq!(markable.text(doc.tokens()).unwrap(), "Dr. Smith");
//! ```

mod basedata;
mod config;
mod document;
mod error;
mod level;
mod markable;
mod matcher;
pub mod scheme;
mod snapshot;
mod span;
mod validate;

use std::collections::BTreeMap;

pub use basedata::{
    Direction, PositionMap, RenderOptions, Rendering, Token, TokenId, TokenStream, Window,
    SPACING_ATTRIBUTE,
};
pub use config::{DocumentConfig, TokenizerConfig};
pub use document::{Document, LevelMatch};
pub use error::{
    InvalidAttributesError, MultipleInvalidAttributesError, Result, SpanError, StandoffError,
};
pub use level::{
    AddOptions, AddOutcome, Conflict, MarkableLevel, RejectReason, MARKABLE_ID_PREFIX, TEXT_KEY,
    WILDCARD_MARKER,
};
pub use markable::{DiscoursePosition, Markable, MarkableId, PointerTarget};
pub use matcher::{
    match_across_tokens, MatchGroup, MatchOptions, MatchPattern, TokenMatch, MATCH_GROUP,
};
pub use scheme::{AnnotationScheme, AttributeKind, DefaultAttribute, SchemeAttribute, SchemeProvider};
pub use snapshot::{DocumentSnapshot, LevelRecord, MarkableRecord, TokenRecord};
pub use span::{Span, SpanSet};
pub use validate::{AttributeValidator, Validation};

/// Attribute map of a token or markable. Values are opaque strings; only
/// the validator interprets them.
pub type Attributes = BTreeMap<String, String>;
