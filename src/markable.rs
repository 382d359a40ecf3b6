//! Markables: annotated span sets with attributes.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::basedata::{RenderOptions, TokenId, TokenStream};
use crate::error::SpanError;
use crate::span::SpanSet;
use crate::Attributes;

static NUMERIC_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(\d+)$").expect("numeric suffix pattern is valid"));

/// Level-unique identifier of a markable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkableId(String);

impl MarkableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `n` for ids shaped like `<anything>_<n>`.
    pub fn numeric_suffix(&self) -> Option<u64> {
        NUMERIC_SUFFIX
            .captures(&self.0)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Usable as an explicit id: non-empty, no whitespace, and none of the
    /// characters that delimit span or pointer strings.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && !self
                .0
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, ',' | ';' | ':'))
    }
}

impl fmt::Display for MarkableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MarkableId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MarkableId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for MarkableId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Ordinals of the first and last token of a markable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiscoursePosition {
    pub first: usize,
    pub last: usize,
}

/// One `[level:]id` reference inside a pointer attribute value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointerTarget {
    /// `None` for targets on the markable's own level.
    pub level: Option<String>,
    pub id: MarkableId,
}

impl PointerTarget {
    pub fn local(id: impl Into<MarkableId>) -> Self {
        Self {
            level: None,
            id: id.into(),
        }
    }

    pub fn on_level(level: impl Into<String>, id: impl Into<MarkableId>) -> Self {
        Self {
            level: Some(level.into()),
            id: id.into(),
        }
    }

    /// Parse a `;`-separated list, skipping empty entries.
    pub fn parse_list(value: &str) -> Vec<PointerTarget> {
        value
            .split(';')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| match t.split_once(':') {
                Some((level, id)) => PointerTarget::on_level(level, id),
                None => PointerTarget::local(t),
            })
            .collect()
    }

    pub fn encode_list(targets: &[PointerTarget]) -> String {
        targets
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Level this target lives on, given the level of the pointing markable.
    pub fn resolve_level<'a>(&'a self, own_level: &'a str) -> &'a str {
        self.level.as_deref().unwrap_or(own_level)
    }
}

impl fmt::Display for PointerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.level {
            Some(level) => write!(f, "{}:{}", level, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// An annotation over a (possibly discontinuous) set of tokens.
///
/// The span set is fixed at creation. Attributes only change through the
/// owning level, which validates them first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markable {
    id: MarkableId,
    level: String,
    spans: SpanSet,
    position: DiscoursePosition,
    attributes: Attributes,
    pointer_keys: BTreeSet<String>,
    pointers: BTreeMap<String, Vec<PointerTarget>>,
}

impl Markable {
    pub(crate) fn new(
        id: MarkableId,
        level: &str,
        spans: SpanSet,
        stream: &TokenStream,
    ) -> Result<Self, SpanError> {
        let first = spans
            .first_token()
            .ok_or_else(|| SpanError::EmptySegment {
                span: spans.encode(),
            })?;
        let last = spans.last_token().unwrap_or(first);
        let position = DiscoursePosition {
            first: stream.require_ordinal(first)?,
            last: stream.require_ordinal(last)?,
        };
        Ok(Self {
            id,
            level: level.to_string(),
            spans,
            position,
            attributes: Attributes::new(),
            pointer_keys: BTreeSet::new(),
            pointers: BTreeMap::new(),
        })
    }

    pub fn id(&self) -> &MarkableId {
        &self.id
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn spans(&self) -> &SpanSet {
        &self.spans
    }

    pub fn position(&self) -> DiscoursePosition {
        self.position
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Starts strictly before `other` in discourse order.
    pub fn before(&self, other: &Markable) -> bool {
        self.position.first < other.position.first
    }

    pub fn after(&self, other: &Markable) -> bool {
        other.before(self)
    }

    /// `token` is the first token of the first segment.
    pub fn starts_at(&self, token: &TokenId) -> bool {
        self.spans.first_token() == Some(token)
    }

    /// `token` is the last token of the last segment.
    pub fn ends_at(&self, token: &TokenId) -> bool {
        self.spans.last_token() == Some(token)
    }

    /// Attribute keys currently tracked as pointers.
    pub fn pointer_keys(&self) -> impl Iterator<Item = &str> {
        self.pointer_keys.iter().map(String::as_str)
    }

    /// Parsed targets of the pointer attribute `key`.
    pub fn pointers(&self, key: &str) -> &[PointerTarget] {
        self.pointers.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any pointer attribute (or the one named `key`) references
    /// `target` on `target_level`.
    pub fn points_to(&self, key: Option<&str>, target_level: &str, target: &MarkableId) -> bool {
        self.pointers
            .iter()
            .filter(|(k, _)| key.map_or(true, |key| key == k.as_str()))
            .flat_map(|(_, targets)| targets)
            .any(|t| t.id == *target && t.resolve_level(&self.level) == target_level)
    }

    /// The covered text, segments rendered as in [`TokenStream::render`].
    pub fn text(&self, stream: &TokenStream) -> Result<String, SpanError> {
        Ok(stream.render(&self.spans, &RenderOptions::default())?.text)
    }

    /// Replace the attribute map and rebuild the pointer cache.
    pub(crate) fn commit_attributes(&mut self, attributes: Attributes, references: &BTreeSet<String>) {
        self.attributes = attributes;
        self.pointer_keys.extend(references.iter().cloned());
        self.refresh_pointers();
    }

    pub(crate) fn track_pointer_key(&mut self, key: &str) {
        self.pointer_keys.insert(key.to_string());
    }

    /// Recompute the parsed pointer lists from the attribute values.
    pub(crate) fn refresh_pointers(&mut self) {
        let attributes = &self.attributes;
        self.pointers = self
            .pointer_keys
            .iter()
            .filter_map(|key| {
                attributes
                    .get(key)
                    .map(|value| (key.clone(), PointerTarget::parse_list(value)))
            })
            .filter(|(_, targets)| !targets.is_empty())
            .collect();
    }
}
