//! Span algebra over the token stream.
//!
//! A [`Span`] is a run of tokens that are contiguous by ordinal. A [`SpanSet`]
//! is an ordered list of spans describing one markable's (possibly
//! discontinuous) coverage. The compact string form renders a one-token span
//! as its id and a longer span as `first..last`, with segments joined by
//! commas: `word_1..word_4,word_7`.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::basedata::{TokenId, TokenStream};
use crate::error::SpanError;

/// Contiguous run of token ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Span(Vec<TokenId>);

impl Span {
    pub fn new(ids: Vec<TokenId>) -> Self {
        Self(ids)
    }

    pub fn ids(&self) -> &[TokenId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&TokenId> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&TokenId> {
        self.0.last()
    }

    fn encode_into(&self, out: &mut String) {
        match self.0.as_slice() {
            [] => {}
            [only] => out.push_str(only.as_str()),
            [first, .., last] => {
                out.push_str(first.as_str());
                out.push_str("..");
                out.push_str(last.as_str());
            }
        }
    }
}

impl<T: Into<TokenId>> FromIterator<T> for Span {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Ordered list of spans covered by one markable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpanSet(Vec<Span>);

impl SpanSet {
    pub fn new(segments: Vec<Span>) -> Self {
        Self(segments)
    }

    /// A span set with exactly one segment.
    pub fn single<T: Into<TokenId>>(ids: impl IntoIterator<Item = T>) -> Self {
        Self(vec![ids.into_iter().collect()])
    }

    /// Build from nested id lists, one inner list per segment.
    pub fn from_segments<S, T>(segments: impl IntoIterator<Item = S>) -> Self
    where
        S: IntoIterator<Item = T>,
        T: Into<TokenId>,
    {
        Self(segments.into_iter().map(|s| s.into_iter().collect()).collect())
    }

    pub fn segments(&self) -> &[Span] {
        &self.0
    }

    /// True when no segment holds any token.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Span::is_empty)
    }

    /// Every token id, segment by segment.
    pub fn tokens(&self) -> impl Iterator<Item = &TokenId> {
        self.0.iter().flat_map(|s| s.0.iter())
    }

    /// Concatenation of all segments in order.
    pub fn flatten(&self) -> Vec<TokenId> {
        self.tokens().cloned().collect()
    }

    pub fn token_count(&self) -> usize {
        self.0.iter().map(Span::len).sum()
    }

    pub fn contains_token(&self, id: &TokenId) -> bool {
        self.tokens().any(|t| t == id)
    }

    /// First token of the first non-empty segment.
    pub fn first_token(&self) -> Option<&TokenId> {
        self.0.iter().find_map(Span::first)
    }

    /// Last token of the last non-empty segment.
    pub fn last_token(&self) -> Option<&TokenId> {
        self.0.iter().rev().find_map(Span::last)
    }

    /// True iff the flattened token sets intersect.
    pub fn overlaps(&self, other: &SpanSet) -> bool {
        let mine: HashSet<&TokenId> = self.tokens().collect();
        other.tokens().any(|t| mine.contains(t))
    }

    /// True iff every token of `other` is also covered by `self`.
    pub fn contains(&self, other: &SpanSet) -> bool {
        let mine: HashSet<&TokenId> = self.tokens().collect();
        other.tokens().all(|t| mine.contains(t))
    }

    /// Returns the first token that occurs more than once, if any.
    pub fn repeated_token(&self) -> Option<&TokenId> {
        let mut seen = HashSet::new();
        self.tokens().find(|t| !seen.insert(*t))
    }

    /// Compact string form, e.g. `word_1..word_4,word_7`.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (idx, span) in self.0.iter().filter(|s| !s.is_empty()).enumerate() {
            if idx > 0 {
                out.push(',');
            }
            span.encode_into(&mut out);
        }
        out
    }

    /// Parse the compact string form, interpolating `first..last` ranges.
    pub fn decode(span: &str, stream: &TokenStream) -> Result<SpanSet, SpanError> {
        let mut segments = Vec::new();
        for segment in span.split(',') {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(SpanError::EmptySegment {
                    span: span.to_string(),
                });
            }
            let ids = match segment.split_once("..") {
                Some((first, last)) => {
                    let (first, last) = (first.trim(), last.trim());
                    if first.is_empty() || last.is_empty() || last.contains("..") {
                        return Err(SpanError::MalformedSegment {
                            segment: segment.to_string(),
                        });
                    }
                    stream.interpolate(&TokenId::from(first), &TokenId::from(last))?
                }
                None => {
                    if segment.chars().any(char::is_whitespace) {
                        return Err(SpanError::MalformedSegment {
                            segment: segment.to_string(),
                        });
                    }
                    let id = TokenId::from(segment);
                    stream.require_ordinal(&id)?;
                    vec![id]
                }
            };
            segments.push(Span(ids));
        }
        Ok(SpanSet(segments))
    }
}

impl fmt::Display for SpanSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<Vec<Span>> for SpanSet {
    fn from(segments: Vec<Span>) -> Self {
        Self(segments)
    }
}
