//! Text reconstruction from token subsets.
//!
//! Each token is rendered as its spacing prefix (`spc` spaces) followed by
//! its text, the first token of a segment included. A multi-segment span set
//! renders every segment in brackets, joined by `..`. The byte range
//! each token occupies is recorded in a [`PositionMap`], so that matches
//! found in the rendered string can be mapped back to token ids.

use std::ops::Range;

use super::{TokenId, TokenStream};
use crate::error::SpanError;
use crate::level::MarkableLevel;
use crate::markable::Markable;
use crate::span::SpanSet;

/// Options for [`TokenStream::render`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions<'a> {
    /// Wrap segments in brackets even when there is only one.
    pub brackets: bool,
    /// Level whose `sup`/`sub` markables are rendered as inline markup.
    pub overlay: Option<&'a MarkableLevel>,
}

impl<'a> RenderOptions<'a> {
    pub fn with_brackets(mut self) -> Self {
        self.brackets = true;
        self
    }

    pub fn with_overlay(mut self, level: &'a MarkableLevel) -> Self {
        self.overlay = Some(level);
        self
    }
}

/// Byte range → token id mapping for a rendered string.
///
/// Characters that belong to no token (spacing, brackets, markup) are not
/// mapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMap {
    entries: Vec<(Range<usize>, TokenId)>,
}

impl PositionMap {
    fn push(&mut self, range: Range<usize>, id: TokenId) {
        self.entries.push((range, id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Range<usize>, &TokenId)> {
        self.entries.iter().map(|(range, id)| (range, id))
    }

    /// Token rendered at byte offset `pos`, if any.
    pub fn token_at(&self, pos: usize) -> Option<&TokenId> {
        let idx = self.entries.partition_point(|(range, _)| range.end <= pos);
        self.entries
            .get(idx)
            .filter(|(range, _)| range.contains(&pos))
            .map(|(_, id)| id)
    }

    /// Ids of all tokens intersecting `range`, in order, without repeats.
    pub fn tokens_in(&self, range: Range<usize>) -> Vec<TokenId> {
        let mut ids: Vec<TokenId> = Vec::new();
        let start = self.entries.partition_point(|(r, _)| r.end <= range.start);
        for (r, id) in &self.entries[start..] {
            if r.start >= range.end {
                break;
            }
            if r.is_empty() || ids.last() == Some(id) {
                continue;
            }
            ids.push(id.clone());
        }
        ids
    }
}

/// Output of [`TokenStream::render`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendering {
    pub text: String,
    /// Token texts in rendering order.
    pub words: Vec<String>,
    /// Token ids in rendering order.
    pub ids: Vec<TokenId>,
    pub positions: PositionMap,
}

fn script_tag(markable: &Markable) -> Option<&'static str> {
    markable.attributes().values().find_map(|value| {
        if value.eq_ignore_ascii_case("sup") {
            Some("sup")
        } else if value.eq_ignore_ascii_case("sub") {
            Some("sub")
        } else {
            None
        }
    })
}

impl TokenStream {
    /// Render the tokens of `spans` to a string.
    pub fn render(&self, spans: &SpanSet, options: &RenderOptions<'_>) -> Result<Rendering, SpanError> {
        let mut out = Rendering::default();
        let segments: Vec<_> = spans.segments().iter().filter(|s| !s.is_empty()).collect();
        let bracketed = options.brackets || segments.len() > 1;

        for (seg_idx, segment) in segments.iter().enumerate() {
            if seg_idx > 0 {
                out.text.push_str("..");
            }
            if bracketed {
                out.text.push('[');
            }
            for id in segment.ids() {
                let token = self
                    .get(id.as_str())
                    .ok_or_else(|| SpanError::UnknownToken(id.clone()))?;
                out.text.extend(std::iter::repeat(' ').take(token.spacing()));
                let (opening, closing) = match options.overlay {
                    Some(level) => overlay_markup(level, id),
                    None => (Vec::new(), Vec::new()),
                };
                for tag in &opening {
                    out.text.push('<');
                    out.text.push_str(tag);
                    out.text.push('>');
                }
                let start = out.text.len();
                out.text.push_str(token.text());
                out.positions.push(start..out.text.len(), id.clone());
                for tag in &closing {
                    out.text.push_str("</");
                    out.text.push_str(tag);
                    out.text.push('>');
                }
                out.words.push(token.text().to_string());
                out.ids.push(id.clone());
            }
            if bracketed {
                out.text.push(']');
            }
        }
        Ok(out)
    }

    /// Render the whole stream as one segment.
    pub fn render_all(&self, options: &RenderOptions<'_>) -> Rendering {
        let spans = SpanSet::single(self.ids().cloned());
        // Every id comes from this stream, so rendering cannot fail.
        self.render(&spans, options).unwrap_or_default()
    }
}

/// Opening tags for markables starting at `id`, closing tags (innermost
/// first) for markables ending there.
fn overlay_markup(level: &MarkableLevel, id: &TokenId) -> (Vec<&'static str>, Vec<&'static str>) {
    let opening = level.starting(id).into_iter().filter_map(script_tag).collect();
    let closing = level
        .ending(id)
        .into_iter()
        .rev()
        .filter_map(script_tag)
        .collect();
    (opening, closing)
}
