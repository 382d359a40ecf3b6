//! Regular expression matching across token boundaries.
//!
//! The selected tokens are rendered to one string (see
//! [`TokenStream::render`]) and each pattern runs over that string. Matched
//! byte ranges are mapped back to token ids through the rendering's
//! [`PositionMap`](crate::PositionMap), so a single pattern can span any
//! number of tokens regardless of how the text was tokenized.

use std::ops::Range;

use regex::RegexBuilder;
use tracing::debug;

use crate::basedata::{RenderOptions, TokenId, TokenStream};
use crate::error::Result;
use crate::span::SpanSet;

/// Name of the capture group whose range selects the tokens.
///
/// Patterns without a group of this name use the whole match.
pub const MATCH_GROUP: &str = "m";

/// A pattern plus the label its results are reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPattern {
    pub regex: String,
    /// Defaults to the pattern text.
    pub label: Option<String>,
}

impl MatchPattern {
    pub fn new(regex: impl Into<String>) -> Self {
        Self {
            regex: regex.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.regex)
    }
}

impl From<&str> for MatchPattern {
    fn from(regex: &str) -> Self {
        Self::new(regex)
    }
}

impl From<(&str, &str)> for MatchPattern {
    fn from((regex, label): (&str, &str)) -> Self {
        Self::new(regex).with_label(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    pub ignore_case: bool,
}

impl MatchOptions {
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }
}

/// One match and the tokens it touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
    /// Distinct token ids in rendering order.
    pub tokens: Vec<TokenId>,
    pub text: String,
    /// Byte range of the selected group in the rendered string.
    pub range: Range<usize>,
}

/// All matches of one input pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub pattern: String,
    pub label: String,
    pub matches: Vec<TokenMatch>,
}

impl MatchGroup {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Run every pattern over the rendering of `spans`.
///
/// Returns one group per pattern, in input order. Matches that cover only
/// inter-token spacing or markup are dropped.
pub fn match_across_tokens<I, P>(
    stream: &TokenStream,
    patterns: I,
    spans: &SpanSet,
    options: MatchOptions,
) -> Result<Vec<MatchGroup>>
where
    I: IntoIterator<Item = P>,
    P: Into<MatchPattern>,
{
    let rendering = stream.render(spans, &RenderOptions::default())?;
    let mut groups = Vec::new();

    for pattern in patterns {
        let pattern: MatchPattern = pattern.into();
        let regex = RegexBuilder::new(&pattern.regex)
            .case_insensitive(options.ignore_case)
            .build()?;
        let has_group = regex.capture_names().any(|name| name == Some(MATCH_GROUP));

        let mut matches = Vec::new();
        for caps in regex.captures_iter(&rendering.text) {
            let selected = if has_group {
                caps.name(MATCH_GROUP)
            } else {
                caps.get(0)
            };
            let selected = match selected {
                Some(selected) => selected,
                None => continue,
            };
            let tokens = rendering.positions.tokens_in(selected.range());
            if tokens.is_empty() {
                continue;
            }
            matches.push(TokenMatch {
                tokens,
                text: selected.as_str().to_string(),
                range: selected.range(),
            });
        }

        debug!(pattern = %pattern.regex, matches = matches.len(), "matched across tokens");
        groups.push(MatchGroup {
            label: pattern.label().to_string(),
            pattern: pattern.regex,
            matches,
        });
    }
    Ok(groups)
}
