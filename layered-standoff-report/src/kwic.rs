//! Keyword-in-context lines.

use layered_standoff::{Direction, RenderOptions, SpanError, SpanSet, Token, TokenStream};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KwicOptions {
    /// Context tokens on each side.
    pub width: usize,
    /// Display width the left context (separator included) is right-aligned to.
    pub fill_width: usize,
    pub left_separator: String,
    pub right_separator: String,
    /// Written where the left context hits the start of the stream.
    pub start_marker: String,
    /// Written where the right context hits the end of the stream.
    pub end_marker: String,
}

impl Default for KwicOptions {
    fn default() -> Self {
        Self {
            width: 5,
            fill_width: 100,
            left_separator: "_>>".to_string(),
            right_separator: "<<_".to_string(),
            start_marker: "*B_O_BDATA*".to_string(),
            end_marker: "*E_O_BDATA*".to_string(),
        }
    }
}

impl KwicOptions {
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_fill_width(mut self, fill_width: usize) -> Self {
        self.fill_width = fill_width;
        self
    }

    pub fn with_separators(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left_separator = left.into();
        self.right_separator = right.into();
        self
    }

    pub fn with_markers(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_marker = start.into();
        self.end_marker = end.into();
        self
    }
}

fn push_spaced(out: &mut String, tokens: &[Token]) {
    for token in tokens {
        out.extend(std::iter::repeat(' ').take(token.spacing()));
        out.push_str(token.text());
    }
}

/// One KWIC line for the tokens of `spans`.
///
/// The context windows are taken before the first and after the last token
/// of `spans`. Context tokens keep their recorded spacing.
pub fn kwic_line(stream: &TokenStream, spans: &SpanSet, options: &KwicOptions) -> Result<String, SpanError> {
    let (first, last) = match (spans.first_token(), spans.last_token()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(SpanError::EmptySegment {
                span: spans.encode(),
            })
        }
    };
    let preceding = stream.window(options.width, first, Direction::Preceding)?;
    let following = stream.window(options.width, last, Direction::Following)?;

    let mut left = String::new();
    if preceding.padded {
        left.push_str(&options.start_marker);
    }
    push_spaced(&mut left, preceding.tokens);
    left.push_str(&options.left_separator);

    let mut right = String::from(" ");
    push_spaced(&mut right, following.tokens);
    if following.padded {
        right.push_str(&options.end_marker);
    }

    let node = stream.render(spans, &RenderOptions::default())?.text;
    let pad = options.fill_width.saturating_sub(UnicodeWidthStr::width(left.as_str()));

    let mut line = String::with_capacity(pad + left.len() + node.len() + right.len());
    line.extend(std::iter::repeat(' ').take(pad));
    line.push_str(&left);
    line.push_str(&node);
    line.push_str(&options.right_separator);
    line.push_str(&right);
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_from(text: &str) -> TokenStream {
        let mut stream = TokenStream::default();
        stream.tokenize(text);
        stream
    }

    fn narrow() -> KwicOptions {
        KwicOptions::default().with_width(2).with_fill_width(12)
    }

    #[test]
    fn test_middle_of_stream() {
        let stream = stream_from("a b c d e f g h");
        let line = kwic_line(&stream, &SpanSet::single(vec!["word_3"]), &narrow()).unwrap();
        assert_eq!(line, "      b c_>> d<<_  e f");
    }

    #[test]
    fn test_stream_edges_are_marked() {
        let stream = stream_from("a b c d e f g h");
        let line = kwic_line(&stream, &SpanSet::single(vec!["word_0"]), &narrow()).unwrap();
        assert_eq!(line, "*B_O_BDATA*_>>a<<_  b c");

        let line = kwic_line(&stream, &SpanSet::single(vec!["word_7"]), &narrow()).unwrap();
        assert_eq!(line, "      f g_>> h<<_ *E_O_BDATA*");
    }

    #[test]
    fn test_multi_token_node() {
        let stream = stream_from("a b c d e f g h");
        let spans = SpanSet::single(vec!["word_3", "word_4"]);
        let line = kwic_line(&stream, &spans, &narrow()).unwrap();
        assert_eq!(line, "      b c_>> d e<<_  f g");
    }

    #[test]
    fn test_alignment_uses_display_width() {
        let stream = stream_from("日本 は 良い");
        let options = narrow().with_width(5).with_markers("", "");
        let line = kwic_line(&stream, &SpanSet::single(vec!["word_2"]), &options).unwrap();
        assert_eq!(line, "  日本 は_>> 良い<<_ ");
    }

    #[test]
    fn test_unknown_and_empty_spans() {
        let stream = stream_from("a b");
        assert_eq!(
            kwic_line(&stream, &SpanSet::single(vec!["word_9"]), &narrow()),
            Err(SpanError::UnknownToken("word_9".into()))
        );
        assert!(kwic_line(&stream, &SpanSet::default(), &narrow()).is_err());
    }
}
