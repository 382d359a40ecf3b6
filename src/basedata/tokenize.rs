//! Default tokenizer driven by Unicode general categories.
//!
//! Punctuation and symbols become tokens of their own; spaces, line and
//! paragraph separators, format and control characters only separate tokens
//! and are counted into the `spc` attribute of the next token. Everything
//! else accumulates into words.

use unicode_general_category::{get_general_category, GeneralCategory};

use super::{TokenId, TokenStream, SPACING_ATTRIBUTE};
use crate::config::TokenizerConfig;
use crate::Attributes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Symbol,
    Space,
}

fn classify(ch: char) -> CharClass {
    use GeneralCategory::*;

    match get_general_category(ch) {
        LineSeparator | ParagraphSeparator | SpaceSeparator | Format | Control => CharClass::Space,
        CurrencySymbol | MathSymbol | OtherSymbol | ConnectorPunctuation | DashPunctuation
        | ClosePunctuation | FinalPunctuation | InitialPunctuation | OtherPunctuation
        | OpenPunctuation => CharClass::Symbol,
        _ => CharClass::Word,
    }
}

fn is_digit(ch: char) -> bool {
    get_general_category(ch) == GeneralCategory::DecimalNumber
}

/// `spc` is only stored when it differs from the default of one space.
fn spacing_attributes(spaces: usize) -> Option<Attributes> {
    if spaces == 1 {
        return None;
    }
    let mut attrs = Attributes::new();
    attrs.insert(SPACING_ATTRIBUTE.to_string(), spaces.to_string());
    Some(attrs)
}

/// Split `word` at every boundary between digit runs and non-digit runs.
fn digit_runs(word: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut previous: Option<bool> = None;
    for (idx, ch) in word.char_indices() {
        let digit = is_digit(ch);
        if previous.map_or(false, |p| p != digit) {
            runs.push(&word[start..idx]);
            start = idx;
        }
        previous = Some(digit);
    }
    if start < word.len() {
        runs.push(&word[start..]);
    }
    runs
}

impl TokenStream {
    /// Tokenize `text` and append the tokens, returning their ids in order.
    pub fn tokenize(&mut self, text: &str) -> Vec<TokenId> {
        self.tokenize_with(text, TokenizerConfig::default())
    }

    pub fn tokenize_with(&mut self, text: &str, config: TokenizerConfig) -> Vec<TokenId> {
        let mut ids = Vec::new();
        let mut word = String::new();
        let mut spaces = 0;

        for ch in text.chars() {
            let class = classify(ch);
            if class == CharClass::Word {
                word.push(ch);
                continue;
            }
            if !word.is_empty() {
                self.push_word(&word, spaces, config, &mut ids);
                word.clear();
                spaces = 0;
            }
            match class {
                CharClass::Symbol => {
                    ids.push(self.push(ch.to_string(), spacing_attributes(spaces)));
                    spaces = 0;
                }
                _ => spaces += 1,
            }
        }
        if !word.is_empty() {
            self.push_word(&word, spaces, config, &mut ids);
        }
        ids
    }

    fn push_word(
        &mut self,
        word: &str,
        spaces: usize,
        config: TokenizerConfig,
        ids: &mut Vec<TokenId>,
    ) {
        if !config.split_digits {
            ids.push(self.push(word, spacing_attributes(spaces)));
            return;
        }
        for (idx, run) in digit_runs(word).into_iter().enumerate() {
            let spaces = if idx == 0 { spaces } else { 0 };
            ids.push(self.push(run, spacing_attributes(spaces)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts_and_spacing(stream: &TokenStream) -> Vec<(String, Option<String>)> {
        stream
            .iter()
            .map(|t| {
                (
                    t.text().to_string(),
                    t.attributes()
                        .and_then(|a| a.get(SPACING_ATTRIBUTE))
                        .cloned(),
                )
            })
            .collect()
    }

    #[test]
    fn test_sentence_with_abbreviation() {
        let mut stream = TokenStream::default();
        let ids = stream.tokenize("Dr. Smith arrived.");
        assert_eq!(ids.len(), 5);

        let texts: Vec<&str> = stream.iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["Dr", ".", "Smith", "arrived", "."]);

        let spacing: Vec<usize> = stream.iter().map(|t| t.spacing()).collect();
        assert_eq!(spacing, vec![0, 0, 1, 1, 0]);

        // Only non-default spacing is stored.
        assert_eq!(
            texts_and_spacing(&stream),
            vec![
                ("Dr".to_string(), Some("0".to_string())),
                (".".to_string(), Some("0".to_string())),
                ("Smith".to_string(), None),
                ("arrived".to_string(), None),
                (".".to_string(), Some("0".to_string())),
            ]
        );
    }

    #[test]
    fn test_multiple_spaces_and_newlines() {
        let mut stream = TokenStream::default();
        stream.tokenize("one   two\n\nthree");
        let spacing: Vec<usize> = stream.iter().map(|t| t.spacing()).collect();
        assert_eq!(spacing, vec![0, 3, 2]);
    }

    #[test]
    fn test_symbols_and_currency() {
        let mut stream = TokenStream::default();
        stream.tokenize("costs $5 (approx.)");
        let texts: Vec<&str> = stream.iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["costs", "$", "5", "(", "approx", ".", ")"]);
    }

    #[test]
    fn test_non_ascii_punctuation() {
        let mut stream = TokenStream::default();
        stream.tokenize("«Grüße»—danke");
        let texts: Vec<&str> = stream.iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["«", "Grüße", "»", "—", "danke"]);
    }

    #[test]
    fn test_trailing_whitespace_emits_nothing() {
        let mut stream = TokenStream::default();
        let ids = stream.tokenize("end   ");
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_split_digits() {
        let mut stream = TokenStream::default();
        stream.tokenize_with(
            "abc123def 42",
            TokenizerConfig { split_digits: true },
        );
        let texts: Vec<&str> = stream.iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["abc", "123", "def", "42"]);
        let spacing: Vec<usize> = stream.iter().map(|t| t.spacing()).collect();
        assert_eq!(spacing, vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_tokenize_appends_to_existing_stream() {
        let mut stream = TokenStream::default();
        stream.tokenize("first");
        let ids = stream.tokenize(" second");
        assert_eq!(ids, vec![TokenId::from("word_1")]);
    }

    #[test]
    fn test_digit_runs() {
        assert_eq!(digit_runs("a1b22"), vec!["a", "1", "b", "22"]);
        assert_eq!(digit_runs("2024"), vec!["2024"]);
        assert_eq!(digit_runs("x"), vec!["x"]);
    }
}
