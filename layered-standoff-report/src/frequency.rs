//! Term frequency tables over the token stream.
//!
//! Besides the raw per-token counts, a second table can be built in which
//! the markables of an overlay level (typically multi-word expressions)
//! replace the tokens they cover and are counted once each.

use std::collections::{HashMap, HashSet};

use layered_standoff::{Document, MarkableId, Result, StandoffError};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    AlphaAsc,
    AlphaDesc,
    FreqAsc,
    FreqDesc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyOptions {
    pub ignore_case: bool,
    /// Trim surrounding whitespace from every term.
    pub strip: bool,
    /// `None` keeps first-occurrence order.
    pub sort: Option<SortOrder>,
    pub overlay_level: Option<String>,
}

impl Default for FrequencyOptions {
    fn default() -> Self {
        Self {
            ignore_case: true,
            strip: false,
            sort: None,
            overlay_level: None,
        }
    }
}

impl FrequencyOptions {
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn with_strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_overlay_level(mut self, level: impl Into<String>) -> Self {
        self.overlay_level = Some(level.into());
        self
    }

    fn normalize(&self, term: &str) -> String {
        let term = if self.strip { term.trim() } else { term };
        if self.ignore_case {
            term.to_lowercase()
        } else {
            term.to_string()
        }
    }
}

/// An ordered `(term, count)` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
    slots: HashMap<String, usize>,
}

impl FrequencyTable {
    fn count(&mut self, term: String) {
        match self.slots.get(&term) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.slots.insert(term.clone(), self.entries.len());
                self.entries.push((term, 1));
            }
        }
    }

    fn sort(&mut self, order: SortOrder) {
        // Stable sorts: equal keys keep first-occurrence order.
        match order {
            SortOrder::AlphaAsc => self.entries.sort_by(|a, b| a.0.cmp(&b.0)),
            SortOrder::AlphaDesc => self.entries.sort_by(|a, b| b.0.cmp(&a.0)),
            SortOrder::FreqAsc => self.entries.sort_by(|a, b| a.1.cmp(&b.1)),
            SortOrder::FreqDesc => self.entries.sort_by(|a, b| b.1.cmp(&a.1)),
        }
        self.slots = self
            .entries
            .iter()
            .enumerate()
            .map(|(slot, (term, _))| (term.clone(), slot))
            .collect();
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn get(&self, term: &str) -> Option<usize> {
        self.slots.get(term).map(|&slot| self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermFrequencies {
    /// One count per token.
    pub raw: FrequencyTable,
    /// Overlay markables counted in place of the tokens they cover. Equal
    /// to `raw` when no overlay level is given.
    pub merged: FrequencyTable,
}

/// Count token texts, and overlay markable texts when an overlay level is set.
///
/// A token covered by several overlay markables contributes each of them
/// once; a markable is counted at its first covered token only.
pub fn term_frequencies(doc: &Document, options: &FrequencyOptions) -> Result<TermFrequencies> {
    let overlay = match &options.overlay_level {
        Some(name) => Some(
            doc.level(name)
                .ok_or_else(|| StandoffError::NoSuchLevel(name.clone()))?,
        ),
        None => None,
    };

    let mut frequencies = TermFrequencies::default();
    let mut processed: HashSet<&MarkableId> = HashSet::new();

    for token in doc.tokens().iter() {
        let term = options.normalize(token.text());
        frequencies.raw.count(term.clone());

        let covering = overlay.map(|level| level.by_token(token.id())).unwrap_or_default();
        if covering.is_empty() {
            frequencies.merged.count(term);
            continue;
        }
        for markable in covering {
            if !processed.insert(markable.id()) {
                continue;
            }
            let text = markable.text(doc.tokens())?;
            frequencies.merged.count(options.normalize(&text));
        }
    }

    if let Some(order) = options.sort {
        frequencies.raw.sort(order);
        frequencies.merged.sort(order);
    }
    debug!(
        terms = frequencies.raw.len(),
        merged_terms = frequencies.merged.len(),
        "counted term frequencies"
    );
    Ok(frequencies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_standoff::{AddOptions, SpanSet};

    fn pairs(table: &FrequencyTable) -> Vec<(&str, usize)> {
        table.entries().iter().map(|(t, c)| (t.as_str(), *c)).collect()
    }

    #[test]
    fn test_raw_counts_keep_first_occurrence_order() {
        let doc = Document::from_text("The cat saw the dog");
        let tf = term_frequencies(&doc, &FrequencyOptions::default()).unwrap();
        assert_eq!(
            pairs(&tf.raw),
            vec![("the", 2), ("cat", 1), ("saw", 1), ("dog", 1)]
        );
        assert_eq!(tf.raw, tf.merged);
    }

    #[test]
    fn test_case_sensitive() {
        let doc = Document::from_text("The cat saw the dog");
        let tf = term_frequencies(&doc, &FrequencyOptions::default().with_ignore_case(false)).unwrap();
        assert_eq!(tf.raw.get("The"), Some(1));
        assert_eq!(tf.raw.get("the"), Some(1));
    }

    #[test]
    fn test_sort_orders() {
        let doc = Document::from_text("b a b c a b");
        let by = |order: SortOrder| {
            let tf = term_frequencies(&doc, &FrequencyOptions::default().with_sort(order)).unwrap();
            let owned: Vec<(String, usize)> = pairs(&tf.raw)
                .into_iter()
                .map(|(t, c)| (t.to_string(), c))
                .collect();
            owned
        };
        let owned = |v: &[(&str, usize)]| v.iter().map(|(t, c)| (t.to_string(), *c)).collect::<Vec<_>>();
        assert_eq!(by(SortOrder::AlphaAsc), owned(&[("a", 2), ("b", 3), ("c", 1)]));
        assert_eq!(by(SortOrder::AlphaDesc), owned(&[("c", 1), ("b", 3), ("a", 2)]));
        assert_eq!(by(SortOrder::FreqAsc), owned(&[("c", 1), ("a", 2), ("b", 3)]));
        assert_eq!(by(SortOrder::FreqDesc), owned(&[("b", 3), ("a", 2), ("c", 1)]));
    }

    #[test]
    fn test_overlay_counts_expression_once() {
        let mut doc = Document::from_text("New York is not York");
        doc.add_level("mwe", None).unwrap();
        doc.add_markable(
            "mwe",
            SpanSet::single(vec!["word_0", "word_1"]),
            None,
            AddOptions::default(),
        )
        .unwrap();

        let options = FrequencyOptions::default().with_overlay_level("mwe");
        let tf = term_frequencies(&doc, &options).unwrap();
        assert_eq!(tf.raw.get("york"), Some(2));
        assert_eq!(
            pairs(&tf.merged),
            vec![("new york", 1), ("is", 1), ("not", 1), ("york", 1)]
        );
    }

    #[test]
    fn test_missing_overlay_level() {
        let doc = Document::from_text("a b");
        let options = FrequencyOptions::default().with_overlay_level("mwe");
        assert!(matches!(
            term_frequencies(&doc, &options),
            Err(StandoffError::NoSuchLevel(name)) if name == "mwe"
        ));
    }
}
