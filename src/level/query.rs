//! Attribute queries over a level.
//!
//! A predicate map selects markables whose attributes match every entry.
//! Values starting with `***` are regular expressions matched at the start
//! of the stored value. The reserved key `_string` matches against the
//! markable's rendered text instead of an attribute.

use regex::Regex;

use super::MarkableLevel;
use crate::basedata::TokenStream;
use crate::error::Result;
use crate::markable::Markable;
use crate::Attributes;

/// Marks a predicate value as a regular expression.
pub const WILDCARD_MARKER: &str = "***";

/// Predicate key matched against the markable's text.
pub const TEXT_KEY: &str = "_string";

enum Condition {
    Exact(String),
    Pattern(Regex),
}

impl Condition {
    fn parse(value: &str) -> Result<Self> {
        match value.strip_prefix(WILDCARD_MARKER) {
            Some(pattern) => Ok(Condition::Pattern(Regex::new(&format!("^(?:{})", pattern))?)),
            None => Ok(Condition::Exact(value.to_string())),
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Condition::Exact(expected) => expected == value,
            Condition::Pattern(regex) => regex.is_match(value),
        }
    }
}

impl MarkableLevel {
    /// Every markable matching all entries of `predicate`, in insertion order.
    ///
    /// An empty predicate matches everything; a key the markable lacks never
    /// matches.
    pub fn query(&self, predicate: &Attributes, stream: &TokenStream) -> Result<Vec<&Markable>> {
        let mut conditions = Vec::with_capacity(predicate.len());
        for (key, value) in predicate {
            conditions.push((key.as_str(), Condition::parse(value)?));
        }

        let mut found = Vec::new();
        'markables: for markable in self.iter() {
            for (key, condition) in &conditions {
                let matched = if *key == TEXT_KEY {
                    condition.matches(&markable.text(stream)?)
                } else {
                    markable
                        .attribute(key)
                        .map_or(false, |value| condition.matches(value))
                };
                if !matched {
                    continue 'markables;
                }
            }
            found.push(markable);
        }
        Ok(found)
    }
}
