//! Persistence-shaped records.
//!
//! These mirror what a persistence layer reads and writes: the token list as
//! `(text, id, attributes)` and, per level, markables as
//! `(id, span string, attributes)` in file order. The byte format is up to
//! the caller; RON helpers are provided for convenience.

use serde::{Deserialize, Serialize};

use crate::basedata::{Token, TokenId};
use crate::level::MarkableLevel;
use crate::markable::{Markable, MarkableId};
use crate::{Attributes, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub text: String,
    pub id: TokenId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

impl TokenRecord {
    pub fn new(id: impl Into<TokenId>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            id: id.into(),
            attributes: None,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkableRecord {
    pub id: MarkableId,
    /// Compact span string, e.g. `word_1..word_4,word_7`.
    pub span: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl MarkableRecord {
    pub fn new(id: impl Into<MarkableId>, span: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            span: span.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub name: String,
    #[serde(default)]
    pub markables: Vec<MarkableRecord>,
}

/// Complete persisted state of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub tokens: Vec<TokenRecord>,
    #[serde(default)]
    pub levels: Vec<LevelRecord>,
}

impl DocumentSnapshot {
    pub fn from_ron(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    pub fn level(&self, name: &str) -> Option<&LevelRecord> {
        self.levels.iter().find(|l| l.name == name)
    }
}

impl Token {
    pub fn to_record(&self) -> TokenRecord {
        TokenRecord {
            text: self.text().to_string(),
            id: self.id().clone(),
            attributes: self.attributes().cloned(),
        }
    }
}

impl Markable {
    pub fn to_record(&self) -> MarkableRecord {
        MarkableRecord {
            id: self.id().clone(),
            span: self.spans().encode(),
            attributes: self.attributes().clone(),
        }
    }
}

impl MarkableLevel {
    /// Markables in insertion order.
    pub fn to_record(&self) -> LevelRecord {
        LevelRecord {
            name: self.name().to_string(),
            markables: self.iter().map(Markable::to_record).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentSnapshot {
        DocumentSnapshot {
            tokens: vec![
                TokenRecord::new("word_0", "Hello").with_attribute("spc", "0"),
                TokenRecord::new("word_1", "world"),
            ],
            levels: vec![LevelRecord {
                name: "np".into(),
                markables: vec![MarkableRecord::new("markable_0", "word_0..word_1")
                    .with_attribute("type", "greeting")],
            }],
        }
    }

    #[test]
    fn test_ron_round_trip() {
        let snapshot = sample();
        let written = snapshot.to_ron().unwrap();
        assert_eq!(DocumentSnapshot::from_ron(&written).unwrap(), snapshot);
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["tokens"][0]["id"], "word_0");
        assert_eq!(value["tokens"][0]["attributes"]["spc"], "0");
        // Tokens without attributes omit the field entirely.
        assert!(value["tokens"][1].get("attributes").is_none());
        assert_eq!(value["levels"][0]["markables"][0]["span"], "word_0..word_1");
    }

    #[test]
    fn test_from_ron_with_defaults() {
        let snapshot = DocumentSnapshot::from_ron(
            r#"(tokens: [(text: "a", id: "word_0")], levels: [(name: "np")])"#,
        )
        .unwrap();
        assert_eq!(snapshot.tokens[0].attributes, None);
        assert!(snapshot.level("np").unwrap().markables.is_empty());
        assert!(snapshot.level("pos").is_none());
    }
}
