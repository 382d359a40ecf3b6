//! Plain-text overview of a document's levels.

use std::fmt;

use layered_standoff::{DefaultAttribute, Document, MarkableLevel};

/// Column width of level names in the summary table.
const NAME_WIDTH: usize = 16;

/// One row of a [`DocumentSummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSummary {
    pub name: String,
    pub markables: usize,
    /// `None` when the level has no annotation scheme.
    pub defaults: Option<Vec<DefaultAttribute>>,
}

impl LevelSummary {
    pub fn of(level: &MarkableLevel) -> Self {
        Self {
            name: level.name().to_string(),
            markables: level.len(),
            defaults: level.default_attributes(),
        }
    }

    /// `name:value` pairs joined by `, `; branching attributes are prefixed
    /// with `<>`.
    pub fn defaults_string(&self) -> String {
        let defaults = match &self.defaults {
            Some(defaults) => defaults,
            None => return "Annotation scheme instance not available!".to_string(),
        };
        if defaults.is_empty() {
            return "none defined".to_string();
        }
        defaults
            .iter()
            .map(|d| {
                let marker = if d.branching { "<>" } else { "" };
                format!("{}{}:{}", marker, d.name, d.value)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for LevelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " {:<width$} : {} markables [default: {}]",
            self.name,
            self.markables,
            self.defaults_string(),
            width = NAME_WIDTH
        )
    }
}

/// Token count plus one [`LevelSummary`] per level, in level order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub tokens: usize,
    pub levels: Vec<LevelSummary>,
}

impl DocumentSummary {
    pub fn of(doc: &Document) -> Self {
        Self {
            tokens: doc.token_count(),
            levels: doc.levels().iter().map(LevelSummary::of).collect(),
        }
    }
}

impl fmt::Display for DocumentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Basedata elements : {}", self.tokens)?;
        write!(f, "Markable levels   :")?;
        for level in &self.levels {
            write!(f, "\n{}", level)?;
        }
        Ok(())
    }
}
