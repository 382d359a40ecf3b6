//! Declarative scheme trees, loadable from RON.
//!
//! ```text
//! (attributes: [
//!     (name: "pos", kind: NominalButton, values: [
//!         (value: "noun", next: [(name: "number", kind: NominalButton, values: [(value: "sg"), (value: "pl")])]),
//!         (value: "verb"),
//!     ]),
//! ])
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{AnnotationScheme, AttributeKind, SchemeAttribute, SchemeProvider};
use crate::Result;

/// A selectable value and the attributes it activates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueNode {
    pub value: String,
    #[serde(default)]
    pub next: Vec<AttributeNode>,
}

/// One attribute definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeNode {
    pub name: String,
    pub kind: AttributeKind,
    /// Falls back to the first value for nominal attributes, empty otherwise.
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub values: Vec<ValueNode>,
    #[serde(default)]
    pub max_size: Option<usize>,
}

impl AttributeNode {
    fn with_kind(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            values: Vec::new(),
            max_size: None,
        }
    }

    pub fn nominal(name: impl Into<String>, values: &[&str]) -> Self {
        let mut node = Self::with_kind(name, AttributeKind::NominalButton);
        node.values = values
            .iter()
            .map(|v| ValueNode {
                value: v.to_string(),
                next: Vec::new(),
            })
            .collect();
        node
    }

    pub fn free_text(name: impl Into<String>) -> Self {
        Self::with_kind(name, AttributeKind::FreeText)
    }

    pub fn pointer(name: impl Into<String>, max_size: Option<usize>) -> Self {
        let mut node = Self::with_kind(name, AttributeKind::MarkablePointer);
        node.max_size = max_size;
        node
    }

    pub fn set(name: impl Into<String>) -> Self {
        Self::with_kind(name, AttributeKind::MarkableSet)
    }

    /// Present a nominal attribute as a list instead of buttons.
    pub fn as_list(mut self) -> Self {
        if self.kind == AttributeKind::NominalButton {
            self.kind = AttributeKind::NominalList;
        }
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Attach dependent attributes to `value`, adding the value if needed.
    pub fn branch(mut self, value: &str, next: Vec<AttributeNode>) -> Self {
        match self.values.iter_mut().find(|v| v.value == value) {
            Some(node) => node.next.extend(next),
            None => self.values.push(ValueNode {
                value: value.to_string(),
                next,
            }),
        }
        self
    }
}

impl SchemeAttribute for AttributeNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AttributeKind {
        self.kind
    }

    fn default_value(&self) -> &str {
        match &self.default {
            Some(default) => default,
            None if self.kind.is_nominal() => {
                self.values.first().map(|v| v.value.as_str()).unwrap_or("")
            }
            None => "",
        }
    }

    fn is_branching(&self) -> bool {
        self.values.iter().any(|v| !v.next.is_empty())
    }

    fn max_cardinality(&self) -> Option<usize> {
        self.max_size
    }

    fn select(&self, value: &str) -> bool {
        if self.kind.is_nominal() {
            self.values.iter().any(|v| v.value == value)
        } else {
            true
        }
    }

    fn dependents(&self, value: &str) -> Vec<&dyn SchemeAttribute> {
        self.values
            .iter()
            .find(|v| v.value == value)
            .map(|v| v.next.iter().map(|n| n as &dyn SchemeAttribute).collect())
            .unwrap_or_default()
    }
}

/// A complete scheme: the independent attributes in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeTree {
    pub attributes: Vec<AttributeNode>,
}

impl SchemeTree {
    pub fn new(attributes: Vec<AttributeNode>) -> Self {
        Self { attributes }
    }

    pub fn from_ron(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }
}

impl AnnotationScheme for SchemeTree {
    fn independent_attributes(&self) -> Vec<&dyn SchemeAttribute> {
        self.attributes.iter().map(|a| a as &dyn SchemeAttribute).collect()
    }
}

/// Level name → scheme lookup.
#[derive(Debug, Clone, Default)]
pub struct SchemeRegistry {
    schemes: HashMap<String, Arc<SchemeTree>>,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, level: impl Into<String>, scheme: SchemeTree) {
        self.schemes.insert(level.into(), Arc::new(scheme));
    }

    pub fn with(mut self, level: impl Into<String>, scheme: SchemeTree) -> Self {
        self.insert(level, scheme);
        self
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

impl SchemeProvider for SchemeRegistry {
    fn scheme_for(&self, level: &str) -> Option<Arc<dyn AnnotationScheme>> {
        self.schemes
            .get(level)
            .map(|scheme| Arc::clone(scheme) as Arc<dyn AnnotationScheme>)
    }
}
