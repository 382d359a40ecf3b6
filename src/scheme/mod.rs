//! Annotation scheme capabilities consumed by validation.
//!
//! A scheme is an ordered list of attribute definitions. Selecting a value on
//! a branching attribute may activate further, dependent attributes. The core
//! only relies on the [`AnnotationScheme`] and [`SchemeAttribute`] traits;
//! [`SchemeTree`] is one concrete, declarative implementation.

mod tree;

pub use tree::{AttributeNode, SchemeRegistry, SchemeTree, ValueNode};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Type tag of a scheme attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Single choice among fixed values.
    NominalButton,
    /// Single choice among fixed values, presented as a list.
    NominalList,
    FreeText,
    /// Unordered set of markables, `;`-separated.
    MarkableSet,
    /// References to other markables, `;`-separated `[level:]id` tokens.
    MarkablePointer,
}

impl AttributeKind {
    /// Numeric type code used by scheme files.
    pub fn code(self) -> u8 {
        match self {
            AttributeKind::NominalButton => 1,
            AttributeKind::NominalList => 2,
            AttributeKind::FreeText => 3,
            AttributeKind::MarkableSet => 5,
            AttributeKind::MarkablePointer => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(AttributeKind::NominalButton),
            2 => Some(AttributeKind::NominalList),
            3 => Some(AttributeKind::FreeText),
            5 => Some(AttributeKind::MarkableSet),
            6 => Some(AttributeKind::MarkablePointer),
            _ => None,
        }
    }

    /// Whether values of this kind reference other markables.
    pub fn is_reference(self) -> bool {
        matches!(self, AttributeKind::MarkableSet | AttributeKind::MarkablePointer)
    }

    pub fn is_nominal(self) -> bool {
        matches!(self, AttributeKind::NominalButton | AttributeKind::NominalList)
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeKind::NominalButton => "NOMINAL_BUTTON",
            AttributeKind::NominalList => "NOMINAL_LIST",
            AttributeKind::FreeText => "FREETEXT",
            AttributeKind::MarkableSet => "MARKABLE_SET",
            AttributeKind::MarkablePointer => "MARKABLE_POINTER",
        };
        f.write_str(name)
    }
}

/// One attribute definition in a scheme.
pub trait SchemeAttribute: fmt::Debug + Send + Sync {
    /// Display name; supplied keys are matched against it case-insensitively.
    fn name(&self) -> &str;

    fn kind(&self) -> AttributeKind;

    fn default_value(&self) -> &str;

    /// Whether selecting a value can activate dependent attributes.
    fn is_branching(&self) -> bool;

    /// Maximum number of `;`-separated targets for reference attributes.
    fn max_cardinality(&self) -> Option<usize> {
        None
    }

    /// Try to select `value`. Returns false if the selection does not stick.
    fn select(&self, value: &str) -> bool;

    /// Attributes activated once `value` is selected.
    fn dependents(&self, value: &str) -> Vec<&dyn SchemeAttribute>;
}

/// `(kind, name, default, branching)` of an independent attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultAttribute {
    pub kind: AttributeKind,
    pub name: String,
    pub value: String,
    pub branching: bool,
}

/// Ordered, branching attribute scheme bound to a markable level.
pub trait AnnotationScheme: fmt::Debug + Send + Sync {
    /// Attributes that are active before any value is selected, in scheme order.
    fn independent_attributes(&self) -> Vec<&dyn SchemeAttribute>;

    fn default_attributes(&self) -> Vec<DefaultAttribute> {
        self.independent_attributes()
            .into_iter()
            .map(|a| DefaultAttribute {
                kind: a.kind(),
                name: a.name().to_string(),
                value: a.default_value().to_string(),
                branching: a.is_branching(),
            })
            .collect()
    }
}

/// Looks up the scheme for a level by name.
pub trait SchemeProvider {
    /// `None` means the level is schema-less.
    fn scheme_for(&self, level: &str) -> Option<Arc<dyn AnnotationScheme>>;
}

/// Provider for documents without any annotation schemes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSchemes;

impl SchemeProvider for NoSchemes {
    fn scheme_for(&self, _level: &str) -> Option<Arc<dyn AnnotationScheme>> {
        None
    }
}
