//! Scheme-driven classification of attribute maps.
//!
//! Validation walks the scheme's attributes in order, growing the worklist
//! with the dependents of every branching attribute whose supplied value is
//! accepted. Supplied keys are matched against attribute names without
//! regard to case. Whatever is left unmatched at the end was never reached by
//! the selected branches and is reported as invalid.
//!
//! The supplied map is never modified; the result is a pure classification.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::error::InvalidAttributesError;
use crate::markable::MarkableId;
use crate::scheme::{AnnotationScheme, DefaultAttribute, SchemeAttribute};
use crate::Attributes;

/// Classification of a supplied attribute map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub supplied: Attributes,
    pub valid: Attributes,
    /// Unknown keys, keys on unreached branches, and rejected values.
    pub invalid: Attributes,
    /// Reached attributes that were not supplied, with their defaults.
    pub missing: Attributes,
    /// Valid keys whose attribute references other markables.
    pub references: BTreeSet<String>,
}

impl Validation {
    pub fn has_errors(&self) -> bool {
        !self.invalid.is_empty() || !self.missing.is_empty()
    }

    /// Every outstanding problem is a missing attribute.
    pub fn only_missing(&self) -> bool {
        self.invalid.is_empty() && !self.missing.is_empty()
    }

    pub fn into_error(self, level: &str, markable: &MarkableId) -> InvalidAttributesError {
        InvalidAttributesError {
            level: level.to_string(),
            markable: markable.clone(),
            supplied: self.supplied,
            valid: self.valid,
            invalid: self.invalid,
            missing: self.missing,
        }
    }
}

/// Validates attribute maps against an optional scheme.
///
/// Without a scheme every map is valid as supplied.
#[derive(Debug, Clone, Default)]
pub struct AttributeValidator {
    scheme: Option<Arc<dyn AnnotationScheme>>,
}

impl AttributeValidator {
    pub fn new(scheme: Arc<dyn AnnotationScheme>) -> Self {
        Self {
            scheme: Some(scheme),
        }
    }

    pub fn schemaless() -> Self {
        Self::default()
    }

    pub fn has_scheme(&self) -> bool {
        self.scheme.is_some()
    }

    pub fn scheme(&self) -> Option<&Arc<dyn AnnotationScheme>> {
        self.scheme.as_ref()
    }

    /// `(kind, name, default, branching)` for every independent attribute.
    pub fn default_attributes(&self) -> Option<Vec<DefaultAttribute>> {
        self.scheme.as_ref().map(|scheme| scheme.default_attributes())
    }

    /// Independent attributes and their defaults as an attribute map.
    pub fn default_map(&self) -> Attributes {
        self.default_attributes()
            .unwrap_or_default()
            .into_iter()
            .map(|d| (d.name, d.value))
            .collect()
    }

    /// Sort `supplied` into valid, invalid and missing attributes.
    ///
    /// Starting from the independent attributes, every scheme attribute is
    /// looked up among the still unmatched keys, case-insensitively. A match
    /// whose value the attribute accepts becomes valid and, for branching
    /// attributes, queues the dependents of that value. Supplied keys left
    /// unmatched at the end are invalid.
    ///
    /// An attribute that is not found is recorded as missing, with its
    /// default value, unless a supplied key of the same name was already
    /// matched earlier in the walk. This happens when two branches share a
    /// dependent attribute: the second visit finds nothing left to match,
    /// and the attribute is not reported missing.
    ///
    /// Without a scheme every supplied attribute is valid.
    pub fn validate(&self, supplied: &Attributes) -> Validation {
        let scheme = match &self.scheme {
            Some(scheme) => scheme,
            None => {
                return Validation {
                    supplied: supplied.clone(),
                    valid: supplied.clone(),
                    ..Validation::default()
                }
            }
        };

        let mut result = Validation {
            supplied: supplied.clone(),
            invalid: supplied.clone(),
            ..Validation::default()
        };
        let mut consumed: HashSet<String> = HashSet::new();
        let mut worklist: Vec<&dyn SchemeAttribute> = scheme.independent_attributes();

        let mut next = 0;
        while next < worklist.len() {
            let attribute = worklist[next];
            next += 1;

            let name = attribute.name().to_lowercase();
            let found = result
                .invalid
                .iter()
                .find(|(key, _)| key.to_lowercase() == name)
                .map(|(key, value)| (key.clone(), value.clone()));

            let (key, value) = match found {
                Some(pair) => pair,
                None => {
                    // A name reached twice is only missing if it was never matched.
                    if !consumed.contains(&name) {
                        result.missing.insert(
                            attribute.name().to_string(),
                            attribute.default_value().to_string(),
                        );
                    }
                    continue;
                }
            };

            if exceeds_cardinality(attribute, &value) || !attribute.select(&value) {
                continue;
            }

            result.invalid.remove(&key);
            if attribute.kind().is_reference() {
                result.references.insert(key.clone());
            }
            consumed.insert(name);
            if attribute.is_branching() {
                worklist.extend(attribute.dependents(&value));
            }
            result.valid.insert(key, value);
        }

        result
    }
}

fn exceeds_cardinality(attribute: &dyn SchemeAttribute, value: &str) -> bool {
    if !attribute.kind().is_reference() {
        return false;
    }
    match attribute.max_cardinality() {
        Some(max) => value.split(';').filter(|t| !t.trim().is_empty()).count() > max,
        None => false,
    }
}
