//! Markable levels: storage, identity and the token index.
//!
//! A level owns its markables and keeps a secondary index from token id to
//! the markables covering that token. Both are updated together in
//! [`MarkableLevel::add`] and [`MarkableLevel::delete`], so the index is
//! always exactly the inverse of the markables' span sets.

mod query;

pub use query::{TEXT_KEY, WILDCARD_MARKER};

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::basedata::{TokenId, TokenStream};
use crate::error::{Result, SpanError, StandoffError};
use crate::markable::{Markable, MarkableId, PointerTarget};
use crate::scheme::{AnnotationScheme, DefaultAttribute};
use crate::span::SpanSet;
use crate::validate::{AttributeValidator, Validation};
use crate::Attributes;

/// Prefix of minted markable ids.
pub const MARKABLE_ID_PREFIX: &str = "markable";

/// Policy knobs for [`MarkableLevel::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOptions {
    pub allow_overlap: bool,
    pub allow_duplicate_spans: bool,
    /// Seed the new markable with the scheme defaults, unvalidated.
    pub apply_defaults: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            allow_overlap: true,
            allow_duplicate_spans: false,
            apply_defaults: false,
        }
    }
}

impl AddOptions {
    pub fn with_allow_overlap(mut self, allow: bool) -> Self {
        self.allow_overlap = allow;
        self
    }

    pub fn with_allow_duplicate_spans(mut self, allow: bool) -> Self {
        self.allow_duplicate_spans = allow;
        self
    }

    pub fn with_apply_defaults(mut self, apply: bool) -> Self {
        self.apply_defaults = apply;
        self
    }
}

/// Why an existing markable blocked an add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// Exactly the same span set.
    Duplicate,
    Overlap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptySpan,
}

/// Result of [`MarkableLevel::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Created(MarkableId),
    /// Nothing was created; `existing` blocked the add.
    Exists {
        existing: MarkableId,
        conflict: Conflict,
    },
    Rejected(RejectReason),
}

impl AddOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, AddOutcome::Created(_))
    }

    pub fn created(&self) -> Option<&MarkableId> {
        match self {
            AddOutcome::Created(id) => Some(id),
            _ => None,
        }
    }

    /// The new markable, or the one that blocked the add.
    pub fn markable_id(&self) -> Option<&MarkableId> {
        match self {
            AddOutcome::Created(id) => Some(id),
            AddOutcome::Exists { existing, .. } => Some(existing),
            AddOutcome::Rejected(_) => None,
        }
    }
}

/// A named collection of markables sharing one annotation scheme.
#[derive(Debug, Clone)]
pub struct MarkableLevel {
    name: String,
    markables: Vec<Markable>,
    slots: HashMap<MarkableId, usize>,
    by_token: HashMap<TokenId, Vec<MarkableId>>,
    next_id: u64,
    issued: HashSet<MarkableId>,
    validator: AttributeValidator,
}

impl MarkableLevel {
    /// A schema-less level.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markables: Vec::new(),
            slots: HashMap::new(),
            by_token: HashMap::new(),
            next_id: 0,
            issued: HashSet::new(),
            validator: AttributeValidator::schemaless(),
        }
    }

    pub fn with_scheme(mut self, scheme: Arc<dyn AnnotationScheme>) -> Self {
        self.validator = AttributeValidator::new(scheme);
        self
    }

    pub(crate) fn with_validator(mut self, validator: AttributeValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn validator(&self) -> &AttributeValidator {
        &self.validator
    }

    pub fn len(&self) -> usize {
        self.markables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markables.is_empty()
    }

    /// Markables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Markable> {
        self.markables.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Markable> {
        self.slots.get(id).map(|&slot| &self.markables[slot])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn require(&self, id: &MarkableId) -> Result<&Markable> {
        self.get(id.as_str()).ok_or_else(|| self.no_such(id))
    }

    fn require_mut(&mut self, id: &MarkableId) -> Result<&mut Markable> {
        match self.slots.get(id.as_str()) {
            Some(&slot) => Ok(&mut self.markables[slot]),
            None => Err(self.no_such(id)),
        }
    }

    fn no_such(&self, id: &MarkableId) -> StandoffError {
        StandoffError::NoSuchMarkable {
            level: self.name.clone(),
            id: id.clone(),
        }
    }

    /// Create a markable over `spans`.
    ///
    /// Empty span sets are rejected and an existing markable with an equal
    /// (or, when overlap is disallowed, overlapping) span set is returned
    /// instead of creating a new one. Span sets naming unknown or repeated
    /// tokens are errors.
    pub fn add(
        &mut self,
        stream: &TokenStream,
        spans: SpanSet,
        explicit_id: Option<&str>,
        options: AddOptions,
    ) -> Result<AddOutcome, SpanError> {
        let spans: SpanSet = spans
            .segments()
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .into();
        if spans.is_empty() {
            warn!(level = %self.name, "not creating markable with empty span");
            return Ok(AddOutcome::Rejected(RejectReason::EmptySpan));
        }
        for token in spans.tokens() {
            stream.require_ordinal(token)?;
        }
        if let Some(token) = spans.repeated_token() {
            return Err(SpanError::RepeatedToken(token.clone()));
        }

        if let Some((existing, conflict)) = self.find_conflict(&spans, options) {
            debug!(
                level = %self.name,
                span = %spans,
                existing = %existing,
                conflict = ?conflict,
                "skipping add"
            );
            return Ok(AddOutcome::Exists { existing, conflict });
        }

        let id = self.allocate_id(explicit_id);
        let mut markable = Markable::new(id.clone(), &self.name, spans, stream)?;
        if options.apply_defaults {
            let references = self.default_references();
            markable.commit_attributes(self.validator.default_map(), &references);
        }

        for token in markable.spans().tokens() {
            self.by_token.entry(token.clone()).or_default().push(id.clone());
        }
        self.slots.insert(id.clone(), self.markables.len());
        self.markables.push(markable);
        Ok(AddOutcome::Created(id))
    }

    fn find_conflict(&self, spans: &SpanSet, options: AddOptions) -> Option<(MarkableId, Conflict)> {
        for token in spans.tokens() {
            for id in self.by_token.get(token).into_iter().flatten() {
                let existing = match self.get(id.as_str()) {
                    Some(existing) => existing,
                    None => continue,
                };
                if !options.allow_duplicate_spans && existing.spans() == spans {
                    return Some((id.clone(), Conflict::Duplicate));
                }
                // Indexed under one of our tokens, so it overlaps.
                if !options.allow_overlap {
                    return Some((id.clone(), Conflict::Overlap));
                }
            }
        }
        None
    }

    /// Explicit ids win when well formed and never issued before; a numeric
    /// suffix advances the counter past it. Otherwise a fresh id is minted.
    ///
    /// The counter wraps around to zero once exhausted. Minting skips every
    /// id already issued, so ids are still never handed out twice.
    fn allocate_id(&mut self, explicit: Option<&str>) -> MarkableId {
        if let Some(explicit) = explicit.map(MarkableId::from) {
            if explicit.is_well_formed() && !self.issued.contains(&explicit) {
                if let Some(next) = explicit.numeric_suffix().and_then(|n| n.checked_add(1)) {
                    self.next_id = self.next_id.max(next);
                }
                self.issued.insert(explicit.clone());
                return explicit;
            }
            debug!(level = %self.name, id = %explicit, "explicit id unusable, minting a new one");
        }
        loop {
            let id = MarkableId::new(format!("{}_{}", MARKABLE_ID_PREFIX, self.next_id));
            self.next_id = self.next_id.wrapping_add(1);
            if self.issued.insert(id.clone()) {
                debug!(level = %self.name, id = %id, "minted markable id");
                return id;
            }
        }
    }

    fn default_references(&self) -> BTreeSet<String> {
        self.validator
            .default_attributes()
            .unwrap_or_default()
            .into_iter()
            .filter(|d| d.kind.is_reference())
            .map(|d| d.name)
            .collect()
    }

    /// Remove a markable and retract it from the token index.
    ///
    /// Index entries that are already gone are tolerated.
    pub fn delete(&mut self, id: &MarkableId) -> Option<Markable> {
        let slot = self.slots.remove(id.as_str())?;
        let markable = self.markables.remove(slot);
        for (slot, m) in self.markables.iter().enumerate().skip(slot) {
            self.slots.insert(m.id().clone(), slot);
        }
        for token in markable.spans().tokens() {
            match self.by_token.get_mut(token) {
                Some(ids) => {
                    ids.retain(|m| m != id);
                    if ids.is_empty() {
                        self.by_token.remove(token);
                    }
                }
                None => debug!(level = %self.name, token = %token, "index entry already missing"),
            }
        }
        Some(markable)
    }

    /// Drop every markable. Issued ids stay retired.
    pub fn remove_all(&mut self) {
        debug!(level = %self.name, count = self.markables.len(), "removing all markables");
        self.markables.clear();
        self.slots.clear();
        self.by_token.clear();
    }

    /// Markables covering `token`, in the order they were added.
    pub fn by_token(&self, token: &TokenId) -> Vec<&Markable> {
        self.by_token
            .get(token)
            .into_iter()
            .flatten()
            .filter_map(|id| self.get(id.as_str()))
            .collect()
    }

    /// Markables whose first segment starts at `token`.
    pub fn starting(&self, token: &TokenId) -> Vec<&Markable> {
        self.by_token(token)
            .into_iter()
            .filter(|m| m.starts_at(token))
            .collect()
    }

    /// Markables whose last segment ends at `token`.
    pub fn ending(&self, token: &TokenId) -> Vec<&Markable> {
        self.by_token(token)
            .into_iter()
            .filter(|m| m.ends_at(token))
            .collect()
    }

    /// All markables by first-token ordinal; ties keep insertion order.
    pub fn ordered(&self) -> Vec<&Markable> {
        let mut ordered: Vec<&Markable> = self.markables.iter().collect();
        ordered.sort_by_key(|m| m.position().first);
        ordered
    }

    /// `(kind, name, default, branching)` of the independent attributes, or
    /// `None` for a schema-less level.
    pub fn default_attributes(&self) -> Option<Vec<DefaultAttribute>> {
        self.validator.default_attributes()
    }

    pub fn validate(&self, attributes: &Attributes) -> Validation {
        self.validator.validate(attributes)
    }

    /// Replace a markable's attributes.
    ///
    /// The map is committed even when validation fails; the returned
    /// [`StandoffError::InvalidAttributes`] only reports the classification.
    pub fn set_attributes(&mut self, id: &MarkableId, attributes: Attributes) -> Result<()> {
        let validation = self.validator.validate(&attributes);
        self.commit(id, attributes, validation)
    }

    /// Merge `new` over the current attributes and revalidate.
    ///
    /// With `add_missing`, attributes that are only missing are backfilled
    /// with their defaults instead of raising. With `drop_invalid`, invalid
    /// keys are left out of the committed map.
    pub fn update(
        &mut self,
        id: &MarkableId,
        new: Attributes,
        add_missing: bool,
        drop_invalid: bool,
    ) -> Result<()> {
        let mut merged = self.require(id)?.attributes().clone();
        merged.extend(new);

        let mut validation = self.validator.validate(&merged);
        while add_missing && validation.only_missing() {
            let before = merged.len();
            merged.extend(validation.missing.clone());
            if merged.len() == before {
                break;
            }
            validation = self.validator.validate(&merged);
        }
        if drop_invalid {
            for key in validation.invalid.keys() {
                merged.remove(key);
            }
        }
        self.commit(id, merged, validation)
    }

    /// Remove one attribute, returning its old value. With `validate`, the
    /// remaining map is revalidated.
    pub fn remove_attribute(
        &mut self,
        id: &MarkableId,
        key: &str,
        validate: bool,
    ) -> Result<Option<String>> {
        let mut attributes = self.require(id)?.attributes().clone();
        let removed = attributes.remove(key);
        let validation = if validate {
            self.validator.validate(&attributes)
        } else {
            Validation::default()
        };
        self.commit(id, attributes, validation)?;
        Ok(removed)
    }

    /// Reset a markable to the scheme defaults.
    pub fn to_default(&mut self, id: &MarkableId) -> Result<()> {
        self.set_attributes(id, self.validator.default_map())
    }

    /// Write `targets` into the pointer attribute `key` and revalidate.
    ///
    /// An empty target list removes the attribute.
    pub fn set_pointers(&mut self, id: &MarkableId, key: &str, targets: &[PointerTarget]) -> Result<()> {
        let markable = self.require_mut(id)?;
        markable.track_pointer_key(key);
        let mut attributes = markable.attributes().clone();
        if targets.is_empty() {
            attributes.remove(key);
        } else {
            attributes.insert(key.to_string(), PointerTarget::encode_list(targets));
        }
        self.set_attributes(id, attributes)
    }

    fn commit(&mut self, id: &MarkableId, attributes: Attributes, validation: Validation) -> Result<()> {
        let markable = self.require_mut(id)?;
        markable.commit_attributes(attributes, &validation.references);
        if validation.has_errors() {
            warn!(
                level = %self.name,
                markable = %id,
                invalid = validation.invalid.len(),
                missing = validation.missing.len(),
                "attributes committed with validation errors"
            );
            return Err(validation.into_error(&self.name, id).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::{AttributeNode, SchemeTree};

    fn stream_of(n: usize) -> TokenStream {
        let mut stream = TokenStream::default();
        for i in 0..n {
            stream.push(format!("t{}", i), None);
        }
        stream
    }

    fn spans(ids: &[&str]) -> SpanSet {
        SpanSet::single(ids.iter().copied())
    }

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn pos_level() -> MarkableLevel {
        let scheme = SchemeTree::new(vec![AttributeNode::nominal("pos", &["noun", "verb"]).branch(
            "noun",
            vec![AttributeNode::nominal("number", &["sg", "pl"])],
        )]);
        MarkableLevel::new("pos").with_scheme(Arc::new(scheme))
    }

    fn created(outcome: AddOutcome) -> MarkableId {
        outcome.created().cloned().unwrap()
    }

    #[test]
    fn test_add_then_duplicate_returns_existing() {
        let stream = stream_of(5);
        let mut level = MarkableLevel::new("np");
        let first = level
            .add(&stream, spans(&["word_1", "word_2"]), None, AddOptions::default())
            .unwrap();
        let id = created(first);
        let second = level
            .add(&stream, spans(&["word_1", "word_2"]), None, AddOptions::default())
            .unwrap();
        assert_eq!(
            second,
            AddOutcome::Exists {
                existing: id,
                conflict: Conflict::Duplicate
            }
        );
        assert_eq!(level.len(), 1);
    }

    #[test]
    fn test_overlap_rejected_when_disallowed() {
        let stream = stream_of(5);
        let mut level = MarkableLevel::new("np");
        let options = AddOptions::default().with_allow_overlap(false);
        let a = created(level.add(&stream, spans(&["word_1", "word_2"]), None, options).unwrap());
        let outcome = level
            .add(&stream, spans(&["word_2", "word_3"]), None, options)
            .unwrap();
        assert_eq!(
            outcome,
            AddOutcome::Exists {
                existing: a,
                conflict: Conflict::Overlap
            }
        );
        // Overlap is fine by default.
        assert!(level
            .add(&stream, spans(&["word_2", "word_3"]), None, AddOptions::default())
            .unwrap()
            .is_created());
    }

    #[test]
    fn test_duplicates_allowed_on_request() {
        let stream = stream_of(3);
        let mut level = MarkableLevel::new("np");
        let options = AddOptions::default().with_allow_duplicate_spans(true);
        level.add(&stream, spans(&["word_0"]), None, options).unwrap();
        assert!(level.add(&stream, spans(&["word_0"]), None, options).unwrap().is_created());
        assert_eq!(level.by_token(&TokenId::from("word_0")).len(), 2);
    }

    #[test]
    fn test_empty_span_is_rejected() {
        let stream = stream_of(3);
        let mut level = MarkableLevel::new("np");
        let outcome = level
            .add(&stream, SpanSet::from_segments(vec![Vec::<&str>::new()]), None, AddOptions::default())
            .unwrap();
        assert_eq!(outcome, AddOutcome::Rejected(RejectReason::EmptySpan));
        assert!(level.is_empty());
    }

    #[test]
    fn test_bad_spans_are_errors() {
        let stream = stream_of(3);
        let mut level = MarkableLevel::new("np");
        assert_eq!(
            level.add(&stream, spans(&["word_9"]), None, AddOptions::default()),
            Err(SpanError::UnknownToken(TokenId::from("word_9")))
        );
        let repeated = SpanSet::from_segments(vec![vec!["word_0", "word_1"], vec!["word_1"]]);
        assert_eq!(
            level.add(&stream, repeated, None, AddOptions::default()),
            Err(SpanError::RepeatedToken(TokenId::from("word_1")))
        );
        assert!(level.is_empty());
    }

    #[test]
    fn test_explicit_ids_advance_counter() {
        let stream = stream_of(5);
        let mut level = MarkableLevel::new("np");
        let opts = AddOptions::default();
        let a = created(level.add(&stream, spans(&["word_0"]), Some("markable_7"), opts).unwrap());
        assert_eq!(a.as_str(), "markable_7");
        let b = created(level.add(&stream, spans(&["word_1"]), None, opts).unwrap());
        assert_eq!(b.as_str(), "markable_8");

        // A colliding explicit id falls back to minting.
        let c = created(level.add(&stream, spans(&["word_2"]), Some("markable_7"), opts).unwrap());
        assert_eq!(c.as_str(), "markable_9");

        // Malformed explicit ids are replaced too.
        let d = created(level.add(&stream, spans(&["word_3"]), Some("bad id"), opts).unwrap());
        assert_eq!(d.as_str(), "markable_10");
    }

    #[test]
    fn test_counter_exhaustion_wraps_to_unused_ids() {
        let stream = stream_of(5);
        let mut level = MarkableLevel::new("np");
        let opts = AddOptions::default();
        let last = format!("markable_{}", u64::MAX);
        let a = created(level.add(&stream, spans(&["word_0"]), Some(last.as_str()), opts).unwrap());
        assert_eq!(a.as_str(), last);
        let b = created(level.add(&stream, spans(&["word_1"]), None, opts).unwrap());
        assert_eq!(b.as_str(), "markable_0");

        let mut level = MarkableLevel::new("np");
        let second_last = format!("markable_{}", u64::MAX - 1);
        created(level.add(&stream, spans(&["word_0"]), Some("markable_0"), opts).unwrap());
        created(level.add(&stream, spans(&["word_1"]), Some(second_last.as_str()), opts).unwrap());
        let c = created(level.add(&stream, spans(&["word_2"]), None, opts).unwrap());
        assert_eq!(c.as_str(), last);
        // Wrapped past the end, skipping the id loaded earlier.
        let d = created(level.add(&stream, spans(&["word_3"]), None, opts).unwrap());
        assert_eq!(d.as_str(), "markable_1");
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let stream = stream_of(5);
        let mut level = MarkableLevel::new("np");
        let opts = AddOptions::default();
        let a = created(level.add(&stream, spans(&["word_0"]), None, opts).unwrap());
        assert!(level.delete(&a).is_some());
        let b = created(level.add(&stream, spans(&["word_0"]), None, opts).unwrap());
        assert_ne!(a, b);
        let c = created(level.add(&stream, spans(&["word_1"]), Some(a.as_str()), opts).unwrap());
        assert_ne!(a, c);
    }

    #[test]
    fn test_delete_retracts_index() {
        let stream = stream_of(6);
        let mut level = MarkableLevel::new("np");
        let opts = AddOptions::default();
        let a = created(level.add(&stream, spans(&["word_1", "word_2"]), None, opts).unwrap());
        let b = created(level.add(&stream, spans(&["word_2", "word_3"]), None, opts).unwrap());
        let c = created(level.add(&stream, spans(&["word_4"]), None, opts).unwrap());

        level.delete(&a).unwrap();
        assert!(level.by_token(&TokenId::from("word_1")).is_empty());
        let on_two: Vec<&MarkableId> = level
            .by_token(&TokenId::from("word_2"))
            .into_iter()
            .map(|m| m.id())
            .collect();
        assert_eq!(on_two, vec![&b]);
        // Slots after the removed one still resolve.
        assert_eq!(level.get(c.as_str()).map(|m| m.id()), Some(&c));
        assert!(level.delete(&a).is_none());
    }

    #[test]
    fn test_starting_ending_and_order() {
        let stream = stream_of(10);
        let mut level = MarkableLevel::new("np");
        let opts = AddOptions::default();
        let late = created(level.add(&stream, spans(&["word_6", "word_7"]), None, opts).unwrap());
        let early = created(
            level
                .add(
                    &stream,
                    SpanSet::from_segments(vec![vec!["word_1", "word_2"], vec!["word_6"]]),
                    None,
                    opts,
                )
                .unwrap(),
        );

        let ordered: Vec<&MarkableId> = level.ordered().into_iter().map(|m| m.id()).collect();
        assert_eq!(ordered, vec![&early, &late]);

        let six = TokenId::from("word_6");
        let starting: Vec<&MarkableId> = level.starting(&six).into_iter().map(|m| m.id()).collect();
        assert_eq!(starting, vec![&late]);
        let ending: Vec<&MarkableId> = level.ending(&six).into_iter().map(|m| m.id()).collect();
        assert_eq!(ending, vec![&early]);
    }

    #[test]
    fn test_set_attributes_is_fail_open() {
        let stream = stream_of(2);
        let mut level = pos_level();
        let id = created(level.add(&stream, spans(&["word_0"]), None, AddOptions::default()).unwrap());

        let err = level
            .set_attributes(&id, attrs(&[("pos", "verb"), ("number", "sg")]))
            .unwrap_err();
        match err {
            StandoffError::InvalidAttributes(details) => {
                assert_eq!(details.invalid, attrs(&[("number", "sg")]));
                assert_eq!(details.markable, id);
            }
            other => panic!("unexpected error {:?}", other),
        }
        // Committed regardless.
        assert_eq!(level.get(id.as_str()).unwrap().attribute("number"), Some("sg"));
    }

    #[test]
    fn test_update_backfills_missing() {
        let stream = stream_of(2);
        let mut level = pos_level();
        let id = created(level.add(&stream, spans(&["word_0"]), None, AddOptions::default()).unwrap());

        level.update(&id, attrs(&[("pos", "noun")]), true, false).unwrap();
        assert_eq!(
            level.get(id.as_str()).unwrap().attributes(),
            &attrs(&[("pos", "noun"), ("number", "sg")])
        );
    }

    #[test]
    fn test_update_without_backfill_raises() {
        let stream = stream_of(2);
        let mut level = pos_level();
        let id = created(level.add(&stream, spans(&["word_0"]), None, AddOptions::default()).unwrap());
        assert!(level.update(&id, attrs(&[("pos", "noun")]), false, false).is_err());
        assert_eq!(level.get(id.as_str()).unwrap().attributes(), &attrs(&[("pos", "noun")]));
    }

    #[test]
    fn test_update_drop_invalid() {
        let stream = stream_of(2);
        let mut level = pos_level();
        let id = created(level.add(&stream, spans(&["word_0"]), None, AddOptions::default()).unwrap());
        let result = level.update(&id, attrs(&[("pos", "verb"), ("color", "red")]), false, true);
        assert!(result.is_err());
        assert_eq!(level.get(id.as_str()).unwrap().attributes(), &attrs(&[("pos", "verb")]));
    }

    #[test]
    fn test_apply_defaults_and_to_default() {
        let stream = stream_of(3);
        let mut level = pos_level();
        let opts = AddOptions::default().with_apply_defaults(true);
        let id = created(level.add(&stream, spans(&["word_1"]), None, opts).unwrap());
        assert_eq!(level.get(id.as_str()).unwrap().attributes(), &attrs(&[("pos", "noun")]));

        level.set_attributes(&id, attrs(&[("pos", "verb")])).unwrap();
        // The noun default reaches the number branch, so resetting reports it missing.
        assert!(level.to_default(&id).is_err());
        assert_eq!(level.get(id.as_str()).unwrap().attribute("pos"), Some("noun"));
    }

    #[test]
    fn test_remove_attribute() {
        let stream = stream_of(2);
        let mut level = pos_level();
        let id = created(level.add(&stream, spans(&["word_0"]), None, AddOptions::default()).unwrap());
        level.set_attributes(&id, attrs(&[("pos", "verb")])).unwrap();

        assert_eq!(level.remove_attribute(&id, "pos", false).unwrap(), Some("verb".to_string()));
        level.set_attributes(&id, attrs(&[("pos", "verb")])).unwrap();
        assert!(level.remove_attribute(&id, "pos", true).is_err());
        assert!(level.get(id.as_str()).unwrap().attributes().is_empty());
    }

    #[test]
    fn test_missing_markable() {
        let mut level = MarkableLevel::new("np");
        let err = level
            .set_attributes(&MarkableId::from("markable_3"), Attributes::new())
            .unwrap_err();
        assert!(matches!(err, StandoffError::NoSuchMarkable { .. }));
    }

    #[test]
    fn test_remove_all_keeps_ids_retired() {
        let stream = stream_of(2);
        let mut level = MarkableLevel::new("np");
        let a = created(level.add(&stream, spans(&["word_0"]), None, AddOptions::default()).unwrap());
        level.remove_all();
        assert!(level.is_empty());
        assert!(level.by_token(&TokenId::from("word_0")).is_empty());
        let b = created(level.add(&stream, spans(&["word_0"]), None, AddOptions::default()).unwrap());
        assert_ne!(a, b);
    }
}
