//! The document façade: one token stream and an ordered set of levels.
//!
//! Loading is split in two, like the persistence flow it mirrors:
//! [`Document::open`] admits the token list and creates the levels, and
//! [`Document::initialize`] loads every level's markables. Attribute
//! validation failures during `initialize` do not stop the load; they are
//! collected and reported together once every markable has been tried.

use std::sync::Arc;

use tracing::{debug, info};

use crate::basedata::{RenderOptions, Rendering, TokenId, TokenStream};
use crate::config::DocumentConfig;
use crate::error::{MultipleInvalidAttributesError, Result, StandoffError};
use crate::level::{AddOptions, AddOutcome, MarkableLevel};
use crate::markable::{Markable, MarkableId, PointerTarget};
use crate::matcher::{match_across_tokens, MatchGroup, MatchOptions, MatchPattern};
use crate::scheme::{AnnotationScheme, SchemeProvider};
use crate::snapshot::DocumentSnapshot;
use crate::span::SpanSet;
use crate::validate::AttributeValidator;
use crate::Attributes;

/// Pattern matches inside one markable, from [`Document::match_levels`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelMatch {
    pub level: String,
    pub markable: MarkableId,
    /// One group per pattern; at least one is non-empty.
    pub groups: Vec<MatchGroup>,
}

#[derive(Debug, Clone)]
pub struct Document {
    config: DocumentConfig,
    tokens: TokenStream,
    levels: Vec<MarkableLevel>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DocumentConfig::default())
    }
}

impl Document {
    /// An empty document.
    pub fn new(config: DocumentConfig) -> Self {
        Self {
            tokens: TokenStream::new(config.token_kind.clone()),
            config,
            levels: Vec::new(),
        }
    }

    /// Tokenize `text` into a new document with the default configuration.
    pub fn from_text(text: &str) -> Self {
        let mut document = Self::default();
        document.append_text(text);
        document
    }

    /// Tokenize `text` under `config`, enforcing its size limit.
    pub fn from_text_with(text: &str, config: DocumentConfig) -> Result<Self> {
        let mut document = Self::new(config);
        document.append_text(text);
        document.check_size(document.tokens.len())?;
        Ok(document)
    }

    /// Build the token stream and the (empty) levels of a persisted document.
    ///
    /// Each level is bound to the scheme `provider` returns for its name.
    pub fn open(
        snapshot: &DocumentSnapshot,
        provider: &dyn SchemeProvider,
        config: DocumentConfig,
    ) -> Result<Self> {
        let mut document = Self::new(config);
        document.check_size(snapshot.tokens.len())?;

        for record in &snapshot.tokens {
            document
                .tokens
                .push_with_id(record.id.clone(), record.text.clone(), record.attributes.clone())?;
        }
        for level in &snapshot.levels {
            document.add_level(&level.name, provider.scheme_for(&level.name))?;
        }
        info!(
            tokens = document.tokens.len(),
            levels = document.levels.len(),
            "opened document"
        );
        Ok(document)
    }

    fn check_size(&self, size: usize) -> Result<()> {
        match self.config.max_tokens {
            Some(max) if size > max => Err(StandoffError::DocumentSizeExceeded { size, max }),
            _ => Ok(()),
        }
    }

    /// Load every level's markables from `snapshot`.
    ///
    /// Markables keep their persisted ids where possible and may overlap.
    /// Their attributes are committed even when invalid; all validation
    /// failures come back together as
    /// [`StandoffError::MultipleInvalidAttributes`]. A malformed span
    /// aborts the load.
    pub fn initialize(&mut self, snapshot: &DocumentSnapshot) -> Result<()> {
        let options = AddOptions::default()
            .with_allow_overlap(true)
            .with_allow_duplicate_spans(self.config.allow_duplicate_spans_on_load);
        let mut invalid = MultipleInvalidAttributesError::new();

        for record in &snapshot.levels {
            let slot = self
                .level_slot(&record.name)
                .ok_or_else(|| StandoffError::NoSuchLevel(record.name.clone()))?;
            let tokens = &self.tokens;
            let level = &mut self.levels[slot];

            for markable in &record.markables {
                let spans = SpanSet::decode(&markable.span, tokens)?;
                let id = match level.add(tokens, spans, Some(markable.id.as_str()), options)? {
                    AddOutcome::Created(id) => id,
                    other => {
                        debug!(level = %record.name, id = %markable.id, outcome = ?other, "markable not loaded");
                        continue;
                    }
                };
                match level.set_attributes(&id, markable.attributes.clone()) {
                    Ok(()) => {}
                    Err(StandoffError::InvalidAttributes(error)) => invalid.add(*error),
                    Err(other) => return Err(other),
                }
            }
            info!(level = %record.name, markables = level.len(), "loaded markables");
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(invalid.into())
        }
    }

    /// Persistence-shaped copy of the current state.
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            tokens: self.tokens.iter().map(|t| t.to_record()).collect(),
            levels: self.levels.iter().map(MarkableLevel::to_record).collect(),
        }
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Tokenize `text` and append it, using the configured tokenizer.
    pub fn append_text(&mut self, text: &str) -> Vec<TokenId> {
        self.tokens.tokenize_with(text, self.config.tokenizer)
    }

    /// Remove every token and every markable; levels stay.
    pub fn clear_tokens(&mut self) {
        for level in &mut self.levels {
            level.remove_all();
        }
        self.tokens.clear();
    }

    pub fn levels(&self) -> &[MarkableLevel] {
        &self.levels
    }

    fn level_slot(&self, name: &str) -> Option<usize> {
        self.levels.iter().position(|l| l.name() == name)
    }

    pub fn add_level(
        &mut self,
        name: &str,
        scheme: Option<Arc<dyn AnnotationScheme>>,
    ) -> Result<&mut MarkableLevel> {
        if self.level_slot(name).is_some() {
            return Err(StandoffError::MarkableLevelExists(name.to_string()));
        }
        let validator = match scheme {
            Some(scheme) => AttributeValidator::new(scheme),
            None => AttributeValidator::schemaless(),
        };
        debug!(level = name, schema = validator.has_scheme(), "adding markable level");
        self.levels
            .push(MarkableLevel::new(name).with_validator(validator));
        let slot = self.levels.len() - 1;
        Ok(&mut self.levels[slot])
    }

    pub fn level(&self, name: &str) -> Option<&MarkableLevel> {
        self.levels.iter().find(|l| l.name() == name)
    }

    pub fn level_mut(&mut self, name: &str) -> Option<&mut MarkableLevel> {
        self.levels.iter_mut().find(|l| l.name() == name)
    }

    pub fn require_level(&self, name: &str) -> Result<&MarkableLevel> {
        self.level(name)
            .ok_or_else(|| StandoffError::NoSuchLevel(name.to_string()))
    }

    fn require_level_mut(&mut self, name: &str) -> Result<&mut MarkableLevel> {
        self.level_mut(name)
            .ok_or_else(|| StandoffError::NoSuchLevel(name.to_string()))
    }

    /// Remove a level together with all of its markables.
    pub fn remove_level(&mut self, name: &str) -> Option<MarkableLevel> {
        let slot = self.level_slot(name)?;
        Some(self.levels.remove(slot))
    }

    /// The token stream alongside one mutable level, for direct level calls.
    pub fn parts_mut(&mut self, level: &str) -> Result<(&TokenStream, &mut MarkableLevel)> {
        let slot = self
            .level_slot(level)
            .ok_or_else(|| StandoffError::NoSuchLevel(level.to_string()))?;
        Ok((&self.tokens, &mut self.levels[slot]))
    }

    pub fn add_markable(
        &mut self,
        level: &str,
        spans: SpanSet,
        explicit_id: Option<&str>,
        options: AddOptions,
    ) -> Result<AddOutcome> {
        let (tokens, level) = self.parts_mut(level)?;
        Ok(level.add(tokens, spans, explicit_id, options)?)
    }

    pub fn delete_markable(&mut self, level: &str, id: &MarkableId) -> Result<Markable> {
        let level = self.require_level_mut(level)?;
        level.delete(id).ok_or_else(|| StandoffError::NoSuchMarkable {
            level: level.name().to_string(),
            id: id.clone(),
        })
    }

    pub fn render(&self, spans: &SpanSet, options: &RenderOptions<'_>) -> Result<Rendering> {
        Ok(self.tokens.render(spans, options)?)
    }

    /// The whole document as text.
    pub fn text(&self) -> String {
        self.tokens.render_all(&RenderOptions::default()).text
    }

    /// Run `patterns` over `spans`, or over the whole document when `None`.
    pub fn match_tokens<I, P>(
        &self,
        patterns: I,
        spans: Option<&SpanSet>,
        options: MatchOptions,
    ) -> Result<Vec<MatchGroup>>
    where
        I: IntoIterator<Item = P>,
        P: Into<MatchPattern>,
    {
        match spans {
            Some(spans) => match_across_tokens(&self.tokens, patterns, spans, options),
            None => {
                let everything = SpanSet::single(self.tokens.ids().cloned());
                match_across_tokens(&self.tokens, patterns, &everything, options)
            }
        }
    }

    /// Run `patterns` inside every markable of `levels` that matches
    /// `predicate` (see [`MarkableLevel::query`]).
    ///
    /// Markables without any match are left out.
    pub fn match_levels(
        &self,
        patterns: &[MatchPattern],
        levels: &[&str],
        predicate: &Attributes,
        options: MatchOptions,
    ) -> Result<Vec<LevelMatch>> {
        let mut found = Vec::new();
        for name in levels {
            let level = self.require_level(name)?;
            for markable in level.query(predicate, &self.tokens)? {
                let groups =
                    match_across_tokens(&self.tokens, patterns.iter().cloned(), markable.spans(), options)?;
                if groups.iter().any(|g| !g.is_empty()) {
                    found.push(LevelMatch {
                        level: level.name().to_string(),
                        markable: markable.id().clone(),
                        groups,
                    });
                }
            }
        }
        Ok(found)
    }

    fn require_markable(&self, level: &str, id: &MarkableId) -> Result<&Markable> {
        self.require_level(level)?.require(id)
    }

    /// Add `target` to the pointer attribute `key` of `source`.
    ///
    /// Both markables must exist. Adding a target twice is a no-op.
    pub fn add_pointer(
        &mut self,
        level: &str,
        source: &MarkableId,
        key: &str,
        target: PointerTarget,
    ) -> Result<()> {
        let mut targets = self.current_targets(level, source, key)?;
        self.require_markable(target.resolve_level(level), &target.id)?;
        if targets
            .iter()
            .any(|t| t.id == target.id && t.resolve_level(level) == target.resolve_level(level))
        {
            return Ok(());
        }
        targets.push(target);
        self.require_level_mut(level)?.set_pointers(source, key, &targets)
    }

    /// Remove `target` from the pointer attribute `key` of `source`.
    ///
    /// Returns whether the target was present.
    pub fn remove_pointer(
        &mut self,
        level: &str,
        source: &MarkableId,
        key: &str,
        target: &PointerTarget,
    ) -> Result<bool> {
        let mut targets = self.current_targets(level, source, key)?;
        let before = targets.len();
        targets.retain(|t| !(t.id == target.id && t.resolve_level(level) == target.resolve_level(level)));
        if targets.len() == before {
            return Ok(false);
        }
        self.require_level_mut(level)?.set_pointers(source, key, &targets)?;
        Ok(true)
    }

    fn current_targets(&self, level: &str, source: &MarkableId, key: &str) -> Result<Vec<PointerTarget>> {
        let markable = self.require_markable(level, source)?;
        Ok(markable
            .attribute(key)
            .map(PointerTarget::parse_list)
            .unwrap_or_default())
    }

    /// Every markable on any level with a pointer to `target` on `level`.
    pub fn pointers_to(&self, level: &str, target: &MarkableId) -> Vec<&Markable> {
        self.levels
            .iter()
            .flat_map(|l| l.iter())
            .filter(|m| m.points_to(None, level, target))
            .collect()
    }
}
