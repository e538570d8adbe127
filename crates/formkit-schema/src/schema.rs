//! Root schema and per-level containers
//!
//! [`Properties`] keeps its children behind [`Arc`] so cloning a level is a
//! shallow copy: untouched subtrees stay shared between snapshots.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::field::SchemaField;

/// Dialect URI written to `$schema` by default
pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

fn default_dialect() -> String {
    DRAFT_07.to_string()
}

/// The root form schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// JSON-Schema dialect
    #[serde(rename = "$schema", default = "default_dialect")]
    pub dialect: String,

    /// Always `object`
    #[serde(rename = "type", default)]
    pub root_type: RootType,

    /// Form title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Top-level fields
    #[serde(default)]
    pub properties: Properties,

    /// Top-level fields that must be filled in
    #[serde(default)]
    pub required: RequiredSet,
}

impl Schema {
    /// Empty schema: no fields, nothing required
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read-only view of the root level
    #[inline]
    #[must_use]
    pub fn level(&self) -> LevelRef<'_> {
        LevelRef {
            properties: &self.properties,
            required: &self.required,
        }
    }

    /// Mutable view of the root level
    #[inline]
    pub fn level_mut(&mut self) -> Level<'_> {
        Level {
            properties: &mut self.properties,
            required: &mut self.required,
        }
    }

    /// Total number of fields at every depth (array items excluded)
    #[must_use]
    pub fn field_count(&self) -> usize {
        fn count(properties: &Properties) -> usize {
            properties
                .iter()
                .map(|(_, field)| 1 + field.properties().map_or(0, count))
                .sum()
        }
        count(&self.properties)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            root_type: RootType::Object,
            title: None,
            description: None,
            properties: Properties::new(),
            required: RequiredSet::new(),
        }
    }
}

/// Type tag of the root; the root is always an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootType {
    #[default]
    Object,
}

/// Named children of one nesting level
///
/// Iteration follows insertion order; display order is given by
/// [`Properties::ordered`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(IndexMap<String, Arc<SchemaField>>);

impl Properties {
    /// Empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if a name is taken
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Field by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaField> {
        self.0.get(name).map(Arc::as_ref)
    }

    /// Shared handle to a field, for identity checks between snapshots
    #[inline]
    #[must_use]
    pub fn get_arc(&self, name: &str) -> Option<&Arc<SchemaField>> {
        self.0.get(name)
    }

    /// Mutable field by name
    ///
    /// Copies the field first if another snapshot still shares it.
    #[inline]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut SchemaField> {
        self.0.get_mut(name).map(Arc::make_mut)
    }

    /// Insert or replace; a replaced field keeps its position
    #[inline]
    pub fn insert(&mut self, name: impl Into<String>, field: SchemaField) -> Option<Arc<SchemaField>> {
        self.0.insert(name.into(), Arc::new(field))
    }

    /// Remove a field, keeping the relative position of the others
    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<Arc<SchemaField>> {
        self.0.shift_remove(name)
    }

    /// Rename a key in place
    ///
    /// Returns `false` if `old` is absent. The caller checks that `new` is
    /// free.
    pub fn rename(&mut self, old: &str, new: impl Into<String>) -> bool {
        match self.0.shift_remove_full(old) {
            Some((index, _, field)) => {
                self.0.shift_insert(index, new.into(), field);
                true
            }
            None => false,
        }
    }

    /// Names in insertion order
    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries in insertion order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaField)> {
        self.0.iter().map(|(name, field)| (name.as_str(), field.as_ref()))
    }

    /// Entries sorted by `order`, ties broken by insertion
    #[must_use]
    pub fn ordered(&self) -> Vec<(&str, &SchemaField)> {
        let mut entries: Vec<_> = self.iter().collect();
        // stable sort keeps insertion order among equal keys
        entries.sort_by_key(|(_, field)| field.order());
        entries
    }

    /// Names sorted by `order`, ties broken by insertion
    #[must_use]
    pub fn ordered_names(&self) -> Vec<String> {
        self.ordered()
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Order value for the next appended field: `max(orders, -1) + 1`
    ///
    /// `None` if a sibling already sits at `i64::MAX`.
    #[must_use]
    pub fn next_order(&self) -> Option<i64> {
        self.0.values().map(|field| field.order()).fold(-1, i64::max).checked_add(1)
    }
}

impl FromIterator<(String, SchemaField)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, SchemaField)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(name, field)| (name, Arc::new(field))).collect())
    }
}

/// Names of the required children of one level
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequiredSet(IndexSet<String>);

impl RequiredSet {
    /// Empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(IndexSet::new())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Add a name; returns `false` if it was already present
    #[inline]
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    /// Remove a name; returns `false` if it was absent
    #[inline]
    pub fn remove(&mut self, name: &str) -> bool {
        self.0.shift_remove(name)
    }

    /// Rename a member in place; no-op if `old` is absent
    pub fn rename(&mut self, old: &str, new: impl Into<String>) {
        if let Some((index, _)) = self.0.shift_remove_full(old) {
            self.0.shift_insert(index, new.into());
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for RequiredSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Mutable view of one nesting level: its fields and its required set
#[derive(Debug)]
pub struct Level<'a> {
    pub properties: &'a mut Properties,
    pub required: &'a mut RequiredSet,
}

/// Read-only view of one nesting level
#[derive(Debug, Clone, Copy)]
pub struct LevelRef<'a> {
    pub properties: &'a Properties,
    pub required: &'a RequiredSet,
}
