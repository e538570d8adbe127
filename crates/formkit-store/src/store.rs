//! The schema store
//!
//! Owns the current schema, its undo/redo history, the editor theme and the
//! live form data. Every mutation runs a pure edit from `formkit_schema`,
//! then swaps the current `Arc<Schema>` in one step: a failed edit never
//! leaves a half-applied tree behind.

use std::fmt;
use std::sync::Arc;

use formkit_schema::{
    self as schema, Direction, FieldPatch, FieldPath, FieldTemplate, RenderView, Schema, DRAFT_07,
};
use serde_json::{Map, Value as JsonValue};

use crate::command::EditCommand;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::event::{ChangeKind, Observer, StoreEvent, SubscriptionId};
use crate::history::History;
use crate::persist::{load_state, save_state, BlobStore, MemoryBlobStore, PersistError};
use crate::state::{PersistedState, Theme};

/// Editable form schema with history and write-through persistence
///
/// Single-threaded: observers are plain `FnMut` callbacks run synchronously
/// after each committed change.
pub struct SchemaStore {
    config: StoreConfig,
    schema: Arc<Schema>,
    theme: Theme,
    form_data: JsonValue,
    history: History,
    blobs: Box<dyn BlobStore>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl SchemaStore {
    /// Open a store, restoring theme and schema from `blobs`
    ///
    /// Stored text that no longer decodes is logged and ignored; the store
    /// then starts from an empty schema.
    ///
    /// # Errors
    /// Returns `StoreError::Persist` if the backend cannot be read.
    pub fn open(config: StoreConfig, blobs: impl BlobStore + 'static) -> StoreResult<Self> {
        let mut store = Self::with_parts(config, Box::new(blobs));

        if store.config.persist {
            match load_state(store.blobs.as_ref(), &store.config.storage_key) {
                Ok(Some(state)) => {
                    store.theme = state.theme;
                    store.schema = state.schema;
                    tracing::info!(
                        key = %store.config.storage_key,
                        fields = store.schema.field_count(),
                        theme = %store.theme,
                        "restored persisted state"
                    );
                }
                Ok(None) => {
                    tracing::debug!(key = %store.config.storage_key, "no persisted state");
                }
                Err(PersistError::Decode(e)) => {
                    tracing::warn!(key = %store.config.storage_key, error = %e, "discarding unreadable persisted state");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(store)
    }

    /// Store backed by a fresh in-memory blob store
    #[must_use]
    pub fn in_memory(config: StoreConfig) -> Self {
        Self::with_parts(config, Box::new(MemoryBlobStore::new()))
    }

    fn with_parts(config: StoreConfig, blobs: Box<dyn BlobStore>) -> Self {
        Self {
            history: History::new(config.history_capacity),
            config,
            schema: Arc::new(Schema::empty()),
            theme: Theme::default(),
            form_data: empty_form_data(),
            blobs,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    #[inline]
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[inline]
    #[must_use]
    pub fn form_data(&self) -> &JsonValue {
        &self.form_data
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Add a field to the object level at `path`
    ///
    /// Returns `Ok(true)` if the schema changed.
    ///
    /// # Errors
    /// See [`formkit_schema::add_field`].
    pub fn add_field(&mut self, path: &FieldPath, name: &str, template: &FieldTemplate) -> StoreResult<bool> {
        self.apply(ChangeKind::AddField, |s| schema::add_field(s, path, name, template))
    }

    /// Remove a field and its required-set membership
    ///
    /// # Errors
    /// See [`formkit_schema::remove_field`].
    pub fn remove_field(&mut self, path: &FieldPath, name: &str) -> StoreResult<bool> {
        self.apply(ChangeKind::RemoveField, |s| schema::remove_field(s, path, name))
    }

    /// Rename a field in place
    ///
    /// # Errors
    /// See [`formkit_schema::rename_field`].
    pub fn rename_field(&mut self, path: &FieldPath, old: &str, new: &str) -> StoreResult<bool> {
        self.apply(ChangeKind::RenameField, |s| schema::rename_field(s, path, old, new))
    }

    /// Patch a field's attributes, type or required flag
    ///
    /// # Errors
    /// See [`formkit_schema::update_field`].
    pub fn update_field(&mut self, path: &FieldPath, name: &str, patch: &FieldPatch) -> StoreResult<bool> {
        self.apply(ChangeKind::UpdateField, |s| schema::update_field(s, path, name, patch))
    }

    /// Move a field one step among its siblings
    ///
    /// # Errors
    /// See [`formkit_schema::reorder_field`].
    pub fn reorder_field(&mut self, path: &FieldPath, name: &str, direction: Direction) -> StoreResult<bool> {
        self.apply(ChangeKind::ReorderField, |s| schema::reorder_field(s, path, name, direction))
    }

    /// Replace the whole schema
    ///
    /// An empty `$schema` is reset to draft-07.
    pub fn update_schema(&mut self, mut replacement: Schema) -> bool {
        if replacement.dialect.is_empty() {
            replacement.dialect = DRAFT_07.to_string();
        }
        self.commit(ChangeKind::ReplaceSchema, replacement)
    }

    /// Parse, normalize and install schema text
    ///
    /// # Errors
    /// `StoreError::Validation` with a human-readable reason.
    pub fn import_schema(&mut self, text: &str) -> StoreResult<bool> {
        self.install_import(schema::parse_schema(text))
    }

    /// Normalize and install an already parsed schema document
    ///
    /// # Errors
    /// `StoreError::Validation` with a human-readable reason.
    pub fn import_value(&mut self, value: JsonValue) -> StoreResult<bool> {
        self.install_import(schema::from_value(value))
    }

    fn install_import(&mut self, parsed: Result<Schema, schema::ImportError>) -> StoreResult<bool> {
        let imported = match parsed {
            Ok(imported) => imported,
            Err(e) => {
                tracing::warn!(error = %e, "import rejected");
                return Err(e.into());
            }
        };
        tracing::info!(fields = imported.field_count(), "importing schema");
        Ok(self.commit(ChangeKind::Import, imported))
    }

    /// Run a scripted command
    ///
    /// # Errors
    /// See [`EditCommand::apply`].
    pub fn execute(&mut self, command: &EditCommand) -> StoreResult<bool> {
        tracing::trace!(op = command.op(), "executing command");
        command.apply(self)
    }

    /// Reset schema, history and form data and rewrite the persisted state
    ///
    /// The stored entry is deleted, then written back with the empty schema
    /// and the current theme, which is kept.
    pub fn clear_all(&mut self) {
        self.schema = Arc::new(Schema::empty());
        self.form_data = empty_form_data();
        self.history.clear();

        if self.config.persist {
            if let Err(e) = self.blobs.remove(&self.config.storage_key) {
                tracing::warn!(key = %self.config.storage_key, error = %e, "failed to delete persisted state");
            }
        }
        self.persist();
        tracing::info!("cleared schema, history and form data");
        self.notify(&StoreEvent::Cleared);
    }

    /// Step back one committed change; returns `false` if there is none
    pub fn undo(&mut self) -> bool {
        let current = Arc::clone(&self.schema);
        match self.history.undo(current) {
            Some(previous) => {
                self.schema = previous;
                self.after_schema_change(ChangeKind::Undo);
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone change; returns `false` if there is none
    pub fn redo(&mut self) -> bool {
        let current = Arc::clone(&self.schema);
        match self.history.redo(current) {
            Some(next) => {
                self.schema = next;
                self.after_schema_change(ChangeKind::Redo);
                true
            }
            None => false,
        }
    }

    /// Switch the editor theme
    pub fn set_theme(&mut self, theme: Theme) {
        if theme == self.theme {
            return;
        }
        self.theme = theme;
        tracing::debug!(%theme, "theme changed");
        self.persist();
        self.notify(&StoreEvent::ThemeChanged(theme));
    }

    /// Replace the live form data; never recorded or persisted
    pub fn update_form_data(&mut self, data: JsonValue) {
        self.form_data = data;
        self.notify(&StoreEvent::FormDataChanged);
    }

    /// Cleaned schema, UI schema and form data for a renderer
    ///
    /// # Errors
    /// `StoreError::Render` if a field value cannot be encoded.
    pub fn render_view(&self) -> StoreResult<RenderView> {
        RenderView::new(&self.schema, self.form_data.clone()).map_err(StoreError::Render)
    }

    /// Register a change callback
    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Drop a callback; returns `false` if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != id);
        self.observers.len() != before
    }

    fn apply<F>(&mut self, change: ChangeKind, edit: F) -> StoreResult<bool>
    where
        F: FnOnce(&Schema) -> Result<Schema, schema::EditError>,
    {
        match edit(&self.schema) {
            Ok(next) => Ok(self.commit(change, next)),
            Err(e) => {
                tracing::warn!(%change, error = %e, "edit rejected");
                Err(e.into())
            }
        }
    }

    /// Install `next` as current and record the old schema
    ///
    /// A tree equal to the current one is not recorded.
    fn commit(&mut self, change: ChangeKind, next: Schema) -> bool {
        if next == *self.schema {
            tracing::debug!(%change, "edit left schema unchanged");
            return false;
        }

        let previous = std::mem::replace(&mut self.schema, Arc::new(next));
        self.history.record(previous);
        self.after_schema_change(change);
        true
    }

    fn after_schema_change(&mut self, change: ChangeKind) {
        tracing::debug!(
            %change,
            fields = self.schema.field_count(),
            undo = self.history.past_len(),
            redo = self.history.future_len(),
            "schema committed"
        );
        self.persist();
        let event = StoreEvent::SchemaChanged {
            change,
            schema: Arc::clone(&self.schema),
        };
        self.notify(&event);
    }

    fn persist(&self) {
        if !self.config.persist {
            return;
        }
        let state = PersistedState {
            theme: self.theme,
            schema: Arc::clone(&self.schema),
        };
        if let Err(e) = save_state(self.blobs.as_ref(), &self.config.storage_key, &state) {
            tracing::warn!(key = %self.config.storage_key, error = %e, "failed to persist state");
        }
    }

    fn notify(&mut self, event: &StoreEvent) {
        for (_, observer) in &mut self.observers {
            observer(event);
        }
    }
}

impl fmt::Debug for SchemaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaStore")
            .field("config", &self.config)
            .field("fields", &self.schema.field_count())
            .field("theme", &self.theme)
            .field("history", &self.history)
            .field("blobs", &self.blobs)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

fn empty_form_data() -> JsonValue {
    JsonValue::Object(Map::new())
}
