//! Change notifications

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use formkit_schema::Schema;
use serde::{Deserialize, Serialize};

use crate::state::Theme;

/// What produced a new schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    AddField,
    RemoveField,
    RenameField,
    UpdateField,
    ReorderField,
    ReplaceSchema,
    Import,
    Undo,
    Redo,
}

impl ChangeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddField => "add_field",
            Self::RemoveField => "remove_field",
            Self::RenameField => "rename_field",
            Self::UpdateField => "update_field",
            Self::ReorderField => "reorder_field",
            Self::ReplaceSchema => "replace_schema",
            Self::Import => "import",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivered to observers after a change is committed
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// New current schema
    SchemaChanged { change: ChangeKind, schema: Arc<Schema> },
    ThemeChanged(Theme),
    FormDataChanged,
    /// Schema, history and form data reset
    Cleared,
}

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

/// Change callback
pub type Observer = Box<dyn FnMut(&StoreEvent)>;
