//! Serializable store commands
//!
//! Every store mutation as data, so a sequence of edits can be scripted:
//!
//! ```json
//! [
//!   { "op": "add_field", "name": "age", "field": { "type": "integer", "title": "Age" } },
//!   { "op": "update_field", "name": "age", "patch": { "required": true, "minimum": 0 } },
//!   { "op": "undo" }
//! ]
//! ```

use formkit_schema::{Direction, FieldPatch, FieldPath, FieldTemplate, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::StoreResult;
use crate::state::Theme;
use crate::store::SchemaStore;

/// One store operation; `path` defaults to the root level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    AddField {
        #[serde(default)]
        path: FieldPath,
        name: String,
        #[serde(default)]
        field: FieldTemplate,
    },
    RemoveField {
        #[serde(default)]
        path: FieldPath,
        name: String,
    },
    RenameField {
        #[serde(default)]
        path: FieldPath,
        old: String,
        new: String,
    },
    UpdateField {
        #[serde(default)]
        path: FieldPath,
        name: String,
        patch: FieldPatch,
    },
    ReorderField {
        #[serde(default)]
        path: FieldPath,
        name: String,
        direction: Direction,
    },
    ReplaceSchema {
        schema: Schema,
    },
    /// Normalize and install an external schema document
    ImportSchema {
        schema: JsonValue,
    },
    SetTheme {
        theme: Theme,
    },
    UpdateFormData {
        data: JsonValue,
    },
    ClearAll,
    Undo,
    Redo,
}

impl EditCommand {
    /// Operation name as it appears in the `op` tag
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::AddField { .. } => "add_field",
            Self::RemoveField { .. } => "remove_field",
            Self::RenameField { .. } => "rename_field",
            Self::UpdateField { .. } => "update_field",
            Self::ReorderField { .. } => "reorder_field",
            Self::ReplaceSchema { .. } => "replace_schema",
            Self::ImportSchema { .. } => "import_schema",
            Self::SetTheme { .. } => "set_theme",
            Self::UpdateFormData { .. } => "update_form_data",
            Self::ClearAll => "clear_all",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }

    /// Run against `store`
    ///
    /// Returns `Ok(true)` if the command changed the store.
    ///
    /// # Errors
    /// Whatever the corresponding store method returns.
    pub fn apply(&self, store: &mut SchemaStore) -> StoreResult<bool> {
        match self {
            Self::AddField { path, name, field } => store.add_field(path, name, field),
            Self::RemoveField { path, name } => store.remove_field(path, name),
            Self::RenameField { path, old, new } => store.rename_field(path, old, new),
            Self::UpdateField { path, name, patch } => store.update_field(path, name, patch),
            Self::ReorderField { path, name, direction } => store.reorder_field(path, name, *direction),
            Self::ReplaceSchema { schema } => Ok(store.update_schema(schema.clone())),
            Self::ImportSchema { schema } => store.import_value(schema.clone()),
            Self::SetTheme { theme } => {
                let changed = store.theme() != *theme;
                store.set_theme(*theme);
                Ok(changed)
            }
            Self::UpdateFormData { data } => {
                store.update_form_data(data.clone());
                Ok(true)
            }
            Self::ClearAll => {
                store.clear_all();
                Ok(true)
            }
            Self::Undo => Ok(store.undo()),
            Self::Redo => Ok(store.redo()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use formkit_schema::FieldType;
    use serde_json::json;

    #[test]
    fn decodes_scripted_commands() {
        let commands: Vec<EditCommand> = serde_json::from_value(json!([
            { "op": "add_field", "name": "age", "field": { "type": "integer", "title": "Age" } },
            { "op": "add_field", "path": "", "name": "nick" },
            { "op": "update_field", "name": "age", "patch": { "required": true } },
            { "op": "reorder_field", "name": "nick", "direction": "up" },
            { "op": "rename_field", "old": "nick", "new": "alias" },
            { "op": "set_theme", "theme": "light" },
            { "op": "undo" }
        ]))
        .unwrap();

        assert_eq!(commands.len(), 7);
        assert_eq!(
            commands[0],
            EditCommand::AddField {
                path: FieldPath::root(),
                name: "age".into(),
                field: FieldPatch::new().field_type(FieldType::Integer).title("Age"),
            }
        );
        assert_eq!(commands[6].op(), "undo");
    }

    #[test]
    fn rejects_unknown_op_and_bad_paths() {
        assert!(serde_json::from_value::<EditCommand>(json!({ "op": "explode" })).is_err());
        assert!(serde_json::from_value::<EditCommand>(json!({
            "op": "remove_field", "path": "a..b", "name": "x"
        }))
        .is_err());
    }

    #[test]
    fn applies_against_store() {
        let mut store = SchemaStore::in_memory(StoreConfig::new());
        let script = [
            EditCommand::AddField {
                path: FieldPath::root(),
                name: "address".into(),
                field: FieldPatch::new().field_type(FieldType::Object),
            },
            EditCommand::AddField {
                path: "address".parse().unwrap(),
                name: "city".into(),
                field: FieldPatch::new(),
            },
            EditCommand::UpdateField {
                path: "address".parse().unwrap(),
                name: "city".into(),
                patch: FieldPatch::new().required(true),
            },
        ];
        for command in &script {
            assert!(command.apply(&mut store).unwrap(), "{}", command.op());
        }

        let address = store.schema().properties.get("address").unwrap();
        assert!(address.kind.as_object().unwrap().required.contains("city"));

        assert!(EditCommand::Undo.apply(&mut store).unwrap());
        assert!(EditCommand::Redo.apply(&mut store).unwrap());
        assert!(!EditCommand::Redo.apply(&mut store).unwrap());
        assert!(EditCommand::SetTheme { theme: Theme::Light }.apply(&mut store).unwrap());
        assert!(!EditCommand::SetTheme { theme: Theme::Light }.apply(&mut store).unwrap());
    }

    #[test]
    fn import_command_normalizes() {
        let mut store = SchemaStore::in_memory(StoreConfig::new());
        let command = EditCommand::ImportSchema {
            schema: json!({ "properties": { "first_name": {} } }),
        };
        assert!(store.execute(&command).unwrap());
        assert_eq!(store.schema().properties.get("first_name").unwrap().title, "First Name");

        let bad = EditCommand::ImportSchema { schema: json!({}) };
        assert!(store.execute(&bad).is_err());
    }
}
