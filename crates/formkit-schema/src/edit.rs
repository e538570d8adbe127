//! Structural edits on the field tree
//!
//! Every edit is a pure function `(&Schema, ...) -> Result<Schema, EditError>`.
//! The input schema is never modified; the returned schema shares every
//! subtree the edit did not touch (see [`apply_at_path`]).

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::field::{FieldKind, FieldType, SchemaField};
use crate::path::{apply_at_path, FieldPath};
use crate::schema::Schema;

/// Attributes a patch may never overwrite
const PROTECTED_ATTRIBUTES: [&str; 2] = ["$id", "metadata"];

/// Errors produced by edits
///
/// None of these are fatal: a failed edit leaves the schema it was given
/// exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// A path segment names no field
    #[error("path not found: '{path}'")]
    PathNotFound { path: FieldPath },

    /// A path segment names a field that has no nested properties
    #[error("'{path}' is not an object field")]
    NotAnObject { path: FieldPath },

    /// Field name absent at the addressed level
    #[error("field '{name}' not found at '{path}'")]
    FieldNotFound { path: FieldPath, name: String },

    /// Field names must be non-empty
    #[error("field name must not be empty")]
    EmptyName,

    /// Name already used by a sibling
    #[error("field '{name}' already exists at '{path}'")]
    NameConflict { path: FieldPath, name: String },

    /// Attribute value rejected
    #[error("invalid attribute '{attribute}': {reason}")]
    InvalidAttribute { attribute: String, reason: String },
}

impl EditError {
    /// Check if the error means a path or field did not resolve
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PathNotFound { .. } | Self::NotAnObject { .. } | Self::FieldNotFound { .. }
        )
    }

    /// Check if the error is a sibling name collision
    #[inline]
    #[must_use]
    pub fn is_name_conflict(&self) -> bool {
        matches!(self, Self::NameConflict { .. })
    }

    fn invalid(attribute: impl Into<String>, reason: impl Display) -> Self {
        Self::InvalidAttribute {
            attribute: attribute.into(),
            reason: reason.to_string(),
        }
    }
}

/// Partial field description used both to create and to update fields
///
/// `type` and `required` are kept apart from the other attributes: the type
/// decides whether existing constraints survive, and `required` is recorded
/// on the parent level rather than on the field.
///
/// # Examples
/// ```
/// # use formkit_schema::{FieldPatch, FieldType};
/// let patch = FieldPatch::new()
///     .field_type(FieldType::Integer)
///     .title("Age")
///     .attribute("minimum", 0)
///     .required(true);
/// assert_eq!(patch.get_field_type(), Some(FieldType::Integer));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Map<String, JsonValue>", into = "Map<String, JsonValue>")]
pub struct FieldPatch {
    field_type: Option<FieldType>,
    required: Option<bool>,
    attributes: Map<String, JsonValue>,
}

/// A patch used as the starting shape of a new field
pub type FieldTemplate = FieldPatch;

impl FieldPatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Change (or, for templates, choose) the field type
    #[inline]
    #[must_use]
    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Add to / remove from the parent's required set
    #[inline]
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    #[inline]
    #[must_use]
    pub fn title(self, title: impl Into<String>) -> Self {
        self.attribute("title", title.into())
    }

    #[inline]
    #[must_use]
    pub fn description(self, description: impl Into<String>) -> Self {
        self.attribute("description", description.into())
    }

    /// Set any JSON-Schema attribute by its serialized name
    ///
    /// `null` clears an optional attribute and resets `title` to empty.
    #[inline]
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        let name = name.into();
        let typed_slot = matches!(name.as_str(), "type" | "required");
        if typed_slot {
            // keep the typed slots authoritative
            let mut single = Map::new();
            single.insert(name, value.into());
            if let Ok(patch) = Self::try_from(single) {
                self.field_type = patch.field_type.or(self.field_type);
                self.required = patch.required.or(self.required);
            }
        } else {
            self.attributes.insert(name, value.into());
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn get_field_type(&self) -> Option<FieldType> {
        self.field_type
    }

    #[inline]
    #[must_use]
    pub fn get_required(&self) -> Option<bool> {
        self.required
    }

    /// Attributes other than `type` and `required`
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &Map<String, JsonValue> {
        &self.attributes
    }

    /// Check if the patch changes nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_type.is_none() && self.required.is_none() && self.attributes.is_empty()
    }

    /// Parse a patch from a JSON object
    ///
    /// # Errors
    /// Returns `InvalidAttribute` if the value is not an object, `type` is
    /// not a known type name, or `required` is not a boolean.
    pub fn from_json(value: JsonValue) -> Result<Self, EditError> {
        match value {
            JsonValue::Object(map) => Self::try_from(map),
            other => Err(EditError::invalid("patch", format!("expected an object, got {other}"))),
        }
    }
}

impl TryFrom<Map<String, JsonValue>> for FieldPatch {
    type Error = EditError;

    fn try_from(mut attributes: Map<String, JsonValue>) -> Result<Self, Self::Error> {
        let field_type = match attributes.remove("type") {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(name)) => {
                Some(name.parse::<FieldType>().map_err(|e| EditError::invalid("type", e))?)
            }
            Some(other) => return Err(EditError::invalid("type", format!("expected a string, got {other}"))),
        };

        let required = match attributes.remove("required") {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::Bool(flag)) => Some(flag),
            Some(other) => {
                return Err(EditError::invalid("required", format!("expected a boolean, got {other}")))
            }
        };

        Ok(Self {
            field_type,
            required,
            attributes,
        })
    }
}

impl From<FieldPatch> for Map<String, JsonValue> {
    fn from(patch: FieldPatch) -> Self {
        let mut map = Map::new();
        if let Some(field_type) = patch.field_type {
            map.insert("type".into(), field_type.as_str().into());
        }
        if let Some(required) = patch.required {
            map.insert("required".into(), required.into());
        }
        map.extend(patch.attributes);
        map
    }
}

/// Direction for [`reorder_field`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards the start
    Up,
    /// Towards the end
    Down,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}

impl FromStr for Direction {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(EditError::invalid("direction", format!("expected 'up' or 'down', got '{other}'"))),
        }
    }
}

/// Add a field named `name` to the level at `path`
///
/// The field gets a fresh id and `order = max(sibling orders, -1) + 1`.
/// Objects start with empty `properties`/`required`, arrays without
/// `items` get a string element schema. A `required: true` template adds
/// the name to the level's required set.
///
/// # Errors
/// - `EmptyName` if `name` is empty
/// - `NameConflict` if a sibling already uses `name`
/// - resolution errors for `path`
/// - `InvalidAttribute` for template values of the wrong shape
pub fn add_field(
    schema: &Schema,
    path: &FieldPath,
    name: &str,
    template: &FieldTemplate,
) -> Result<Schema, EditError> {
    if name.is_empty() {
        return Err(EditError::EmptyName);
    }

    let (next, ()) = apply_at_path(schema, path, |level| {
        if level.properties.contains(name) {
            return Err(EditError::NameConflict {
                path: path.clone(),
                name: name.to_string(),
            });
        }

        let order = level
            .properties
            .next_order()
            .ok_or_else(|| EditError::invalid("metadata.order", "no order value left after the last sibling"))?;
        let field_type = template.field_type.unwrap_or(FieldType::String);
        let base = SchemaField::new(field_type, String::new()).with_order(order);
        let field = merge_attributes(base, &template.attributes)?;

        level.properties.insert(name, field);
        if template.required == Some(true) {
            level.required.insert(name);
        }
        Ok(())
    })?;

    Ok(next)
}

/// Remove field `name` from the level at `path`
///
/// Also drops `name` from that level's required set.
///
/// # Errors
/// `FieldNotFound` or resolution errors for `path`.
pub fn remove_field(schema: &Schema, path: &FieldPath, name: &str) -> Result<Schema, EditError> {
    let (next, ()) = apply_at_path(schema, path, |level| {
        level.properties.remove(name).ok_or_else(|| EditError::FieldNotFound {
            path: path.clone(),
            name: name.to_string(),
        })?;
        level.required.remove(name);
        Ok(())
    })?;

    Ok(next)
}

/// Rename field `old` to `new` at the level at `path`
///
/// The field keeps its map position and its `order`; required membership
/// follows the new name. Renaming a field to its own name changes nothing.
///
/// # Errors
/// - `EmptyName` if `new` is empty
/// - `FieldNotFound` if `old` is absent
/// - `NameConflict` if another sibling is already called `new`
pub fn rename_field(schema: &Schema, path: &FieldPath, old: &str, new: &str) -> Result<Schema, EditError> {
    if new.is_empty() {
        return Err(EditError::EmptyName);
    }

    let (next, ()) = apply_at_path(schema, path, |level| {
        if !level.properties.contains(old) {
            return Err(EditError::FieldNotFound {
                path: path.clone(),
                name: old.to_string(),
            });
        }
        if old == new {
            return Ok(());
        }
        if level.properties.contains(new) {
            return Err(EditError::NameConflict {
                path: path.clone(),
                name: new.to_string(),
            });
        }

        level.properties.rename(old, new);
        level.required.rename(old, new);
        Ok(())
    })?;

    Ok(next)
}

/// Apply `patch` to field `name` at the level at `path`
///
/// If the patch changes the type, the field is reset to the defaults of the
/// new type, keeping only id, title, description and order; the patch's
/// other attributes are ignored. Otherwise the attributes are merged onto
/// the existing field. `required` toggles membership in the level's
/// required set and is never stored on the field.
///
/// # Errors
/// `FieldNotFound`, resolution errors for `path`, or `InvalidAttribute`.
pub fn update_field(
    schema: &Schema,
    path: &FieldPath,
    name: &str,
    patch: &FieldPatch,
) -> Result<Schema, EditError> {
    let (next, ()) = apply_at_path(schema, path, |level| {
        let current = level.properties.get(name).ok_or_else(|| EditError::FieldNotFound {
            path: path.clone(),
            name: name.to_string(),
        })?;

        let updated = match patch.field_type {
            Some(field_type) if field_type != current.field_type() => {
                if !patch.attributes.is_empty() {
                    tracing::debug!(%path, field = name, "type change ignores other attributes");
                }
                tracing::debug!(%path, field = name, from = %current.field_type(), to = %field_type, "changing field type");
                Some(current.retyped(field_type))
            }
            _ if patch.attributes.is_empty() => None,
            _ => Some(merge_attributes(current.clone(), &patch.attributes)?),
        };

        if let Some(updated) = updated {
            level.properties.insert(name, updated);
        }

        match patch.required {
            Some(true) => {
                level.required.insert(name);
            }
            Some(false) => {
                level.required.remove(name);
            }
            None => {}
        }
        Ok(())
    })?;

    Ok(next)
}

/// Move field `name` one step up or down among its siblings
///
/// Siblings are sorted by `(order, insertion)`; the field swaps its `order`
/// value with its neighbour in that sequence. Every other sibling keeps
/// its order. At either end this changes nothing.
///
/// # Errors
/// `FieldNotFound` or resolution errors for `path`.
pub fn reorder_field(
    schema: &Schema,
    path: &FieldPath,
    name: &str,
    direction: Direction,
) -> Result<Schema, EditError> {
    let (next, ()) = apply_at_path(schema, path, |level| {
        let ordered = level.properties.ordered_names();
        let index = ordered
            .iter()
            .position(|candidate| candidate == name)
            .ok_or_else(|| EditError::FieldNotFound {
                path: path.clone(),
                name: name.to_string(),
            })?;

        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&t| t < ordered.len()),
        };
        let Some(target) = target else {
            return Ok(());
        };
        let neighbour = &ordered[target];

        let own_order = level.properties.get(name).map(SchemaField::order);
        let neighbour_order = level.properties.get(neighbour).map(SchemaField::order);
        if let (Some(own), Some(other)) = (own_order, neighbour_order) {
            if let Some(field) = level.properties.get_mut(name) {
                field.metadata.order = other;
            }
            if let Some(field) = level.properties.get_mut(neighbour) {
                field.metadata.order = own;
            }
        }
        Ok(())
    })?;

    Ok(next)
}

/// Shallow-merge attributes onto a field through its JSON form
///
/// Attributes that are not valid for the field's type do not survive the
/// round trip; they are reported at debug level. Nested `properties` and
/// `items` the patch does not mention are carried over as the original
/// shared nodes.
fn merge_attributes(field: SchemaField, attributes: &Map<String, JsonValue>) -> Result<SchemaField, EditError> {
    if attributes.is_empty() {
        return Ok(field);
    }

    let mut encoded = match serde_json::to_value(&field) {
        Ok(JsonValue::Object(map)) => map,
        Ok(_) => return Err(EditError::invalid("field", "field did not encode as an object")),
        Err(e) => return Err(EditError::invalid("field", e)),
    };

    for (name, value) in attributes {
        if PROTECTED_ATTRIBUTES.contains(&name.as_str()) {
            continue;
        }
        // title is always present; null resets it
        if name == "title" && value.is_null() {
            encoded.insert(name.clone(), JsonValue::String(String::new()));
            continue;
        }
        encoded.insert(name.clone(), value.clone());
    }
    // the type tag is owned by the base field
    encoded.insert("type".into(), field.field_type().as_str().into());

    let mut merged: SchemaField =
        serde_json::from_value(JsonValue::Object(encoded)).map_err(|e| EditError::invalid(first_key(attributes), e))?;
    validate_constraints(&merged)?;
    keep_shared_children(&field, &mut merged, attributes);

    if tracing::enabled!(tracing::Level::DEBUG) {
        if let Ok(JsonValue::Object(kept)) = serde_json::to_value(&merged) {
            let dropped: Vec<&str> = attributes
                .iter()
                .filter(|(name, value)| !value.is_null() && !kept.contains_key(name.as_str()))
                .filter(|(name, _)| !PROTECTED_ATTRIBUTES.contains(&name.as_str()))
                .map(|(name, _)| name.as_str())
                .collect();
            if !dropped.is_empty() {
                tracing::debug!(?dropped, field_type = %merged.field_type(), "ignored attributes not valid for field type");
            }
        }
    }

    Ok(merged)
}

fn keep_shared_children(original: &SchemaField, merged: &mut SchemaField, attributes: &Map<String, JsonValue>) {
    match (&original.kind, &mut merged.kind) {
        (FieldKind::Object(before), FieldKind::Object(after)) if !attributes.contains_key("properties") => {
            after.properties = before.properties.clone();
        }
        (FieldKind::Array(before), FieldKind::Array(after)) if !attributes.contains_key("items") => {
            after.items = Arc::clone(&before.items);
        }
        _ => {}
    }
}

fn first_key(attributes: &Map<String, JsonValue>) -> String {
    if attributes.len() == 1 {
        attributes.keys().next().cloned().unwrap_or_default()
    } else {
        "attributes".to_string()
    }
}

fn validate_constraints(field: &SchemaField) -> Result<(), EditError> {
    if let FieldKind::String(constraints) = &field.kind {
        if let Some(pattern) = &constraints.pattern {
            regex::Regex::new(pattern).map_err(|e| EditError::invalid("pattern", e))?;
        }
        if let (Some(min), Some(max)) = (constraints.min_length, constraints.max_length) {
            if min > max {
                return Err(EditError::invalid("minLength", format!("{min} exceeds maxLength {max}")));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{NumericConstraints, StringConstraints};
    use crate::path::resolve;
    use serde_json::json;

    fn root() -> FieldPath {
        FieldPath::root()
    }

    fn object_template(title: &str) -> FieldTemplate {
        FieldPatch::new().field_type(FieldType::Object).title(title)
    }

    fn with_address() -> Schema {
        let schema = add_field(&Schema::empty(), &root(), "name", &FieldPatch::new().title("Name")).unwrap();
        let schema = add_field(&schema, &root(), "address", &object_template("Address")).unwrap();
        let address = FieldPath::single("address");
        let schema = add_field(&schema, &address, "street", &FieldPatch::new().title("Street")).unwrap();
        add_field(&schema, &address, "city", &FieldPatch::new().title("City")).unwrap()
    }

    #[test]
    fn add_field_to_empty_root() {
        let template = FieldPatch::new().field_type(FieldType::Number).title("Age");
        let schema = add_field(&Schema::empty(), &root(), "age", &template).unwrap();

        let age = schema.properties.get("age").unwrap();
        assert_eq!(age.field_type(), FieldType::Number);
        assert_eq!(age.title, "Age");
        assert_eq!(age.order(), 0);
        assert!(uuid::Uuid::parse_str(age.id.as_str()).is_ok());
        assert!(schema.required.is_empty());
    }

    #[test]
    fn add_field_assigns_increasing_order() {
        let schema = with_address();
        let address = resolve(&schema, &FieldPath::single("address")).unwrap();
        assert_eq!(schema.properties.get("address").unwrap().order(), 1);
        assert_eq!(address.get("street").unwrap().order(), 0);
        assert_eq!(address.get("city").unwrap().order(), 1);
    }

    #[test]
    fn add_field_rejects_empty_name() {
        let err = add_field(&Schema::empty(), &root(), "", &FieldPatch::new()).unwrap_err();
        assert!(matches!(err, EditError::EmptyName));
    }

    #[test]
    fn add_field_rejects_duplicate_name() {
        let schema = with_address();
        let err = add_field(&schema, &root(), "name", &FieldPatch::new()).unwrap_err();
        assert!(err.is_name_conflict());
    }

    #[test]
    fn add_field_defaults_object_and_array_bodies() {
        let schema = add_field(&Schema::empty(), &root(), "meta", &object_template("Meta")).unwrap();
        let meta = schema.properties.get("meta").unwrap();
        let obj = meta.kind.as_object().unwrap();
        assert!(obj.properties.is_empty());
        assert!(obj.required.is_empty());

        let template = FieldPatch::new().field_type(FieldType::Array).title("Tags");
        let schema = add_field(&schema, &root(), "tags", &template).unwrap();
        let FieldKind::Array(tags) = &schema.properties.get("tags").unwrap().kind else {
            panic!("expected array");
        };
        assert_eq!(tags.items.field_type(), FieldType::String);
    }

    #[test]
    fn add_field_keeps_template_items() {
        let template = FieldPatch::new()
            .field_type(FieldType::Array)
            .attribute("items", json!({ "type": "integer", "minimum": 1 }));
        let schema = add_field(&Schema::empty(), &root(), "ids", &template).unwrap();
        let FieldKind::Array(ids) = &schema.properties.get("ids").unwrap().kind else {
            panic!("expected array");
        };
        assert_eq!(ids.items.field_type(), FieldType::Integer);
    }

    #[test]
    fn add_field_with_required_template() {
        let template = FieldPatch::new().title("Email").required(true);
        let schema = add_field(&Schema::empty(), &root(), "email", &template).unwrap();
        assert!(schema.required.contains("email"));
    }

    #[test]
    fn add_field_under_missing_path() {
        let err = add_field(&Schema::empty(), &FieldPath::single("nope"), "x", &FieldPatch::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn add_field_leaves_input_untouched() {
        let schema = with_address();
        let before = schema.clone();
        let _ = add_field(&schema, &FieldPath::single("address"), "zip", &FieldPatch::new()).unwrap();
        assert_eq!(schema, before);
    }

    #[test]
    fn remove_field_cleans_parent_required() {
        let schema = with_address();
        let address = FieldPath::single("address");
        let schema = update_field(&schema, &address, "city", &FieldPatch::new().required(true)).unwrap();
        let schema = update_field(&schema, &root(), "name", &FieldPatch::new().required(true)).unwrap();

        let schema = remove_field(&schema, &address, "city").unwrap();
        let level = crate::path::resolve_level(&schema, &address).unwrap();
        assert!(!level.properties.contains("city"));
        assert!(!level.required.contains("city"));
        // root required untouched
        assert!(schema.required.contains("name"));
    }

    #[test]
    fn remove_missing_field() {
        let err = remove_field(&with_address(), &root(), "ghost").unwrap_err();
        assert!(matches!(err, EditError::FieldNotFound { .. }));
    }

    #[test]
    fn rename_keeps_position_order_and_required() {
        let schema = update_field(&with_address(), &root(), "name", &FieldPatch::new().required(true)).unwrap();
        let schema = rename_field(&schema, &root(), "name", "full_name").unwrap();

        assert_eq!(schema.properties.names().collect::<Vec<_>>(), vec!["full_name", "address"]);
        assert_eq!(schema.properties.get("full_name").unwrap().order(), 0);
        assert!(schema.required.contains("full_name"));
        assert!(!schema.required.contains("name"));
    }

    #[test]
    fn rename_nested_field() {
        let address = FieldPath::single("address");
        let schema = rename_field(&with_address(), &address, "city", "town").unwrap();
        let level = resolve(&schema, &address).unwrap();
        assert_eq!(level.names().collect::<Vec<_>>(), vec!["street", "town"]);
    }

    #[test]
    fn rename_conflict_and_empty() {
        let schema = with_address();
        assert!(rename_field(&schema, &root(), "name", "address").unwrap_err().is_name_conflict());
        assert!(matches!(
            rename_field(&schema, &root(), "name", "").unwrap_err(),
            EditError::EmptyName
        ));
    }

    #[test]
    fn rename_to_same_name_changes_nothing() {
        let schema = with_address();
        assert_eq!(rename_field(&schema, &root(), "name", "name").unwrap(), schema);
    }

    #[test]
    fn update_required_is_not_stored_on_field() {
        let template = FieldPatch::new().field_type(FieldType::Number).title("Age");
        let schema = add_field(&Schema::empty(), &root(), "age", &template).unwrap();
        let schema = update_field(&schema, &root(), "age", &FieldPatch::new().required(true)).unwrap();

        assert_eq!(schema.required.iter().collect::<Vec<_>>(), vec!["age"]);
        let encoded = serde_json::to_value(schema.properties.get("age").unwrap()).unwrap();
        assert!(encoded.get("required").is_none());

        let schema = update_field(&schema, &root(), "age", &FieldPatch::new().required(false)).unwrap();
        assert!(schema.required.is_empty());
    }

    #[test]
    fn update_type_change_discards_constraints() {
        let template = FieldPatch::new()
            .title("Code")
            .attribute("minLength", 2)
            .attribute("pattern", "^[A-Z]+$")
            .attribute("enum", json!(["AB", "CD"]));
        let schema = add_field(&Schema::empty(), &root(), "code", &template).unwrap();
        let before = schema.properties.get("code").unwrap().clone();

        let schema = update_field(
            &schema,
            &root(),
            "code",
            &FieldPatch::new().field_type(FieldType::Number),
        )
        .unwrap();
        let after = schema.properties.get("code").unwrap();

        assert_eq!(after.kind, FieldKind::Number(NumericConstraints::default()));
        assert_eq!(after.id, before.id);
        assert_eq!(after.title, before.title);
        assert_eq!(after.order(), before.order());
        let encoded = serde_json::to_value(after).unwrap();
        for gone in ["minLength", "pattern", "enum"] {
            assert!(encoded.get(gone).is_none(), "{gone} survived");
        }
    }

    #[test]
    fn update_type_to_object_gets_empty_body() {
        let schema = update_field(
            &with_address(),
            &root(),
            "name",
            &FieldPatch::new().field_type(FieldType::Object),
        )
        .unwrap();
        let obj = schema.properties.get("name").unwrap().kind.as_object().unwrap();
        assert!(obj.properties.is_empty());
    }

    #[test]
    fn update_type_change_ignores_remaining_attributes() {
        let patch = FieldPatch::new()
            .field_type(FieldType::Integer)
            .attribute("minimum", 18)
            .title("Other")
            .required(true);
        let schema = update_field(&with_address(), &root(), "name", &patch).unwrap();
        let name = schema.properties.get("name").unwrap();
        assert_eq!(name.title, "Name");
        assert_eq!(name.kind, FieldKind::Integer(NumericConstraints::default()));
        assert!(schema.required.contains("name"));
    }

    #[test]
    fn update_title_keeps_nested_fields_shared() {
        let schema = with_address();
        let street_before = resolve(&schema, &FieldPath::single("address"))
            .unwrap()
            .get_arc("street")
            .unwrap()
            .clone();

        let next = update_field(&schema, &root(), "address", &FieldPatch::new().title("Home")).unwrap();
        assert_eq!(next.properties.get("address").unwrap().title, "Home");
        let street_after = resolve(&next, &FieldPath::single("address")).unwrap().get_arc("street").unwrap();
        assert!(Arc::ptr_eq(&street_before, street_after));
    }

    #[test]
    fn update_null_title_resets_to_empty() {
        let schema = update_field(&with_address(), &root(), "name", &FieldPatch::new().attribute("title", JsonValue::Null))
            .unwrap();
        assert_eq!(schema.properties.get("name").unwrap().title, "");
    }

    #[test]
    fn add_field_after_max_order_is_rejected() {
        let mut schema = Schema::empty();
        schema
            .properties
            .insert("last", SchemaField::new(FieldType::String, "Last").with_order(i64::MAX));
        let err = add_field(&schema, &root(), "next", &FieldPatch::new()).unwrap_err();
        assert!(matches!(err, EditError::InvalidAttribute { ref attribute, .. } if attribute == "metadata.order"));
    }

    #[test]
    fn update_same_type_merges() {
        let patch = FieldPatch::new()
            .field_type(FieldType::String)
            .attribute("maxLength", 40)
            .description("Your name");
        let schema = update_field(&with_address(), &root(), "name", &patch).unwrap();
        let name = schema.properties.get("name").unwrap();
        assert_eq!(name.title, "Name");
        assert_eq!(name.description.as_deref(), Some("Your name"));
        assert_eq!(
            name.kind,
            FieldKind::String(StringConstraints {
                max_length: Some(40),
                ..StringConstraints::default()
            })
        );
    }

    #[test]
    fn update_cannot_overwrite_id_or_order() {
        let schema = with_address();
        let before = schema.properties.get("name").unwrap().clone();
        let patch = FieldPatch::new()
            .attribute("$id", "forged")
            .attribute("metadata", json!({ "order": 99 }))
            .title("Renamed");
        let schema = update_field(&schema, &root(), "name", &patch).unwrap();
        let after = schema.properties.get("name").unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.order(), before.order());
        assert_eq!(after.title, "Renamed");
    }

    #[test]
    fn update_null_clears_optional_attribute() {
        let schema = update_field(&with_address(), &root(), "name", &FieldPatch::new().description("x")).unwrap();
        let schema = update_field(&schema, &root(), "name", &FieldPatch::new().attribute("description", JsonValue::Null)).unwrap();
        assert!(schema.properties.get("name").unwrap().description.is_none());
    }

    #[test]
    fn update_rejects_bad_pattern_and_shapes() {
        let schema = with_address();
        let err = update_field(&schema, &root(), "name", &FieldPatch::new().attribute("pattern", "(")).unwrap_err();
        assert!(matches!(err, EditError::InvalidAttribute { ref attribute, .. } if attribute == "pattern"));

        let err = update_field(&schema, &root(), "name", &FieldPatch::new().attribute("minLength", "three")).unwrap_err();
        assert!(matches!(err, EditError::InvalidAttribute { .. }));
    }

    #[test]
    fn update_missing_field() {
        let err = update_field(&with_address(), &root(), "ghost", &FieldPatch::new().title("x")).unwrap_err();
        assert!(matches!(err, EditError::FieldNotFound { .. }));
    }

    #[test]
    fn reorder_swaps_order_values() {
        let schema = with_address();
        let schema = add_field(&schema, &root(), "email", &FieldPatch::new()).unwrap();
        // name:0 address:1 email:2
        let schema = reorder_field(&schema, &root(), "email", Direction::Up).unwrap();
        assert_eq!(schema.properties.ordered_names(), vec!["name", "email", "address"]);
        assert_eq!(schema.properties.get("email").unwrap().order(), 1);
        assert_eq!(schema.properties.get("address").unwrap().order(), 2);
        assert_eq!(schema.properties.get("name").unwrap().order(), 0);
        // map positions are not spliced
        assert_eq!(schema.properties.names().collect::<Vec<_>>(), vec!["name", "address", "email"]);
    }

    #[test]
    fn reorder_at_edges_is_a_no_op() {
        let schema = with_address();
        assert_eq!(reorder_field(&schema, &root(), "name", Direction::Up).unwrap(), schema);
        assert_eq!(reorder_field(&schema, &root(), "address", Direction::Down).unwrap(), schema);
    }

    #[test]
    fn reorder_up_then_down_restores() {
        let schema = with_address();
        let address = FieldPath::single("address");
        let moved = reorder_field(&schema, &address, "city", Direction::Up).unwrap();
        assert_eq!(resolve(&moved, &address).unwrap().ordered_names(), vec!["city", "street"]);
        let back = reorder_field(&moved, &address, "city", Direction::Down).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn patch_from_json_splits_typed_slots() {
        let patch = FieldPatch::from_json(json!({ "type": "boolean", "required": true, "title": "Agree" })).unwrap();
        assert_eq!(patch.get_field_type(), Some(FieldType::Boolean));
        assert_eq!(patch.get_required(), Some(true));
        assert_eq!(patch.attributes().len(), 1);

        assert!(FieldPatch::from_json(json!({ "type": "date" })).is_err());
        assert!(FieldPatch::from_json(json!({ "required": "yes" })).is_err());
        assert!(FieldPatch::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn patch_serde_round_trip_keeps_shape() {
        let patch: FieldPatch = serde_json::from_value(json!({ "type": "string", "title": "T" })).unwrap();
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "type": "string", "title": "T" })
        );
    }

    #[test]
    fn direction_parse() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("down".parse::<Direction>().unwrap(), Direction::Down);
        assert!("left".parse::<Direction>().is_err());
    }
}
