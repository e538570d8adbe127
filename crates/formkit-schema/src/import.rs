//! Import of externally authored schemas
//!
//! Accepts loosely written JSON Schema text and fills in everything the
//! editor relies on (ids, types, titles, object bodies, array items and
//! ordering metadata) before decoding into a [`Schema`].

use serde_json::{Map, Value as JsonValue};

use crate::field::{FieldId, FieldType};
use crate::path::FieldPath;
use crate::schema::{Schema, DRAFT_07};

/// Reasons an import is rejected
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("please enter or upload a JSON schema")]
    Empty,

    #[error("invalid JSON format: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("invalid JSON Schema format: schema must be an object")]
    NotAnObject,

    #[error("invalid JSON Schema format: schema must have a properties field")]
    MissingProperties,

    #[error("invalid JSON Schema format: properties must be an object")]
    PropertiesNotObject,

    /// A field definition (or its `properties`/`items`) is not an object
    #[error("invalid JSON Schema format: '{path}' must be an object")]
    FieldNotObject { path: FieldPath },

    #[error("unsupported type {found} at '{path}'")]
    UnknownType { path: FieldPath, found: String },

    /// A field without `metadata.order` follows a sibling at `i64::MAX`
    #[error("invalid JSON Schema format: no order left for '{path}' after the largest metadata.order")]
    OrderOverflow { path: FieldPath },

    /// Normalized document still does not decode
    #[error("invalid JSON Schema format: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Parse and normalize schema text
///
/// # Errors
/// Checks run in order: blank input, JSON syntax, root shape, presence and
/// shape of `properties`, then each field.
///
/// # Examples
/// ```
/// let schema = formkit_schema::parse_schema(r#"{"properties":{"full_name":{}}}"#).unwrap();
/// let field = schema.properties.get("full_name").unwrap();
/// assert_eq!(field.title, "Full Name");
/// ```
pub fn parse_schema(text: &str) -> Result<Schema, ImportError> {
    if text.trim().is_empty() {
        return Err(ImportError::Empty);
    }
    let value: JsonValue = serde_json::from_str(text).map_err(ImportError::InvalidJson)?;
    from_value(value)
}

/// Normalize an already parsed JSON document
///
/// # Errors
/// Same as [`parse_schema`] minus the text checks.
pub fn from_value(value: JsonValue) -> Result<Schema, ImportError> {
    let JsonValue::Object(mut root) = value else {
        return Err(ImportError::NotAnObject);
    };

    match root.get_mut("properties") {
        None | Some(JsonValue::Null) => return Err(ImportError::MissingProperties),
        Some(JsonValue::Object(properties)) => normalize_level(properties, &FieldPath::root())?,
        Some(_) => return Err(ImportError::PropertiesNotObject),
    }

    root.insert("type".into(), "object".into());
    if !matches!(root.get("$schema"), Some(JsonValue::String(_))) {
        root.insert("$schema".into(), DRAFT_07.into());
    }
    if root.get("required").is_some_and(JsonValue::is_null) {
        root.remove("required");
    }

    let schema: Schema = serde_json::from_value(JsonValue::Object(root)).map_err(ImportError::Decode)?;
    tracing::info!(fields = schema.field_count(), "normalized imported schema");
    Ok(schema)
}

/// Display title derived from a property name
///
/// Splits on `_`, upper-cases the first character of every word and joins
/// the words with single spaces: `full_name` becomes `Full Name`.
#[must_use]
pub fn title_from_name(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn normalize_level(properties: &mut Map<String, JsonValue>, path: &FieldPath) -> Result<(), ImportError> {
    let mut next_order = properties
        .values()
        .filter_map(present_order)
        .fold(-1, i64::max)
        .checked_add(1);

    for (name, value) in properties.iter_mut() {
        let field_path = path.child(name.as_str());
        let has_order = present_order(value).is_some();
        let JsonValue::Object(field) = value else {
            return Err(ImportError::FieldNotObject { path: field_path });
        };

        normalize_field(field, &field_path, &title_from_name(name))?;

        if !has_order {
            let order = next_order.ok_or_else(|| ImportError::OrderOverflow { path: field_path.clone() })?;
            let mut metadata = Map::new();
            metadata.insert("order".into(), order.into());
            field.insert("metadata".into(), JsonValue::Object(metadata));
            next_order = order.checked_add(1);
        }
    }
    Ok(())
}

fn normalize_field(field: &mut Map<String, JsonValue>, path: &FieldPath, title: &str) -> Result<(), ImportError> {
    if !is_non_empty_string(field.get("$id")) {
        field.insert("$id".into(), FieldId::generate().to_string().into());
    }

    let field_type = match field.get("type") {
        None | Some(JsonValue::Null) => FieldType::String,
        Some(JsonValue::String(name)) if name.is_empty() => FieldType::String,
        Some(JsonValue::String(name)) => name.parse().map_err(|_| ImportError::UnknownType {
            path: path.clone(),
            found: format!("'{name}'"),
        })?,
        Some(other) => {
            return Err(ImportError::UnknownType {
                path: path.clone(),
                found: other.to_string(),
            })
        }
    };
    field.insert("type".into(), field_type.as_str().into());

    if !is_non_empty_string(field.get("title")) {
        field.insert("title".into(), title.into());
    }

    match field_type {
        FieldType::Object => match field.get_mut("properties") {
            Some(JsonValue::Object(nested)) => normalize_level(nested, path)?,
            None | Some(JsonValue::Null) => {
                field.insert("properties".into(), JsonValue::Object(Map::new()));
            }
            Some(_) => {
                return Err(ImportError::FieldNotObject {
                    path: path.child("properties"),
                })
            }
        },
        FieldType::Array => {
            let items_path = path.child("items");
            match field.get_mut("items") {
                Some(JsonValue::Object(items)) => normalize_field(items, &items_path, "")?,
                None | Some(JsonValue::Null) => {
                    let mut items = Map::new();
                    items.insert("type".into(), "string".into());
                    normalize_field(&mut items, &items_path, "")?;
                    field.insert("items".into(), JsonValue::Object(items));
                }
                Some(_) => return Err(ImportError::FieldNotObject { path: items_path }),
            }
        }
        _ => {}
    }
    Ok(())
}

fn present_order(field: &JsonValue) -> Option<i64> {
    field.get("metadata")?.get("order")?.as_i64()
}

fn is_non_empty_string(value: Option<&JsonValue>) -> bool {
    matches!(value, Some(JsonValue::String(s)) if !s.is_empty())
}
