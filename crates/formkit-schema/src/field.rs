//! Field tree nodes
//!
//! Provides [`SchemaField`], one node of a form schema. Type-specific
//! constraints live inside [`FieldKind`], so a field can only ever carry the
//! attributes that are valid for its current type.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};

use crate::schema::{Level, LevelRef, Properties, RequiredSet};

/// JSON-Schema primitive type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Text
    String,
    /// Floating point number
    Number,
    /// Whole number
    Integer,
    /// True / false
    Boolean,
    /// Homogeneous list described by `items`
    Array,
    /// Nested group of named fields
    Object,
}

impl FieldType {
    /// Every supported type, in declaration order
    pub const ALL: [FieldType; 6] = [
        FieldType::String,
        FieldType::Number,
        FieldType::Integer,
        FieldType::Boolean,
        FieldType::Array,
        FieldType::Object,
    ];

    /// Lowercase JSON-Schema name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Check if the type holds a single value (not array/object)
    #[inline]
    #[must_use]
    pub fn is_scalar(self) -> bool {
        !matches!(self, Self::Array | Self::Object)
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| UnknownFieldType(s.to_string()))
    }
}

/// A type name that is not one of [`FieldType::ALL`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field type: '{0}'")]
pub struct UnknownFieldType(pub String);

/// Stable field identifier
///
/// Survives renames, reorders and type changes. Generated identifiers are
/// v4 UUIDs; imported schemas may carry any string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Fresh random identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Identifier text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FieldId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FieldId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Editor bookkeeping stored next to the JSON-Schema attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Sibling sort key
    #[serde(default)]
    pub order: i64,
}

/// One node of the field tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Stable identifier
    #[serde(rename = "$id", default = "FieldId::generate")]
    pub id: FieldId,

    /// Type tag and the constraints valid for it
    #[serde(flatten)]
    pub kind: FieldKind,

    /// Display label
    #[serde(default)]
    pub title: String,

    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Initial value offered by the form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,

    /// Fixed value
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<JsonValue>,

    /// Sample values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<JsonValue>>,

    /// Ordering metadata
    #[serde(default)]
    pub metadata: FieldMetadata,
}

impl SchemaField {
    /// Create a field of the given type with default constraints
    #[must_use]
    pub fn new(field_type: FieldType, title: impl Into<String>) -> Self {
        Self {
            id: FieldId::generate(),
            kind: FieldKind::default_for(field_type),
            title: title.into(),
            description: None,
            default: None,
            const_value: None,
            examples: None,
            metadata: FieldMetadata::default(),
        }
    }

    /// Set the sibling sort key
    #[inline]
    #[must_use]
    pub fn with_order(mut self, order: i64) -> Self {
        self.metadata.order = order;
        self
    }

    /// Set the description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Current type
    #[inline]
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    /// Sibling sort key
    #[inline]
    #[must_use]
    pub fn order(&self) -> i64 {
        self.metadata.order
    }

    /// Nested fields, if this is an object
    #[inline]
    #[must_use]
    pub fn properties(&self) -> Option<&Properties> {
        self.kind.as_object().map(|obj| &obj.properties)
    }

    /// Same field switched to another type
    ///
    /// Keeps identity, labels and ordering; every constraint and the
    /// `default`/`const`/`examples` values are discarded.
    #[must_use]
    pub fn retyped(&self, field_type: FieldType) -> Self {
        Self {
            id: self.id.clone(),
            kind: FieldKind::default_for(field_type),
            title: self.title.clone(),
            description: self.description.clone(),
            default: None,
            const_value: None,
            examples: None,
            metadata: self.metadata,
        }
    }
}

/// Type tag plus type-specific constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// Text constraints
    String(StringConstraints),
    /// Numeric constraints
    Number(NumericConstraints),
    /// Numeric constraints for whole numbers
    Integer(NumericConstraints),
    /// No constraints
    Boolean,
    /// Element schema and list constraints
    Array(ArrayField),
    /// Nested fields
    Object(ObjectField),
}

impl FieldKind {
    /// Default constraints for a type
    ///
    /// Objects start with empty `properties`/`required`, arrays with a
    /// string `items` schema.
    #[must_use]
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => Self::String(StringConstraints::default()),
            FieldType::Number => Self::Number(NumericConstraints::default()),
            FieldType::Integer => Self::Integer(NumericConstraints::default()),
            FieldType::Boolean => Self::Boolean,
            FieldType::Array => Self::Array(ArrayField::default()),
            FieldType::Object => Self::Object(ObjectField::default()),
        }
    }

    /// Type tag
    #[inline]
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::String(_) => FieldType::String,
            Self::Number(_) => FieldType::Number,
            Self::Integer(_) => FieldType::Integer,
            Self::Boolean => FieldType::Boolean,
            Self::Array(_) => FieldType::Array,
            Self::Object(_) => FieldType::Object,
        }
    }

    /// Object body, if any
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectField> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Mutable object body, if any
    #[inline]
    pub fn as_object_mut(&mut self) -> Option<&mut ObjectField> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

/// Constraints for `string` fields
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Regular expression the value must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Format hint (`email`, `date`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<JsonValue>>,
}

/// Constraints for `number` and `integer` fields
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<JsonValue>>,
}

/// Body of an `array` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayField {
    /// Element schema
    #[serde(default = "default_items")]
    pub items: Arc<SchemaField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
}

fn default_items() -> Arc<SchemaField> {
    Arc::new(SchemaField::new(FieldType::String, String::new()))
}

impl Default for ArrayField {
    fn default() -> Self {
        Self {
            items: default_items(),
            min_items: None,
            max_items: None,
            unique_items: None,
        }
    }
}

/// Body of an `object` field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectField {
    /// Nested fields
    #[serde(default)]
    pub properties: Properties,
    /// Names of nested fields that must be filled in
    #[serde(default)]
    pub required: RequiredSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
}

impl ObjectField {
    /// Read-only view of this nesting level
    #[inline]
    #[must_use]
    pub fn level(&self) -> LevelRef<'_> {
        LevelRef {
            properties: &self.properties,
            required: &self.required,
        }
    }

    /// Mutable view of this nesting level
    #[inline]
    pub fn level_mut(&mut self) -> Level<'_> {
        Level {
            properties: &mut self.properties,
            required: &mut self.required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_type_round_trips_through_str() {
        for ty in FieldType::ALL {
            assert_eq!(ty.as_str().parse::<FieldType>().unwrap(), ty);
        }
        assert!(matches!("date".parse::<FieldType>(), Err(UnknownFieldType(_))));
    }

    #[test]
    fn field_type_is_scalar() {
        assert!(FieldType::String.is_scalar());
        assert!(FieldType::Boolean.is_scalar());
        assert!(!FieldType::Array.is_scalar());
        assert!(!FieldType::Object.is_scalar());
    }

    #[test]
    fn default_kind_for_object_and_array() {
        let FieldKind::Object(obj) = FieldKind::default_for(FieldType::Object) else {
            panic!("expected object");
        };
        assert!(obj.properties.is_empty());
        assert!(obj.required.is_empty());

        let FieldKind::Array(arr) = FieldKind::default_for(FieldType::Array) else {
            panic!("expected array");
        };
        assert_eq!(arr.items.field_type(), FieldType::String);
    }

    #[test]
    fn serializes_with_type_tag_and_metadata() {
        let mut field = SchemaField::new(FieldType::String, "Name").with_order(3);
        field.id = FieldId::from("f-1");
        if let FieldKind::String(c) = &mut field.kind {
            c.min_length = Some(2);
        }

        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(
            value,
            json!({
                "$id": "f-1",
                "type": "string",
                "minLength": 2,
                "title": "Name",
                "metadata": { "order": 3 }
            })
        );
    }

    #[test]
    fn decode_ignores_constraints_of_other_types() {
        let field: SchemaField = serde_json::from_value(json!({
            "$id": "x",
            "type": "boolean",
            "title": "Flag",
            "minLength": 4
        }))
        .unwrap();
        assert_eq!(field.kind, FieldKind::Boolean);
        assert!(serde_json::to_value(&field).unwrap().get("minLength").is_none());
    }

    #[test]
    fn decode_generates_missing_id_and_items() {
        let field: SchemaField = serde_json::from_value(json!({
            "type": "array",
            "title": "Tags"
        }))
        .unwrap();
        assert!(!field.id.as_str().is_empty());
        let FieldKind::Array(arr) = &field.kind else {
            panic!("expected array");
        };
        assert_eq!(arr.items.field_type(), FieldType::String);
    }

    #[test]
    fn retyped_keeps_identity_and_drops_constraints() {
        let mut field = SchemaField::new(FieldType::String, "Code")
            .with_order(7)
            .with_description("postal code");
        field.default = Some(json!("00000"));
        if let FieldKind::String(c) = &mut field.kind {
            c.pattern = Some("^[0-9]+$".into());
        }

        let number = field.retyped(FieldType::Number);
        assert_eq!(number.id, field.id);
        assert_eq!(number.title, "Code");
        assert_eq!(number.description.as_deref(), Some("postal code"));
        assert_eq!(number.order(), 7);
        assert_eq!(number.kind, FieldKind::Number(NumericConstraints::default()));
        assert!(number.default.is_none());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(FieldId::generate(), FieldId::generate());
    }
}
