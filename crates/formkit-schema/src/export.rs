//! Renderer-facing output
//!
//! The editor keeps bookkeeping (`$id`, `metadata`) inside every field. A
//! form renderer must never see it, so this module produces:
//!
//! - [`clean_schema`]: plain JSON Schema, properties in display order
//! - [`ordering_hints`]: per-level display order, renderable as a UI schema
//! - [`RenderView`]: both of the above plus the live form data

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::field::{FieldKind, SchemaField};
use crate::schema::{Properties, Schema};

/// Key under which a UI schema lists display order
pub const UI_ORDER: &str = "ui:order";

/// Key for the renderer's submit button options
pub const UI_SUBMIT_BUTTON: &str = "ui:submitButtonOptions";

/// Strip editor bookkeeping from a schema
///
/// Removes `$id` and `metadata` at every depth (array `items` included),
/// drops empty `enum` arrays and emits each `properties` map sorted by
/// `order`.
///
/// # Errors
/// Returns an error if a field value cannot be encoded as JSON.
pub fn clean_schema(schema: &Schema) -> Result<JsonValue, serde_json::Error> {
    let mut root = Map::new();
    root.insert("$schema".into(), schema.dialect.clone().into());
    root.insert("type".into(), "object".into());
    if let Some(title) = &schema.title {
        root.insert("title".into(), title.clone().into());
    }
    if let Some(description) = &schema.description {
        root.insert("description".into(), description.clone().into());
    }
    root.insert("properties".into(), clean_properties(&schema.properties)?);
    root.insert(
        "required".into(),
        JsonValue::Array(schema.required.iter().map(JsonValue::from).collect()),
    );
    Ok(JsonValue::Object(root))
}

fn clean_properties(properties: &Properties) -> Result<JsonValue, serde_json::Error> {
    let mut cleaned = Map::new();
    for (name, field) in properties.ordered() {
        cleaned.insert(name.to_string(), clean_field(field)?);
    }
    Ok(JsonValue::Object(cleaned))
}

fn clean_field(field: &SchemaField) -> Result<JsonValue, serde_json::Error> {
    let JsonValue::Object(mut map) = serde_json::to_value(field)? else {
        return Ok(JsonValue::Null);
    };

    map.remove("$id");
    map.remove("metadata");
    if matches!(map.get("enum"), Some(JsonValue::Array(values)) if values.is_empty()) {
        map.remove("enum");
    }

    match &field.kind {
        FieldKind::Object(obj) => {
            map.insert("properties".into(), clean_properties(&obj.properties)?);
        }
        FieldKind::Array(arr) => {
            map.insert("items".into(), clean_field(&arr.items)?);
        }
        _ => {}
    }
    Ok(JsonValue::Object(map))
}

/// Display order of one object level and of its nested objects
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OrderHints {
    /// Child names by ascending `order`, ties by insertion
    pub order: Vec<String>,
    /// Hints for children that are objects themselves
    pub children: IndexMap<String, OrderHints>,
}

impl OrderHints {
    /// Render as a UI schema: `{"ui:order": [...], "<child>": {...}}`
    #[must_use]
    pub fn to_ui_schema(&self) -> JsonValue {
        let mut ui = Map::new();
        ui.insert(
            UI_ORDER.into(),
            JsonValue::Array(self.order.iter().map(|name| JsonValue::from(name.as_str())).collect()),
        );
        for (name, child) in &self.children {
            ui.insert(name.clone(), child.to_ui_schema());
        }
        JsonValue::Object(ui)
    }
}

/// Display order for every object level, root included
#[must_use]
pub fn ordering_hints(schema: &Schema) -> OrderHints {
    hints_for(&schema.properties)
}

fn hints_for(properties: &Properties) -> OrderHints {
    OrderHints {
        order: properties.ordered_names(),
        children: properties
            .iter()
            .filter_map(|(name, field)| field.properties().map(|nested| (name.to_string(), hints_for(nested))))
            .collect(),
    }
}

/// Everything a form renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderView {
    /// Cleaned JSON Schema
    pub schema: JsonValue,
    /// Ordering hints plus submit button options
    pub ui_schema: JsonValue,
    /// Current form data
    pub form_data: JsonValue,
}

impl RenderView {
    /// Build the view for a schema and its current form data
    ///
    /// # Errors
    /// Returns an error if a field value cannot be encoded as JSON.
    pub fn new(schema: &Schema, form_data: JsonValue) -> Result<Self, serde_json::Error> {
        let mut ui_schema = ordering_hints(schema).to_ui_schema();
        if let JsonValue::Object(ui) = &mut ui_schema {
            ui.insert(UI_SUBMIT_BUTTON.into(), submit_button_options());
        }

        Ok(Self {
            schema: clean_schema(schema)?,
            ui_schema,
            form_data,
        })
    }

    /// Check if there is anything to render
    #[must_use]
    pub fn has_fields(&self) -> bool {
        self.schema
            .get("properties")
            .and_then(JsonValue::as_object)
            .is_some_and(|properties| !properties.is_empty())
    }
}

fn submit_button_options() -> JsonValue {
    let mut props = Map::new();
    props.insert("type".into(), "primary".into());
    let mut options = Map::new();
    options.insert("props".into(), JsonValue::Object(props));
    options.insert("submitText".into(), "Submit".into());
    JsonValue::Object(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldType, StringConstraints};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Schema {
        let mut address = SchemaField::new(FieldType::Object, "Address").with_order(0);
        if let Some(obj) = address.kind.as_object_mut() {
            obj.properties
                .insert("city", SchemaField::new(FieldType::String, "City").with_order(1));
            obj.properties
                .insert("street", SchemaField::new(FieldType::String, "Street").with_order(0));
            obj.required.insert("city");
        }

        let mut code = SchemaField::new(FieldType::String, "Code").with_order(2);
        code.kind = FieldKind::String(StringConstraints {
            enum_values: Some(Vec::new()),
            max_length: Some(5),
            ..StringConstraints::default()
        });

        let mut schema = Schema::empty();
        schema.properties.insert("code", code);
        schema.properties.insert("address", address);
        schema
            .properties
            .insert("tags", SchemaField::new(FieldType::Array, "Tags").with_order(1));
        schema.required.insert("code");
        schema
    }

    #[test]
    fn clean_schema_strips_bookkeeping_and_sorts() {
        let cleaned = clean_schema(&sample()).unwrap();
        assert_eq!(
            cleaned,
            json!({
                "$schema": crate::schema::DRAFT_07,
                "type": "object",
                "properties": {
                    "address": {
                        "type": "object",
                        "title": "Address",
                        "properties": {
                            "street": { "type": "string", "title": "Street" },
                            "city": { "type": "string", "title": "City" }
                        },
                        "required": ["city"]
                    },
                    "tags": { "type": "array", "title": "Tags", "items": { "type": "string", "title": "" } },
                    "code": { "type": "string", "title": "Code", "maxLength": 5 }
                },
                "required": ["code"]
            })
        );

        let keys: Vec<_> = cleaned["properties"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["address", "tags", "code"]);
    }

    #[test]
    fn clean_schema_keeps_non_empty_enum() {
        let mut schema = Schema::empty();
        let mut color = SchemaField::new(FieldType::String, "Color");
        color.kind = FieldKind::String(StringConstraints {
            enum_values: Some(vec![json!("red")]),
            ..StringConstraints::default()
        });
        schema.properties.insert("color", color);
        let cleaned = clean_schema(&schema).unwrap();
        assert_eq!(cleaned["properties"]["color"]["enum"], json!(["red"]));
    }

    #[test]
    fn ui_schema_lists_order_per_level() {
        let ui = ordering_hints(&sample()).to_ui_schema();
        assert_eq!(
            ui,
            json!({
                "ui:order": ["address", "tags", "code"],
                "address": { "ui:order": ["street", "city"] }
            })
        );
    }

    #[test]
    fn render_view_bundles_everything() {
        let view = RenderView::new(&sample(), json!({ "code": "AB" })).unwrap();
        assert!(view.has_fields());
        assert_eq!(view.form_data, json!({ "code": "AB" }));
        assert_eq!(view.ui_schema[UI_SUBMIT_BUTTON]["submitText"], json!("Submit"));

        let encoded = serde_json::to_value(&view).unwrap();
        assert!(encoded.get("uiSchema").is_some());
        assert!(encoded.get("formData").is_some());

        let empty = RenderView::new(&Schema::empty(), json!({})).unwrap();
        assert!(!empty.has_fields());
    }
}
