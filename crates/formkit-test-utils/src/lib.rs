//! Testing utilities for formkit workspace
//!
//! Shared fixtures, store builders and assertions.

#![allow(missing_docs)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use formkit_schema::{add_field, FieldPatch, FieldPath, FieldType, Schema};
use formkit_store::{
    save_state, ChangeKind, MemoryBlobStore, PersistedState, SchemaStore, StoreConfig, StoreEvent, Theme,
    DEFAULT_STORAGE_KEY,
};

/// Import text for a small signup form with one nested object
pub const SIGNUP_SCHEMA: &str = r#"{
  "title": "Signup",
  "required": ["email"],
  "properties": {
    "full_name": {},
    "email": { "type": "string", "format": "email" },
    "age": { "type": "integer", "minimum": 0 },
    "address": {
      "type": "object",
      "properties": {
        "street": {},
        "zip_code": { "pattern": "^[0-9]{5}$" }
      }
    },
    "tags": { "type": "array" }
  }
}"#;

pub fn path(text: &str) -> FieldPath {
    text.parse().unwrap()
}

/// `name` (string), `age` (number), `address { street, city }` built via edits
pub fn sample_schema() -> Schema {
    let root = FieldPath::root();
    let address = FieldPath::single("address");
    let steps: [(&FieldPath, &str, FieldPatch); 5] = [
        (&root, "name", FieldPatch::new().title("Name")),
        (&root, "age", FieldPatch::new().field_type(FieldType::Number).title("Age")),
        (&root, "address", FieldPatch::new().field_type(FieldType::Object).title("Address")),
        (&address, "street", FieldPatch::new().title("Street")),
        (&address, "city", FieldPatch::new().title("City")),
    ];
    steps
        .iter()
        .fold(Schema::empty(), |schema, (at, name, template)| {
            add_field(&schema, at, name, template).unwrap()
        })
}

/// In-memory store that is not persisted
pub fn memory_store() -> SchemaStore {
    SchemaStore::in_memory(StoreConfig::new().with_persist(false))
}

/// Store persisting into `blobs`; keep a clone of `blobs` to inspect it
pub fn persistent_store(blobs: &MemoryBlobStore) -> SchemaStore {
    SchemaStore::open(StoreConfig::new(), blobs.clone()).unwrap()
}

/// Store restored with [`sample_schema`], so history starts empty
pub fn sample_store() -> SchemaStore {
    let blobs = MemoryBlobStore::new();
    let state = PersistedState {
        theme: Theme::default(),
        schema: Arc::new(sample_schema()),
    };
    save_state(&blobs, DEFAULT_STORAGE_KEY, &state).unwrap();
    persistent_store(&blobs)
}

/// Records the change kind of every schema event
pub fn record_changes(store: &mut SchemaStore) -> Rc<RefCell<Vec<ChangeKind>>> {
    let seen: Rc<RefCell<Vec<ChangeKind>>> = Rc::default();
    let sink = Rc::clone(&seen);
    store.subscribe(move |event| {
        if let StoreEvent::SchemaChanged { change, .. } = event {
            sink.borrow_mut().push(*change);
        }
    });
    seen
}

/// Names of the level at `at` in display order
pub fn ordered_names(schema: &Schema, at: &str) -> Vec<String> {
    formkit_schema::resolve(schema, &path(at)).unwrap().ordered_names()
}
