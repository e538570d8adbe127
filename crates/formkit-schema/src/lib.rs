//! formkit Schema Model
//!
//! Typed JSON-Schema field tree with path-addressed, copy-on-write edits.
//!
//! # Core Concepts
//!
//! - [`Schema`]: Root form schema, always an object
//! - [`SchemaField`]: One field; its [`FieldKind`] carries only the
//!   constraints valid for its type
//! - [`FieldPath`]: Dotted address of a nesting level (`""` is the root)
//! - Edits ([`add_field`], [`remove_field`], [`rename_field`],
//!   [`update_field`], [`reorder_field`]): pure functions returning a new
//!   schema that shares every untouched subtree with the old one
//! - [`parse_schema`]: Import with normalization
//! - [`clean_schema`] / [`RenderView`]: Renderer-facing output
//!
//! # Example
//!
//! ```rust
//! use formkit_schema::{add_field, update_field, FieldPatch, FieldPath, FieldType, Schema};
//!
//! let root = FieldPath::root();
//! let schema = add_field(
//!     &Schema::empty(),
//!     &root,
//!     "age",
//!     &FieldPatch::new().field_type(FieldType::Number).title("Age"),
//! )?;
//! let schema = update_field(&schema, &root, "age", &FieldPatch::new().required(true))?;
//!
//! assert!(schema.required.contains("age"));
//! # Ok::<(), formkit_schema::EditError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod edit;
mod export;
mod field;
mod import;
mod path;
mod schema;

pub use edit::{
    add_field, remove_field, rename_field, reorder_field, update_field, Direction, EditError, FieldPatch,
    FieldTemplate,
};
pub use export::{clean_schema, ordering_hints, OrderHints, RenderView, UI_ORDER, UI_SUBMIT_BUTTON};
pub use field::{
    ArrayField, FieldId, FieldKind, FieldMetadata, FieldType, NumericConstraints, ObjectField, SchemaField,
    StringConstraints, UnknownFieldType,
};
pub use import::{from_value, parse_schema, title_from_name, ImportError};
pub use path::{apply_at_path, resolve, resolve_level, FieldPath, PathError};
pub use schema::{Level, LevelRef, Properties, RequiredSet, RootType, Schema, DRAFT_07};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
