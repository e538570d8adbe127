//! formkit Schema Store
//!
//! Stateful front for the `formkit_schema` edits: one current schema, a
//! bounded undo/redo history of structurally shared snapshots, editor theme,
//! live form data and write-through persistence.
//!
//! # Core Concepts
//!
//! - [`SchemaStore`]: The store; every mutation is all-or-nothing
//! - [`History`]: Bounded past/future snapshot stacks
//! - [`BlobStore`]: Where `{theme, schema}` is persisted
//!   ([`MemoryBlobStore`], [`FileBlobStore`])
//! - [`EditCommand`]: Store operations as serializable data
//! - [`StoreEvent`]: Delivered to observers after each committed change
//!
//! # Example
//!
//! ```rust
//! use formkit_schema::{FieldPatch, FieldPath, FieldType};
//! use formkit_store::{SchemaStore, StoreConfig};
//!
//! let mut store = SchemaStore::in_memory(StoreConfig::new());
//! let root = FieldPath::root();
//! store.add_field(&root, "age", &FieldPatch::new().field_type(FieldType::Number))?;
//! store.update_field(&root, "age", &FieldPatch::new().required(true))?;
//!
//! assert!(store.undo());
//! assert!(store.schema().required.is_empty());
//! # Ok::<(), formkit_store::StoreError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod command;
mod config;
mod error;
mod event;
mod history;
mod persist;
mod state;
mod store;

pub use command::EditCommand;
pub use config::{StoreConfig, DEFAULT_HISTORY_CAPACITY, DEFAULT_STORAGE_KEY};
pub use error::{StoreError, StoreResult};
pub use event::{ChangeKind, Observer, StoreEvent, SubscriptionId};
pub use history::History;
pub use persist::{load_state, save_state, BlobStore, FileBlobStore, MemoryBlobStore, PersistError};
pub use state::{PersistedState, Theme, UnknownTheme};
pub use store::SchemaStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
