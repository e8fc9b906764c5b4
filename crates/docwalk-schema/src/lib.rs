//! docwalk schema model
//!
//! Author-defined field configuration and the coordinates used to walk it.
//!
//! # Core Concepts
//!
//! - [`Field`] / [`FieldKind`]: one node of the polymorphic schema tree
//! - [`Block`] / [`BlockLibrary`]: shared definitions for polymorphic rows
//! - [`AppConfig`]: collections, globals, library blocks and localization
//! - [`SanitizedConfig`]: validated configuration accepted by the engine
//! - [`FieldPath`]: paired [`DataPath`] and [`SchemaPath`]
//!
//! # Example
//!
//! ```rust,ignore
//! use docwalk_schema::{AppConfig, CollectionConfig, Field, LocalizationConfig};
//!
//! let config = AppConfig::new()
//!     .with_localization(LocalizationConfig::new(["en", "es"]))
//!     .with_collection(CollectionConfig::new(
//!         "posts",
//!         vec![Field::text("title").localized().unique()],
//!     ))
//!     .sanitize()?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod block;
mod collection;
mod error;
mod field;
mod loader;
mod path;

pub use block::{Block, BlockLibrary, BLOCK_TYPE_KEY};
pub use collection::{
    AppConfig, CollectionConfig, GlobalConfig, Locale, LocalizationConfig, SanitizedCollection,
    SanitizedConfig, SanitizedGlobal, DEFAULT_DUPLICATE_HOOK,
};
pub use error::{LoadError, SchemaError};
pub use field::{
    ArrayField, BlocksField, Field, FieldHooks, FieldKind, FieldRef, GroupField, HookSlot,
    JoinField, RelationTo, RelationshipField, RowField, Tab, TabsField,
};
pub use loader::load_sanitized;
pub use path::{DataPath, FieldPath, PathError, PathSegment, SchemaPath};

/// A JSON document: ordered mapping from field name to value
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
