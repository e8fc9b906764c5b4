//! docwalk traversal engine
//!
//! Walks a field configuration tree in lock-step with a JSON document and
//! runs the field hooks registered for a lifecycle slot.
//!
//! # Core Concepts
//!
//! - [`FieldHookEngine`]: owns configuration, hooks and settings
//! - [`TraversalArgs`]: the document and request a call runs on
//! - [`LocaleValues`]: per-locale fan-out of localized values
//! - [`TraversalSettings`]: depth bound and row processing mode
//! - [`TraversalError`]: why a traversal was aborted
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docwalk_engine::{FieldHookEngine, TraversalArgs};
//! use docwalk_hooks::{HookRegistry, Request};
//!
//! let engine = FieldHookEngine::new(Arc::new(sanitized), Arc::new(HookRegistry::with_defaults()))?;
//! let posts = engine.config().collection("posts").unwrap();
//! let req = Request::new();
//!
//! let copy = engine
//!     .before_duplicate(TraversalArgs::for_collection(posts, &doc, &req))
//!     .await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod clone;
mod config;
mod dispatch;
mod engine;
mod error;
mod locale;
mod walker;

pub use clone::{clone_document, deep_clone};
pub use config::{RowMode, TraversalSettings, DEFAULT_MAX_DEPTH};
pub use engine::{FieldHookEngine, Target, TraversalArgs};
pub use error::{value_kind, TraversalConfigurationError, TraversalError};
pub use locale::{LocaleEntry, LocaleValues};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
