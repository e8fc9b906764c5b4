//! docwalk field hooks
//!
//! The contract between the traversal engine and per-field lifecycle logic.
//!
//! # Core Concepts
//!
//! - [`FieldHook`]: async transform run for one field
//! - [`HookArgs`]: value, location and request context handed to a hook
//! - [`HookRegistry`]: hook implementations looked up by configured name
//! - [`Request`]: opaque request data, including the cancellation signal
//! - [`HookError`]: failures a hook can signal
//!
//! # Example
//!
//! ```rust,ignore
//! use docwalk_hooks::HookRegistry;
//!
//! let mut registry = HookRegistry::with_defaults();
//! registry.register_fn("trim", |args| {
//!     Ok(args.value.map(|v| match v {
//!         serde_json::Value::String(s) => serde_json::Value::String(s.trim().to_string()),
//!         other => other,
//!     }))
//! });
//! registry.verify(&sanitized)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod builtin;
mod error;
mod hook;
mod registry;
mod request;

pub use builtin::{AppendCopySuffix, ClearValue, NullValue, CLEAR_VALUE, COPY_SUFFIX, NULL_VALUE};
pub use error::HookError;
pub use hook::{async_hook_fn, hook_fn, AsyncHook, FieldHook, HookArgs, HookResult, SyncHook};
pub use registry::HookRegistry;
pub use request::{DocumentId, Request, RequestContext};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
