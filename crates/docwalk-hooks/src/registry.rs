//! Registry of named hooks
//!
//! Field configuration refers to hooks by name; [`HookRegistry`] maps those
//! names to implementations.

use std::sync::Arc;

use docwalk_schema::{SanitizedConfig, SchemaError, DEFAULT_DUPLICATE_HOOK};
use indexmap::IndexMap;

use crate::builtin::{AppendCopySuffix, ClearValue, NullValue, CLEAR_VALUE, NULL_VALUE};
use crate::hook::{hook_fn, FieldHook, HookArgs, HookResult};

/// Named hook implementations
#[derive(Debug, Default, Clone)]
pub struct HookRegistry {
    hooks: IndexMap<String, Arc<dyn FieldHook>>,
}

impl HookRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            hooks: IndexMap::new(),
        }
    }

    /// Create registry with built-in hooks
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(DEFAULT_DUPLICATE_HOOK, AppendCopySuffix);
        registry.register(CLEAR_VALUE, ClearValue);
        registry.register(NULL_VALUE, NullValue);
        registry
    }

    /// Register a hook, replacing any previous hook with the same name
    pub fn register<H: FieldHook + 'static>(&mut self, name: impl Into<String>, hook: H) {
        self.register_arc(name, Arc::new(hook));
    }

    /// Register an already shared hook
    pub fn register_arc(&mut self, name: impl Into<String>, hook: Arc<dyn FieldHook>) {
        let name = name.into();
        if self.hooks.insert(name.clone(), hook).is_some() {
            tracing::debug!("Replaced hook '{name}'");
        }
    }

    /// Register a synchronous closure
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(HookArgs<'_>) -> HookResult + Send + Sync + 'static,
    {
        self.register(name, hook_fn(f));
    }

    /// Look up a hook by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn FieldHook>> {
        self.hooks.get(name)
    }

    /// Check if hook exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    /// Remove hook
    #[inline]
    pub fn remove(&mut self, name: &str) -> bool {
        self.hooks.shift_remove(name).is_some()
    }

    /// List all registered hook names, in registration order
    #[inline]
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.hooks.keys().map(String::as_str).collect()
    }

    /// Get number of registered hooks
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Check that every hook referenced by a configuration is registered
    ///
    /// # Errors
    /// `SchemaError::UnknownHook` for the first unregistered name
    pub fn verify(&self, config: &SanitizedConfig) -> Result<(), SchemaError> {
        for (hook, location) in config.hook_references() {
            if !self.contains(&hook) {
                return Err(SchemaError::unknown_hook(location, hook));
            }
        }
        Ok(())
    }
}
