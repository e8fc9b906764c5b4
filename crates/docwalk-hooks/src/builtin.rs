//! Built-in hooks registered by [`HookRegistry::with_defaults`](crate::HookRegistry::with_defaults)

use async_trait::async_trait;
use serde_json::Value;

use crate::hook::{FieldHook, HookArgs, HookResult};

/// Name of [`ClearValue`] in the default registry
pub const CLEAR_VALUE: &str = "clearValue";

/// Name of [`NullValue`] in the default registry
pub const NULL_VALUE: &str = "nullValue";

/// Suffix appended by [`AppendCopySuffix`]
pub const COPY_SUFFIX: &str = " - Copy";

/// Marks string values as copies so unique constraints hold after duplication
///
/// Non-string values (including absent ones) pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppendCopySuffix;

#[async_trait]
impl FieldHook for AppendCopySuffix {
    async fn call(&self, args: HookArgs<'_>) -> HookResult {
        Ok(args.value.map(|value| match value {
            Value::String(s) => Value::String(format!("{s}{COPY_SUFFIX}")),
            other => other,
        }))
    }
}

/// Drops the value; the key ends up absent
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearValue;

#[async_trait]
impl FieldHook for ClearValue {
    async fn call(&self, _args: HookArgs<'_>) -> HookResult {
        Ok(None)
    }
}

/// Replaces the value with an explicit `null`
#[derive(Debug, Clone, Copy, Default)]
pub struct NullValue;

#[async_trait]
impl FieldHook for NullValue {
    async fn call(&self, _args: HookArgs<'_>) -> HookResult {
        Ok(Some(Value::Null))
    }
}
