//! Error types for traversal
//!
//! Every traversal error aborts the whole call; the caller never sees a
//! partially transformed document.

use docwalk_hooks::HookError;
use docwalk_schema::DataPath;
use serde_json::Value;

/// Main traversal error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TraversalError {
    /// A hook rejected a value
    #[error("validation failed at '{path}': {message}")]
    Validation { path: DataPath, message: String },

    /// A hook (or the policy it delegates to) denied access
    #[error("access denied at '{path}'")]
    AccessDenied { path: DataPath },

    /// A hook observed request cancellation
    #[error("traversal cancelled at '{path}'")]
    Cancelled { path: DataPath },

    /// A hook failed for any other reason
    #[error("hook '{hook}' failed at '{path}': {message}")]
    HookFailed {
        hook: String,
        path: DataPath,
        message: String,
    },

    /// Document does not fit the configuration
    #[error("traversal configuration error: {0}")]
    Configuration(#[from] TraversalConfigurationError),
}

impl TraversalError {
    /// Wrap an error raised by hook `hook` while visiting `path`
    #[must_use]
    pub fn from_hook(error: HookError, hook: &str, path: &DataPath) -> Self {
        match error {
            HookError::Validation { path, message } => Self::Validation { path, message },
            HookError::AccessDenied { path } => Self::AccessDenied { path },
            HookError::Cancelled => Self::Cancelled { path: path.clone() },
            HookError::Other(message) => Self::HookFailed {
                hook: hook.to_string(),
                path: path.clone(),
                message,
            },
        }
    }

    /// Data path where the error happened
    #[must_use]
    pub fn path(&self) -> &DataPath {
        match self {
            Self::Validation { path, .. }
            | Self::AccessDenied { path }
            | Self::Cancelled { path }
            | Self::HookFailed { path, .. } => path,
            Self::Configuration(err) => err.path(),
        }
    }

    /// Check if error is retryable
    ///
    /// Only opaque hook failures may be transient; configuration errors,
    /// rejections and cancellations never are.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::HookFailed { .. })
    }

    /// Check if the document or configuration is at fault
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Mismatch between the document and the field configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraversalConfigurationError {
    /// Row's `blockType` names no block accepted by the field
    #[error("unknown block type '{block_type}' at '{path}'")]
    UnknownBlockType { path: DataPath, block_type: String },

    /// Row has no string `blockType`
    #[error("missing block type at '{path}'")]
    MissingBlockType { path: DataPath },

    /// Stored value has the wrong JSON type for its field
    #[error("expected {expected} at '{path}', found {found}")]
    ShapeMismatch {
        path: DataPath,
        expected: &'static str,
        found: &'static str,
    },

    /// Nesting deeper than the configured limit
    #[error("maximum traversal depth {max_depth} exceeded at '{path}'")]
    MaxDepthExceeded { path: DataPath, max_depth: usize },

    /// Field declares a hook name the registry does not know
    #[error("hook '{hook}' declared at '{path}' is not registered")]
    UnregisteredHook { path: DataPath, hook: String },

    /// Data-bearing field without a name, in an unsanitized field list
    #[error("{field_type} field at '{path}' has no name")]
    MissingFieldName {
        path: DataPath,
        field_type: &'static str,
    },
}

impl TraversalConfigurationError {
    /// Create shape mismatch error
    #[inline]
    #[must_use]
    pub fn shape_mismatch(path: &DataPath, expected: &'static str, found: &Value) -> Self {
        Self::ShapeMismatch {
            path: path.clone(),
            expected,
            found: value_kind(found),
        }
    }

    /// Data path where the error happened
    #[must_use]
    pub fn path(&self) -> &DataPath {
        match self {
            Self::UnknownBlockType { path, .. }
            | Self::MissingBlockType { path }
            | Self::ShapeMismatch { path, .. }
            | Self::MaxDepthExceeded { path, .. }
            | Self::UnregisteredHook { path, .. }
            | Self::MissingFieldName { path, .. } => path,
        }
    }
}

/// JSON type name of a value, for diagnostics
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hook_errors_keep_their_location() {
        let at: DataPath = "items.2.sku".parse().unwrap();
        let inner: DataPath = "items.2".parse().unwrap();

        let err = TraversalError::from_hook(HookError::validation(&inner, "bad"), "check", &at);
        assert_eq!(err.path(), &inner);

        let err = TraversalError::from_hook(HookError::Cancelled, "check", &at);
        assert_eq!(err, TraversalError::Cancelled { path: at.clone() });

        let err = TraversalError::from_hook(HookError::Other("timeout".into()), "lookup", &at);
        assert_eq!(err.to_string(), "hook 'lookup' failed at 'items.2.sku': timeout");
        assert!(err.is_retryable());
    }

    #[test]
    fn configuration_errors_are_not_retryable() {
        let at: DataPath = "layout.0".parse().unwrap();
        let err: TraversalError =
            TraversalConfigurationError::shape_mismatch(&at, "object", &json!([1])).into();

        assert!(err.is_configuration());
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "traversal configuration error: expected object at 'layout.0', found array"
        );
    }
}
