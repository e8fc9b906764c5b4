//! Errors a hook can raise

use docwalk_schema::DataPath;

/// Failure signalled by a hook
///
/// Any of these aborts the whole traversal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookError {
    /// The hook rejected the value
    #[error("validation failed at '{path}': {message}")]
    Validation { path: DataPath, message: String },

    /// The acting principal may not perform this operation
    #[error("access denied at '{path}'")]
    AccessDenied { path: DataPath },

    /// The request was cancelled while the hook was running
    #[error("operation cancelled")]
    Cancelled,

    /// Any other hook failure
    #[error("hook failed: {0}")]
    Other(String),
}

impl HookError {
    /// Create validation error
    #[inline]
    pub fn validation(path: &DataPath, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.clone(),
            message: message.into(),
        }
    }

    /// Create access denied error
    #[inline]
    #[must_use]
    pub fn access_denied(path: &DataPath) -> Self {
        Self::AccessDenied { path: path.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hook_error_display() {
        let path: DataPath = "items.1.sku".parse().unwrap();
        let err = HookError::validation(&path, "must be unique");
        assert_eq!(
            err.to_string(),
            "validation failed at 'items.1.sku': must be unique"
        );
        assert_eq!(
            HookError::access_denied(&path).to_string(),
            "access denied at 'items.1.sku'"
        );
    }
}
