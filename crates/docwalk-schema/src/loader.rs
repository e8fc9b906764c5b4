//! Loading app configuration from JSON or YAML

use std::path::Path;

use crate::collection::{AppConfig, SanitizedConfig};
use crate::error::LoadError;

impl AppConfig {
    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid or does not describe an app config
    #[inline]
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from YAML string
    ///
    /// # Errors
    /// Returns error if YAML is invalid or does not describe an app config
    #[inline]
    pub fn from_yaml(yaml: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a `.json`, `.yaml` or `.yml` file
    ///
    /// # Errors
    /// - `LoadError::Io` if the file cannot be read
    /// - `LoadError::UnsupportedFormat` for any other extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let content =
            std::fs::read_to_string(path).map_err(|e| LoadError::io_error(path, e))?;

        tracing::debug!("Loading config from {}", path.display());

        match extension.as_str() {
            "json" => Self::from_json(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            other => Err(LoadError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Serialize to JSON string
    ///
    /// # Errors
    /// Returns error if serialization fails (rare for JSON)
    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Read and sanitize a configuration file in one step
///
/// # Errors
/// Returns the load error, or the sanitizer's error wrapped in `LoadError::Schema`
pub fn load_sanitized(path: impl AsRef<Path>) -> Result<SanitizedConfig, LoadError> {
    Ok(AppConfig::from_path(path)?.sanitize()?)
}
