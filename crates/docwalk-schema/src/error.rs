//! Error types for schema loading and sanitization

use std::path::PathBuf;

/// Configuration rejected by the sanitizer or the engine builder
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Data field without a name
    #[error("{location}: '{field_type}' field requires a name")]
    MissingName {
        location: String,
        field_type: &'static str,
    },

    /// Name that cannot be addressed by a path
    #[error("{location}: invalid field name '{name}'")]
    InvalidName { location: String, name: String },

    /// Two fields storing data under the same key
    #[error("{location}: duplicate field name '{name}'")]
    DuplicateField { location: String, name: String },

    /// Two collections with the same slug
    #[error("duplicate collection slug '{0}'")]
    DuplicateCollection(String),

    /// Two globals with the same slug
    #[error("duplicate global slug '{0}'")]
    DuplicateGlobal(String),

    /// Block slug defined twice in the library or within one blocks field
    #[error("{location}: duplicate block slug '{slug}'")]
    DuplicateBlock { location: String, slug: String },

    /// Block reference with no library definition
    #[error("{location}: unknown block reference '{slug}'")]
    UnknownBlockReference { location: String, slug: String },

    /// Relationship or join pointing at a collection that does not exist
    #[error("{location}: unknown collection '{slug}'")]
    UnknownCollection { location: String, slug: String },

    /// Hook name that is not registered
    #[error("{location}: hook '{hook}' is not registered")]
    UnknownHook { location: String, hook: String },

    /// Localization enabled without locales
    #[error("localization requires at least one locale")]
    NoLocales,

    /// Locale code listed twice
    #[error("duplicate locale '{0}'")]
    DuplicateLocale(String),

    /// Default locale missing from the locale list
    #[error("default locale '{0}' is not a configured locale")]
    UnknownDefaultLocale(String),
}

impl SchemaError {
    pub(crate) fn missing_name(location: impl Into<String>, field_type: &'static str) -> Self {
        Self::MissingName {
            location: location.into(),
            field_type,
        }
    }

    pub(crate) fn duplicate_field(location: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateField {
            location: location.into(),
            name: name.into(),
        }
    }

    /// Create unknown hook error
    pub fn unknown_hook(location: impl Into<String>, hook: impl Into<String>) -> Self {
        Self::UnknownHook {
            location: location.into(),
            hook: hook.into(),
        }
    }
}

/// Errors while reading configuration from text or files
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File extension not recognised
    #[error("unsupported config format: '{0}' (expected json, yaml or yml)")]
    UnsupportedFormat(String),

    /// Loaded configuration failed sanitization
    #[error("invalid configuration: {0}")]
    Schema(#[from] SchemaError),
}

impl LoadError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
