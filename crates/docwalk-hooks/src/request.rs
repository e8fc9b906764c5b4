//! Request-scoped data handed through to hooks
//!
//! The engine never interprets any of this; it only passes it along.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Identifier of a stored document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Number(i64),
    Text(String),
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for DocumentId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Application-supplied context map, shared by every hook of one traversal
pub type RequestContext = serde_json::Map<String, Value>;

/// The incoming request on whose behalf hooks run
///
/// Carries the acting principal, locale preferences and a cancellation
/// signal. Hooks that do I/O should check [`Request::is_cancelled`] (or select
/// on [`Request::cancellation`]) and fail fast.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Authenticated principal, if any
    pub user: Option<Value>,
    /// Locale requested by the caller
    pub locale: Option<String>,
    /// Locale to read when `locale` has no content
    pub fallback_locale: Option<String>,
    cancellation: CancellationToken,
}

impl Request {
    /// Anonymous request with a fresh cancellation token
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With principal
    #[inline]
    #[must_use]
    pub fn with_user(mut self, user: Value) -> Self {
        self.user = Some(user);
        self
    }

    /// With requested locale
    #[inline]
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// With a caller-owned cancellation token
    #[inline]
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Cancellation signal of this request
    #[inline]
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Check if the caller gave up on this request
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
