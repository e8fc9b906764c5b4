//! Traversal settings

use serde::{Deserialize, Serialize};

/// Default bound on nested data levels
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How rows of one array or blocks field are processed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowMode {
    /// One row after another, in order
    #[default]
    Sequential,
    /// All rows of a field at once; the first failure aborts the rest
    Concurrent,
}

/// Engine-wide traversal settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TraversalSettings {
    /// Maximum number of nested data levels below the document root
    pub max_depth: usize,
    pub row_mode: RowMode,
}

impl TraversalSettings {
    /// Create default settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With max depth
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// With row mode
    #[inline]
    #[must_use]
    pub fn with_row_mode(mut self, row_mode: RowMode) -> Self {
        self.row_mode = row_mode;
        self
    }
}

impl Default for TraversalSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            row_mode: RowMode::Sequential,
        }
    }
}
