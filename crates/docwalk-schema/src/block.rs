//! Block definitions and the shared block library

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::field::Field;

/// Key holding the block slug in every stored block row
pub const BLOCK_TYPE_KEY: &str = "blockType";

/// One member of a polymorphic blocks field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Discriminator value stored under [`BLOCK_TYPE_KEY`]
    pub slug: String,
    /// Fields of a row of this block type
    pub fields: Vec<Field>,
}

impl Block {
    #[must_use]
    pub fn new(slug: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            slug: slug.into(),
            fields,
        }
    }
}

/// App-level reusable blocks, referenced by slug from blocks fields
///
/// Definitions are shared, never copied: every reference resolves to the same
/// [`Arc`]. A block may reference itself (directly or through other blocks);
/// traversal depth limits are what stop runaway documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockLibrary {
    blocks: IndexMap<String, Arc<Block>>,
}

impl BlockLibrary {
    /// Create empty library
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a block, returning the previous definition with that slug
    pub fn insert(&mut self, block: Arc<Block>) -> Option<Arc<Block>> {
        self.blocks.insert(block.slug.clone(), block)
    }

    /// Look up a block by slug
    #[inline]
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&Arc<Block>> {
        self.blocks.get(slug)
    }

    /// Check if a slug is defined
    #[inline]
    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.blocks.contains_key(slug)
    }

    /// Number of blocks
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if library is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate blocks in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Block>> {
        self.blocks.values()
    }
}
