//! Collection, global and app configuration
//!
//! [`AppConfig`] is what authors write (or load from JSON/YAML).
//! [`AppConfig::sanitize`] validates it and produces a [`SanitizedConfig`],
//! the only form the traversal engine accepts.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockLibrary};
use crate::error::SchemaError;
use crate::field::{Field, FieldKind, FieldRef, HookSlot};
use crate::path::SchemaPath;

/// Hook attached to `unique` leaves that declare no duplicate hook of their own
pub const DEFAULT_DUPLICATE_HOOK: &str = "appendCopySuffix";

/// A locale, written either as a bare code or as `{ code, label }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LocaleDef")]
pub struct Locale {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LocaleDef {
    Code(String),
    Detailed { code: String, label: Option<String> },
}

impl From<LocaleDef> for Locale {
    fn from(def: LocaleDef) -> Self {
        match def {
            LocaleDef::Code(code) => Self { code, label: None },
            LocaleDef::Detailed { code, label } => Self { code, label },
        }
    }
}

/// Locales the application stores content in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizationConfig {
    /// Locales in configured order
    pub locales: Vec<Locale>,
    pub default_locale: String,
    /// Whether reads fall back to the default locale
    #[serde(default)]
    pub fallback: bool,
}

impl LocalizationConfig {
    /// Create from locale codes; the first code is the default
    #[must_use]
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let locales: Vec<Locale> = codes
            .into_iter()
            .map(|code| Locale {
                code: code.into(),
                label: None,
            })
            .collect();
        let default_locale = locales.first().map(|l| l.code.clone()).unwrap_or_default();
        Self {
            locales,
            default_locale,
            fallback: false,
        }
    }

    /// Locale codes in configured order
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.locales.iter().map(|l| l.code.as_str())
    }

    /// Check if a code is configured
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes().any(|c| c == code)
    }
}

/// Author-defined collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub slug: String,
    pub fields: Vec<Field>,
}

impl CollectionConfig {
    #[must_use]
    pub fn new(slug: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            slug: slug.into(),
            fields,
        }
    }
}

/// Author-defined singleton document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub slug: String,
    pub fields: Vec<Field>,
}

/// Everything the engine needs to know about an application's schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localization: Option<LocalizationConfig>,
    /// Reusable blocks referenced by slug
    #[serde(default)]
    pub blocks: Vec<Arc<Block>>,
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
    #[serde(default)]
    pub globals: Vec<GlobalConfig>,
}

impl AppConfig {
    /// Create empty configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With localization
    #[inline]
    #[must_use]
    pub fn with_localization(mut self, localization: LocalizationConfig) -> Self {
        self.localization = Some(localization);
        self
    }

    /// With a library block
    #[inline]
    #[must_use]
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(Arc::new(block));
        self
    }

    /// With a collection
    #[inline]
    #[must_use]
    pub fn with_collection(mut self, collection: CollectionConfig) -> Self {
        self.collections.push(collection);
        self
    }

    /// With a global
    #[inline]
    #[must_use]
    pub fn with_global(mut self, slug: impl Into<String>, fields: Vec<Field>) -> Self {
        self.globals.push(GlobalConfig {
            slug: slug.into(),
            fields,
        });
        self
    }

    /// Validate and normalize the configuration
    ///
    /// # Errors
    /// Returns the first [`SchemaError`] found; nothing is partially applied.
    pub fn sanitize(self) -> Result<SanitizedConfig, SchemaError> {
        let AppConfig {
            localization,
            blocks,
            collections,
            globals,
        } = self;

        if let Some(localization) = &localization {
            sanitize_localization(localization)?;
        }

        let mut collection_slugs = HashSet::new();
        for collection in &collections {
            if !collection_slugs.insert(collection.slug.clone()) {
                return Err(SchemaError::DuplicateCollection(collection.slug.clone()));
            }
        }

        let mut block_slugs = HashSet::new();
        for block in &blocks {
            if !block_slugs.insert(block.slug.clone()) {
                return Err(SchemaError::DuplicateBlock {
                    location: "blocks".to_string(),
                    slug: block.slug.clone(),
                });
            }
        }

        let mut sanitizer = Sanitizer {
            collections: &collection_slugs,
            library: &block_slugs,
            shared: HashMap::new(),
        };

        let mut library = BlockLibrary::new();
        for mut block in blocks {
            let scope = format!("blocks.{}", block.slug);
            sanitizer.block(&mut block, &scope, &SchemaPath::root())?;
            library.insert(block);
        }

        let mut sanitized_collections = IndexMap::new();
        for mut collection in collections {
            let scope = format!("collections.{}", collection.slug);
            sanitizer.fields(
                &mut collection.fields,
                &scope,
                &SchemaPath::root(),
                &mut HashSet::new(),
            )?;
            sanitized_collections.insert(
                collection.slug.clone(),
                SanitizedCollection {
                    slug: collection.slug,
                    fields: collection.fields,
                },
            );
        }

        let mut sanitized_globals = IndexMap::new();
        for mut global in globals {
            if sanitized_globals.contains_key(&global.slug) {
                return Err(SchemaError::DuplicateGlobal(global.slug));
            }
            let scope = format!("globals.{}", global.slug);
            sanitizer.fields(&mut global.fields, &scope, &SchemaPath::root(), &mut HashSet::new())?;
            sanitized_globals.insert(
                global.slug.clone(),
                SanitizedGlobal {
                    slug: global.slug,
                    fields: global.fields,
                },
            );
        }

        tracing::debug!(
            "Sanitized config: {} collections, {} globals, {} library blocks",
            sanitized_collections.len(),
            sanitized_globals.len(),
            library.len()
        );

        Ok(SanitizedConfig {
            localization,
            blocks: library,
            collections: sanitized_collections,
            globals: sanitized_globals,
        })
    }
}

/// Validated collection, ready for traversal
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedCollection {
    slug: String,
    fields: Vec<Field>,
}

impl SanitizedCollection {
    #[inline]
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// Validated global, ready for traversal
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedGlobal {
    slug: String,
    fields: Vec<Field>,
}

impl SanitizedGlobal {
    #[inline]
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// Output of [`AppConfig::sanitize`]
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedConfig {
    localization: Option<LocalizationConfig>,
    blocks: BlockLibrary,
    collections: IndexMap<String, SanitizedCollection>,
    globals: IndexMap<String, SanitizedGlobal>,
}

impl SanitizedConfig {
    /// Localization settings, if localization is enabled
    #[inline]
    #[must_use]
    pub fn localization(&self) -> Option<&LocalizationConfig> {
        self.localization.as_ref()
    }

    /// Reusable block library
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &BlockLibrary {
        &self.blocks
    }

    /// Look up a collection by slug
    #[inline]
    #[must_use]
    pub fn collection(&self, slug: &str) -> Option<&SanitizedCollection> {
        self.collections.get(slug)
    }

    /// Look up a global by slug
    #[inline]
    #[must_use]
    pub fn global(&self, slug: &str) -> Option<&SanitizedGlobal> {
        self.globals.get(slug)
    }

    /// Iterate collections in configured order
    pub fn collections(&self) -> impl Iterator<Item = &SanitizedCollection> {
        self.collections.values()
    }

    /// Every hook name referenced anywhere, with where it was first seen
    #[must_use]
    pub fn hook_references(&self) -> Vec<(String, String)> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        let mut record = |location: String, field: FieldRef<'_>| {
            for hook in field.hooks().names() {
                if seen.insert(hook.to_string()) {
                    out.push((hook.to_string(), location.clone()));
                }
            }
        };

        let root = SchemaPath::root();
        for block in self.blocks.iter() {
            visit_fields(&block.fields, &format!("blocks.{}", block.slug), &root, &mut record);
        }
        for collection in self.collections.values() {
            let scope = format!("collections.{}", collection.slug);
            visit_fields(&collection.fields, &scope, &root, &mut record);
        }
        for global in self.globals.values() {
            let scope = format!("globals.{}", global.slug);
            visit_fields(&global.fields, &scope, &root, &mut record);
        }
        out
    }
}

fn visit_fields<F>(fields: &[Field], scope: &str, at: &SchemaPath, f: &mut F)
where
    F: FnMut(String, FieldRef<'_>),
{
    for field in fields {
        let here = match field.name() {
            Some(name) if field.affects_data() => at.child(name),
            _ => at.clone(),
        };
        f(location(scope, &here), FieldRef::Field(field));
        match &field.kind {
            FieldKind::Tabs(tabs) => {
                for tab in &tabs.tabs {
                    let tab_at = match &tab.name {
                        Some(name) => at.child(name.clone()),
                        None => at.clone(),
                    };
                    f(location(scope, &tab_at), FieldRef::Tab(tab));
                    visit_fields(&tab.fields, scope, &tab_at, f);
                }
            }
            FieldKind::Blocks(blocks) => {
                for block in &blocks.blocks {
                    visit_fields(&block.fields, scope, &here.child(block.slug.clone()), f);
                }
            }
            _ => {
                if let Some(children) = field.sub_fields() {
                    visit_fields(children, scope, &here, f);
                }
            }
        }
    }
}

fn sanitize_localization(localization: &LocalizationConfig) -> Result<(), SchemaError> {
    if localization.locales.is_empty() {
        return Err(SchemaError::NoLocales);
    }
    let mut codes = HashSet::new();
    for code in localization.codes() {
        if !codes.insert(code) {
            return Err(SchemaError::DuplicateLocale(code.to_string()));
        }
    }
    if !localization.contains(&localization.default_locale) {
        return Err(SchemaError::UnknownDefaultLocale(
            localization.default_locale.clone(),
        ));
    }
    Ok(())
}

struct Sanitizer<'a> {
    collections: &'a HashSet<String>,
    library: &'a HashSet<String>,
    /// Blocks already sanitized, keyed by the caller's allocation. The
    /// caller's `Arc` is kept so its address cannot be reused.
    shared: HashMap<*const Block, (Arc<Block>, Arc<Block>)>,
}

impl Sanitizer<'_> {
    /// Sanitize one data level; `names` collects keys already used at this level
    fn fields(
        &mut self,
        fields: &mut [Field],
        scope: &str,
        at: &SchemaPath,
        names: &mut HashSet<String>,
    ) -> Result<(), SchemaError> {
        for field in fields.iter_mut() {
            self.field(field, scope, at, names)?;
        }
        Ok(())
    }

    fn field(
        &mut self,
        field: &mut Field,
        scope: &str,
        at: &SchemaPath,
        names: &mut HashSet<String>,
    ) -> Result<(), SchemaError> {
        let location = location(scope, at);

        match &mut field.kind {
            FieldKind::Ui => return Ok(()),
            FieldKind::Row(row) | FieldKind::Collapsible(row) => {
                if let Some(name) = field.name.take() {
                    tracing::warn!("{location}: ignoring name '{name}' on presentational field");
                }
                return self.fields(&mut row.fields, scope, at, names);
            }
            FieldKind::Tabs(tabs) => {
                for tab in &mut tabs.tabs {
                    match &tab.name {
                        Some(name) => {
                            claim_name(names, name, &location)?;
                            let inner = at.child(name.clone());
                            self.fields(&mut tab.fields, scope, &inner, &mut HashSet::new())?;
                        }
                        None => self.fields(&mut tab.fields, scope, at, names)?,
                    }
                }
                return Ok(());
            }
            FieldKind::Group(group) if field.name.is_none() => {
                return self.fields(&mut group.fields, scope, at, names);
            }
            _ => {}
        }

        let type_name = field.kind.type_name();
        let Some(name) = field.name.clone() else {
            return Err(SchemaError::missing_name(location, type_name));
        };
        claim_name(names, &name, &location)?;
        let inner = at.child(name.clone());
        let inner_location = self::location(scope, &inner);

        match &mut field.kind {
            FieldKind::Group(group) => {
                self.fields(&mut group.fields, scope, &inner, &mut HashSet::new())?;
            }
            FieldKind::Array(array) => {
                self.fields(&mut array.fields, scope, &inner, &mut HashSet::new())?;
            }
            FieldKind::Blocks(blocks) => {
                let mut slugs = HashSet::new();
                for block in &mut blocks.blocks {
                    if !slugs.insert(block.slug.clone()) {
                        return Err(SchemaError::DuplicateBlock {
                            location: inner_location,
                            slug: block.slug.clone(),
                        });
                    }
                    let block_at = inner.child(block.slug.clone());
                    self.block(block, scope, &block_at)?;
                }
                for slug in &blocks.block_references {
                    if !slugs.insert(slug.clone()) {
                        return Err(SchemaError::DuplicateBlock {
                            location: inner_location,
                            slug: slug.clone(),
                        });
                    }
                    if !self.library.contains(slug) {
                        return Err(SchemaError::UnknownBlockReference {
                            location: inner_location,
                            slug: slug.clone(),
                        });
                    }
                }
            }
            FieldKind::Relationship(rel) | FieldKind::Upload(rel) => {
                for slug in rel.relation_to.slugs() {
                    self.require_collection(slug, &inner_location)?;
                }
            }
            FieldKind::Join(join) => {
                self.require_collection(&join.collection, &inner_location)?;
            }
            kind if kind.is_leaf() => {
                if field.unique && !field.hooks.has(HookSlot::BeforeDuplicate) {
                    tracing::debug!("{inner_location}: attaching default duplicate hook");
                    field
                        .hooks
                        .push(HookSlot::BeforeDuplicate, DEFAULT_DUPLICATE_HOOK);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Sanitize a block once, however many fields share it
    ///
    /// Every holder of the same `Arc` ends up with the same sanitized `Arc`;
    /// a block that needs no normalization keeps its original allocation.
    fn block(
        &mut self,
        block: &mut Arc<Block>,
        scope: &str,
        at: &SchemaPath,
    ) -> Result<(), SchemaError> {
        let key = Arc::as_ptr(block);
        if let Some((_, sanitized)) = self.shared.get(&key) {
            *block = Arc::clone(sanitized);
            return Ok(());
        }

        let mut inner = Block::clone(block);
        self.fields(&mut inner.fields, scope, at, &mut HashSet::new())?;
        let sanitized = if inner == **block {
            Arc::clone(block)
        } else {
            Arc::new(inner)
        };
        self.shared
            .insert(key, (Arc::clone(block), Arc::clone(&sanitized)));
        *block = sanitized;
        Ok(())
    }

    fn require_collection(&self, slug: &str, location: &str) -> Result<(), SchemaError> {
        if self.collections.contains(slug) {
            Ok(())
        } else {
            Err(SchemaError::UnknownCollection {
                location: location.to_string(),
                slug: slug.to_string(),
            })
        }
    }
}

fn claim_name(names: &mut HashSet<String>, name: &str, location: &str) -> Result<(), SchemaError> {
    if name.is_empty() || name.contains('.') {
        return Err(SchemaError::InvalidName {
            location: location.to_string(),
            name: name.to_string(),
        });
    }
    if !names.insert(name.to_string()) {
        return Err(SchemaError::duplicate_field(location, name));
    }
    Ok(())
}

fn location(scope: &str, at: &SchemaPath) -> String {
    if at.is_empty() {
        scope.to_string()
    } else {
        format!("{scope}.{at}")
    }
}
