//! Field configuration model
//!
//! A [`Field`] is one node of the author-defined schema tree. The variant set is
//! a closed sum type ([`FieldKind`]) so every consumer matches it exhaustively.
//!
//! Configuration is plain data: hooks are referenced by registered name, block
//! definitions are shared through [`Arc`] and may also be referenced by slug
//! from the app-level block library.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::block::Block;

/// Named lifecycle slot a hook can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookSlot {
    /// Runs before incoming data is validated
    BeforeValidate,
    /// Runs before a document is written
    BeforeChange,
    /// Runs after a document is written
    AfterChange,
    /// Runs when a document is read
    AfterRead,
    /// Runs on a copy of a document that is about to be duplicated
    BeforeDuplicate,
}

impl HookSlot {
    /// Every slot, in lifecycle order
    pub const ALL: [HookSlot; 5] = [
        HookSlot::BeforeValidate,
        HookSlot::BeforeChange,
        HookSlot::AfterChange,
        HookSlot::AfterRead,
        HookSlot::BeforeDuplicate,
    ];

    /// Configuration key of this slot
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeValidate => "beforeValidate",
            Self::BeforeChange => "beforeChange",
            Self::AfterChange => "afterChange",
            Self::AfterRead => "afterRead",
            Self::BeforeDuplicate => "beforeDuplicate",
        }
    }
}

impl Display for HookSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hook names declared on a field, per slot, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldHooks(BTreeMap<HookSlot, Vec<String>>);

impl FieldHooks {
    /// No hooks
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks declared for a slot (empty if none)
    #[inline]
    #[must_use]
    pub fn get(&self, slot: HookSlot) -> &[String] {
        self.0.get(&slot).map_or(&[], Vec::as_slice)
    }

    /// Check if any hook is declared for a slot
    #[inline]
    #[must_use]
    pub fn has(&self, slot: HookSlot) -> bool {
        !self.get(slot).is_empty()
    }

    /// Append a hook to a slot's chain
    pub fn push(&mut self, slot: HookSlot, name: impl Into<String>) {
        self.0.entry(slot).or_default().push(name.into());
    }

    /// Check if no hooks are declared at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Iterate over every declared hook name
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.values().flatten().map(String::as_str)
    }
}

/// One field of a collection, global, block or composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Key under which the value is stored; absent for presentational wrappers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether the stored value is keyed by locale
    #[serde(default, skip_serializing_if = "is_false")]
    pub localized: bool,

    /// Whether values must be unique across documents
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,

    /// Registered hook names per slot
    #[serde(default, skip_serializing_if = "FieldHooks::is_empty")]
    pub hooks: FieldHooks,

    /// Variant and variant-specific settings
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// Field variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    Code,
    Number,
    Checkbox,
    Date,
    Select,
    Radio,
    Point,
    Json,
    RichText,
    Relationship(RelationshipField),
    Upload(RelationshipField),
    Join(JoinField),
    Group(GroupField),
    Array(ArrayField),
    Blocks(BlocksField),
    Tabs(TabsField),
    Row(RowField),
    Collapsible(RowField),
    Ui,
}

impl FieldKind {
    /// Configuration tag of this variant
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Email => "email",
            Self::Code => "code",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Point => "point",
            Self::Json => "json",
            Self::RichText => "richText",
            Self::Relationship(_) => "relationship",
            Self::Upload(_) => "upload",
            Self::Join(_) => "join",
            Self::Group(_) => "group",
            Self::Array(_) => "array",
            Self::Blocks(_) => "blocks",
            Self::Tabs(_) => "tabs",
            Self::Row(_) => "row",
            Self::Collapsible(_) => "collapsible",
            Self::Ui => "ui",
        }
    }

    /// Check if this variant stores a single value with no nested schema
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        !matches!(
            self,
            Self::Group(_)
                | Self::Array(_)
                | Self::Blocks(_)
                | Self::Tabs(_)
                | Self::Row(_)
                | Self::Collapsible(_)
                | Self::Ui
        )
    }
}

/// Target collection(s) of a relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationTo {
    One(String),
    Many(Vec<String>),
}

impl RelationTo {
    /// Iterate over target collection slugs
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(slug) => std::slice::from_ref(slug),
            Self::Many(slugs) => slugs,
        };
        slice.iter().map(String::as_str)
    }
}

/// Relationship / upload settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipField {
    pub relation_to: RelationTo,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_many: bool,
}

/// Virtual reverse-relationship settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinField {
    /// Collection holding the relationship
    pub collection: String,
    /// Relationship field on that collection pointing back here
    pub on: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupField {
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayField {
    pub fields: Vec<Field>,
}

/// Polymorphic rows, each tagged with a block slug
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlocksField {
    /// Blocks defined in place
    #[serde(default)]
    pub blocks: Vec<Arc<Block>>,
    /// Slugs of blocks from the app-level library
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_references: Vec<String>,
}

impl BlocksField {
    /// Find an inline block by slug
    #[must_use]
    pub fn inline(&self, slug: &str) -> Option<&Arc<Block>> {
        self.blocks.iter().find(|b| b.slug == slug)
    }

    /// Check if a slug is referenced from the library
    #[must_use]
    pub fn references(&self, slug: &str) -> bool {
        self.block_references.iter().any(|s| s == slug)
    }

    /// Every slug this field accepts, inline first
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .map(|b| b.slug.as_str())
            .chain(self.block_references.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabsField {
    pub tabs: Vec<Tab>,
}

/// Presentational container (`row`, `collapsible`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowField {
    pub fields: Vec<Field>,
}

/// One tab of a tabs field
///
/// A named tab stores its fields under its own key, exactly like a group.
/// An unnamed tab is purely presentational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub localized: bool,
    #[serde(default, skip_serializing_if = "FieldHooks::is_empty")]
    pub hooks: FieldHooks,
    pub fields: Vec<Field>,
}

impl Tab {
    /// Tab storing its fields under `name`
    #[must_use]
    pub fn named(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: Some(name.into()),
            localized: false,
            hooks: FieldHooks::new(),
            fields,
        }
    }

    /// Presentational tab
    #[must_use]
    pub fn unnamed(fields: Vec<Field>) -> Self {
        Self {
            name: None,
            localized: false,
            hooks: FieldHooks::new(),
            fields,
        }
    }

    /// Mark as localized
    #[must_use]
    pub fn localized(mut self) -> Self {
        self.localized = true;
        self
    }

    /// Register a hook
    #[must_use]
    pub fn with_hook(mut self, slot: HookSlot, name: impl Into<String>) -> Self {
        self.hooks.push(slot, name);
        self
    }
}

impl Field {
    /// Create field from name and kind
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: Some(name.into()),
            localized: false,
            unique: false,
            hooks: FieldHooks::new(),
            kind,
        }
    }

    /// Create a field with no name (wrapper or presentational group)
    #[must_use]
    pub fn anonymous(kind: FieldKind) -> Self {
        Self {
            name: None,
            localized: false,
            unique: false,
            hooks: FieldHooks::new(),
            kind,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Checkbox)
    }

    pub fn relationship(name: impl Into<String>, relation_to: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::Relationship(RelationshipField {
                relation_to: RelationTo::One(relation_to.into()),
                has_many: false,
            }),
        )
    }

    pub fn join(
        name: impl Into<String>,
        collection: impl Into<String>,
        on: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            FieldKind::Join(JoinField {
                collection: collection.into(),
                on: on.into(),
            }),
        )
    }

    pub fn group(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self::new(name, FieldKind::Group(GroupField { fields }))
    }

    pub fn array(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self::new(name, FieldKind::Array(ArrayField { fields }))
    }

    pub fn blocks(name: impl Into<String>, blocks: Vec<Arc<Block>>) -> Self {
        Self::new(
            name,
            FieldKind::Blocks(BlocksField {
                blocks,
                block_references: Vec::new(),
            }),
        )
    }

    pub fn tabs(tabs: Vec<Tab>) -> Self {
        Self::anonymous(FieldKind::Tabs(TabsField { tabs }))
    }

    pub fn row(fields: Vec<Field>) -> Self {
        Self::anonymous(FieldKind::Row(RowField { fields }))
    }

    pub fn collapsible(fields: Vec<Field>) -> Self {
        Self::anonymous(FieldKind::Collapsible(RowField { fields }))
    }

    /// Mark as localized
    #[must_use]
    pub fn localized(mut self) -> Self {
        self.localized = true;
        self
    }

    /// Mark as unique
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Register a hook
    #[must_use]
    pub fn with_hook(mut self, slot: HookSlot, name: impl Into<String>) -> Self {
        self.hooks.push(slot, name);
        self
    }

    /// Add library block references to a blocks field; no-op for other kinds
    #[must_use]
    pub fn with_block_references<I, S>(mut self, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let FieldKind::Blocks(blocks) = &mut self.kind {
            blocks.block_references.extend(slugs.into_iter().map(Into::into));
        }
        self
    }

    /// Stored name, if any
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Check if this field stores a value under its own key
    #[must_use]
    pub fn affects_data(&self) -> bool {
        match &self.kind {
            FieldKind::Tabs(_) | FieldKind::Row(_) | FieldKind::Collapsible(_) | FieldKind::Ui => {
                false
            }
            _ => self.name.is_some(),
        }
    }

    /// Child field sequence of a group, array, row or collapsible
    #[must_use]
    pub fn sub_fields(&self) -> Option<&[Field]> {
        match &self.kind {
            FieldKind::Group(g) => Some(&g.fields),
            FieldKind::Array(a) => Some(&a.fields),
            FieldKind::Row(r) | FieldKind::Collapsible(r) => Some(&r.fields),
            _ => None,
        }
    }
}

/// Borrowed view of anything hooks can be attached to
///
/// Named tabs carry data and hooks like fields do, without being a [`Field`].
#[derive(Debug, Clone, Copy)]
pub enum FieldRef<'a> {
    Field(&'a Field),
    Tab(&'a Tab),
}

impl<'a> FieldRef<'a> {
    #[must_use]
    pub fn name(&self) -> Option<&'a str> {
        match self {
            Self::Field(f) => f.name.as_deref(),
            Self::Tab(t) => t.name.as_deref(),
        }
    }

    #[must_use]
    pub fn localized(&self) -> bool {
        match self {
            Self::Field(f) => f.localized,
            Self::Tab(t) => t.localized,
        }
    }

    #[must_use]
    pub fn hooks(&self) -> &'a FieldHooks {
        match self {
            Self::Field(f) => &f.hooks,
            Self::Tab(t) => &t.hooks,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Field(f) => f.kind.type_name(),
            Self::Tab(_) => "tab",
        }
    }

    /// Underlying field, if this is not a tab
    #[must_use]
    pub fn as_field(&self) -> Option<&'a Field> {
        match self {
            Self::Field(f) => Some(f),
            Self::Tab(_) => None,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}
