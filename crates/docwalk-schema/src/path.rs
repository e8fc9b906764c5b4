//! Data and schema paths
//!
//! A traversal tracks two coordinates at once:
//! - [`DataPath`]: field names *and* array indices, locating a value in a document
//! - [`SchemaPath`]: field names only, locating a field definition in the schema
//!
//! [`FieldPath`] bundles both and only grows through [`FieldPath::append`] and
//! [`FieldPath::append_index`], so the schema path can never pick up an index.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One step of a [`DataPath`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// Named field
    Field(String),
    /// Row position inside an array or blocks value
    Index(usize),
}

impl PathSegment {
    /// Field name, if this is a field segment
    #[inline]
    #[must_use]
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name),
            Self::Index(_) => None,
        }
    }

    /// Row index, if this is an index segment
    #[inline]
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Field(_) => None,
            Self::Index(i) => Some(*i),
        }
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Location of a value inside a document
///
/// # Examples
/// - `["title"]` → `title`
/// - `["items", 2, "label"]` → `items.2.label`
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataPath(Vec<PathSegment>);

impl DataPath {
    /// Empty path (document root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Get last segment (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Append a field segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(PathSegment::Field(name.into()));
        new
    }

    /// Append an index segment, returning new path
    #[inline]
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut new = self.clone();
        new.0.push(PathSegment::Index(index));
        new
    }

    /// Check if this path is a prefix of another
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        self.0 == other.0[..self.0.len()]
    }

    /// Schema path obtained by dropping every index segment
    #[must_use]
    pub fn to_schema_path(&self) -> SchemaPath {
        SchemaPath(
            self.0
                .iter()
                .filter_map(|seg| seg.as_field().map(str::to_string))
                .collect(),
        )
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PathSegment> {
        self.0.iter()
    }
}

impl Display for DataPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

impl FromStr for DataPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments = s
            .split('.')
            .map(|seg| {
                validate_segment(seg)?;
                Ok(match seg.parse::<usize>() {
                    Ok(i) => PathSegment::Index(i),
                    Err(_) => PathSegment::Field(seg.to_string()),
                })
            })
            .collect::<Result<_, PathError>>()?;

        Ok(Self(segments))
    }
}

/// Location of a field definition inside a schema
///
/// Shared by every row of an array or blocks field: `items.label` addresses
/// the `label` definition regardless of which row is being visited.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaPath(Vec<String>);

impl SchemaPath {
    /// Empty path (schema root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get last segment (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(name.into());
        new
    }

    /// Join segments with custom separator
    #[inline]
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for SchemaPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for SchemaPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments = s
            .split('.')
            .map(|seg| {
                validate_segment(seg)?;
                if seg.parse::<usize>().is_ok() {
                    return Err(PathError::IndexInSchemaPath(seg.to_string()));
                }
                Ok(seg.to_string())
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

/// Paired data and schema coordinates of the field under traversal
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    data: DataPath,
    schema: SchemaPath,
}

impl FieldPath {
    /// Both paths at the root
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Descend into a named field; extends both paths
    #[inline]
    #[must_use]
    pub fn append(&self, name: &str) -> Self {
        Self {
            data: self.data.child(name),
            schema: self.schema.child(name),
        }
    }

    /// Descend into a row; extends the data path only
    #[inline]
    #[must_use]
    pub fn append_index(&self, index: usize) -> Self {
        Self {
            data: self.data.index(index),
            schema: self.schema.clone(),
        }
    }

    /// Data path
    #[inline]
    #[must_use]
    pub fn data(&self) -> &DataPath {
        &self.data
    }

    /// Schema path
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &SchemaPath {
        &self.schema
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.data, self.schema)
    }
}

fn validate_segment(seg: &str) -> Result<(), PathError> {
    if seg.is_empty() {
        Err(PathError::EmptySegment)
    } else if seg.contains(|c: char| !c.is_alphanumeric() && c != '_' && c != '-') {
        Err(PathError::InvalidSegment(seg.to_string()))
    } else {
        Ok(())
    }
}

/// Errors related to paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Invalid segment characters
    #[error("invalid segment: {0} (must be alphanumeric, '-' or '_')")]
    InvalidSegment(String),

    /// Array index in a schema path
    #[error("schema path cannot contain index segment: {0}")]
    IndexInSchemaPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn append_extends_both_paths() {
        let path = FieldPath::root().append("meta").append("title");
        assert_eq!(path.data().to_string(), "meta.title");
        assert_eq!(path.schema().to_string(), "meta.title");
    }

    #[test]
    fn append_index_extends_data_only() {
        let path = FieldPath::root().append("items").append_index(3).append("label");
        assert_eq!(path.data().to_string(), "items.3.label");
        assert_eq!(path.schema().to_string(), "items.label");
    }

    #[test]
    fn rows_share_schema_path() {
        let items = FieldPath::root().append("items");
        let first = items.append_index(0).append("label");
        let second = items.append_index(1).append("label");
        assert_ne!(first.data(), second.data());
        assert_eq!(first.schema(), second.schema());
    }

    #[test]
    fn data_path_parent_and_last() {
        let path: DataPath = "items.2.label".parse().unwrap();
        assert_eq!(path.last(), Some(&PathSegment::Field("label".into())));
        let parent = path.parent().unwrap();
        assert_eq!(parent.last(), Some(&PathSegment::Index(2)));
        assert!(DataPath::root().parent().is_none());
    }

    #[test]
    fn data_path_is_prefix_of() {
        let a: DataPath = "items.0".parse().unwrap();
        let b: DataPath = "items.0.label".parse().unwrap();
        assert!(a.is_prefix_of(&b));
        assert!(!b.is_prefix_of(&a));
    }

    #[test]
    fn data_path_to_schema_path() {
        let path: DataPath = "layout.4.columns.1.text".parse().unwrap();
        assert_eq!(path.to_schema_path().join("/"), "layout/columns/text");
    }

    #[test]
    fn data_path_from_str_errors() {
        assert!(matches!("a..b".parse::<DataPath>(), Err(PathError::EmptySegment)));
        assert!(matches!(
            "a.b c".parse::<DataPath>(),
            Err(PathError::InvalidSegment(_))
        ));
        assert!("".parse::<DataPath>().unwrap().is_empty());
    }

    #[test]
    fn schema_path_rejects_index() {
        let result = "items.0.label".parse::<SchemaPath>();
        assert_eq!(result, Err(PathError::IndexInSchemaPath("0".into())));
    }

    #[derive(Debug, Clone)]
    enum Step {
        Field(String),
        Index(usize),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            "[a-z][a-z_]{0,6}".prop_map(Step::Field),
            (0usize..50).prop_map(Step::Index),
        ]
    }

    proptest! {
        #[test]
        fn schema_path_never_longer_than_data_path(steps in prop::collection::vec(step(), 0..24)) {
            let mut path = FieldPath::root();
            for s in &steps {
                path = match s {
                    Step::Field(name) => path.append(name),
                    Step::Index(i) => path.append_index(*i),
                };
                prop_assert!(path.schema().len() <= path.data().len());
            }
            prop_assert_eq!(path.data().to_schema_path(), path.schema().clone());
        }
    }
}
