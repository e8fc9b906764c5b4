//! Recursive walk of field configuration alongside a document
//!
//! Every named field is visited in configured order: its value is split by
//! locale, each locale's value goes through the hook chain, and the result is
//! descended into according to the field's variant before being written back.
//! Presentational wrappers (`row`, `collapsible`, unnamed tabs and unnamed
//! groups) share their parent's data level.

use docwalk_schema::{
    BlockLibrary, BlocksField, DataPath, Document, Field, FieldKind, FieldPath, FieldRef,
    BLOCK_TYPE_KEY,
};
use futures::future::{try_join_all, BoxFuture};
use serde_json::Value;

use crate::config::{RowMode, TraversalSettings};
use crate::dispatch::Dispatcher;
use crate::error::{TraversalConfigurationError, TraversalError};
use crate::locale::LocaleValues;

#[derive(Debug, Clone, Copy)]
struct Level<'l> {
    /// Data levels below the document root
    depth: usize,
    /// An ancestor already split its value by locale
    parent_localized: bool,
    /// Locale branch inherited from that ancestor
    locale: Option<&'l str>,
}

/// What lives under a named field's key
#[derive(Debug, Clone, Copy)]
enum Shape<'a> {
    Leaf,
    Group(&'a [Field]),
    Rows(Rows<'a>),
}

#[derive(Debug, Clone, Copy)]
enum Rows<'a> {
    Array(&'a [Field]),
    Blocks(&'a BlocksField),
}

pub(crate) struct Walker<'a> {
    dispatcher: Dispatcher<'a>,
    library: &'a BlockLibrary,
    locales: Vec<&'a str>,
    settings: &'a TraversalSettings,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(
        dispatcher: Dispatcher<'a>,
        library: &'a BlockLibrary,
        locales: Vec<&'a str>,
        settings: &'a TraversalSettings,
    ) -> Self {
        Self {
            dispatcher,
            library,
            locales,
            settings,
        }
    }

    /// Walk `fields` over a whole document
    pub(crate) async fn walk(
        &self,
        fields: &'a [Field],
        doc: &mut Document,
    ) -> Result<(), TraversalError> {
        let root = Level {
            depth: 0,
            parent_localized: false,
            locale: None,
        };
        let path = FieldPath::root();
        self.walk_fields(fields, doc, &path, root).await?;
        Ok(())
    }

    fn walk_fields<'s>(
        &'s self,
        fields: &'a [Field],
        slice: &'s mut Document,
        at: &'s FieldPath,
        level: Level<'s>,
    ) -> BoxFuture<'s, Result<(), TraversalError>> {
        Box::pin(async move {
            if level.depth > self.settings.max_depth {
                return Err(TraversalConfigurationError::MaxDepthExceeded {
                    path: at.data().clone(),
                    max_depth: self.settings.max_depth,
                }
                .into());
            }

            tracing::trace!("Walking {} fields at '{}'", fields.len(), at.data());
            for field in fields {
                self.visit(field, slice, at, level).await?;
            }
            Ok(())
        })
    }

    async fn visit(
        &self,
        field: &'a Field,
        slice: &mut Document,
        at: &FieldPath,
        level: Level<'_>,
    ) -> Result<(), TraversalError> {
        let shape = match &field.kind {
            FieldKind::Ui => return Ok(()),
            FieldKind::Row(row) | FieldKind::Collapsible(row) => {
                return self.walk_fields(&row.fields, slice, at, level).await;
            }
            FieldKind::Tabs(tabs) => {
                for tab in &tabs.tabs {
                    match tab.name.as_deref() {
                        Some(name) => {
                            let node = FieldRef::Tab(tab);
                            let shape = Shape::Group(&tab.fields);
                            self.visit_named(node, name, shape, slice, at, level).await?;
                        }
                        None => self.walk_fields(&tab.fields, slice, at, level).await?,
                    }
                }
                return Ok(());
            }
            FieldKind::Group(group) if field.name.is_none() => {
                return self.walk_fields(&group.fields, slice, at, level).await;
            }
            FieldKind::Group(group) => Shape::Group(&group.fields),
            FieldKind::Array(array) => Shape::Rows(Rows::Array(&array.fields)),
            FieldKind::Blocks(blocks) => Shape::Rows(Rows::Blocks(blocks)),
            _ => Shape::Leaf,
        };

        let Some(name) = field.name() else {
            return Err(TraversalConfigurationError::MissingFieldName {
                path: at.data().clone(),
                field_type: field.kind.type_name(),
            }
            .into());
        };
        self.visit_named(FieldRef::Field(field), name, shape, slice, at, level)
            .await
    }

    async fn visit_named(
        &self,
        node: FieldRef<'a>,
        name: &'a str,
        shape: Shape<'a>,
        slice: &mut Document,
        at: &FieldPath,
        level: Level<'_>,
    ) -> Result<(), TraversalError> {
        let path = at.append(name);

        // Hooks see the untouched value in their sibling document
        let raw = if node.hooks().has(self.dispatcher.slot) {
            slice.get(name).cloned()
        } else {
            slice.get_mut(name).map(Value::take)
        };

        let localized = node.localized() && !level.parent_localized;
        let mut values = LocaleValues::resolve(localized, &self.locales, raw, path.data())?;
        let parent_localized = level.parent_localized || values.is_localized();

        for entry in values.entries_mut() {
            let locale = entry.locale.as_deref().or(level.locale);
            let value = entry.value.take();
            let candidate = self
                .dispatcher
                .run(node, value, locale, slice, &path)
                .await?;
            let child = Level {
                depth: level.depth + 1,
                parent_localized,
                locale,
            };
            entry.value = self.descend(shape, candidate, &path, child).await?;
        }

        match values.reassemble() {
            Some(value) => {
                slice.insert(name.to_string(), value);
            }
            None => {
                slice.shift_remove(name);
            }
        }
        Ok(())
    }

    async fn descend(
        &self,
        shape: Shape<'a>,
        candidate: Option<Value>,
        path: &FieldPath,
        level: Level<'_>,
    ) -> Result<Option<Value>, TraversalError> {
        match (shape, candidate) {
            (Shape::Leaf, candidate) => Ok(candidate),
            (_, None) => Ok(None),
            (_, Some(Value::Null)) => Ok(Some(Value::Null)),
            (Shape::Group(fields), Some(Value::Object(mut map))) => {
                self.walk_fields(fields, &mut map, path, level).await?;
                Ok(Some(Value::Object(map)))
            }
            (Shape::Group(_), Some(other)) => Err(TraversalConfigurationError::shape_mismatch(
                path.data(),
                "object",
                &other,
            )
            .into()),
            (Shape::Rows(source), Some(Value::Array(mut rows))) => {
                self.walk_rows(source, &mut rows, path, level).await?;
                Ok(Some(Value::Array(rows)))
            }
            (Shape::Rows(_), Some(other)) => Err(TraversalConfigurationError::shape_mismatch(
                path.data(),
                "array",
                &other,
            )
            .into()),
        }
    }

    async fn walk_rows(
        &self,
        source: Rows<'a>,
        rows: &mut [Value],
        path: &FieldPath,
        level: Level<'_>,
    ) -> Result<(), TraversalError> {
        tracing::trace!("Walking {} rows at '{}'", rows.len(), path.data());

        match self.settings.row_mode {
            RowMode::Sequential => {
                for (index, row) in rows.iter_mut().enumerate() {
                    self.walk_row(source, row, path.append_index(index), level)
                        .await?;
                }
            }
            RowMode::Concurrent => {
                let visits: Vec<_> = rows
                    .iter_mut()
                    .enumerate()
                    .map(|(index, row)| self.walk_row(source, row, path.append_index(index), level))
                    .collect();
                try_join_all(visits).await?;
            }
        }
        Ok(())
    }

    async fn walk_row(
        &self,
        source: Rows<'a>,
        row: &mut Value,
        path: FieldPath,
        level: Level<'_>,
    ) -> Result<(), TraversalError> {
        let map = match row {
            Value::Object(map) => map,
            other => {
                return Err(
                    TraversalConfigurationError::shape_mismatch(path.data(), "object", other)
                        .into(),
                )
            }
        };

        let fields = match source {
            Rows::Array(fields) => fields,
            Rows::Blocks(blocks) => self.block_fields(blocks, map, path.data())?,
        };
        self.walk_fields(fields, map, &path, level).await
    }

    /// Fields of the block a row is tagged with; inline definitions win
    fn block_fields(
        &self,
        blocks: &'a BlocksField,
        row: &Document,
        path: &DataPath,
    ) -> Result<&'a [Field], TraversalConfigurationError> {
        let Some(block_type) = row.get(BLOCK_TYPE_KEY).and_then(Value::as_str) else {
            return Err(TraversalConfigurationError::MissingBlockType { path: path.clone() });
        };

        if let Some(block) = blocks.inline(block_type) {
            return Ok(&block.fields);
        }
        if blocks.references(block_type) {
            if let Some(block) = self.library.get(block_type) {
                return Ok(&block.fields);
            }
        }
        Err(TraversalConfigurationError::UnknownBlockType {
            path: path.clone(),
            block_type: block_type.to_string(),
        })
    }
}
