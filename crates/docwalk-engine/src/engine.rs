//! Engine facade
//!
//! [`FieldHookEngine`] owns the sanitized configuration, the hook registry and
//! the traversal settings. Each call clones the input document, walks the
//! clone and returns it; the input is never touched.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use docwalk_hooks::{DocumentId, HookRegistry, Request, RequestContext};
use docwalk_schema::{
    Document, Field, HookSlot, SanitizedCollection, SanitizedConfig, SanitizedGlobal, SchemaError,
};

use crate::clone::clone_document;
use crate::config::TraversalSettings;
use crate::dispatch::Dispatcher;
use crate::error::TraversalError;
use crate::walker::Walker;

/// Field configuration a traversal runs over
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Collection(&'a SanitizedCollection),
    Global(&'a SanitizedGlobal),
    /// Bare field list, for documents that belong to neither
    Fields(&'a [Field]),
}

impl<'a> Target<'a> {
    /// Root field list
    #[must_use]
    pub fn fields(&self) -> &'a [Field] {
        match *self {
            Self::Collection(collection) => collection.fields(),
            Self::Global(global) => global.fields(),
            Self::Fields(fields) => fields,
        }
    }

    /// Owning collection, handed to every hook
    #[must_use]
    pub fn collection(&self) -> Option<&'a SanitizedCollection> {
        match *self {
            Self::Collection(collection) => Some(collection),
            Self::Global(_) | Self::Fields(_) => None,
        }
    }
}

impl Display for Target<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection(collection) => write!(f, "collection '{}'", collection.slug()),
            Self::Global(global) => write!(f, "global '{}'", global.slug()),
            Self::Fields(fields) => write!(f, "{} fields", fields.len()),
        }
    }
}

/// Per-call input of a traversal
#[derive(Debug, Clone)]
pub struct TraversalArgs<'a> {
    pub target: Target<'a>,
    /// Document to transform; only ever read
    pub doc: &'a Document,
    pub req: &'a Request,
    pub id: Option<DocumentId>,
    /// Passed unchanged to every hook
    pub context: RequestContext,
    pub override_access: bool,
}

impl<'a> TraversalArgs<'a> {
    /// Traverse a document of a collection
    #[must_use]
    pub fn for_collection(
        collection: &'a SanitizedCollection,
        doc: &'a Document,
        req: &'a Request,
    ) -> Self {
        Self::new(Target::Collection(collection), doc, req)
    }

    /// Traverse a global document
    #[must_use]
    pub fn for_global(global: &'a SanitizedGlobal, doc: &'a Document, req: &'a Request) -> Self {
        Self::new(Target::Global(global), doc, req)
    }

    /// Traverse a document described by a bare field list
    #[must_use]
    pub fn for_fields(fields: &'a [Field], doc: &'a Document, req: &'a Request) -> Self {
        Self::new(Target::Fields(fields), doc, req)
    }

    fn new(target: Target<'a>, doc: &'a Document, req: &'a Request) -> Self {
        Self {
            target,
            doc,
            req,
            id: None,
            context: RequestContext::new(),
            override_access: false,
        }
    }

    /// With document id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: impl Into<DocumentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// With application context
    #[inline]
    #[must_use]
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// With override access
    #[inline]
    #[must_use]
    pub fn with_override_access(mut self, override_access: bool) -> Self {
        self.override_access = override_access;
        self
    }
}

/// Runs field hooks over documents
#[derive(Debug, Clone)]
pub struct FieldHookEngine {
    config: Arc<SanitizedConfig>,
    registry: Arc<HookRegistry>,
    settings: TraversalSettings,
}

impl FieldHookEngine {
    /// Create engine with default settings
    ///
    /// # Errors
    /// `SchemaError::UnknownHook` if the configuration names a hook the
    /// registry does not have
    pub fn new(
        config: Arc<SanitizedConfig>,
        registry: Arc<HookRegistry>,
    ) -> Result<Self, SchemaError> {
        registry.verify(&config)?;
        tracing::info!(
            "Field hook engine ready: {} collections, {} hooks",
            config.collections().count(),
            registry.len()
        );
        Ok(Self {
            config,
            registry,
            settings: TraversalSettings::default(),
        })
    }

    /// With traversal settings
    #[inline]
    #[must_use]
    pub fn with_settings(mut self, settings: TraversalSettings) -> Self {
        self.settings = settings;
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SanitizedConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &TraversalSettings {
        &self.settings
    }

    /// Prepare a copy of a document for duplication
    ///
    /// # Errors
    /// The first [`TraversalError`] raised; no partial result is returned
    pub async fn before_duplicate(
        &self,
        args: TraversalArgs<'_>,
    ) -> Result<Document, TraversalError> {
        self.run_hooks(HookSlot::BeforeDuplicate, args).await
    }

    /// Run the hooks of one slot over a copy of a document
    ///
    /// # Errors
    /// The first [`TraversalError`] raised; no partial result is returned
    pub async fn run_hooks(
        &self,
        slot: HookSlot,
        args: TraversalArgs<'_>,
    ) -> Result<Document, TraversalError> {
        let TraversalArgs {
            target,
            doc,
            req,
            id,
            context,
            override_access,
        } = args;

        tracing::info!("Running {} hooks on {}", slot, target);

        let locales: Vec<&str> = self
            .config
            .localization()
            .map(|localization| localization.codes().collect())
            .unwrap_or_default();
        let dispatcher = Dispatcher {
            registry: &self.registry,
            slot,
            id: id.as_ref(),
            collection: target.collection(),
            override_access,
            req,
            context: &context,
        };
        let walker = Walker::new(dispatcher, self.config.blocks(), locales, &self.settings);

        let mut working = clone_document(doc);
        match walker.walk(target.fields(), &mut working).await {
            Ok(()) => {
                tracing::info!("Finished {} hooks on {}", slot, target);
                Ok(working)
            }
            Err(err) => {
                tracing::warn!("{} hooks on {} aborted: {}", slot, target, err);
                Err(err)
            }
        }
    }
}
