//! Hook dispatch for one field visit

use docwalk_hooks::{DocumentId, HookArgs, HookRegistry, Request, RequestContext};
use docwalk_schema::{Document, FieldPath, FieldRef, HookSlot, SanitizedCollection};
use serde_json::Value;

use crate::error::{TraversalConfigurationError, TraversalError};

/// Traversal-wide part of the hook context
#[derive(Debug, Clone, Copy)]
pub(crate) struct Dispatcher<'a> {
    pub(crate) registry: &'a HookRegistry,
    pub(crate) slot: HookSlot,
    pub(crate) id: Option<&'a DocumentId>,
    pub(crate) collection: Option<&'a SanitizedCollection>,
    pub(crate) override_access: bool,
    pub(crate) req: &'a Request,
    pub(crate) context: &'a RequestContext,
}

impl Dispatcher<'_> {
    /// Run the field's hook chain for the slot, threading the value through
    ///
    /// A field with no hooks for the slot returns its value untouched.
    pub(crate) async fn run(
        &self,
        field: FieldRef<'_>,
        value: Option<Value>,
        locale: Option<&str>,
        sibling_doc: &Document,
        path: &FieldPath,
    ) -> Result<Option<Value>, TraversalError> {
        let names = field.hooks().get(self.slot);
        let mut value = value;

        for name in names {
            let Some(hook) = self.registry.get(name) else {
                return Err(TraversalConfigurationError::UnregisteredHook {
                    path: path.data().clone(),
                    hook: name.clone(),
                }
                .into());
            };

            tracing::debug!("Running {} hook '{}' at '{}'", self.slot, name, path.data());

            let args = HookArgs {
                value,
                locale,
                sibling_doc,
                field,
                path: path.data(),
                schema_path: path.schema(),
                slot: self.slot,
                id: self.id,
                collection: self.collection,
                override_access: self.override_access,
                req: self.req,
                context: self.context,
            };
            value = hook
                .call(args)
                .await
                .map_err(|err| TraversalError::from_hook(err, name, path.data()))?;
        }

        Ok(value)
    }
}
