//! The field hook contract
//!
//! Every hook is asynchronous at this boundary. Synchronous logic is wrapped
//! with [`hook_fn`]; closures returning boxed futures with [`async_hook_fn`].

use std::fmt;

use async_trait::async_trait;
use docwalk_schema::{DataPath, Document, FieldRef, HookSlot, SanitizedCollection, SchemaPath};
use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::HookError;
use crate::request::{DocumentId, Request, RequestContext};

/// Result of one hook call: the new value, `None` meaning absent
pub type HookResult = Result<Option<Value>, HookError>;

/// Everything a hook sees about the field it runs for
#[derive(Debug, Clone)]
pub struct HookArgs<'a> {
    /// Current value; `None` if the key is absent
    pub value: Option<Value>,
    /// Locale being visited, for localized fields
    pub locale: Option<&'a str>,
    /// Nearest object enclosing the field
    pub sibling_doc: &'a Document,
    /// Configuration of the field
    pub field: FieldRef<'a>,
    pub path: &'a DataPath,
    pub schema_path: &'a SchemaPath,
    /// Lifecycle slot being run
    pub slot: HookSlot,
    pub id: Option<&'a DocumentId>,
    /// Owning collection, `None` for globals and bare field lists
    pub collection: Option<&'a SanitizedCollection>,
    pub override_access: bool,
    pub req: &'a Request,
    pub context: &'a RequestContext,
}

impl<'a> HookArgs<'a> {
    /// Read a co-located field from the sibling document
    #[inline]
    #[must_use]
    pub fn sibling(&self, name: &str) -> Option<&'a Value> {
        self.sibling_doc.get(name)
    }

    /// Build a validation error located at this field
    #[inline]
    pub fn invalid(&self, message: impl Into<String>) -> HookError {
        HookError::validation(self.path, message)
    }

    /// Apply the result of a policy check
    ///
    /// # Errors
    /// `HookError::AccessDenied` if `allowed` is false and access is not overridden
    pub fn ensure_access(&self, allowed: bool) -> Result<(), HookError> {
        if allowed || self.override_access {
            Ok(())
        } else {
            Err(HookError::access_denied(self.path))
        }
    }

    /// Fail fast once the request is cancelled
    ///
    /// # Errors
    /// `HookError::Cancelled` if the request's cancellation signal fired
    pub fn ensure_active(&self) -> Result<(), HookError> {
        if self.req.is_cancelled() {
            Err(HookError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A transform run for one field during traversal
///
/// The walker awaits every call before looking at the field's children, since
/// a hook may change the shape of the value it returns.
#[async_trait]
pub trait FieldHook: Send + Sync + fmt::Debug {
    /// Produce the field's new value
    async fn call(&self, args: HookArgs<'_>) -> HookResult;
}

/// Hook backed by a synchronous closure
pub struct SyncHook<F> {
    f: F,
}

impl<F> fmt::Debug for SyncHook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncHook").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> FieldHook for SyncHook<F>
where
    F: Fn(HookArgs<'_>) -> HookResult + Send + Sync,
{
    async fn call(&self, args: HookArgs<'_>) -> HookResult {
        (self.f)(args)
    }
}

/// Wrap a synchronous closure as a [`FieldHook`]
pub fn hook_fn<F>(f: F) -> SyncHook<F>
where
    F: Fn(HookArgs<'_>) -> HookResult + Send + Sync,
{
    SyncHook { f }
}

/// Hook backed by a closure returning a boxed future
pub struct AsyncHook<F> {
    f: F,
}

impl<F> fmt::Debug for AsyncHook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncHook").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> FieldHook for AsyncHook<F>
where
    F: for<'a> Fn(HookArgs<'a>) -> BoxFuture<'a, HookResult> + Send + Sync,
{
    async fn call(&self, args: HookArgs<'_>) -> HookResult {
        (self.f)(args).await
    }
}

/// Wrap an async closure as a [`FieldHook`]
///
/// ```rust,ignore
/// let hook = async_hook_fn(|args| Box::pin(async move {
///     let related = lookup(args.req, args.value.as_ref()).await?;
///     Ok(related)
/// }));
/// ```
pub fn async_hook_fn<F>(f: F) -> AsyncHook<F>
where
    F: for<'a> Fn(HookArgs<'a>) -> BoxFuture<'a, HookResult> + Send + Sync,
{
    AsyncHook { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwalk_schema::Field;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Fixture {
        field: Field,
        sibling: Document,
        path: DataPath,
        schema_path: SchemaPath,
        req: Request,
        context: RequestContext,
    }

    impl Fixture {
        fn new() -> Self {
            let mut sibling = Document::new();
            sibling.insert("title".into(), json!("Hello"));
            sibling.insert("status".into(), json!("draft"));
            Self {
                field: Field::text("title"),
                sibling,
                path: "title".parse().unwrap(),
                schema_path: "title".parse().unwrap(),
                req: Request::new(),
                context: RequestContext::new(),
            }
        }

        fn args(&self, override_access: bool) -> HookArgs<'_> {
            HookArgs {
                value: self.sibling.get("title").cloned(),
                locale: None,
                sibling_doc: &self.sibling,
                field: FieldRef::Field(&self.field),
                path: &self.path,
                schema_path: &self.schema_path,
                slot: HookSlot::BeforeDuplicate,
                id: None,
                collection: None,
                override_access,
                req: &self.req,
                context: &self.context,
            }
        }
    }

    #[tokio::test]
    async fn sync_hook_sees_siblings() {
        let fixture = Fixture::new();
        let hook = hook_fn(|args| {
            let status = args.sibling("status").and_then(Value::as_str).unwrap_or("");
            Ok(Some(json!(format!("{status}:{}", args.value.unwrap_or_default()))))
        });

        let result = hook.call(fixture.args(false)).await.unwrap();
        assert_eq!(result, Some(json!("draft:\"Hello\"")));
    }

    #[tokio::test]
    async fn async_hook_is_awaited() {
        let fixture = Fixture::new();
        let hook = async_hook_fn(|args| {
            Box::pin(async move {
                tokio::task::yield_now().await;
                Ok(args.value.map(|_| json!("resolved")))
            })
        });

        let result = hook.call(fixture.args(false)).await.unwrap();
        assert_eq!(result, Some(json!("resolved")));
    }

    #[test]
    fn ensure_access_respects_override() {
        let fixture = Fixture::new();
        assert!(matches!(
            fixture.args(false).ensure_access(false),
            Err(HookError::AccessDenied { .. })
        ));
        assert!(fixture.args(true).ensure_access(false).is_ok());
        assert!(fixture.args(false).ensure_access(true).is_ok());
    }

    #[test]
    fn ensure_active_observes_cancellation() {
        let fixture = Fixture::new();
        assert!(fixture.args(false).ensure_active().is_ok());
        fixture.req.cancellation().cancel();
        assert_eq!(fixture.args(false).ensure_active(), Err(HookError::Cancelled));
    }
}
