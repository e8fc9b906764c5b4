//! Testing utilities for docwalk workspace
//!
//! Shared fixtures, recording hooks and tracing setup.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docwalk_engine::{FieldHookEngine, TraversalSettings};
use docwalk_hooks::{FieldHook, HookArgs, HookRegistry, HookResult};
use docwalk_schema::{
    AppConfig, Block, CollectionConfig, Document, Field, FieldKind, LocalizationConfig, Tab,
};
use parking_lot::Mutex;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber; `RUST_LOG` controls verbosity
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Unwrap a JSON object literal into a document
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// One observed hook call
#[derive(Debug, Clone, PartialEq)]
pub struct HookCall {
    pub hook: String,
    pub path: String,
    pub schema_path: String,
    pub locale: Option<String>,
    pub value: Option<Value>,
}

/// Shared, append-only record of hook calls
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    inner: Arc<Mutex<Vec<HookCall>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, hook: &str, args: &HookArgs<'_>) {
        self.inner.lock().push(HookCall {
            hook: hook.to_string(),
            path: args.path.to_string(),
            schema_path: args.schema_path.to_string(),
            locale: args.locale.map(str::to_string),
            value: args.value.clone(),
        });
    }

    pub fn calls(&self) -> Vec<HookCall> {
        self.inner.lock().clone()
    }

    /// Data paths in call order
    pub fn paths(&self) -> Vec<String> {
        self.inner.lock().iter().map(|c| c.path.clone()).collect()
    }

    /// Data paths of calls made by one hook
    pub fn paths_of(&self, hook: &str) -> Vec<String> {
        self.inner
            .lock()
            .iter()
            .filter(|c| c.hook == hook)
            .map(|c| c.path.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Passes values through unchanged, recording every call
#[derive(Debug, Clone)]
pub struct RecordingHook {
    name: String,
    log: CallLog,
}

impl RecordingHook {
    pub fn new(name: impl Into<String>, log: &CallLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
        }
    }
}

#[async_trait]
impl FieldHook for RecordingHook {
    async fn call(&self, args: HookArgs<'_>) -> HookResult {
        self.log.record(&self.name, &args);
        Ok(args.value)
    }
}

/// Appends a suffix to string values
#[derive(Debug, Clone)]
pub struct SuffixHook {
    suffix: String,
}

impl SuffixHook {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

#[async_trait]
impl FieldHook for SuffixHook {
    async fn call(&self, args: HookArgs<'_>) -> HookResult {
        Ok(args.value.map(|value| match value {
            Value::String(s) => Value::String(format!("{s}{}", self.suffix)),
            other => other,
        }))
    }
}

/// Rejects every value, recording the attempt first
#[derive(Debug, Clone)]
pub struct FailingHook {
    message: String,
    log: CallLog,
}

impl FailingHook {
    pub fn new(message: impl Into<String>, log: &CallLog) -> Self {
        Self {
            message: message.into(),
            log: log.clone(),
        }
    }
}

#[async_trait]
impl FieldHook for FailingHook {
    async fn call(&self, args: HookArgs<'_>) -> HookResult {
        self.log.record("failing", &args);
        Err(args.invalid(self.message.clone()))
    }
}

/// Waits for the number of milliseconds in the sibling `delayMs` field, then
/// records the call and passes the value through
#[derive(Debug, Clone)]
pub struct DelayHook {
    log: CallLog,
}

impl DelayHook {
    pub fn new(log: &CallLog) -> Self {
        Self { log: log.clone() }
    }
}

#[async_trait]
impl FieldHook for DelayHook {
    async fn call(&self, args: HookArgs<'_>) -> HookResult {
        let delay = args.sibling("delayMs").and_then(Value::as_u64).unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.log.record("delay", &args);
        Ok(args.value)
    }
}

/// Locales `en` (default) and `es`
pub fn en_es() -> LocalizationConfig {
    LocalizationConfig::new(["en", "es"])
}

/// Blog schema touching every field variant
///
/// `posts`:
/// - `slug`: unique text
/// - `title`: localized text
/// - unnamed tab holding `body`; named tab `meta` holding `description`
/// - `seo`: localized group with a (suppressed) localized `title`
/// - `items`: array of `sku` / `qty`
/// - `layout`: blocks with inline `hero` and library `cta`
/// - row holding `author`, a `ui` divider, `category` relationship
///
/// `categories`: `name` plus a `posts` join
pub fn blog_config() -> AppConfig {
    AppConfig::new()
        .with_localization(en_es())
        .with_block(Block::new(
            "cta",
            vec![Field::text("label"), Field::text("url")],
        ))
        .with_collection(CollectionConfig::new(
            "posts",
            vec![
                Field::text("slug").unique(),
                Field::text("title").localized(),
                Field::tabs(vec![
                    Tab::unnamed(vec![Field::new("body", FieldKind::RichText)]),
                    Tab::named("meta", vec![Field::text("description")]),
                ]),
                Field::group(
                    "seo",
                    vec![Field::text("title").localized(), Field::text("keywords")],
                )
                .localized(),
                Field::array("items", vec![Field::text("sku"), Field::number("qty")]),
                Field::blocks(
                    "layout",
                    vec![Arc::new(Block::new("hero", vec![Field::text("heading")]))],
                )
                .with_block_references(["cta"]),
                Field::row(vec![Field::text("author")]),
                Field::new("divider", FieldKind::Ui),
                Field::relationship("category", "categories"),
            ],
        ))
        .with_collection(CollectionConfig::new(
            "categories",
            vec![Field::text("name"), Field::join("posts", "posts", "category")],
        ))
}

/// Sanitize `config` and build an engine over it
pub fn build_engine(config: AppConfig, registry: HookRegistry) -> FieldHookEngine {
    let sanitized = config.sanitize().expect("test config should sanitize");
    FieldHookEngine::new(Arc::new(sanitized), Arc::new(registry))
        .expect("test hooks should be registered")
}

/// [`build_engine`] with explicit settings
pub fn build_engine_with(
    config: AppConfig,
    registry: HookRegistry,
    settings: TraversalSettings,
) -> FieldHookEngine {
    build_engine(config, registry).with_settings(settings)
}
