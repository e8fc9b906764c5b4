//! Functional tests for the recursive walk.
//!
//! Core guarantees exercised here:
//! - Data paths carry row indices, schema paths never do.
//! - Rows keep their order and length whether processed one by one or
//!   concurrently.
//! - The first failing hook aborts the traversal; later hooks never run.
//! - Wrappers and named tabs put their children on the right data level.
//! - Shape mismatches and runaway nesting are configuration errors.
//! - Hooks see their siblings, the request and the application context.

use docwalk_engine::{
    FieldHookEngine, RowMode, TraversalArgs, TraversalConfigurationError, TraversalError,
    TraversalSettings,
};
use docwalk_hooks::{HookRegistry, Request, RequestContext};
use docwalk_schema::{
    AppConfig, CollectionConfig, DataPath, Document, Field, FieldKind, GroupField, HookSlot, Tab,
};
use docwalk_test_utils::{
    build_engine, build_engine_with, doc, init_tracing, CallLog, DelayHook, FailingHook,
    RecordingHook, SuffixHook,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

const DUP: HookSlot = HookSlot::BeforeDuplicate;

fn posts(fields: Vec<Field>) -> AppConfig {
    AppConfig::new().with_collection(CollectionConfig::new("posts", fields))
}

fn recording(log: &CallLog) -> HookRegistry {
    let mut registry = HookRegistry::with_defaults();
    registry.register("rec", RecordingHook::new("rec", log));
    registry
}

async fn duplicate(
    engine: &FieldHookEngine,
    input: &Document,
) -> Result<Document, TraversalError> {
    let posts = engine.config().collection("posts").unwrap();
    let req = Request::new();
    engine
        .before_duplicate(TraversalArgs::for_collection(posts, input, &req))
        .await
}

/// Tenet: schema paths are invariant under repetition.
///
/// Every row of an array shares one schema path, and that path is the data
/// path with its indices removed.
#[tokio::test]
async fn schema_path_drops_row_indices() {
    init_tracing();
    let log = CallLog::new();
    let engine = build_engine(
        posts(vec![Field::array(
            "items",
            vec![
                Field::text("sku").with_hook(DUP, "rec"),
                Field::array("tags", vec![Field::text("label").with_hook(DUP, "rec")]),
            ],
        )]),
        recording(&log),
    );
    let input = doc(json!({
        "items": [
            { "sku": "a", "tags": [{ "label": "x" }, { "label": "y" }] },
            { "sku": "b", "tags": [{ "label": "z" }] }
        ]
    }));

    duplicate(&engine, &input).await.unwrap();

    assert_eq!(
        log.paths(),
        vec![
            "items.0.sku",
            "items.0.tags.0.label",
            "items.0.tags.1.label",
            "items.1.sku",
            "items.1.tags.0.label",
        ]
    );
    for call in log.calls() {
        let data: DataPath = call.path.parse().unwrap();
        assert_eq!(call.schema_path, data.to_schema_path().to_string());
        assert!(!call.schema_path.chars().any(|c| c.is_ascii_digit()));
    }
}

fn delayed_rows() -> Document {
    doc(json!({
        "items": [
            { "sku": "a", "delayMs": 30 },
            { "sku": "b", "delayMs": 20 },
            { "sku": "c", "delayMs": 10 },
            { "sku": "d", "delayMs": 0 }
        ]
    }))
}

fn delayed_engine(log: &CallLog, row_mode: RowMode) -> FieldHookEngine {
    let mut registry = HookRegistry::new();
    registry.register("delay", DelayHook::new(log));
    registry.register("bang", SuffixHook::new("!"));
    build_engine_with(
        posts(vec![Field::array(
            "items",
            vec![Field::text("sku")
                .with_hook(DUP, "delay")
                .with_hook(DUP, "bang")],
        )]),
        registry,
        TraversalSettings::new().with_row_mode(row_mode),
    )
}

fn skus(out: &Document) -> Vec<&str> {
    out["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["sku"].as_str().unwrap())
        .collect()
}

/// Tenet: sequential rows are visited and returned in order.
#[tokio::test(start_paused = true)]
async fn sequential_rows_run_in_order() {
    let log = CallLog::new();
    let engine = delayed_engine(&log, RowMode::Sequential);

    let out = duplicate(&engine, &delayed_rows()).await.unwrap();

    assert_eq!(skus(&out), vec!["a!", "b!", "c!", "d!"]);
    assert_eq!(log.paths(), vec!["items.0.sku", "items.1.sku", "items.2.sku", "items.3.sku"]);
}

/// Tenet: concurrent rows may finish in any order, but the output keeps the
/// input order and length.
///
/// Delays are chosen so that rows complete in reverse.
#[tokio::test(start_paused = true)]
async fn concurrent_rows_preserve_order() {
    let log = CallLog::new();
    let engine = delayed_engine(&log, RowMode::Concurrent);

    let out = duplicate(&engine, &delayed_rows()).await.unwrap();

    assert_eq!(skus(&out), vec!["a!", "b!", "c!", "d!"]);
    assert_eq!(log.paths(), vec!["items.3.sku", "items.2.sku", "items.1.sku", "items.0.sku"]);
}

/// Tenet: the first failing hook aborts the whole traversal.
///
/// With a failing hook on the third of five siblings, the two later hooks
/// never run and no document is returned.
#[tokio::test]
async fn failure_aborts_remaining_siblings() {
    let log = CallLog::new();
    let mut registry = recording(&log);
    registry.register("fail", FailingHook::new("rejected", &log));
    let engine = build_engine(
        posts(vec![
            Field::text("a").with_hook(DUP, "rec"),
            Field::text("b").with_hook(DUP, "rec"),
            Field::text("c").with_hook(DUP, "fail"),
            Field::text("d").with_hook(DUP, "rec"),
            Field::text("e").with_hook(DUP, "rec"),
        ]),
        registry,
    );
    let input = doc(json!({ "a": 1, "b": 2, "c": 3, "d": 4, "e": 5 }));

    let err = duplicate(&engine, &input).await.unwrap_err();

    assert_eq!(
        err,
        TraversalError::Validation {
            path: "c".parse().unwrap(),
            message: "rejected".into(),
        }
    );
    assert_eq!(log.paths(), vec!["a", "b", "c"]);
    assert_eq!(log.paths_of("rec"), vec!["a", "b"]);
}

/// Tenet: a failing row stops concurrent siblings from producing a result.
#[tokio::test(start_paused = true)]
async fn concurrent_row_failure_is_fatal() {
    let log = CallLog::new();
    let mut registry = HookRegistry::new();
    registry.register("delay", DelayHook::new(&log));
    registry.register_fn("rejectB", |args| {
        if args.value == Some(json!("b")) {
            return Err(args.invalid("b is not allowed"));
        }
        Ok(args.value)
    });
    let engine = build_engine_with(
        posts(vec![Field::array(
            "items",
            vec![Field::text("sku")
                .with_hook(DUP, "delay")
                .with_hook(DUP, "rejectB")],
        )]),
        registry,
        TraversalSettings::new().with_row_mode(RowMode::Concurrent),
    );

    let err = duplicate(&engine, &delayed_rows()).await.unwrap_err();

    assert_eq!(err.path(), &"items.1.sku".parse::<DataPath>().unwrap());
    // rows slower than the failing one are dropped before their hooks finish
    assert!(!log.paths().contains(&"items.0.sku".to_string()));
}

/// Tenet: presentational wrappers share their parent's data level.
///
/// Rows, collapsibles, unnamed tabs and unnamed groups add nothing to either
/// path; a named tab stores its fields under its own key like a group.
#[tokio::test]
async fn wrappers_and_named_tabs() {
    let log = CallLog::new();
    let engine = build_engine(
        posts(vec![
            Field::row(vec![Field::text("first").with_hook(DUP, "rec")]),
            Field::collapsible(vec![Field::text("second").with_hook(DUP, "rec")]),
            Field::anonymous(FieldKind::Group(GroupField {
                fields: vec![Field::text("third").with_hook(DUP, "rec")],
            })),
            Field::tabs(vec![
                Tab::unnamed(vec![Field::text("body").with_hook(DUP, "rec")]),
                Tab::named("meta", vec![Field::text("description").with_hook(DUP, "rec")])
                    .with_hook(DUP, "rec"),
            ]),
        ]),
        recording(&log),
    );
    let input = doc(json!({
        "first": 1,
        "second": 2,
        "third": 3,
        "body": "b",
        "meta": { "description": "d" }
    }));

    let out = duplicate(&engine, &input).await.unwrap();

    assert_eq!(out, input);
    assert_eq!(log.paths(), vec!["first", "second", "third", "body", "meta", "meta.description"]);
    let meta = log.calls().into_iter().find(|c| c.path == "meta").unwrap();
    assert_eq!(meta.value, Some(json!({ "description": "d" })));
}

/// Tenet: absent values still reach hooks, and hooks decide presence.
///
/// A hook may supply a default for a missing key, and a hook returning
/// nothing removes the key.
#[tokio::test]
async fn hooks_control_key_presence() {
    let mut registry = HookRegistry::with_defaults();
    registry.register_fn("defaultDraft", |args| {
        Ok(Some(args.value.unwrap_or_else(|| json!("draft"))))
    });
    let engine = build_engine(
        posts(vec![
            Field::text("status").with_hook(DUP, "defaultDraft"),
            Field::text("publishedAt").with_hook(DUP, "clearValue"),
            Field::text("editor").with_hook(DUP, "nullValue"),
            Field::text("untouched"),
        ]),
        registry,
    );
    let input = doc(json!({ "publishedAt": "2024-05-01", "editor": "kim" }));

    let out = duplicate(&engine, &input).await.unwrap();

    assert_eq!(Value::Object(out), json!({ "editor": null, "status": "draft" }));
}

/// Tenet: a hook's result is what the walker descends into.
#[tokio::test]
async fn children_see_the_hooked_value() {
    let log = CallLog::new();
    let mut registry = recording(&log);
    registry.register_fn("seedRows", |_| Ok(Some(json!([{ "sku": "new" }]))));
    let items = Field::array("items", vec![Field::text("sku").with_hook(DUP, "rec")])
        .with_hook(DUP, "seedRows");
    let engine = build_engine(posts(vec![items]), registry);

    let out = duplicate(&engine, &doc(json!({ "items": [] }))).await.unwrap();

    assert_eq!(Value::Object(out), json!({ "items": [{ "sku": "new" }] }));
    assert_eq!(log.paths(), vec!["items.0.sku"]);
}

/// Tenet: hooks see siblings, request data and the application context.
#[tokio::test]
async fn hooks_receive_traversal_context() {
    let mut registry = HookRegistry::with_defaults();
    registry.register_fn("label", |args| {
        let tenant = args.context.get("tenant").and_then(Value::as_str).unwrap_or("?");
        let status = args.sibling("status").and_then(Value::as_str).unwrap_or("?");
        let user = args.req.user.as_ref().and_then(|u| u["name"].as_str()).unwrap_or("?");
        let id = args.id.map(ToString::to_string).unwrap_or_default();
        let collection = args.collection.map_or("-", |c| c.slug());
        Ok(Some(json!(format!("{tenant}/{collection}/{id}/{status}/{user}"))))
    });
    let engine = build_engine(
        posts(vec![
            Field::text("status"),
            Field::text("label").with_hook(DUP, "label"),
        ]),
        registry,
    );
    let posts = engine.config().collection("posts").unwrap();
    let input = doc(json!({ "status": "published", "label": "" }));
    let req = Request::new().with_user(json!({ "name": "ana" }));
    let mut context = RequestContext::new();
    context.insert("tenant".into(), json!("acme"));

    let out = engine
        .before_duplicate(
            TraversalArgs::for_collection(posts, &input, &req)
                .with_id("p-9")
                .with_context(context),
        )
        .await
        .unwrap();

    assert_eq!(out["label"], json!("acme/posts/p-9/published/ana"));
}

/// Tenet: policy failures abort unless access is overridden.
#[tokio::test]
async fn access_denied_unless_overridden() {
    let mut registry = HookRegistry::with_defaults();
    registry.register_fn("adminOnly", |args| {
        let is_admin = args
            .req
            .user
            .as_ref()
            .is_some_and(|u| u["role"] == json!("admin"));
        args.ensure_access(is_admin)?;
        Ok(args.value)
    });
    let engine = build_engine(
        posts(vec![Field::group(
            "internal",
            vec![Field::text("notes").with_hook(DUP, "adminOnly")],
        )]),
        registry,
    );
    let posts = engine.config().collection("posts").unwrap();
    let input = doc(json!({ "internal": { "notes": "secret" } }));
    let req = Request::new().with_user(json!({ "role": "editor" }));

    let err = engine
        .before_duplicate(TraversalArgs::for_collection(posts, &input, &req))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TraversalError::AccessDenied {
            path: "internal.notes".parse().unwrap()
        }
    );

    let out = engine
        .before_duplicate(
            TraversalArgs::for_collection(posts, &input, &req).with_override_access(true),
        )
        .await
        .unwrap();
    assert_eq!(out, input);
}

/// Tenet: the request's cancellation signal reaches every hook unchanged.
#[tokio::test]
async fn cancellation_is_observed_by_hooks() {
    let mut registry = HookRegistry::with_defaults();
    registry.register_fn("cancel", |args| {
        args.req.cancellation().cancel();
        Ok(args.value)
    });
    registry.register_fn("guarded", |args| {
        args.ensure_active()?;
        Ok(args.value)
    });
    let engine = build_engine(
        posts(vec![
            Field::text("a").with_hook(DUP, "cancel"),
            Field::text("b").with_hook(DUP, "guarded"),
        ]),
        registry,
    );
    let posts = engine.config().collection("posts").unwrap();
    let token = CancellationToken::new();
    let req = Request::new().with_cancellation(token.clone());
    let input = doc(json!({ "a": 1, "b": 2 }));

    let err = engine
        .before_duplicate(TraversalArgs::for_collection(posts, &input, &req))
        .await
        .unwrap_err();

    assert!(token.is_cancelled());
    assert_eq!(
        err,
        TraversalError::Cancelled {
            path: "b".parse().unwrap()
        }
    );
    assert!(!err.is_retryable());
}

/// Tenet: values of the wrong JSON type are configuration errors.
#[tokio::test]
async fn shape_mismatches_are_fatal() {
    let engine = build_engine(
        posts(vec![
            Field::group("seo", vec![Field::text("title")]),
            Field::array("items", vec![Field::text("sku")]),
        ]),
        HookRegistry::with_defaults(),
    );

    let cases = [
        (json!({ "seo": 5 }), "seo", "object", "number"),
        (json!({ "items": "oops" }), "items", "array", "string"),
        (json!({ "items": [{ "sku": "a" }, 7] }), "items.1", "object", "number"),
    ];
    for (input, path, expected, found) in cases {
        let err = duplicate(&engine, &doc(input)).await.unwrap_err();
        assert_eq!(
            err,
            TraversalError::Configuration(TraversalConfigurationError::ShapeMismatch {
                path: path.parse().unwrap(),
                expected,
                found,
            })
        );
    }

    let out = duplicate(&engine, &doc(json!({ "seo": null, "items": null })))
        .await
        .unwrap();
    assert_eq!(Value::Object(out), json!({ "seo": null, "items": null }));
}

/// Tenet: nesting beyond the configured depth is rejected.
#[tokio::test]
async fn max_depth_is_enforced() {
    let fields = vec![Field::group(
        "a",
        vec![Field::group("b", vec![Field::group("c", vec![Field::text("d")])])],
    )];
    let input = doc(json!({ "a": { "b": { "c": { "d": "x" } } } }));

    let shallow = build_engine_with(
        posts(fields.clone()),
        HookRegistry::with_defaults(),
        TraversalSettings::new().with_max_depth(2),
    );
    let err = duplicate(&shallow, &input).await.unwrap_err();
    assert_eq!(
        err,
        TraversalError::Configuration(TraversalConfigurationError::MaxDepthExceeded {
            path: "a.b.c".parse().unwrap(),
            max_depth: 2,
        })
    );

    // absent groups are never entered, so they never count
    assert!(duplicate(&shallow, &doc(json!({ "a": { "b": {} } }))).await.is_ok());

    let deep = build_engine_with(
        posts(fields),
        HookRegistry::with_defaults(),
        TraversalSettings::new().with_max_depth(3),
    );
    assert_eq!(duplicate(&deep, &input).await.unwrap(), input);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Duplicating any list of rows keeps its length and order.
    #[test]
    fn rows_keep_length_and_order(
        skus in prop::collection::vec("[a-z]{1,6}", 0..12),
        concurrent in any::<bool>(),
    ) {
        let mode = if concurrent { RowMode::Concurrent } else { RowMode::Sequential };
        let engine = build_engine_with(
            posts(vec![Field::array("items", vec![Field::text("sku").unique()])]),
            HookRegistry::with_defaults(),
            TraversalSettings::new().with_row_mode(mode),
        );
        let rows: Vec<Value> = skus.iter().map(|s| json!({ "sku": s })).collect();
        let input = doc(json!({ "items": rows }));

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let out = runtime.block_on(duplicate(&engine, &input)).unwrap();

        let expected: Vec<Value> = skus
            .iter()
            .map(|s| json!({ "sku": format!("{s} - Copy") }))
            .collect();
        prop_assert_eq!(&out["items"], &Value::Array(expected));
    }
}
