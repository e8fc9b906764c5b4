//! Structural cloning of documents
//!
//! The engine only ever mutates a working copy produced here.

use docwalk_schema::Document;
use serde_json::Value;

/// Deep copy of a value; objects keep their key order
#[must_use]
pub fn deep_clone(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(deep_clone).collect()),
        Value::Object(map) => Value::Object(clone_document(map)),
        primitive => primitive.clone(),
    }
}

/// Deep copy of a document
#[must_use]
pub fn clone_document(doc: &Document) -> Document {
    doc.iter()
        .map(|(key, value)| (key.clone(), deep_clone(value)))
        .collect()
}
