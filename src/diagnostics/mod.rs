pub mod record;
pub mod sanitize;

use serde_json::{Map, Value};

pub use record::ValidDiagnostic;

/// One diagnostic as the exporter wrote it. No fixed schema: fields are
/// looked up tolerantly by [`record`].
pub type RawDiagnostic = Map<String, Value>;

/// Keys an exporter may wrap its diagnostic list in, in lookup order.
pub const WRAPPER_KEYS: [&str; 4] = ["problems", "diagnostics", "items", "data"];

/// Shape of an export document, resolved before any record is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// Top-level JSON array
    List,
    /// Object holding the list under one of [`WRAPPER_KEYS`]
    Wrapped(&'static str),
    /// Anything else: yields no records
    Unrecognized,
}

impl DocumentShape {
    pub fn detect(doc: &Value) -> Self {
        match doc {
            Value::Array(_) => DocumentShape::List,
            Value::Object(map) => WRAPPER_KEYS
                .iter()
                .find(|key| matches!(map.get(**key), Some(Value::Array(_))))
                .map(|key| DocumentShape::Wrapped(*key))
                .unwrap_or(DocumentShape::Unrecognized),
            _ => DocumentShape::Unrecognized,
        }
    }
}

/// Pull the diagnostic records out of a parsed export document.
///
/// Non-object elements are dropped silently. Shape mismatches never fail;
/// an unrecognized document simply has no records.
pub fn extract(doc: Value) -> Vec<RawDiagnostic> {
    let list = match (DocumentShape::detect(&doc), doc) {
        (DocumentShape::List, Value::Array(items)) => items,
        (DocumentShape::Wrapped(key), Value::Object(mut map)) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    list.into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}
