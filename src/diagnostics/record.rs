//! Tolerant field access over raw diagnostic records.
//!
//! Exporters disagree on field names (plain `file`/`line`, VS Code
//! `resource`/`startLineNumber`, LSP `uri`/`range.start`), so each accessor
//! tries the known spellings in a fixed order.

use serde_json::Value;

use super::sanitize::coerce_position;
use super::RawDiagnostic;

const FILE_KEYS: [&str; 4] = ["resource", "file", "uri", "path"];
const NESTED_FILE_KEYS: [&str; 3] = ["path", "fsPath", "uri"];

/// A record that passed the validation gate: `source` and `message` are strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDiagnostic<'a> {
    pub file: Option<String>,
    pub line: Option<i64>,
    pub column: Option<i64>,
    pub code: Option<String>,
    pub source: &'a str,
    pub message: &'a str,
}

impl<'a> ValidDiagnostic<'a> {
    /// Returns `None` when `source` or `message` is missing or not a string.
    pub fn from_raw(raw: &'a RawDiagnostic) -> Option<Self> {
        let source = raw.get("source")?.as_str()?;
        let message = raw.get("message")?.as_str()?;
        let (line, column) = position(raw);
        Some(ValidDiagnostic {
            file: file(raw),
            line,
            column,
            code: code(raw),
            source,
            message,
        })
    }
}

pub fn is_valid(raw: &RawDiagnostic) -> bool {
    matches!(raw.get("source"), Some(Value::String(_)))
        && matches!(raw.get("message"), Some(Value::String(_)))
}

/// Path of the file a diagnostic belongs to, if one can be found.
pub fn file(raw: &RawDiagnostic) -> Option<String> {
    let value = FILE_KEYS
        .iter()
        .filter_map(|key| raw.get(*key))
        .find(|v| is_truthy(v))?;

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(nested) => NESTED_FILE_KEYS
            .iter()
            .filter_map(|key| nested.get(*key))
            .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
            .map(str::to_string),
        _ => None,
    }
}

/// Diagnostic code: a string, a number, or `{"value": ...}`.
pub fn code(raw: &RawDiagnostic) -> Option<String> {
    match raw.get("code")? {
        Value::Object(nested) => scalar_text(nested.get("value")?),
        other => scalar_text(other),
    }
}

/// `(line, column)`, each coerced independently.
pub fn position(raw: &RawDiagnostic) -> (Option<i64>, Option<i64>) {
    if raw.contains_key("line") || raw.contains_key("column") {
        return (coerce_position(raw.get("line")), coerce_position(raw.get("column")));
    }

    let start_line = raw.get("startLineNumber").filter(|v| !v.is_null());
    let start_col = raw.get("startColumn").filter(|v| !v.is_null());
    if start_line.is_some() && start_col.is_some() {
        return (coerce_position(start_line), coerce_position(start_col));
    }

    let start = raw.get("range").and_then(|r| r.get("start"));
    (
        coerce_position(start.and_then(|s| s.get("line"))),
        coerce_position(start.and_then(|s| s.get("character"))),
    )
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> RawDiagnostic {
        match v {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_validation_gate() {
        assert!(is_valid(&raw(json!({"source": "clangd", "message": "m"}))));
        assert!(!is_valid(&raw(json!({"source": 123, "message": "m"}))));
        assert!(!is_valid(&raw(json!({"source": "clangd", "message": null}))));
        assert!(!is_valid(&raw(json!({"message": "m"}))));

        let bad = raw(json!({"source": 123, "message": "m", "file": "x.c"}));
        assert!(ValidDiagnostic::from_raw(&bad).is_none());
    }

    #[test]
    fn test_file_lookup_order() {
        assert_eq!(file(&raw(json!({"file": "x.c"}))).as_deref(), Some("x.c"));
        assert_eq!(
            file(&raw(json!({"resource": "/abs/a.c", "file": "a.c"}))).as_deref(),
            Some("/abs/a.c")
        );
        // empty resource falls through to the next key
        assert_eq!(file(&raw(json!({"resource": "", "uri": "u.c"}))).as_deref(), Some("u.c"));
        assert_eq!(
            file(&raw(json!({"resource": {"fsPath": "/p/b.c", "uri": "file:///p/b.c"}}))).as_deref(),
            Some("/p/b.c")
        );
        assert_eq!(file(&raw(json!({"file": 12}))), None);
        assert_eq!(file(&raw(json!({}))), None);
    }

    #[test]
    fn test_code_shapes() {
        assert_eq!(code(&raw(json!({"code": "unused-includes"}))).as_deref(), Some("unused-includes"));
        assert_eq!(code(&raw(json!({"code": {"value": "W1", "target": "x"}}))).as_deref(), Some("W1"));
        assert_eq!(code(&raw(json!({"code": 1234}))).as_deref(), Some("1234"));
        assert_eq!(code(&raw(json!({"code": [1]}))), None);
        assert_eq!(code(&raw(json!({}))), None);
    }

    #[test]
    fn test_position_shapes() {
        assert_eq!(position(&raw(json!({"line": 4, "column": "2"}))), (Some(4), Some(2)));
        assert_eq!(position(&raw(json!({"line": "abc"}))), (None, None));
        assert_eq!(
            position(&raw(json!({"startLineNumber": 10, "startColumn": 3}))),
            (Some(10), Some(3))
        );
        assert_eq!(
            position(&raw(json!({"range": {"start": {"line": 7, "character": 1}}}))),
            (Some(7), Some(1))
        );
        assert_eq!(
            position(&raw(json!({"range": {"start": {"line": "x", "character": "y"}}}))),
            (None, None)
        );
        assert_eq!(position(&raw(json!({"range": "bogus"}))), (None, None));
    }
}
