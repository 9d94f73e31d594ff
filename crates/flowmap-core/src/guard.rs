//! Narrowing helpers for untyped flow graph input.
//!
//! Every helper returns a narrowed value or an empty fallback and never
//! panics. [`as_string_array`] is the only place that records diagnostics for
//! malformed list members; callers thread a [`Warnings`] accumulator through
//! the build so the diagnostics stay capturable as plain data.

use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Append-only list of diagnostic messages collected during one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warnings(Vec<String>);

impl Warnings {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a diagnostic. Earlier entries are never touched.
    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Narrowing
// ---------------------------------------------------------------------------

/// Accept only JSON objects.
#[must_use]
pub fn as_record(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object()
}

/// Accept only non-empty strings.
#[must_use]
pub fn as_string(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// Look up `key` in `record` and narrow it with [`as_string`].
#[must_use]
pub fn field_str<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    record.get(key).and_then(as_string)
}

/// Coerce an optional JSON value into a list of non-empty strings.
///
/// - Absent or `null`: empty list, no diagnostic.
/// - Present but not an array: empty list plus one warning naming `context`.
/// - Array: string items are kept (empty strings dropped silently); each
///   non-string item is skipped with its own warning.
pub fn as_string_array(value: Option<&Value>, warnings: &mut Warnings, context: &str) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };

    let items = match value {
        Value::Null => return Vec::new(),
        Value::Array(items) => items,
        other => {
            warnings.push(format!(
                "Expected {context} to be a list of strings, got {}; ignoring it.",
                json_type_name(other)
            ));
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::String(s) if s.is_empty() => {}
            Value::String(s) => out.push(s.clone()),
            other => warnings.push(format!(
                "Skipped non-string entry at {context}[{index}] ({}).",
                json_type_name(other)
            )),
        }
    }
    out
}

/// Short JSON type label used in diagnostics.
#[must_use]
pub const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
