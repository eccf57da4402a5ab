//! Input records, path resolution and value coercion.

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Caller-supplied record: string keys mapping to scalars or nested records.
pub type Input = Map<String, Value>;

/// Marker segment for the record root, stripped from the front of a path.
const ROOT_MARKER: &str = "$";

/// Convert a JSON value into an input record. Non-objects yield `None`.
pub fn to_input(value: Value) -> Option<Input> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// A dot-delimited path into an [`Input`], parsed once at load time.
///
/// ```
/// use roulette_features::InputPath;
/// use serde_json::json;
///
/// let path = InputPath::parse("$.user.id");
/// let input = roulette_features::to_input(json!({"user": {"id": 7}})).unwrap();
/// assert_eq!(path.resolve(&input), Some(&json!(7)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputPath {
    raw: String,
    segments: Vec<String>,
}

impl InputPath {
    /// Split a path on `.`, dropping leading `$` root markers.
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('.')
            .skip_while(|segment| *segment == ROOT_MARKER)
            .map(str::to_string)
            .collect();

        Self {
            raw: path.to_string(),
            segments,
        }
    }

    /// The path as written in the definition.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Path segments after root stripping.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walk the record one mapping level per segment.
    ///
    /// A missing key, a `null`, or a non-mapping intermediate value all
    /// resolve to `None`.
    pub fn resolve<'a>(&self, input: &'a Input) -> Option<&'a Value> {
        let mut segments = self.segments.iter();
        let Some(first) = segments.next() else {
            return None;
        };

        let mut current = input.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }

        (!current.is_null()).then_some(current)
    }
}

impl fmt::Display for InputPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Coerce an integral number to `i64`.
///
/// Unsigned values above `i64::MAX`, floats and non-numbers yield `None`.
pub fn coerce_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Coerce a string or integral number to its canonical string form.
pub fn coerce_to_string(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

/// Booleans only; no string or numeric truthiness.
pub fn coerce_to_bool(value: &Value) -> Option<bool> {
    value.as_bool()
}
