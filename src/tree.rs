//! Path-addressed configuration documents.
//!
//! A [`Document`] is a JSON object whose leaves are addressed by
//! [`FieldPath`]s. Numeric segments index into arrays, every other segment
//! selects an object member. The tree walker produces a [`ConfigTree`] holding
//! the `basic` and `full` variants side by side.

use crate::error::PathError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Path segment used for the single synthesized element of a list or set.
pub const ELEMENT_SEGMENT: &str = "0";

/// Ordered, non-empty address of one field inside a document.
///
/// Paths are values: extending a path returns a new path and never mutates
/// the receiver, so sibling branches of a walk cannot observe each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Single-segment path for a top-level field.
    pub fn root(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// New path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// New path addressing the synthesized collection element.
    pub fn element(&self) -> Self {
        self.child(ELEMENT_SEGMENT)
    }

    /// Parse a dotted path such as `profile.emails.0`.
    ///
    /// Returns `None` for an empty string or an empty segment.
    pub fn parse(dotted: &str) -> Option<Self> {
        let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

impl TryFrom<String> for FieldPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid field path '{}'", value))
    }
}

fn array_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Path-addressable configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; only objects are documents.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of top-level members.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Resolve the value at `path`.
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = self.0.get(first)?;
        for segment in rest {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(array_index(segment)?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.get(path).is_some()
    }

    /// Write `value` at `path`, creating intermediate containers.
    ///
    /// A numeric segment creates (or indexes into) an array; appending at
    /// index `len` is allowed, anything past that is a gap and rejected.
    /// Descending through an existing scalar is rejected as well.
    pub fn set(&mut self, path: &FieldPath, value: Value) -> Result<(), PathError> {
        let Some((first, rest)) = path.segments().split_first() else {
            return Err(PathError::new(path, "path is empty"));
        };
        if rest.is_empty() {
            self.0.insert(first.clone(), value);
            return Ok(());
        }

        let slot = self
            .0
            .entry(first.clone())
            .or_insert_with(|| container_for(&rest[0]));
        set_in(slot, rest, value, path)
    }

    /// Every scalar leaf path, in member iteration order.
    pub fn leaf_paths(&self) -> Vec<FieldPath> {
        let mut paths = Vec::new();
        for (key, value) in &self.0 {
            collect_leaves(value, FieldPath::root(key.clone()), &mut paths);
        }
        paths
    }
}

fn container_for(segment: &str) -> Value {
    if array_index(segment).is_some() {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn set_in(
    current: &mut Value,
    segments: &[String],
    value: Value,
    full_path: &FieldPath,
) -> Result<(), PathError> {
    let Some((segment, rest)) = segments.split_first() else {
        *current = value;
        return Ok(());
    };

    let next = match current {
        Value::Object(map) => {
            if rest.is_empty() {
                map.insert(segment.clone(), value);
                return Ok(());
            }
            map.entry(segment.clone())
                .or_insert_with(|| container_for(&rest[0]))
        }
        Value::Array(items) => {
            let index = array_index(segment).ok_or_else(|| {
                PathError::new(full_path, format!("'{}' is not an array index", segment))
            })?;
            if index > items.len() {
                return Err(PathError::new(
                    full_path,
                    format!("index {} leaves a gap in an array of {}", index, items.len()),
                ));
            }
            if index == items.len() {
                items.push(rest.first().map_or(Value::Null, |s| container_for(s)));
            }
            if rest.is_empty() {
                items[index] = value;
                return Ok(());
            }
            &mut items[index]
        }
        _ => {
            return Err(PathError::new(
                full_path,
                format!("cannot descend into scalar at '{}'", segment),
            ));
        }
    };
    set_in(next, rest, value, full_path)
}

fn collect_leaves(value: &Value, path: FieldPath, paths: &mut Vec<FieldPath>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                collect_leaves(nested, path.child(key.clone()), paths);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                collect_leaves(nested, path.child(index.to_string()), paths);
            }
        }
        _ => paths.push(path),
    }
}

/// Which of the two generated configurations to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Required, non-computed fields only
    Basic,
    /// Every settable field
    Full,
}

impl Variant {
    /// Variants in the order their steps are applied.
    pub const ALL: [Variant; 2] = [Variant::Basic, Variant::Full];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The minimal and maximal configurations produced by one walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    pub basic: Document,
    pub full: Document,
}

impl ConfigTree {
    pub fn variant(&self, variant: Variant) -> &Document {
        match variant {
            Variant::Basic => &self.basic,
            Variant::Full => &self.full,
        }
    }
}
