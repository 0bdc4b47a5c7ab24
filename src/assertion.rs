//! Post-apply assertions derived from generated configurations.
//!
//! Each configured leaf becomes an [`Assertion`] that the materialized
//! resource attribute equals the configured value. An [`AssertionSet`] is
//! checked conjunctively: every assertion is evaluated and all mismatches
//! are reported together.

use crate::error::{CheckFailure, Mismatch};
use crate::tree::{Document, FieldPath};

use log::trace;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Expectation that `resource_name`'s attribute at `path` equals `expected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    pub resource_name: String,
    pub path: FieldPath,
    pub expected: String,
}

/// Ordered assertions against a single resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionSet {
    resource_name: String,
    assertions: Vec<Assertion>,
}

impl AssertionSet {
    pub fn new(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            assertions: Vec::new(),
        }
    }

    /// Assertions for every scalar leaf of `document`.
    pub fn from_document(resource_name: impl Into<String>, document: &Document) -> Self {
        build_assertions(resource_name, document, &document.leaf_paths())
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn push(&mut self, path: FieldPath, expected: impl Into<String>) {
        self.assertions.push(Assertion {
            resource_name: self.resource_name.clone(),
            path,
            expected: expected.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assertion> {
        self.assertions.iter()
    }

    /// Assertion for `path`, if one was built.
    pub fn find(&self, path: &FieldPath) -> Option<&Assertion> {
        self.assertions.iter().find(|a| &a.path == path)
    }

    /// Evaluate every assertion against flattened resource attributes.
    ///
    /// `state` maps dotted attribute paths to their string values, as
    /// produced by [`flatten_attributes`].
    pub fn check(&self, state: &BTreeMap<String, String>) -> Result<(), CheckFailure> {
        let mismatches: Vec<Mismatch> = self
            .assertions
            .iter()
            .filter_map(|assertion| {
                let actual = state.get(&assertion.path.to_string());
                if actual == Some(&assertion.expected) {
                    None
                } else {
                    Some(Mismatch {
                        path: assertion.path.clone(),
                        expected: assertion.expected.clone(),
                        actual: actual.cloned(),
                    })
                }
            })
            .collect();

        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(CheckFailure {
                resource_name: self.resource_name.clone(),
                mismatches,
            })
        }
    }
}

impl<'a> IntoIterator for &'a AssertionSet {
    type Item = &'a Assertion;
    type IntoIter = std::slice::Iter<'a, Assertion>;

    fn into_iter(self) -> Self::IntoIter {
        self.assertions.iter()
    }
}

/// Build one assertion per path whose value in `document` is a non-empty
/// scalar.
///
/// Paths that are absent, resolve to null, to an empty string, or to a
/// container are skipped.
pub fn build_assertions(
    resource_name: impl Into<String>,
    document: &Document,
    paths: &[FieldPath],
) -> AssertionSet {
    let mut set = AssertionSet::new(resource_name);

    for path in paths {
        match document.get(path).and_then(canonical_string) {
            Some(expected) if !expected.is_empty() => set.push(path.clone(), expected),
            _ => trace!("No assertion for '{}'", path),
        }
    }

    set
}

/// Canonical string form of a scalar value.
///
/// Booleans become `"true"`/`"false"` and numbers their decimal form.
/// Null and containers have no canonical form.
pub fn canonical_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Flatten a resource's attributes into dotted path keys.
///
/// Arrays additionally record their length under `<path>.#`.
pub fn flatten_attributes(value: &Value) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    if let Value::Object(map) = value {
        for (key, nested) in map {
            flatten_into(nested, key.clone(), &mut flat);
        }
    }
    flat
}

fn flatten_into(value: &Value, prefix: String, flat: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(nested, format!("{}.{}", prefix, key), flat);
            }
        }
        Value::Array(items) => {
            flat.insert(format!("{}.#", prefix), items.len().to_string());
            for (index, nested) in items.iter().enumerate() {
                flatten_into(nested, format!("{}.{}", prefix, index), flat);
            }
        }
        scalar => {
            if let Some(text) = canonical_string(scalar) {
                flat.insert(prefix, text);
            }
        }
    }
}
