//! Schema registry for loading, managing, and accessing resource schemas.
//!
//! This module provides the SchemaRegistry which handles schema loading from
//! JSON strings and files, structural validation, and access to registered
//! schemas by resource type.

use super::embedded;
use super::types::{Element, ResourceSchema, SchemaNode};
use crate::error::{AccTestError, AccTestResult};

use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Registry of resource schemas keyed by resource type.
///
/// Iteration order is sorted by resource type so generated test suites are
/// stable between runs.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, ResourceSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the embedded identity provider schemas.
    pub fn with_embedded_schemas() -> AccTestResult<Self> {
        let mut registry = Self::new();
        for content in [
            embedded::oauth_app_schema(),
            embedded::app_user_attachment_schema(),
            embedded::user_schema_schema(),
        ] {
            registry.add_schema(Self::load_schema_from_str(content)?)?;
        }
        Ok(registry)
    }

    /// Create a registry by loading every `*.json` schema in a directory.
    pub fn from_schema_dir<P: AsRef<Path>>(schema_dir: P) -> AccTestResult<Self> {
        let dir = schema_dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| AccTestError::io(dir.display().to_string(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AccTestError::io(dir.display().to_string(), e))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut registry = Self::new();
        for path in paths {
            registry.add_schema(Self::load_schema_from_file(&path)?)?;
        }
        Ok(registry)
    }

    /// Load a schema from a JSON file.
    pub fn load_schema_from_file<P: AsRef<Path>>(path: P) -> AccTestResult<ResourceSchema> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| AccTestError::io(path.display().to_string(), e))?;
        Self::load_schema_from_str(&content)
    }

    /// Load a schema from a JSON string.
    pub fn load_schema_from_str(content: &str) -> AccTestResult<ResourceSchema> {
        let schema: ResourceSchema = serde_json::from_str(content)?;
        Self::validate_schema(&schema)?;
        Ok(schema)
    }

    /// Check the structural facts the walker relies on.
    ///
    /// Field names must be non-empty and unique among siblings, and primitive
    /// fields must not declare nested elements. Unsupported kinds are left to
    /// the walker, which skips them.
    pub fn validate_schema(schema: &ResourceSchema) -> AccTestResult<()> {
        if schema.resource_type.trim().is_empty() {
            return Err(AccTestError::invalid_schema(
                "<unnamed>",
                "type",
                "resource type cannot be empty",
            ));
        }
        Self::validate_fields(&schema.resource_type, "", &schema.fields)
    }

    fn validate_fields(resource_type: &str, parent: &str, fields: &[SchemaNode]) -> AccTestResult<()> {
        let mut seen = BTreeSet::new();
        for field in fields {
            let path = if parent.is_empty() {
                field.name.clone()
            } else {
                format!("{}.{}", parent, field.name)
            };

            if field.name.trim().is_empty() {
                return Err(AccTestError::invalid_schema(
                    resource_type,
                    parent,
                    "nested field name cannot be empty",
                ));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(AccTestError::invalid_schema(
                    resource_type,
                    path,
                    "field is declared more than once",
                ));
            }
            Self::validate_node(resource_type, &path, field)?;
        }
        Ok(())
    }

    fn validate_node(resource_type: &str, path: &str, node: &SchemaNode) -> AccTestResult<()> {
        if node.kind.is_primitive() && node.element.is_some() {
            return Err(AccTestError::invalid_schema(
                resource_type,
                path,
                format!("{} field cannot declare an element schema", node.kind),
            ));
        }
        if node.required && node.computed && !node.optional {
            debug!(
                "Field '{}' of '{}' is both required and computed; treating as required",
                path, resource_type
            );
        }

        match &node.element {
            Some(Element::Fields(fields)) => Self::validate_fields(resource_type, path, fields),
            Some(Element::Node(inner)) => {
                Self::validate_node(resource_type, &format!("{}.0", path), inner)
            }
            None => Ok(()),
        }
    }

    /// Get a schema by resource type.
    pub fn get_schema(&self, resource_type: &str) -> Option<&ResourceSchema> {
        self.schemas.get(resource_type)
    }

    /// Registered resource types, sorted.
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn contains(&self, resource_type: &str) -> bool {
        self.schemas.contains_key(resource_type)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Add a schema to the registry, replacing any schema of the same type.
    pub fn add_schema(&mut self, schema: ResourceSchema) -> AccTestResult<()> {
        Self::validate_schema(&schema)?;
        debug!(
            "Registered schema '{}' with {} top-level fields",
            schema.resource_type,
            schema.fields.len()
        );
        self.schemas.insert(schema.resource_type.clone(), schema);
        Ok(())
    }
}
