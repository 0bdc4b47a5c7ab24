//! Core schema type definitions for provider resources.
//!
//! This module contains the read-only field definitions the test synthesizer
//! walks: resource schemas, field nodes and their kinds. Schemas are supplied
//! by the surrounding provider, either built in code or deserialized from JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A resource type's schema.
///
/// Represents the declarative shape of one manageable entity such as an
/// application or a user assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Resource type name, e.g. `okta_oauth_app`
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Top-level fields in declaration order
    pub fields: Vec<SchemaNode>,
}

impl ResourceSchema {
    /// Create a schema for the given resource type.
    pub fn new(resource_type: impl Into<String>, fields: Vec<SchemaNode>) -> Self {
        Self {
            resource_type: resource_type.into(),
            description: String::new(),
            fields,
        }
    }

    /// Get a top-level field by name.
    pub fn field(&self, name: &str) -> Option<&SchemaNode> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Definition of a single field.
///
/// Composite kinds (`map`, `list`, `set`) carry an [`Element`] describing
/// what they contain; primitive kinds never do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Field name. Empty for bare list/set element schemas.
    #[serde(default)]
    pub name: String,
    /// Kind of the field
    pub kind: FieldKind,
    /// Whether the field must be configured
    #[serde(default)]
    pub required: bool,
    /// Whether the field may be configured
    #[serde(default)]
    pub optional: bool,
    /// Whether the provider fills the field in
    #[serde(default)]
    pub computed: bool,
    /// Declared default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Free-text description, may embed an `Example: "..."` literal
    #[serde(default)]
    pub description: String,
    /// Nested definition for composite kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
}

impl SchemaNode {
    fn primitive(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: true,
            ..Self::default()
        }
    }

    /// Optional string field
    pub fn string(name: impl Into<String>) -> Self {
        Self::primitive(name, FieldKind::String)
    }

    /// Optional boolean field
    pub fn bool(name: impl Into<String>) -> Self {
        Self::primitive(name, FieldKind::Bool)
    }

    /// Optional integer field
    pub fn int(name: impl Into<String>) -> Self {
        Self::primitive(name, FieldKind::Int)
    }

    /// Optional floating point field
    pub fn float(name: impl Into<String>) -> Self {
        Self::primitive(name, FieldKind::Float)
    }

    /// Optional nested block with the given fields
    pub fn map(name: impl Into<String>, fields: Vec<SchemaNode>) -> Self {
        Self {
            element: Some(Element::Fields(fields)),
            ..Self::primitive(name, FieldKind::Map)
        }
    }

    /// Optional list whose elements follow `element`
    pub fn list(name: impl Into<String>, element: Element) -> Self {
        Self {
            element: Some(element),
            ..Self::primitive(name, FieldKind::List)
        }
    }

    /// Optional set whose elements follow `element`
    pub fn set(name: impl Into<String>, element: Element) -> Self {
        Self {
            element: Some(element),
            ..Self::primitive(name, FieldKind::Set)
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    /// Mark the field as computed by the provider.
    ///
    /// The optional flag is kept as declared; the walker skips the field
    /// either way.
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// Mark the field as computed and not configurable.
    pub fn computed_only(mut self) -> Self {
        self.computed = true;
        self.optional = false;
        self.required = false;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether a configuration may set this field.
    ///
    /// Computed fields are owned by the provider and never configured, even
    /// when also marked optional. A field marked both required and computed
    /// is treated as required.
    pub fn is_settable(&self) -> bool {
        !self.computed || self.required
    }

    /// Declared boolean default, accepting `"true"`/`"false"` strings too.
    pub fn default_bool(&self) -> Option<bool> {
        match self.default.as_ref()? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Element definition of a composite field.
///
/// Deserializes from a JSON array (named nested fields) or from a single
/// object (a bare element schema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Element {
    /// Named nested fields, rendered as a nested block
    Fields(Vec<SchemaNode>),
    /// Bare element schema, e.g. the `string` in `list<string>`
    Node(Box<SchemaNode>),
}

impl Element {
    /// Bare element of the given kind.
    pub fn of(kind: FieldKind) -> Self {
        Self::Node(Box::new(SchemaNode {
            kind,
            ..SchemaNode::default()
        }))
    }

    /// Nested block element.
    pub fn fields(fields: Vec<SchemaNode>) -> Self {
        Self::Fields(fields)
    }
}

/// Field kinds understood by the synthesizer.
///
/// Kind names outside this set deserialize to [`FieldKind::Unsupported`],
/// which the walker reports and skips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// String value
    #[default]
    String,
    /// Boolean value
    Bool,
    /// Integer number
    Int,
    /// Floating point number
    Float,
    /// Nested block of named fields
    Map,
    /// Ordered collection
    List,
    /// Unordered collection
    Set,
    /// Any kind name this crate does not know
    #[serde(other)]
    Unsupported,
}

impl FieldKind {
    pub fn is_primitive(self) -> bool {
        matches!(self, Self::String | Self::Bool | Self::Int | Self::Float)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Map => "map",
            Self::List => "list",
            Self::Set => "set",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
