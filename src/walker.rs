//! Recursive schema walk producing the basic and full configurations.
//!
//! Every node is visited by [`TreeWalker::walk_node`], which returns the
//! node's contribution to both documents instead of writing into shared
//! state. Parents compose the outcomes of their children, and each child
//! receives its own [`FieldPath`], so sibling branches never share a path
//! buffer.

use crate::error::SchemaError;
use crate::schema::{Element, FieldKind, ResourceSchema, SchemaNode};
use crate::synth::{Synthesizer, ValueGenerator};
use crate::tree::{ConfigTree, Document, FieldPath};

use log::{debug, trace};
use serde_json::{Map, Value};

/// Result of walking one resource schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkResult {
    /// The basic and full configuration documents
    pub tree: ConfigTree,
    /// Every leaf path written to `full`, in declaration order
    pub paths: Vec<FieldPath>,
    /// Nodes that were skipped, for the caller to report
    pub skipped: Vec<SchemaError>,
}

/// Contribution of a single node to the walk.
#[derive(Debug, Default)]
struct NodeOutcome {
    full: Option<Value>,
    basic: Option<Value>,
    paths: Vec<FieldPath>,
    skipped: Vec<SchemaError>,
}

impl NodeOutcome {
    fn skipped(error: SchemaError) -> Self {
        Self {
            skipped: vec![error],
            ..Self::default()
        }
    }
}

/// Outcome of walking an ordered list of named fields.
#[derive(Debug, Default)]
struct FieldsOutcome {
    full: Map<String, Value>,
    basic: Map<String, Value>,
    paths: Vec<FieldPath>,
    skipped: Vec<SchemaError>,
}

impl FieldsOutcome {
    fn into_node(self) -> NodeOutcome {
        NodeOutcome {
            full: non_empty(self.full),
            basic: non_empty(self.basic),
            paths: self.paths,
            skipped: self.skipped,
        }
    }
}

fn non_empty(map: Map<String, Value>) -> Option<Value> {
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

/// Walks resource schemas, synthesizing one value per settable leaf.
pub struct TreeWalker<'g> {
    synth: Synthesizer<'g>,
}

impl<'g> TreeWalker<'g> {
    pub fn new(generator: &'g mut dyn ValueGenerator, string_length: usize) -> Self {
        Self {
            synth: Synthesizer::new(generator, string_length),
        }
    }

    /// Walk every top-level field of `schema` in declaration order.
    pub fn walk(&mut self, schema: &ResourceSchema) -> WalkResult {
        let outcome = self.walk_fields(&schema.fields, None);

        debug!(
            "Walked '{}': {} leaf path(s), {} basic field(s), {} skipped node(s)",
            schema.resource_type,
            outcome.paths.len(),
            outcome.basic.len(),
            outcome.skipped.len()
        );

        WalkResult {
            tree: ConfigTree {
                basic: Document::from_map(outcome.basic),
                full: Document::from_map(outcome.full),
            },
            paths: outcome.paths,
            skipped: outcome.skipped,
        }
    }

    fn walk_fields(&mut self, fields: &[SchemaNode], parent: Option<&FieldPath>) -> FieldsOutcome {
        let mut outcome = FieldsOutcome::default();

        for field in fields {
            let path = match parent {
                Some(parent) => parent.child(field.name.clone()),
                None => FieldPath::root(field.name.clone()),
            };
            let child = self.walk_node(field, path, field.required);

            if let Some(full) = child.full {
                outcome.full.insert(field.name.clone(), full);
            }
            if let Some(basic) = child.basic {
                outcome.basic.insert(field.name.clone(), basic);
            }
            outcome.paths.extend(child.paths);
            outcome.skipped.extend(child.skipped);
        }

        outcome
    }

    /// Contribution of `node` at `path`.
    ///
    /// `required` is passed separately because bare collection elements carry
    /// no flags of their own and inherit the collection's.
    fn walk_node(&mut self, node: &SchemaNode, path: FieldPath, required: bool) -> NodeOutcome {
        if !node.is_settable() {
            trace!("Skipping computed field '{}'", path);
            return NodeOutcome::default();
        }

        match node.kind {
            FieldKind::String | FieldKind::Bool | FieldKind::Int | FieldKind::Float => {
                let value = Value::String(self.synth.value_for(node));
                trace!("Synthesized {} for '{}'", node.kind, path);
                NodeOutcome {
                    basic: required.then(|| value.clone()),
                    full: Some(value),
                    paths: vec![path],
                    skipped: Vec::new(),
                }
            }
            FieldKind::Map => match &node.element {
                Some(Element::Fields(fields)) => self.walk_fields(fields, Some(&path)).into_node(),
                _ => NodeOutcome::skipped(SchemaError::MissingElement {
                    path: path.to_string(),
                    kind: node.kind.to_string(),
                }),
            },
            FieldKind::List | FieldKind::Set => {
                let element_path = path.element();
                let element = match &node.element {
                    Some(Element::Node(element)) => self.walk_node(element, element_path, required),
                    Some(Element::Fields(fields)) => {
                        self.walk_fields(fields, Some(&element_path)).into_node()
                    }
                    None => {
                        return NodeOutcome::skipped(SchemaError::MissingElement {
                            path: path.to_string(),
                            kind: node.kind.to_string(),
                        });
                    }
                };
                NodeOutcome {
                    full: element.full.map(|value| Value::Array(vec![value])),
                    basic: element.basic.map(|value| Value::Array(vec![value])),
                    paths: element.paths,
                    skipped: element.skipped,
                }
            }
            FieldKind::Unsupported => NodeOutcome::skipped(SchemaError::UnsupportedKind {
                path: path.to_string(),
            }),
        }
    }
}

/// Walk `schema` with a fresh walker over `generator`.
pub fn walk_schema(
    schema: &ResourceSchema,
    generator: &mut dyn ValueGenerator,
    string_length: usize,
) -> WalkResult {
    TreeWalker::new(generator, string_length).walk(schema)
}
