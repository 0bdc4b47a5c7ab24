//! Declarative syntax to document parsing.

use super::ParsedResource;
use crate::error::{snippet, FormatError, FormatResult};
use crate::tree::{Document, FieldPath};

use hcl::expr::{ObjectKey, TemplateExpr};
use hcl::{Block, BlockLabel, Body, Expression, Structure};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// How a member of a parsed body was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Attribute,
    Block,
    LabeledBlock,
}

/// Parse declarative text into a structured document.
///
/// Attributes become members, unlabeled blocks become nested objects and a
/// block name repeated within one body collects into an array. Labeled
/// blocks nest one object level per label, so
/// `resource "okta_user" "test" { .. }` parses to
/// `{"resource": {"okta_user": {"test": {..}}}}`.
pub fn parse_document(text: &str) -> FormatResult<Value> {
    let body = parse_body(text)?;
    Ok(Value::Object(object_from_body(&body, None)?))
}

/// Parse text containing exactly one `resource` block.
pub fn parse_resource(text: &str) -> FormatResult<ParsedResource> {
    let mut resources = parse_resources(text)?;
    if resources.len() != 1 {
        return Err(FormatError::ResourceBlockCount {
            found: resources.len(),
        });
    }
    Ok(resources.remove(0))
}

/// Parse every `resource` block in `text`, in order of appearance.
///
/// Other top-level structures (providers, data sources, variables) are
/// accepted and ignored.
pub fn parse_resources(text: &str) -> FormatResult<Vec<ParsedResource>> {
    let body = parse_body(text)?;
    body.iter()
        .filter_map(|structure| match structure {
            Structure::Block(block) if block.identifier.to_string() == "resource" => Some(block),
            _ => None,
        })
        .map(|block| resource_from_block(block, text))
        .collect()
}

fn parse_body(text: &str) -> FormatResult<Body> {
    hcl::parse(text).map_err(|err| FormatError::parse(err.to_string(), text))
}

fn resource_from_block(block: &Block, text: &str) -> FormatResult<ParsedResource> {
    let [resource_type, instance_name] = block.labels.as_slice() else {
        return Err(FormatError::MissingLabels {
            snippet: snippet(text),
        });
    };
    let resource_type = label_string(resource_type);
    let instance_name = label_string(instance_name);
    let root = FieldPath::root(resource_type.clone()).child(instance_name.clone());
    let body = object_from_body(&block.body, Some(&root))?;

    Ok(ParsedResource {
        resource_type,
        instance_name,
        body: Document::from_map(body),
    })
}

fn label_string(label: &BlockLabel) -> String {
    match label {
        BlockLabel::String(s) => s.clone(),
        BlockLabel::Identifier(id) => id.to_string(),
    }
}

fn object_from_body(body: &Body, parent: Option<&FieldPath>) -> FormatResult<Map<String, Value>> {
    let mut object = Map::new();
    let mut origins: HashMap<String, Origin> = HashMap::new();

    for structure in body.iter() {
        match structure {
            Structure::Attribute(attr) => {
                let key = attr.key.to_string();
                let path = child_path(parent, &key);
                if origins.contains_key(&key) {
                    return Err(FormatError::Duplicate {
                        path: path.to_string(),
                    });
                }
                let value = value_from_expression(&attr.expr, &path)?;
                origins.insert(key.clone(), Origin::Attribute);
                object.insert(key, value);
            }
            Structure::Block(block) => {
                let key = block.identifier.to_string();
                let mut path = child_path(parent, &key);
                for label in &block.labels {
                    path = path.child(label_string(label));
                }

                let mut value = Value::Object(object_from_body(&block.body, Some(&path))?);
                for label in block.labels.iter().rev() {
                    let mut wrapper = Map::new();
                    wrapper.insert(label_string(label), value);
                    value = Value::Object(wrapper);
                }

                insert_block(&mut object, &mut origins, key, value, block.labels.len(), parent)?;
            }
        }
    }

    Ok(object)
}

fn insert_block(
    object: &mut Map<String, Value>,
    origins: &mut HashMap<String, Origin>,
    key: String,
    value: Value,
    labels: usize,
    parent: Option<&FieldPath>,
) -> FormatResult<()> {
    let path = child_path(parent, &key);
    let origin = if labels == 0 {
        Origin::Block
    } else {
        Origin::LabeledBlock
    };

    match (origins.get(&key).copied(), origin) {
        (None, _) => {
            origins.insert(key.clone(), origin);
            object.insert(key, value);
            Ok(())
        }
        (Some(Origin::Block), Origin::Block) => {
            if let Some(existing) = object.get_mut(&key) {
                match existing {
                    Value::Array(items) => items.push(value),
                    other => {
                        let first = std::mem::take(other);
                        *other = Value::Array(vec![first, value]);
                    }
                }
            }
            Ok(())
        }
        (Some(Origin::LabeledBlock), Origin::LabeledBlock) => match object.get_mut(&key) {
            Some(existing) => merge_labeled(existing, value, labels, &path),
            None => Ok(()),
        },
        _ => Err(FormatError::Duplicate {
            path: path.to_string(),
        }),
    }
}

/// Merge the label tree of a repeated labeled block into the existing one.
///
/// Blocks sharing every label are duplicates; blocks that differ in any
/// label land side by side.
fn merge_labeled(
    target: &mut Value,
    incoming: Value,
    depth: usize,
    path: &FieldPath,
) -> FormatResult<()> {
    let (Value::Object(target_map), Value::Object(incoming_map)) = (target, incoming) else {
        return Err(FormatError::Duplicate {
            path: path.to_string(),
        });
    };
    if depth == 0 {
        return Err(FormatError::Duplicate {
            path: path.to_string(),
        });
    }

    for (key, value) in incoming_map {
        let child = path.child(key.clone());
        match target_map.get_mut(&key) {
            Some(existing) => merge_labeled(existing, value, depth - 1, &child)?,
            None => {
                target_map.insert(key, value);
            }
        }
    }
    Ok(())
}

fn child_path(parent: Option<&FieldPath>, key: &str) -> FieldPath {
    match parent {
        Some(parent) => parent.child(key),
        None => FieldPath::root(key),
    }
}

fn value_from_expression(expr: &Expression, path: &FieldPath) -> FormatResult<Value> {
    let value = match expr {
        Expression::Null => Value::Null,
        Expression::Bool(b) => Value::Bool(*b),
        Expression::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(f) = n.as_f64().and_then(serde_json::Number::from_f64) {
                Value::Number(f)
            } else {
                Value::String(n.to_string())
            }
        }
        Expression::String(s) => Value::String(s.clone()),
        Expression::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                values.push(value_from_expression(item, &path.child(index.to_string()))?);
            }
            Value::Array(values)
        }
        Expression::Object(object) => {
            let mut map = Map::new();
            for (key, item) in object.iter() {
                let key = object_key(key, path)?;
                let value = value_from_expression(item, &path.child(key.clone()))?;
                if map.insert(key.clone(), value).is_some() {
                    return Err(FormatError::Duplicate {
                        path: path.child(key).to_string(),
                    });
                }
            }
            Value::Object(map)
        }
        Expression::TemplateExpr(template) => Value::String(template_string(template)),
        Expression::Parenthesis(inner) => value_from_expression(inner, path)?,
        other => {
            return Err(FormatError::UnsupportedExpression {
                path: path.to_string(),
                snippet: snippet(&format!("{:?}", other)),
            });
        }
    };
    Ok(value)
}

fn template_string(template: &TemplateExpr) -> String {
    match template {
        TemplateExpr::QuotedString(s) => s.clone(),
        TemplateExpr::Heredoc(heredoc) => heredoc.template.to_string(),
    }
}

fn object_key(key: &ObjectKey, path: &FieldPath) -> FormatResult<String> {
    match key {
        ObjectKey::Identifier(id) => Ok(id.to_string()),
        ObjectKey::Expression(Expression::Variable(var)) => Ok(var.as_str().to_string()),
        ObjectKey::Expression(expr) => match value_from_expression(expr, path)? {
            Value::String(s) => Ok(s),
            other => Ok(other.to_string()),
        },
        #[allow(unreachable_patterns)]
        other => Err(FormatError::UnsupportedExpression {
            path: path.to_string(),
            snippet: snippet(&format!("{:?}", other)),
        }),
    }
}
