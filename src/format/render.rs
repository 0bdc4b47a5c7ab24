//! Document to declarative syntax rendering.

use crate::error::{snippet, FormatError, FormatResult};
use crate::tree::FieldPath;

use hcl::{Block, Body, Expression};
use serde_json::{Map, Value};

/// Top-level block types that carry labels, with their label count.
///
/// Used when rendering whole configuration files so that
/// `{"resource": {"okta_user": {"test": {..}}}}` becomes
/// `resource "okta_user" "test" { .. }`.
const LABELED_BLOCKS: &[(&str, usize)] = &[
    ("resource", 2),
    ("data", 2),
    ("provider", 1),
    ("variable", 1),
    ("output", 1),
    ("module", 1),
];

/// Render a document as a declarative body.
///
/// Object members become attributes, nested objects become nested blocks,
/// arrays become bracketed lists. String values stay quoted, so a
/// synthesized `"true"` is not turned into a boolean.
pub fn render_document(document: &Value) -> FormatResult<String> {
    let body = body_from_object(root_object(document)?, None)?;
    to_text(&body, document)
}

/// Render `document` as the body of `resource "<type>" "<instance>" { .. }`.
pub fn render_resource(
    resource_type: &str,
    instance_name: &str,
    document: &Value,
) -> FormatResult<String> {
    let block = resource_block(resource_type, instance_name, root_object(document)?)?;
    to_text(&Body::builder().add_block(block).build(), document)
}

/// Render a whole configuration file, restoring labeled top-level blocks.
pub(crate) fn render_config(document: &Value) -> FormatResult<String> {
    let object = root_object(document)?;
    let mut builder = Body::builder();

    for (key, value) in object {
        let path = FieldPath::root(key.clone());
        let labels = LABELED_BLOCKS
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, count)| *count);

        match (labels, value) {
            (Some(count), Value::Object(nested)) if has_label_depth(value, count) => {
                for block in labeled_blocks(key, nested, count, &path)? {
                    builder = builder.add_block(block);
                }
            }
            (_, Value::Object(nested)) => {
                validate_identifier(key, &path)?;
                builder = builder.add_block(nested_block(key, nested, &path)?);
            }
            _ => {
                validate_identifier(key, &path)?;
                builder = builder.add_attribute((key.as_str(), expression_for(value, &path)?));
            }
        }
    }

    to_text(&builder.build(), document)
}

fn root_object(document: &Value) -> FormatResult<&Map<String, Value>> {
    document.as_object().ok_or_else(|| FormatError::Render {
        path: "<root>".to_string(),
        message: "document root must be an object".to_string(),
        snippet: snippet(&document.to_string()),
    })
}

fn to_text(body: &Body, document: &Value) -> FormatResult<String> {
    hcl::to_string(body).map_err(|err| FormatError::Render {
        path: "<root>".to_string(),
        message: err.to_string(),
        snippet: snippet(&document.to_string()),
    })
}

fn resource_block(
    resource_type: &str,
    instance_name: &str,
    object: &Map<String, Value>,
) -> FormatResult<Block> {
    let mut block = Block::builder("resource")
        .add_label(resource_type)
        .add_label(instance_name)
        .build();
    block.body = body_from_object(object, None)?;
    Ok(block)
}

fn body_from_object(object: &Map<String, Value>, parent: Option<&FieldPath>) -> FormatResult<Body> {
    let mut builder = Body::builder();

    for (key, value) in object {
        let path = match parent {
            Some(parent) => parent.child(key.clone()),
            None => FieldPath::root(key.clone()),
        };
        validate_identifier(key, &path)?;

        builder = match value {
            Value::Object(nested) => builder.add_block(nested_block(key, nested, &path)?),
            _ => builder.add_attribute((key.as_str(), expression_for(value, &path)?)),
        };
    }

    Ok(builder.build())
}

fn nested_block(key: &str, object: &Map<String, Value>, path: &FieldPath) -> FormatResult<Block> {
    let mut block = Block::builder(key).build();
    block.body = body_from_object(object, Some(path))?;
    Ok(block)
}

/// Whether every branch of `value` is an object for `depth` levels.
fn has_label_depth(value: &Value, depth: usize) -> bool {
    match value {
        Value::Object(_) if depth == 0 => true,
        Value::Object(map) => !map.is_empty() && map.values().all(|v| has_label_depth(v, depth - 1)),
        _ => false,
    }
}

fn labeled_blocks(
    identifier: &str,
    object: &Map<String, Value>,
    depth: usize,
    path: &FieldPath,
) -> FormatResult<Vec<Block>> {
    let mut blocks = Vec::new();
    collect_labeled(identifier, object, depth, Vec::new(), path, &mut blocks)?;
    Ok(blocks)
}

fn collect_labeled(
    identifier: &str,
    object: &Map<String, Value>,
    depth: usize,
    labels: Vec<String>,
    path: &FieldPath,
    blocks: &mut Vec<Block>,
) -> FormatResult<()> {
    if depth == 0 {
        let mut builder = Block::builder(identifier);
        for label in labels {
            builder = builder.add_label(label);
        }
        let mut block = builder.build();
        block.body = body_from_object(object, Some(path))?;
        blocks.push(block);
        return Ok(());
    }

    for (label, value) in object {
        if let Value::Object(nested) = value {
            let mut next = labels.clone();
            next.push(label.clone());
            collect_labeled(identifier, nested, depth - 1, next, &path.child(label.clone()), blocks)?;
        }
    }
    Ok(())
}

fn expression_for(value: &Value, path: &FieldPath) -> FormatResult<Expression> {
    hcl::expr::to_expression(value).map_err(|err| FormatError::Render {
        path: path.to_string(),
        message: err.to_string(),
        snippet: snippet(&value.to_string()),
    })
}

/// Attribute and block names: a letter or underscore, then letters, digits,
/// underscores or dashes.
fn validate_identifier(key: &str, path: &FieldPath) -> FormatResult<()> {
    let mut chars = key.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(FormatError::InvalidIdentifier {
            path: path.to_string(),
            key: key.to_string(),
        })
    }
}
