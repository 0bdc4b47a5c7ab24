//! Conversion between structured documents and declarative block syntax.
//!
//! Generated configurations are built as JSON documents and rendered to the
//! engine's block syntax before they are applied. The reverse direction is
//! used to derive assertions from hand-written step configurations.
//!
//! # Examples
//!
//! ```rust
//! use identity_acctest::format::{parse_resource, render_resource};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = json!({ "name": "engineering", "tags": ["admins"] });
//! let text = render_resource("okta_group", "test-acc-1", &document)?;
//!
//! let parsed = parse_resource(&text)?;
//! assert_eq!(parsed.resource_type, "okta_group");
//! assert_eq!(parsed.instance_name, "test-acc-1");
//! assert_eq!(parsed.body.into_value(), document);
//! # Ok(())
//! # }
//! ```

pub mod parse;
pub mod render;


pub use parse::{parse_document, parse_resource, parse_resources};
pub use render::{render_document, render_resource};

use crate::error::{FormatError, FormatResult};
use crate::tree::Document;

/// A single `resource "<type>" "<instance>" { .. }` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResource {
    pub resource_type: String,
    pub instance_name: String,
    pub body: Document,
}

impl ParsedResource {
    /// Fully qualified resource name, `<type>.<instance>`.
    pub fn resource_name(&self) -> String {
        format!("{}.{}", self.resource_type, self.instance_name)
    }
}

/// Convert JSON configuration text to declarative text.
///
/// Top-level `resource`, `data`, `provider`, `variable`, `output` and
/// `module` members are restored as labeled blocks.
pub fn json_to_declarative(text: &str) -> FormatResult<String> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|err| FormatError::json(&err, text))?;
    render::render_config(&value)
}

/// Convert declarative text to pretty-printed JSON text.
pub fn declarative_to_json(text: &str) -> FormatResult<String> {
    let value = parse_document(text)?;
    serde_json::to_string_pretty(&value).map_err(|err| FormatError::Render {
        path: "<root>".to_string(),
        message: err.to_string(),
        snippet: crate::error::snippet(text),
    })
}
