//! Resource schema definitions consumed by the test synthesizer.
//!
//! This module provides the read-only schema model and a registry for
//! looking schemas up by resource type.
//!
//! # Key Types
//!
//! - [`ResourceSchema`] - A resource type with its top-level fields
//! - [`SchemaNode`] - A single field definition
//! - [`FieldKind`] - Closed set of field kinds
//! - [`SchemaRegistry`] - Registry for managing and accessing schemas
//!
//! # Examples
//!
//! ```rust
//! use identity_acctest::schema::SchemaRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::with_embedded_schemas()?;
//! let oauth_app = registry.get_schema("okta_oauth_app");
//! assert!(oauth_app.is_some());
//! # Ok(())
//! # }
//! ```

pub mod embedded;
pub mod registry;
pub mod types;


// Re-export the main types for convenience
pub use registry::SchemaRegistry;
pub use types::{Element, FieldKind, ResourceSchema, SchemaNode};
