//! Schema-driven acceptance test synthesis for identity provider resources.
//!
//! Given only the declarative shape of a resource (field names, kinds,
//! nesting and required/optional/computed flags), this crate derives a
//! minimal configuration, a maximal configuration, the post-apply assertions
//! for both, and the declarative text the infrastructure engine applies.
//!
//! # Core Components
//!
//! - [`SchemaRegistry`] - Resource schemas by type
//! - [`TreeWalker`] - Recursive walk producing the basic and full documents
//! - [`format`] - Conversion between documents and declarative block syntax
//! - [`AssertionSet`] - Conjunctive post-apply checks
//! - [`TestCaseAssembler`] / [`TestCaseBuilder`] - Generated and hand-written test cases
//! - [`AcceptanceManager`] - Generates every type's tests and runs them through a [`TestHarness`]
//!
//! # Quick Start
//!
//! ```rust
//! use identity_acctest::{SchemaRegistry, SequenceGenerator, SynthesizerConfig, TestCaseAssembler};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::with_embedded_schemas()?;
//! let schema = registry.get_schema("okta_oauth_app").expect("embedded schema");
//!
//! let config = SynthesizerConfig::default();
//! let mut generator = SequenceGenerator::new();
//! let cases = TestCaseAssembler::new(&config).assemble(schema, &mut generator, None)?;
//!
//! let default_case = &cases[0];
//! assert_eq!(default_case.display_name(), "TestAutomatedAcc_okta_oauth_app");
//! assert_eq!(default_case.steps().len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod assertion;
pub mod config;
pub mod error;
pub mod format;
pub mod harness;
pub mod manifest;
pub mod runner;
pub mod schema;
pub mod synth;
pub mod testcase;
pub mod tree;
pub mod walker;

// Re-export commonly used types for convenience
pub use assertion::{Assertion, AssertionSet, build_assertions, flatten_attributes};
pub use config::SynthesizerConfig;
pub use error::{AccTestError, AccTestResult, FormatError, HarnessError, SchemaError};
pub use format::{ParsedResource, declarative_to_json, json_to_declarative};
pub use harness::{NoHooks, ProviderHooks, TestHarness};
pub use manifest::{Manifest, OverrideConfig};
pub use runner::{AcceptanceManager, RunReport};
pub use schema::{Element, FieldKind, ResourceSchema, SchemaNode, SchemaRegistry};
pub use synth::{RandomGenerator, SequenceGenerator, ValueGenerator, extract_example};
pub use testcase::{TestCase, TestCaseAssembler, TestCaseBuilder, TestStep};
pub use tree::{ConfigTree, Document, FieldPath, Variant};
pub use walker::{TreeWalker, WalkResult, walk_schema};
