//! Test case assembly.
//!
//! [`TestCaseAssembler`] turns a resource schema into the default two-step
//! test case (basic configuration, then full configuration) plus any named
//! tests declared in the resource's override file. [`TestCaseBuilder`]
//! assembles a test case from hand-written step configurations instead.

use crate::assertion::{build_assertions, AssertionSet};
use crate::config::SynthesizerConfig;
use crate::error::{AccTestError, AccTestResult, FormatError, HarnessError};
use crate::format::{self, parse_resources, render_resource};
use crate::harness::{NoHooks, ProviderHooks};
use crate::manifest::{apply_overrides, OverrideConfig, StepType};
use crate::schema::ResourceSchema;
use crate::synth::ValueGenerator;
use crate::tree::{Document, FieldPath, Variant};
use crate::walker::{walk_schema, WalkResult};

use log::{debug, info, warn};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// One apply-and-check step.
#[derive(Debug, Clone)]
pub struct TestStep {
    /// Declarative configuration to apply
    pub config: String,
    /// Checks evaluated after apply
    pub assertions: AssertionSet,
    /// When set, applying must fail with a matching error
    pub expect_error: Option<Regex>,
}

/// An ordered sequence of steps against one resource instance.
#[derive(Clone)]
pub struct TestCase {
    display_name: String,
    description: String,
    resource_type: String,
    instance_name: String,
    steps: Vec<TestStep>,
    hooks: Arc<dyn ProviderHooks>,
}

impl TestCase {
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// `<type>.<instance>`
    pub fn resource_name(&self) -> String {
        format!("{}.{}", self.resource_type, self.instance_name)
    }

    pub fn steps(&self) -> &[TestStep] {
        &self.steps
    }

    /// Run the provider's environment check.
    pub fn pre_check(&self) -> Result<(), HarnessError> {
        self.hooks.pre_check()
    }

    /// Run the provider's post-teardown check for this case's resource.
    pub fn check_destroy(&self) -> Result<(), HarnessError> {
        self.hooks
            .check_destroy(&self.resource_type, &self.resource_name())
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("display_name", &self.display_name)
            .field("resource_type", &self.resource_type)
            .field("instance_name", &self.instance_name)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

/// Builds generated test cases for resource schemas.
pub struct TestCaseAssembler<'a> {
    config: &'a SynthesizerConfig,
    hooks: Arc<dyn ProviderHooks>,
}

impl<'a> TestCaseAssembler<'a> {
    pub fn new(config: &'a SynthesizerConfig) -> Self {
        Self {
            config,
            hooks: Arc::new(NoHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Walk `schema` and assemble its test cases.
    ///
    /// The first case is always the default two-step case. Named tests from
    /// `overrides` follow in name order, each with its own instance name.
    /// Skipped schema nodes are logged and do not fail assembly.
    ///
    /// # Errors
    ///
    /// * `AccTestError::Format` - If a generated document cannot be rendered
    /// * `AccTestError::Path` - If an override conflicts with the generated shape
    pub fn assemble(
        &self,
        schema: &ResourceSchema,
        generator: &mut dyn ValueGenerator,
        overrides: Option<&OverrideConfig>,
    ) -> AccTestResult<Vec<TestCase>> {
        let resource_type = schema.resource_type.as_str();
        let walk = walk_schema(schema, generator, self.config.string_length);
        for skipped in &walk.skipped {
            warn!("Skipping field of '{}': {}", resource_type, skipped);
        }

        let mut cases = vec![self.default_case(resource_type, &walk, generator, overrides)?];

        if let Some(overrides) = overrides {
            for path in undeclared_properties(schema, overrides) {
                warn!(
                    "Override '{}' of '{}' does not name a schema field",
                    path, resource_type
                );
            }

            for (name, test) in &overrides.tests {
                if test.steps.is_empty() {
                    warn!("Named test '{}' of '{}' has no steps", name, resource_type);
                    continue;
                }

                let instance_name = self.config.instance_name(generator.random_int());
                let mut steps = Vec::with_capacity(test.steps.len());
                for step in &test.steps {
                    let mut document = match step.step_type {
                        StepType::Basic => walk.tree.basic.clone(),
                        StepType::Full => walk.tree.full.clone(),
                        StepType::Custom => Document::new(),
                    };
                    apply_overrides(
                        &mut document,
                        &overrides.properties,
                        step.step_type == StepType::Basic,
                    )?;
                    apply_overrides(&mut document, &step.properties, false)?;
                    steps.push(generated_step(
                        resource_type,
                        &instance_name,
                        &document,
                        &walk.paths,
                    )?);
                }

                cases.push(TestCase {
                    display_name: format!("{}_{}", self.config.display_name(resource_type), name),
                    description: test.description.clone(),
                    resource_type: resource_type.to_string(),
                    instance_name,
                    steps,
                    hooks: Arc::clone(&self.hooks),
                });
            }
        }

        info!(
            "Assembled {} test case(s) for '{}'",
            cases.len(),
            resource_type
        );
        Ok(cases)
    }

    fn default_case(
        &self,
        resource_type: &str,
        walk: &WalkResult,
        generator: &mut dyn ValueGenerator,
        overrides: Option<&OverrideConfig>,
    ) -> AccTestResult<TestCase> {
        let instance_name = self.config.instance_name(generator.random_int());
        let mut steps = Vec::with_capacity(Variant::ALL.len());

        for variant in Variant::ALL {
            let mut document = walk.tree.variant(variant).clone();
            if let Some(overrides) = overrides {
                apply_overrides(
                    &mut document,
                    &overrides.properties,
                    variant == Variant::Basic,
                )?;
            }
            let step = generated_step(resource_type, &instance_name, &document, &walk.paths)?;
            debug!(
                "{} step for '{}' carries {} assertion(s)",
                variant,
                resource_type,
                step.assertions.len()
            );
            steps.push(step);
        }

        Ok(TestCase {
            display_name: self.config.display_name(resource_type),
            description: format!("Basic then full configuration of {}", resource_type),
            resource_type: resource_type.to_string(),
            instance_name,
            steps,
            hooks: Arc::clone(&self.hooks),
        })
    }
}

/// Pinned properties whose top-level field the schema does not declare.
fn undeclared_properties<'o>(
    schema: &ResourceSchema,
    overrides: &'o OverrideConfig,
) -> Vec<&'o FieldPath> {
    let pinned = overrides.properties.keys();
    let per_step = overrides
        .tests
        .values()
        .flat_map(|test| test.steps.iter())
        .flat_map(|step| step.properties.keys());

    pinned
        .chain(per_step)
        .filter(|path| {
            path.segments()
                .first()
                .is_none_or(|root| schema.field(root).is_none())
        })
        .collect()
}

/// Render `document` and derive its assertions.
///
/// Assertions cover the walked paths first, then any leaf an override added
/// outside the walked shape.
fn generated_step(
    resource_type: &str,
    instance_name: &str,
    document: &Document,
    walked: &[FieldPath],
) -> AccTestResult<TestStep> {
    let config = render_resource(resource_type, instance_name, &document.to_value())?;

    let leaves = document.leaf_paths();
    let mut seen: HashSet<&FieldPath> = walked.iter().collect();
    let mut paths = walked.to_vec();
    for leaf in &leaves {
        if seen.insert(leaf) {
            paths.push(leaf.clone());
        }
    }

    let resource_name = format!("{}.{}", resource_type, instance_name);
    Ok(TestStep {
        config,
        assertions: build_assertions(resource_name, document, &paths),
        expect_error: None,
    })
}

/// Assembles a test case from hand-written step configurations.
///
/// The builder fixes the instance name up front; step configurations must
/// declare `resource "<type>" "<instance>"` using [`TestCaseBuilder::instance_name`].
///
/// ```rust
/// use identity_acctest::testcase::TestCaseBuilder;
/// use identity_acctest::{SequenceGenerator, SynthesizerConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SynthesizerConfig::default();
/// let mut generator = SequenceGenerator::new();
/// let mut builder = TestCaseBuilder::new("okta_group", &config, &mut generator);
///
/// let step = format!(
///     "resource \"okta_group\" \"{}\" {{\n  name = \"engineering\"\n}}\n",
///     builder.instance_name()
/// );
/// builder.add_step(step, None)?;
///
/// let case = builder.build();
/// assert_eq!(case.steps().len(), 1);
/// assert_eq!(case.steps()[0].assertions.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct TestCaseBuilder {
    display_name: String,
    resource_type: String,
    instance_name: String,
    steps: Vec<TestStep>,
    hooks: Arc<dyn ProviderHooks>,
}

impl TestCaseBuilder {
    pub fn new(
        resource_type: impl Into<String>,
        config: &SynthesizerConfig,
        generator: &mut dyn ValueGenerator,
    ) -> Self {
        let resource_type = resource_type.into();
        Self {
            display_name: config.display_name(&resource_type),
            instance_name: config.instance_name(generator.random_int()),
            resource_type,
            steps: Vec::new(),
            hooks: Arc::new(NoHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// `<type>.<instance>`
    pub fn resource_name(&self) -> String {
        format!("{}.{}", self.resource_type, self.instance_name)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Add a step from declarative text.
    ///
    /// Assertions are derived from the body of the resource under test.
    /// A step with `expect_error` is expected to fail, so it carries no
    /// assertions and its text is passed through as is.
    ///
    /// # Errors
    ///
    /// * `AccTestError::Format` - If the text cannot be parsed
    /// * `AccTestError::MissingResource` - If the text does not declare the resource under test
    pub fn add_step(
        &mut self,
        config: impl Into<String>,
        expect_error: Option<Regex>,
    ) -> AccTestResult<&mut Self> {
        let config = config.into();
        let resource_name = self.resource_name();

        let assertions = if expect_error.is_some() {
            AssertionSet::new(resource_name)
        } else {
            let resources = parse_resources(&config)?;
            let target = resources
                .into_iter()
                .find(|r| r.resource_type == self.resource_type && r.instance_name == self.instance_name)
                .ok_or_else(|| AccTestError::MissingResource {
                    resource_name: resource_name.clone(),
                })?;
            AssertionSet::from_document(resource_name, &target.body)
        };

        self.steps.push(TestStep {
            config,
            assertions,
            expect_error,
        });
        Ok(self)
    }

    /// Add a step from a `.json`, `.hcl` or `.tf` file.
    ///
    /// JSON files either hold a whole configuration (a top-level `resource`
    /// member) or just the body of the resource under test.
    ///
    /// # Errors
    ///
    /// * `AccTestError::UnsupportedStepFile` - For any other extension
    /// * `AccTestError::Io` - If the file cannot be read
    /// * `AccTestError::Format` - If the content cannot be converted or parsed
    pub fn add_step_from_path<P: AsRef<Path>>(
        &mut self,
        path: P,
        expect_error: Option<Regex>,
    ) -> AccTestResult<&mut Self> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|ext| ext.to_str());
        if !matches!(extension, Some("json" | "hcl" | "tf")) {
            return Err(AccTestError::UnsupportedStepFile {
                path: path.display().to_string(),
            });
        }

        let content =
            fs::read_to_string(path).map_err(|err| AccTestError::io(path.display().to_string(), err))?;

        let config = if extension == Some("json") {
            self.json_step(&content)?
        } else {
            content
        };
        debug!("Loaded step for '{}' from {}", self.resource_type, path.display());

        self.add_step(config, expect_error)
    }

    fn json_step(&self, content: &str) -> AccTestResult<String> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|err| FormatError::json(&err, content))?;

        let text = if value.get("resource").is_some() {
            format::json_to_declarative(content)?
        } else {
            render_resource(&self.resource_type, &self.instance_name, &value)?
        };
        Ok(text)
    }

    /// Drop every step added so far.
    pub fn reset(&mut self) -> &mut Self {
        self.steps.clear();
        self
    }

    pub fn build(&self) -> TestCase {
        TestCase {
            display_name: self.display_name.clone(),
            description: String::new(),
            resource_type: self.resource_type.clone(),
            instance_name: self.instance_name.clone(),
            steps: self.steps.clone(),
            hooks: Arc::clone(&self.hooks),
        }
    }
}
