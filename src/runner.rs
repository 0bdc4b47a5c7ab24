//! Generation and dispatch of acceptance tests for every resource type.
//!
//! [`AcceptanceManager`] ties the schema registry, the override manifest and
//! the external harness together. Generation is synchronous and independent
//! per resource type; a failure for one type is recorded in the
//! [`RunReport`] and never stops the others. Each type's test cases then run
//! on their own tokio task.

use crate::config::SynthesizerConfig;
use crate::error::{AccTestError, AccTestResult, HarnessError, ManifestResult};
use crate::harness::{NoHooks, ProviderHooks, TestHarness};
use crate::manifest::Manifest;
use crate::schema::SchemaRegistry;
use crate::testcase::{TestCase, TestCaseAssembler};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;

/// A test case the harness reported as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFailure {
    pub test: String,
    pub error: HarnessError,
}

/// What happened to one resource type during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceOutcome {
    /// Display names of passing test cases
    pub passed: Vec<String>,
    /// Failing test cases with the harness error
    pub failed: Vec<CaseFailure>,
    /// Set when no test cases could be generated for the type
    pub generation_error: Option<String>,
}

impl ResourceOutcome {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.generation_error.is_none()
    }
}

/// Outcome of a full acceptance run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: BTreeMap<String, ResourceOutcome>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.outcomes.values().map(|o| o.passed.len()).sum()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.values().map(|o| o.failed.len()).sum()
    }

    /// Resource types that produced no test cases.
    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.generation_error.is_some())
            .map(|(t, _)| t.as_str())
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.values().all(ResourceOutcome::is_success)
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Generates and runs acceptance tests for every registered resource type.
pub struct AcceptanceManager<H> {
    registry: SchemaRegistry,
    harness: Arc<H>,
    hooks: Arc<dyn ProviderHooks>,
    config: SynthesizerConfig,
    manifest: Option<Manifest>,
}

impl<H: TestHarness + 'static> AcceptanceManager<H> {
    pub fn new(registry: SchemaRegistry, harness: H) -> Self {
        Self {
            registry,
            harness: Arc::new(harness),
            hooks: Arc::new(NoHooks),
            config: SynthesizerConfig::default(),
            manifest: None,
        }
    }

    /// Create a manager, loading the manifest named by `config` if any.
    pub fn from_config(
        registry: SchemaRegistry,
        harness: H,
        config: SynthesizerConfig,
    ) -> ManifestResult<Self> {
        let manifest_path = config.manifest_path.clone();
        let mut manager = Self::new(registry, harness).with_config(config);
        if let Some(path) = manifest_path {
            manager.load_manifest(path)?;
        }
        Ok(manager)
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_config(mut self, config: SynthesizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach an override manifest.
    ///
    /// Entries for resource types the registry does not know are ignored.
    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.set_manifest(manifest);
        self
    }

    pub fn load_manifest<P: AsRef<Path>>(&mut self, path: P) -> ManifestResult<()> {
        let manifest = Manifest::load(path)?;
        self.set_manifest(manifest);
        Ok(())
    }

    fn set_manifest(&mut self, manifest: Manifest) {
        for resource_type in manifest.resource_types() {
            if !self.registry.contains(resource_type) {
                warn!(
                    "Manifest lists '{}' which the provider does not expose, ignoring it",
                    resource_type
                );
            }
        }
        self.manifest = Some(manifest);
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Generate the test cases of one resource type.
    ///
    /// Every call walks the schema afresh with a new generator seeded for
    /// this resource type; nothing is cached between calls or shared across
    /// resource types.
    ///
    /// # Errors
    ///
    /// * `AccTestError::UnknownResourceType` - If the registry has no such type
    /// * `AccTestError::ResourceType` - If the override file or assembly fails
    pub fn generate(&self, resource_type: &str) -> AccTestResult<Vec<TestCase>> {
        let schema = self
            .registry
            .get_schema(resource_type)
            .ok_or_else(|| AccTestError::UnknownResourceType(resource_type.to_string()))?;

        let overrides = match self
            .manifest
            .as_ref()
            .and_then(|manifest| manifest.load_overrides(resource_type))
        {
            Some(Ok(overrides)) => Some(overrides),
            Some(Err(err)) => {
                return Err(AccTestError::for_resource_type(resource_type, err.into()));
            }
            None => None,
        };

        let mut generator = self.config.generator_for(resource_type);
        TestCaseAssembler::new(&self.config)
            .with_hooks(Arc::clone(&self.hooks))
            .assemble(schema, &mut generator, overrides.as_ref())
            .map_err(|err| AccTestError::for_resource_type(resource_type, err))
    }

    /// Generate test cases for every registered resource type.
    pub fn generate_all(&self) -> BTreeMap<String, AccTestResult<Vec<TestCase>>> {
        self.registry
            .resource_types()
            .map(|resource_type| (resource_type.to_string(), self.generate(resource_type)))
            .collect()
    }

    /// Generate and run every resource type's test cases.
    ///
    /// Resource types run concurrently, one task each; the cases of a single
    /// type run in order.
    pub async fn run(&self) -> RunReport {
        let started_at = Utc::now();
        let mut outcomes = BTreeMap::new();
        let mut tasks = JoinSet::new();
        let mut task_types = HashMap::new();

        for (resource_type, generated) in self.generate_all() {
            let cases = match generated {
                Ok(cases) => cases,
                Err(err) => {
                    warn!("No tests generated for '{}': {}", resource_type, err);
                    outcomes.insert(
                        resource_type,
                        ResourceOutcome {
                            generation_error: Some(err.to_string()),
                            ..ResourceOutcome::default()
                        },
                    );
                    continue;
                }
            };

            info!(
                "Dispatching {} test case(s) for '{}'",
                cases.len(),
                resource_type
            );
            let harness = Arc::clone(&self.harness);
            let task_type = resource_type.clone();
            let handle = tasks.spawn(async move {
                let mut outcome = ResourceOutcome::default();
                for case in cases {
                    match harness.run(&case).await {
                        Ok(()) => {
                            debug!("{} passed", case.display_name());
                            outcome.passed.push(case.display_name().to_string());
                        }
                        Err(error) => {
                            warn!("{} failed: {}", case.display_name(), error);
                            outcome.failed.push(CaseFailure {
                                test: case.display_name().to_string(),
                                error,
                            });
                        }
                    }
                }
                (task_type, outcome)
            });
            task_types.insert(handle.id(), resource_type);
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((resource_type, outcome)) => {
                    outcomes.insert(resource_type, outcome);
                }
                Err(err) => {
                    let resource_type = task_types
                        .remove(&err.id())
                        .unwrap_or_else(|| "<unknown>".to_string());
                    warn!("Test task for '{}' aborted: {}", resource_type, err);
                    outcomes.insert(
                        resource_type.clone(),
                        ResourceOutcome {
                            failed: vec![CaseFailure {
                                test: resource_type,
                                error: HarnessError::Other {
                                    message: err.to_string(),
                                },
                            }],
                            ..ResourceOutcome::default()
                        },
                    );
                }
            }
        }

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        info!(
            "Acceptance run finished: {} passed, {} failed",
            report.passed(),
            report.failed()
        );
        report
    }
}
