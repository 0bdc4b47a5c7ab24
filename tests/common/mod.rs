//! Common test utilities for acceptance test synthesis.
//!
//! This module provides schema fixtures and an in-memory [`TestHarness`] that
//! "applies" a step by parsing its configuration and treating the parsed
//! resource body as the materialized state.

pub mod fixtures;

use async_trait::async_trait;
use identity_acctest::error::HarnessError;
use identity_acctest::format::parse_resources;
use identity_acctest::{ProviderHooks, TestCase, TestHarness, flatten_attributes};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Initialize logging once for tests that want to see crate output.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Harness that applies steps to an in-memory state map.
///
/// A step's parsed resource body becomes the resource state; assertions are
/// evaluated against its flattened attributes.
#[derive(Debug, Default)]
pub struct InMemoryHarness {
    rejected_attribute: Option<String>,
    drift: Option<(String, String)>,
    applied: Mutex<Vec<String>>,
}

impl InMemoryHarness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail to apply any configuration that sets `attribute` at the top level.
    pub fn rejecting(mut self, attribute: &str) -> Self {
        self.rejected_attribute = Some(attribute.to_string());
        self
    }

    /// Report `value` for `attribute` regardless of what was configured.
    pub fn drifting(mut self, attribute: &str, value: &str) -> Self {
        self.drift = Some((attribute.to_string(), value.to_string()));
        self
    }

    /// Display names of every applied step, as `<test>#<step>`.
    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn apply(&self, case: &TestCase, config: &str) -> Result<BTreeMap<String, String>, String> {
        let resources = parse_resources(config).map_err(|e| e.to_string())?;
        let resource = resources
            .into_iter()
            .find(|r| r.resource_name() == case.resource_name())
            .ok_or_else(|| format!("no resource {} in configuration", case.resource_name()))?;

        if let Some(attribute) = &self.rejected_attribute {
            if resource.body.as_map().contains_key(attribute) {
                return Err(format!("unsupported attribute '{}'", attribute));
            }
        }

        let mut state = flatten_attributes(&resource.body.to_value());
        if let Some((attribute, value)) = &self.drift {
            if state.contains_key(attribute) {
                state.insert(attribute.clone(), value.clone());
            }
        }
        Ok(state)
    }
}

#[async_trait]
impl TestHarness for InMemoryHarness {
    async fn run(&self, case: &TestCase) -> Result<(), HarnessError> {
        case.pre_check()?;

        for (index, step) in case.steps().iter().enumerate() {
            let step_number = index + 1;
            if let Ok(mut applied) = self.applied.lock() {
                applied.push(format!("{}#{}", case.display_name(), step_number));
            }

            match (self.apply(case, &step.config), &step.expect_error) {
                (Ok(_), Some(pattern)) => {
                    return Err(HarnessError::ExpectedErrorMissing {
                        test: case.display_name().to_string(),
                        step: step_number,
                        pattern: pattern.to_string(),
                    });
                }
                (Err(message), Some(pattern)) if pattern.is_match(&message) => {}
                (Err(message), _) => {
                    return Err(HarnessError::Apply {
                        test: case.display_name().to_string(),
                        step: step_number,
                        message,
                    });
                }
                (Ok(state), None) => {
                    step.assertions
                        .check(&state)
                        .map_err(|failure| HarnessError::Check {
                            test: case.display_name().to_string(),
                            step: step_number,
                            failure,
                        })?;
                }
            }
        }

        case.check_destroy()
    }
}

/// Hooks that count their invocations and can refuse the environment.
#[derive(Debug, Default)]
pub struct RecordingHooks {
    pub fail_pre_check: bool,
    pub pre_checks: AtomicUsize,
    pub destroyed: Mutex<Vec<String>>,
}

impl RecordingHooks {
    pub fn failing() -> Self {
        Self {
            fail_pre_check: true,
            ..Self::default()
        }
    }

    pub fn pre_check_count(&self) -> usize {
        self.pre_checks.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl ProviderHooks for RecordingHooks {
    fn pre_check(&self) -> Result<(), HarnessError> {
        self.pre_checks.fetch_add(1, Ordering::SeqCst);
        if self.fail_pre_check {
            return Err(HarnessError::PreCheck {
                message: "OKTA_API_TOKEN is not set".to_string(),
            });
        }
        Ok(())
    }

    fn check_destroy(&self, _resource_type: &str, resource_name: &str) -> Result<(), HarnessError> {
        if let Ok(mut destroyed) = self.destroyed.lock() {
            destroyed.push(resource_name.to_string());
        }
        Ok(())
    }
}
