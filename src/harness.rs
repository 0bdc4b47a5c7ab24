//! Seams to the external test-execution engine.
//!
//! The crate never applies configurations itself. Assembled [`TestCase`]s are
//! handed to a [`TestHarness`], which applies each step, evaluates its
//! assertions and tears the resource down again. Provider-specific checks
//! plug in through [`ProviderHooks`].

use crate::error::HarnessError;
use crate::testcase::TestCase;

use async_trait::async_trait;

/// Executes assembled test cases against a live provider.
///
/// Implementations own timeouts, retries and resource teardown.
#[async_trait]
pub trait TestHarness: Send + Sync {
    /// Run every step of `case` in order.
    ///
    /// Implementations should call [`TestCase::pre_check`] before the first
    /// step and [`TestCase::check_destroy`] after teardown.
    ///
    /// # Errors
    ///
    /// * `HarnessError::PreCheck` - If the environment is not usable
    /// * `HarnessError::Apply` - If a step's configuration fails to apply
    /// * `HarnessError::ExpectedErrorMissing` - If a step expected to fail applied cleanly
    /// * `HarnessError::Check` - If assertions do not hold after apply
    /// * `HarnessError::DestroyCheck` - If the resource survives teardown
    async fn run(&self, case: &TestCase) -> Result<(), HarnessError>;
}

/// Provider-specific checks attached to every test case.
///
/// Both hooks default to passing.
pub trait ProviderHooks: Send + Sync {
    /// Validate credentials and environment before any step runs.
    fn pre_check(&self) -> Result<(), HarnessError> {
        Ok(())
    }

    /// Confirm that the resource no longer exists upstream.
    fn check_destroy(&self, resource_type: &str, resource_name: &str) -> Result<(), HarnessError> {
        let _ = (resource_type, resource_name);
        Ok(())
    }
}

/// Hooks that accept everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl ProviderHooks for NoHooks {}
