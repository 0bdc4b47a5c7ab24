//! Concurrent acceptance runs across resource types.

use crate::common::fixtures::{fixture_registry, unsupported_schema};
use crate::common::{InMemoryHarness, RecordingHooks, init_logging};
use identity_acctest::error::{AccTestError, HarnessError};
use identity_acctest::{AcceptanceManager, Manifest, SchemaRegistry, SynthesizerConfig};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;

#[tokio::test]
async fn test_run_every_resource_type() {
    init_logging();
    let hooks = Arc::new(RecordingHooks::default());
    let manager = AcceptanceManager::new(fixture_registry(), InMemoryHarness::new())
        .with_hooks(hooks.clone())
        .with_config(SynthesizerConfig::default().with_seed(11));

    let report = manager.run().await;

    assert!(report.is_success());
    assert_eq!(report.passed(), 2);
    assert_eq!(report.failed(), 0);
    assert_eq!(
        report.outcomes.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["okta_group", "okta_user"]
    );
    assert!(report.duration() >= chrono::Duration::zero());
    assert_eq!(hooks.pre_check_count(), 2);
    assert_eq!(hooks.destroyed().len(), 2);
}

#[tokio::test]
async fn test_failures_are_reported_per_type() {
    init_logging();
    let manager = AcceptanceManager::new(
        fixture_registry(),
        InMemoryHarness::new().drifting("login", "someone-else"),
    );

    let report = manager.run().await;

    assert!(!report.is_success());
    assert!(report.outcomes["okta_group"].is_success());
    let user = &report.outcomes["okta_user"];
    assert_eq!(user.failed.len(), 1);
    assert_eq!(user.failed[0].test, "TestAutomatedAcc_okta_user");
    assert!(matches!(user.failed[0].error, HarnessError::Check { step: 1, .. }));
}

#[tokio::test]
async fn test_pre_check_failure_fails_every_case() {
    let manager = AcceptanceManager::new(fixture_registry(), InMemoryHarness::new())
        .with_hooks(Arc::new(RecordingHooks::failing()));

    let report = manager.run().await;

    assert_eq!(report.passed(), 0);
    assert_eq!(report.failed(), 2);
    assert!(report.outcomes.values().all(|outcome| {
        outcome
            .failed
            .iter()
            .all(|f| matches!(f.error, HarnessError::PreCheck { .. }))
    }));
}

#[tokio::test]
async fn test_generation_error_skips_only_that_type() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("manifest.yaml"),
        "okta_user: missing.yaml\nokta_unknown: other.yaml\n",
    )
    .unwrap();

    let mut registry = fixture_registry();
    registry.add_schema(unsupported_schema()).unwrap();
    let manager = AcceptanceManager::new(registry, InMemoryHarness::new())
        .with_manifest(Manifest::load(dir.path().join("manifest.yaml")).unwrap());

    let report = manager.run().await;

    assert_eq!(report.skipped().collect::<Vec<_>>(), vec!["okta_user"]);
    assert!(report.outcomes["okta_group"].is_success());
    assert!(report.outcomes["okta_policy_rule"].is_success());
    assert!(!report.outcomes.contains_key("okta_unknown"));
    assert!(!report.is_success());
}

#[test]
fn test_generate_unknown_type() {
    let manager = AcceptanceManager::new(fixture_registry(), InMemoryHarness::new());
    assert!(matches!(
        manager.generate("okta_missing"),
        Err(AccTestError::UnknownResourceType(_))
    ));

    let all = manager.generate_all();
    assert_eq!(all.len(), 2);
    assert!(all.values().all(Result::is_ok));
}

#[test]
fn test_seeded_generation_is_reproducible() {
    let config = SynthesizerConfig::default().with_seed(99);
    let first = AcceptanceManager::new(fixture_registry(), InMemoryHarness::new())
        .with_config(config.clone());
    let second = AcceptanceManager::new(fixture_registry(), InMemoryHarness::new())
        .with_config(config);

    let a = first.generate("okta_user").unwrap();
    let b = second.generate("okta_user").unwrap();
    assert_eq!(a[0].instance_name(), b[0].instance_name());
    assert_eq!(a[0].steps()[1].config, b[0].steps()[1].config);
}

#[test]
fn test_seeded_generation_keeps_resource_types_apart() {
    let manager = AcceptanceManager::new(
        SchemaRegistry::with_embedded_schemas().unwrap(),
        InMemoryHarness::new(),
    )
    .with_config(SynthesizerConfig::default().with_seed(7));

    let generated = manager.generate_all();
    let instance_names: HashSet<String> = generated
        .values()
        .map(|cases| cases.as_ref().unwrap()[0].instance_name().to_string())
        .collect();
    assert_eq!(instance_names.len(), generated.len());

    let again = manager.generate_all();
    for (resource_type, cases) in &generated {
        assert_eq!(
            cases.as_ref().unwrap()[0].instance_name(),
            again[resource_type].as_ref().unwrap()[0].instance_name()
        );
    }
}
