//! End-to-end generation and execution of single test cases.

use crate::common::fixtures::{group_schema, unsupported_schema, user_schema};
use crate::common::{InMemoryHarness, RecordingHooks};
use identity_acctest::error::{AccTestError, HarnessError, SchemaError};
use identity_acctest::{
    FieldPath, SchemaRegistry, SequenceGenerator, SynthesizerConfig, TestCaseAssembler,
    TestCaseBuilder, TestHarness, declarative_to_json, json_to_declarative, walk_schema,
};
use regex::Regex;
use serde_json::{Value, json};
use std::sync::Arc;

fn path(dotted: &str) -> FieldPath {
    FieldPath::parse(dotted).unwrap()
}

fn assertion_paths(step: &identity_acctest::TestStep) -> Vec<String> {
    step.assertions.iter().map(|a| a.path.to_string()).collect()
}

#[tokio::test]
async fn test_generated_group_case_passes_in_memory() {
    let hooks = Arc::new(RecordingHooks::default());
    let config = SynthesizerConfig::default();
    let mut generator = SequenceGenerator::new();
    let cases = TestCaseAssembler::new(&config)
        .with_hooks(hooks.clone())
        .assemble(&group_schema(), &mut generator, None)
        .unwrap();

    let case = &cases[0];
    let full = &case.steps()[1];
    assert_eq!(
        full.assertions.find(&path("description")).unwrap().expected,
        "Engineering team"
    );
    assert_eq!(full.assertions.find(&path("skip_users")).unwrap().expected, "true");
    assert!(full.assertions.find(&path("id")).is_none());

    let harness = InMemoryHarness::new();
    harness.run(case).await.unwrap();

    assert_eq!(hooks.pre_check_count(), 1);
    assert_eq!(hooks.destroyed(), vec![case.resource_name()]);
    assert_eq!(harness.applied().len(), 2);
}

#[tokio::test]
async fn test_nested_user_schema_round_trips_through_harness() {
    let config = SynthesizerConfig::default();
    let mut generator = SequenceGenerator::new();
    let cases = TestCaseAssembler::new(&config)
        .assemble(&user_schema(), &mut generator, None)
        .unwrap();
    let steps = cases[0].steps();

    assert_eq!(
        assertion_paths(&steps[0]),
        vec!["login", "email", "profile.first_name", "addresses.0.street"]
    );
    assert_eq!(
        assertion_paths(&steps[1]),
        vec![
            "login",
            "email",
            "recovery_question_count",
            "profile.first_name",
            "profile.nick_name",
            "addresses.0.street",
            "addresses.0.city",
            "group_memberships.0",
        ]
    );

    for basic in &steps[0].assertions {
        let full = steps[1].assertions.find(&basic.path).unwrap();
        assert_eq!(full.expected, basic.expected);
    }

    assert!(steps[1].config.contains("profile {"));
    assert!(!steps[1].config.contains("status"));

    InMemoryHarness::new().run(&cases[0]).await.unwrap();
}

#[tokio::test]
async fn test_drifted_state_reports_mismatch() {
    let config = SynthesizerConfig::default();
    let mut generator = SequenceGenerator::new();
    let cases = TestCaseAssembler::new(&config)
        .assemble(&group_schema(), &mut generator, None)
        .unwrap();

    let harness = InMemoryHarness::new().drifting("name", "renamed-upstream");
    let error = harness.run(&cases[0]).await.unwrap_err();

    match error {
        HarnessError::Check { step, failure, .. } => {
            assert_eq!(step, 1);
            assert_eq!(failure.mismatches.len(), 1);
            assert_eq!(failure.mismatches[0].path, path("name"));
            assert_eq!(failure.mismatches[0].actual.as_deref(), Some("renamed-upstream"));
        }
        other => panic!("expected a check failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_expected_error_steps() {
    let config = SynthesizerConfig::default();
    let mut generator = SequenceGenerator::new();
    let mut builder = TestCaseBuilder::new("okta_group", &config, &mut generator);
    let instance = builder.instance_name().to_string();
    let invalid = format!(
        "resource \"okta_group\" \"{}\" {{\n  name = \"x\"\n  legacy = \"y\"\n}}\n",
        instance
    );
    let valid = format!("resource \"okta_group\" \"{}\" {{\n  name = \"x\"\n}}\n", instance);

    builder
        .add_step(invalid, Some(Regex::new("unsupported attribute").unwrap()))
        .unwrap()
        .add_step(valid.clone(), None)
        .unwrap();
    let harness = InMemoryHarness::new().rejecting("legacy");
    harness.run(&builder.build()).await.unwrap();

    builder.reset();
    builder
        .add_step(valid, Some(Regex::new("unsupported attribute").unwrap()))
        .unwrap();
    let error = harness.run(&builder.build()).await.unwrap_err();
    assert!(matches!(error, HarnessError::ExpectedErrorMissing { step: 1, .. }));
}

#[tokio::test]
async fn test_failing_pre_check_stops_before_any_step() {
    let hooks = Arc::new(RecordingHooks::failing());
    let config = SynthesizerConfig::default();
    let mut generator = SequenceGenerator::new();
    let cases = TestCaseAssembler::new(&config)
        .with_hooks(hooks.clone())
        .assemble(&group_schema(), &mut generator, None)
        .unwrap();

    let harness = InMemoryHarness::new();
    let error = harness.run(&cases[0]).await.unwrap_err();

    assert!(matches!(error, HarnessError::PreCheck { .. }));
    assert!(harness.applied().is_empty());
    assert!(hooks.destroyed().is_empty());
}

#[test]
fn test_unsupported_fields_are_skipped_not_fatal() {
    let mut generator = SequenceGenerator::new();
    let walk = walk_schema(&unsupported_schema(), &mut generator, 10);
    assert_eq!(
        walk.skipped,
        vec![SchemaError::UnsupportedKind {
            path: "conditions".to_string()
        }]
    );
    assert!(walk.tree.full.is_empty());

    let config = SynthesizerConfig::default();
    let cases = TestCaseAssembler::new(&config)
        .assemble(&unsupported_schema(), &mut generator, None)
        .unwrap();
    assert_eq!(cases.len(), 1);
    assert!(cases[0].steps().iter().all(|s| s.assertions.is_empty()));
}

#[test]
fn test_embedded_schemas_assemble() {
    let registry = SchemaRegistry::with_embedded_schemas().unwrap();
    let config = SynthesizerConfig::default().with_seed(17);

    for resource_type in registry.resource_types() {
        let schema = registry.get_schema(resource_type).unwrap();
        let mut generator = config.generator_for(resource_type);
        let cases = TestCaseAssembler::new(&config)
            .assemble(schema, &mut generator, None)
            .unwrap();

        let steps = cases[0].steps();
        assert_eq!(steps.len(), 2, "{}", resource_type);
        assert!(steps[0].assertions.len() <= steps[1].assertions.len());
        assert!(
            steps[1]
                .config
                .starts_with(&format!("resource \"{}\"", resource_type))
        );
    }
}

#[test]
fn test_example_values_win_over_random_ones() {
    let registry = SchemaRegistry::with_embedded_schemas().unwrap();
    let schema = registry.get_schema("okta_oauth_app").unwrap();
    let mut generator = SequenceGenerator::new();
    let walk = walk_schema(schema, &mut generator, 10);

    assert_eq!(walk.tree.basic.get(&path("type")), Some(&json!("web")));
    assert_eq!(
        walk.tree.full.get(&path("grant_types.0")),
        Some(&json!("authorization_code"))
    );
}

#[test]
fn test_configuration_conversion_round_trip() {
    let original = json!({
        "resource": {
            "okta_group": {
                "engineering": {
                    "name": "Engineering",
                    "skip_users": true
                }
            },
            "okta_user": {
                "jdoe": {
                    "login": "jdoe@example.com",
                    "group_memberships": ["engineering"]
                }
            }
        }
    });

    let text = json_to_declarative(&original.to_string()).unwrap();
    assert!(text.contains("resource \"okta_group\" \"engineering\""));
    assert!(text.contains("resource \"okta_user\" \"jdoe\""));

    let back: Value = serde_json::from_str(&declarative_to_json(&text).unwrap()).unwrap();
    assert_eq!(back, original);
}

#[test]
fn test_malformed_step_file_is_reported_with_snippet() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.json");
    std::fs::write(&file, "{\n  \"login\": \n}").unwrap();

    let config = SynthesizerConfig::default();
    let mut generator = SequenceGenerator::new();
    let mut builder = TestCaseBuilder::new("okta_user", &config, &mut generator);

    match builder.add_step_from_path(&file, None) {
        Err(AccTestError::Format(error)) => assert!(error.snippet().is_some()),
        other => panic!("expected a format error, got {:?}", other.map(|b| b.len())),
    }
}
