//! Override manifests loaded from disk.

use crate::common::InMemoryHarness;
use crate::common::fixtures::fixture_registry;
use identity_acctest::error::AccTestError;
use identity_acctest::{AcceptanceManager, FieldPath, Manifest, SynthesizerConfig, TestHarness};
use std::fs;
use std::path::Path;

fn path(dotted: &str) -> FieldPath {
    FieldPath::parse(dotted).unwrap()
}

fn write_manifest(dir: &Path) {
    fs::write(
        dir.join("manifest.yaml"),
        "okta_user: overrides/user.yaml\nokta_app: overrides/app.yaml\n",
    )
    .unwrap();
    fs::create_dir_all(dir.join("overrides")).unwrap();
    fs::write(
        dir.join("overrides/user.yaml"),
        r#"
properties:
  email: jdoe@example.com
  profile.nick_name: JD
tests:
  rename_login:
    description: Change the login after creation
    steps:
      - type: basic
      - type: basic
        properties:
          login: renamed
  minimal_custom:
    steps:
      - type: custom
        properties:
          login: custom
          email: custom@example.com
"#,
    )
    .unwrap();
}

#[test]
fn test_manifest_overrides_shape_generated_cases() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(dir.path());

    let manifest = Manifest::load(dir.path().join("manifest.yaml")).unwrap();
    assert_eq!(manifest.len(), 2);
    assert_eq!(
        manifest.override_path("okta_user").unwrap(),
        dir.path().join("overrides/user.yaml")
    );

    let manager = AcceptanceManager::new(fixture_registry(), InMemoryHarness::new())
        .with_manifest(manifest);
    let cases = manager.generate("okta_user").unwrap();

    let names: Vec<&str> = cases.iter().map(|c| c.display_name()).collect();
    assert_eq!(
        names,
        vec![
            "TestAutomatedAcc_okta_user",
            "TestAutomatedAcc_okta_user_minimal_custom",
            "TestAutomatedAcc_okta_user_rename_login",
        ]
    );

    let default_steps = cases[0].steps();
    let basic = &default_steps[0].assertions;
    assert_eq!(basic.find(&path("email")).unwrap().expected, "jdoe@example.com");
    assert!(basic.find(&path("profile.nick_name")).is_none());
    assert_eq!(
        default_steps[1].assertions.find(&path("profile.nick_name")).unwrap().expected,
        "JD"
    );

    let custom = cases[1].steps();
    assert_eq!(custom.len(), 1);
    // starts empty, then takes the global properties and its own
    assert_eq!(custom[0].assertions.len(), 3);
    assert_eq!(
        custom[0].assertions.find(&path("email")).unwrap().expected,
        "custom@example.com"
    );

    let rename = &cases[2];
    assert_eq!(rename.description(), "Change the login after creation");
    assert_eq!(
        rename.steps()[1].assertions.find(&path("login")).unwrap().expected,
        "renamed"
    );
    assert_ne!(
        rename.steps()[0].assertions.find(&path("login")).unwrap().expected,
        "renamed"
    );
}

#[tokio::test]
async fn test_manifest_cases_run_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(dir.path());

    let config = SynthesizerConfig::default()
        .with_manifest(dir.path().join("manifest.yaml"))
        .with_seed(3);
    let manager =
        AcceptanceManager::from_config(fixture_registry(), InMemoryHarness::new(), config)
            .unwrap();

    let harness = InMemoryHarness::new();
    for case in manager.generate("okta_user").unwrap() {
        harness.run(&case).await.unwrap();
    }
}

#[test]
fn test_broken_override_file_fails_only_its_type() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("manifest.yaml"), "okta_group: group.yaml\n").unwrap();
    fs::write(dir.path().join("group.yaml"), "properties: [not, a, mapping]\n").unwrap();

    let manager = AcceptanceManager::new(fixture_registry(), InMemoryHarness::new())
        .with_manifest(Manifest::load(dir.path().join("manifest.yaml")).unwrap());

    match manager.generate("okta_group") {
        Err(AccTestError::ResourceType { resource_type, source }) => {
            assert_eq!(resource_type, "okta_group");
            assert!(matches!(*source, AccTestError::Manifest(_)));
        }
        other => panic!("expected a manifest failure, got {:?}", other.map(|c| c.len())),
    }
    assert!(manager.generate("okta_user").is_ok());
}

#[test]
fn test_missing_manifest_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = SynthesizerConfig::default().with_manifest(dir.path().join("absent.yaml"));
    let result = AcceptanceManager::from_config(fixture_registry(), InMemoryHarness::new(), config);
    assert!(result.is_err());
}
