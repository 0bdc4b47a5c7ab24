//! Override manifest and per-resource override files.
//!
//! The manifest is a YAML mapping from resource type to an override file,
//! resolved relative to the manifest's directory:
//!
//! ```yaml
//! okta_user_schema: user_schema.yaml
//! okta_oauth_app: oauth_app.yaml
//! ```
//!
//! An override file pins property values and declares additional named
//! tests:
//!
//! ```yaml
//! properties:
//!   type: web
//! tests:
//!   rotate:
//!     description: Disable key rotation after creation
//!     steps:
//!       - type: basic
//!       - type: full
//!         properties:
//!           auto_key_rotation: "false"
//! ```

use crate::error::{ManifestError, ManifestResult, PathError};
use crate::tree::{Document, FieldPath};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Resource types mapped to their override files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    base_dir: PathBuf,
    entries: BTreeMap<String, PathBuf>,
}

impl Manifest {
    /// Load a manifest file; entries resolve relative to its directory.
    pub fn load<P: AsRef<Path>>(path: P) -> ManifestResult<Self> {
        let path = path.as_ref();
        let content = read(path)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&content, base_dir, &path.display().to_string())
    }

    /// Parse manifest YAML with entries relative to `base_dir`.
    pub fn from_yaml_str(content: &str, base_dir: impl Into<PathBuf>) -> ManifestResult<Self> {
        Self::parse(content, base_dir.into(), "<inline>")
    }

    fn parse(content: &str, base_dir: PathBuf, origin: &str) -> ManifestResult<Self> {
        let entries: BTreeMap<String, PathBuf> =
            serde_yaml::from_str(content).map_err(|source| ManifestError::Parse {
                path: origin.to_string(),
                source,
            })?;
        debug!("Loaded manifest '{}' with {} entries", origin, entries.len());
        Ok(Self { base_dir, entries })
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolved override file for `resource_type`.
    pub fn override_path(&self, resource_type: &str) -> Option<PathBuf> {
        self.entries
            .get(resource_type)
            .map(|file| self.base_dir.join(file))
    }

    /// Load the override file for `resource_type`, if the manifest lists one.
    pub fn load_overrides(&self, resource_type: &str) -> Option<ManifestResult<OverrideConfig>> {
        self.override_path(resource_type).map(OverrideConfig::load)
    }
}

/// Overrides for one resource type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideConfig {
    /// Values pinned in every generated step
    pub properties: BTreeMap<FieldPath, Value>,
    /// Additional named test cases
    pub tests: BTreeMap<String, TestOverride>,
}

impl OverrideConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> ManifestResult<Self> {
        let path = path.as_ref();
        let content = read(path)?;
        serde_yaml::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml_str(content: &str) -> ManifestResult<Self> {
        serde_yaml::from_str(content).map_err(|source| ManifestError::Parse {
            path: "<inline>".to_string(),
            source,
        })
    }
}

/// A named test made of explicit steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestOverride {
    pub description: String,
    pub steps: Vec<StepOverride>,
}

/// One step of a named test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepOverride {
    /// Which generated document the step starts from
    #[serde(rename = "type")]
    pub step_type: StepType,
    /// Values set on top of the starting document
    pub properties: BTreeMap<FieldPath, Value>,
}

/// Starting document of an override step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    /// The basic configuration
    Basic,
    /// The full configuration
    #[default]
    #[serde(alias = "infer")]
    Full,
    /// An empty document; only the step's properties are set
    Custom,
}

/// Write `properties` into `document`.
///
/// With `existing_only`, a property is written only where `document` already
/// has a value, so pinned values never widen a minimal configuration.
/// Returns the number of properties written.
pub fn apply_overrides(
    document: &mut Document,
    properties: &BTreeMap<FieldPath, Value>,
    existing_only: bool,
) -> Result<usize, PathError> {
    let mut applied = 0;
    for (path, value) in properties {
        if existing_only && !document.contains(path) {
            continue;
        }
        document.set(path, value.clone())?;
        applied += 1;
    }
    Ok(applied)
}

fn read(path: &Path) -> ManifestResult<String> {
    fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.display().to_string(),
        source,
    })
}
