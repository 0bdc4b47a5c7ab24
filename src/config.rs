//! Configuration for test synthesis.
//!
//! [`SynthesizerConfig`] carries the knobs shared by the walker, the
//! assembler and the runner. It can be built in code or deserialized from
//! YAML alongside the override manifest.

use crate::error::{ManifestError, ManifestResult};
use crate::synth::RandomGenerator;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for acceptance test synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Length of synthesized string values. Defaults to 10.
    pub string_length: usize,

    /// Prefix of generated resource instance names, e.g. `test-acc-4821`.
    pub instance_prefix: String,

    /// Prefix of test case display names, e.g. `TestAutomatedAcc_okta_user`.
    pub display_prefix: String,

    /// Override manifest mapping resource types to override files.
    pub manifest_path: Option<PathBuf>,

    /// Fixed seed for value generation. Unset means a fresh seed per run.
    pub seed: Option<u64>,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            string_length: 10,
            instance_prefix: "test-acc".to_string(),
            display_prefix: "TestAutomatedAcc_".to_string(),
            manifest_path: None,
            seed: None,
        }
    }
}

impl SynthesizerConfig {
    /// Parse a configuration from YAML. Missing keys keep their defaults.
    pub fn from_yaml_str(content: &str) -> ManifestResult<Self> {
        serde_yaml::from_str(content).map_err(|source| ManifestError::Parse {
            path: "<inline>".to_string(),
            source,
        })
    }

    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> ManifestResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = Some(path.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_string_length(mut self, length: usize) -> Self {
        self.string_length = length;
        self
    }

    /// Value generator for one resource type's walk.
    ///
    /// With a fixed seed, each resource type gets its own stream derived from
    /// the seed and the type name: repeated calls for one type yield the same
    /// values, while different types never share instance names. Without a
    /// seed each call is freshly seeded.
    pub fn generator_for(&self, resource_type: &str) -> RandomGenerator {
        match self.seed {
            Some(seed) => RandomGenerator::seeded(type_seed(seed, resource_type)),
            None => RandomGenerator::new(),
        }
    }

    /// Display name for a resource type's generated test case.
    pub fn display_name(&self, resource_type: &str) -> String {
        format!("{}{}", self.display_prefix, resource_type)
    }

    /// Instance name for a given random suffix.
    pub fn instance_name(&self, suffix: u32) -> String {
        format!("{}-{}", self.instance_prefix, suffix)
    }
}

/// Mix `resource_type` into `seed` (FNV-1a), stable across runs and platforms.
fn type_seed(seed: u64, resource_type: &str) -> u64 {
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
    resource_type
        .bytes()
        .fold(seed ^ 0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
}
