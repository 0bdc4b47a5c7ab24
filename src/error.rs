//! Error types for acceptance test synthesis.
//!
//! This module follows the layering used throughout the crate: a top-level
//! [`AccTestError`] that wraps the specific error families raised by the
//! format converter, the schema walker, manifest loading and the external
//! test harness.

use crate::tree::FieldPath;

/// Maximum number of characters kept when quoting offending input.
const SNIPPET_LIMIT: usize = 80;

/// Main error type for acceptance test generation.
#[derive(Debug, thiserror::Error)]
pub enum AccTestError {
    /// Malformed input to the format converter
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Manifest or override file could not be loaded
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Failure reported by the external test harness
    #[error("Harness error: {0}")]
    Harness(#[from] HarnessError),

    /// A value could not be written into a configuration document
    #[error("Path error: {0}")]
    Path(#[from] PathError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File system errors while reading schemas or step files
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Resource schema is structurally malformed
    #[error("Invalid schema for resource type '{resource_type}', field '{field}': {message}")]
    InvalidSchema {
        resource_type: String,
        field: String,
        message: String,
    },

    /// Resource type is not known to the schema registry
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    /// Step configuration does not declare the resource under test
    #[error("Step configuration does not declare resource '{resource_name}'")]
    MissingResource { resource_name: String },

    /// Test step file with an extension the builder cannot read
    #[error("Unsupported test step file '{path}': expected .json, .hcl or .tf")]
    UnsupportedStepFile { path: String },

    /// Generation failed for a single resource type
    #[error("Test generation failed for resource type '{resource_type}': {source}")]
    ResourceType {
        resource_type: String,
        #[source]
        source: Box<AccTestError>,
    },
}

/// Errors raised while converting between structured documents and the
/// declarative block syntax.
///
/// Every variant carries the offending snippet so a failing test case can be
/// traced back to the exact input that broke it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Declarative text could not be parsed
    #[error("Unable to parse declarative syntax: {message} (near `{snippet}`)")]
    Parse { message: String, snippet: String },

    /// JSON text could not be parsed
    #[error("Unable to parse JSON: {message} (near `{snippet}`)")]
    Json { message: String, snippet: String },

    /// Document could not be rendered
    #[error("Unable to render document at '{path}': {message} (value `{snippet}`)")]
    Render {
        path: String,
        message: String,
        snippet: String,
    },

    /// Key that cannot be expressed as an attribute or block name
    #[error("Invalid identifier '{key}' at '{path}'")]
    InvalidIdentifier { path: String, key: String },

    /// Expression kind with no structured-document equivalent
    #[error("Unsupported expression at '{path}': `{snippet}`")]
    UnsupportedExpression { path: String, snippet: String },

    /// Same attribute assigned twice in one body
    #[error("Duplicate definition of '{path}'")]
    Duplicate { path: String },

    /// Resource text did not contain exactly one resource block
    #[error("Expected exactly one resource block, found {found}")]
    ResourceBlockCount { found: usize },

    /// Resource block without its type and instance labels
    #[error("Resource block must carry a type and an instance label (near `{snippet}`)")]
    MissingLabels { snippet: String },
}

/// Schema shapes the tree walker cannot synthesize values for.
///
/// These never abort a walk: the offending node is skipped and the error is
/// returned alongside the walk result so the caller can log it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Field kind the walker has no handling for
    #[error("Field '{path}' has an unsupported kind")]
    UnsupportedKind { path: String },

    /// Composite field without a usable element definition
    #[error("Composite field '{path}' ({kind}) has no usable element schema")]
    MissingElement { path: String, kind: String },
}

/// Errors raised while loading the override manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// File could not be read
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid YAML for the expected structure
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors raised while writing into a path-addressed document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot set '{path}': {reason}")]
pub struct PathError {
    pub path: String,
    pub reason: String,
}

/// Failures from the external execution of a test case.
///
/// The core never raises these itself; they are defined here so harness
/// implementations share one vocabulary with the run report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarnessError {
    /// Environment or credential validation failed before any step ran
    #[error("Pre-check failed: {message}")]
    PreCheck { message: String },

    /// A step's configuration failed to apply
    #[error("Step {step} of '{test}' failed to apply: {message}")]
    Apply {
        test: String,
        step: usize,
        message: String,
    },

    /// A step expected to fail applied cleanly
    #[error("Step {step} of '{test}' expected an error matching `{pattern}`")]
    ExpectedErrorMissing {
        test: String,
        step: usize,
        pattern: String,
    },

    /// State assertions did not hold after apply
    #[error("Step {step} of '{test}': {failure}")]
    Check {
        test: String,
        step: usize,
        failure: CheckFailure,
    },

    /// Resource was still present upstream after teardown
    #[error("Resource '{resource_name}' still exists upstream after destroy")]
    DestroyCheck { resource_name: String },

    /// Any other harness failure
    #[error("Harness error: {message}")]
    Other { message: String },
}

/// Conjunctive assertion check failure, listing every mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    pub resource_name: String,
    pub mismatches: Vec<Mismatch>,
}

/// One attribute whose materialized value differed from the expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub path: FieldPath,
    pub expected: String,
    pub actual: Option<String>,
}

impl std::fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} assertion(s) failed: ",
            self.resource_name,
            self.mismatches.len()
        )?;
        for (i, m) in self.mismatches.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            match &m.actual {
                Some(actual) => write!(f, "{} expected '{}' got '{}'", m.path, m.expected, actual)?,
                None => write!(f, "{} expected '{}' got nothing", m.path, m.expected)?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for CheckFailure {}

/// Shorten input text for inclusion in an error message.
pub(crate) fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= SNIPPET_LIMIT {
        return trimmed.to_string();
    }
    let mut short: String = trimmed.chars().take(SNIPPET_LIMIT).collect();
    short.push_str("...");
    short
}

impl AccTestError {
    /// Create an I/O error for the given path
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid schema error
    pub fn invalid_schema(
        resource_type: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidSchema {
            resource_type: resource_type.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Attribute an error to the resource type it occurred for
    pub fn for_resource_type(resource_type: impl Into<String>, source: AccTestError) -> Self {
        Self::ResourceType {
            resource_type: resource_type.into(),
            source: Box::new(source),
        }
    }
}

impl FormatError {
    /// Create a declarative parse error quoting the input
    pub fn parse(message: impl Into<String>, input: &str) -> Self {
        Self::Parse {
            message: message.into(),
            snippet: snippet(input),
        }
    }

    /// Create a JSON parse error from serde's location information
    pub fn json(error: &serde_json::Error, input: &str) -> Self {
        let line = input
            .lines()
            .nth(error.line().saturating_sub(1))
            .unwrap_or(input);
        Self::Json {
            message: error.to_string(),
            snippet: snippet(line),
        }
    }

    /// The quoted input carried by this error, if any
    pub fn snippet(&self) -> Option<&str> {
        match self {
            Self::Parse { snippet, .. }
            | Self::Json { snippet, .. }
            | Self::Render { snippet, .. }
            | Self::UnsupportedExpression { snippet, .. }
            | Self::MissingLabels { snippet } => Some(snippet),
            Self::InvalidIdentifier { key, .. } => Some(key),
            Self::Duplicate { path } => Some(path),
            Self::ResourceBlockCount { .. } => None,
        }
    }
}

impl PathError {
    pub fn new(path: &FieldPath, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

// Result type aliases for convenience
pub type AccTestResult<T> = Result<T, AccTestError>;
pub type FormatResult<T> = Result<T, FormatError>;
pub type ManifestResult<T> = Result<T, ManifestError>;
