//! Example extraction and literal value synthesis.
//!
//! Schema authors can embed a literal in a field description
//! (`Example: "admin@example.com"`); when present it is used verbatim.
//! Otherwise a value is synthesized from the field kind using an injected
//! [`ValueGenerator`], so tests can swap in a deterministic generator.

use crate::schema::{FieldKind, SchemaNode};

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::sync::LazyLock;

const STRING_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

static EXAMPLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bexample:?\s*"([^"]*)""#).expect("example pattern is a valid regex")
});

/// Extract the first quoted literal following the word `example`.
///
/// Matching is case-insensitive and tolerates an optional `:` and any
/// whitespace before the opening quote. Only the first match is used.
///
/// ```rust
/// use identity_acctest::synth::extract_example;
///
/// assert_eq!(
///     extract_example(r#"Primary email. Example: "admin@example.com""#),
///     Some("admin@example.com".to_string())
/// );
/// assert_eq!(extract_example("No hints here."), None);
/// ```
pub fn extract_example(description: &str) -> Option<String> {
    EXAMPLE_PATTERN
        .captures(description)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// Source of pseudo-random values for synthesized fields.
pub trait ValueGenerator {
    /// String of exactly `length` characters.
    fn random_string(&mut self, length: usize) -> String;

    /// Non-negative integer.
    fn random_int(&mut self) -> u32;
}

/// [`ValueGenerator`] backed by a seeded standard RNG.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    rng: StdRng,
}

impl RandomGenerator {
    /// Generator seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Generator with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueGenerator for RandomGenerator {
    fn random_string(&mut self, length: usize) -> String {
        (0..length)
            .map(|_| STRING_CHARSET[self.rng.gen_range(0..STRING_CHARSET.len())] as char)
            .collect()
    }

    fn random_int(&mut self) -> u32 {
        self.rng.gen_range(0..i32::MAX as u32)
    }
}

/// Deterministic [`ValueGenerator`] producing a counting sequence.
///
/// Every call yields a distinct value (`s000000001`, `s000000002`, ... for
/// strings; `1`, `2`, ... for integers), which makes walk output predictable
/// in tests and benchmarks.
#[derive(Debug, Clone, Default)]
pub struct SequenceGenerator {
    counter: u32,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values handed out so far.
    pub fn calls(&self) -> u32 {
        self.counter
    }

    fn bump(&mut self) -> u32 {
        self.counter += 1;
        self.counter
    }
}

impl ValueGenerator for SequenceGenerator {
    fn random_string(&mut self, length: usize) -> String {
        let n = self.bump();
        if length == 0 {
            return String::new();
        }
        let digits = format!("{:0>width$}", n, width = length - 1);
        let mut value = String::with_capacity(length);
        value.push('s');
        value.push_str(&digits[digits.len().saturating_sub(length - 1)..]);
        value
    }

    fn random_int(&mut self) -> u32 {
        self.bump()
    }
}

/// Produces literal values for primitive fields.
///
/// Values are returned in their canonical string form: booleans as
/// `"true"`/`"false"`, integers as decimal digits.
pub struct Synthesizer<'g> {
    generator: &'g mut dyn ValueGenerator,
    string_length: usize,
}

impl<'g> Synthesizer<'g> {
    pub fn new(generator: &'g mut dyn ValueGenerator, string_length: usize) -> Self {
        Self {
            generator,
            string_length,
        }
    }

    /// Literal for `node`, consulting its description for an example first.
    ///
    /// - strings get a random string of the configured length
    /// - booleans get the negation of their declared default, so applying
    ///   the full configuration actually changes the field
    /// - integers and floats share the integer generator
    ///
    /// Kinds without a literal generator yield an empty string, which the
    /// assertion builder later skips.
    pub fn value_for(&mut self, node: &SchemaNode) -> String {
        if let Some(example) = extract_example(&node.description) {
            trace!("Using example literal for field '{}'", node.name);
            return example;
        }

        match node.kind {
            FieldKind::String => self.generator.random_string(self.string_length),
            FieldKind::Bool => {
                if node.default_bool() == Some(true) {
                    "false".to_string()
                } else {
                    "true".to_string()
                }
            }
            FieldKind::Int | FieldKind::Float => self.generator.random_int().to_string(),
            FieldKind::Map | FieldKind::List | FieldKind::Set | FieldKind::Unsupported => {
                debug!(
                    "No literal generator for {} field '{}', leaving it empty",
                    node.kind, node.name
                );
                String::new()
            }
        }
    }
}
