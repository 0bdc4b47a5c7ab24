//! # Acceptance Test Preview
//!
//! A command-line utility that shows the acceptance tests generated for a
//! resource schema without running them.
//!
//! ## Usage
//!
//! ### Preview a Schema File
//!
//! ```bash
//! cargo run --bin acctest-preview schemas/okta_group.json
//! ```
//!
//! ### Preview an Embedded Schema
//!
//! ```bash
//! cargo run --bin acctest-preview okta_oauth_app --seed 42
//! ```
//!
//! ### Apply an Override File
//!
//! ```bash
//! cargo run --bin acctest-preview okta_oauth_app --overrides tests/oauth_app.yaml
//! ```
//!
//! ## Output Example
//!
//! ```text
//! Resource type: okta_group
//!
//! Test case: TestAutomatedAcc_okta_group (okta_group.test-acc-1804289383)
//!   Step 1 (2 assertions)
//!     resource "okta_group" "test-acc-1804289383" {
//!       name = "q3v0m1k9zd"
//!       type = "OKTA_GROUP"
//!     }
//!     check name = "q3v0m1k9zd"
//!     check type = "OKTA_GROUP"
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: Tests were generated
//! - `1`: The schema or override file could not be loaded, or generation failed

use identity_acctest::manifest::OverrideConfig;
use identity_acctest::schema::{ResourceSchema, SchemaRegistry};
use identity_acctest::{SynthesizerConfig, TestCase, TestCaseAssembler};
use std::env;
use std::path::Path;
use std::process;

struct Options {
    target: String,
    seed: Option<u64>,
    overrides: Option<String>,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let options = match parse_args(&args) {
        Some(options) => options,
        None => {
            eprintln!(
                "Usage: {} <schema-file-or-embedded-type> [--seed <n>] [--overrides <file>]",
                args[0]
            );
            eprintln!();
            eprintln!("Examples:");
            eprintln!("  {} schemas/okta_group.json", args[0]);
            eprintln!("  {} okta_oauth_app --seed 42", args[0]);
            process::exit(1);
        }
    };

    let schema = match load_schema(&options.target) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("❌ Failed to load schema: {}", e);
            process::exit(1);
        }
    };

    let overrides = match options.overrides.as_deref().map(OverrideConfig::load) {
        Some(Ok(overrides)) => Some(overrides),
        Some(Err(e)) => {
            eprintln!("❌ Failed to load overrides: {}", e);
            process::exit(1);
        }
        None => None,
    };

    let mut config = SynthesizerConfig::default();
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }

    let mut generator = config.generator_for(&schema.resource_type);
    let cases = match TestCaseAssembler::new(&config).assemble(
        &schema,
        &mut generator,
        overrides.as_ref(),
    ) {
        Ok(cases) => cases,
        Err(e) => {
            eprintln!("❌ Test generation failed: {}", e);
            process::exit(1);
        }
    };

    println!("Resource type: {}", schema.resource_type);
    for case in &cases {
        print_case(case);
    }
}

fn parse_args(args: &[String]) -> Option<Options> {
    let mut target = None;
    let mut seed = None;
    let mut overrides = None;

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--seed" => seed = Some(rest.next()?.parse().ok()?),
            "--overrides" => overrides = Some(rest.next()?.clone()),
            _ if target.is_none() => target = Some(arg.clone()),
            _ => return None,
        }
    }

    Some(Options {
        target: target?,
        seed,
        overrides,
    })
}

fn load_schema(target: &str) -> Result<ResourceSchema, Box<dyn std::error::Error>> {
    let path = Path::new(target);
    if path.is_file() {
        return Ok(SchemaRegistry::load_schema_from_file(path)?);
    }

    let registry = SchemaRegistry::with_embedded_schemas()?;
    match registry.get_schema(target) {
        Some(schema) => Ok(schema.clone()),
        None => {
            let known: Vec<&str> = registry.resource_types().collect();
            Err(format!(
                "'{}' is neither a schema file nor an embedded type ({})",
                target,
                known.join(", ")
            )
            .into())
        }
    }
}

fn print_case(case: &TestCase) {
    println!();
    println!(
        "Test case: {} ({})",
        case.display_name(),
        case.resource_name()
    );
    if !case.description().is_empty() {
        println!("  {}", case.description());
    }

    for (index, step) in case.steps().iter().enumerate() {
        println!(
            "  Step {} ({} assertions)",
            index + 1,
            step.assertions.len()
        );
        for line in step.config.lines() {
            println!("    {}", line);
        }
        for assertion in &step.assertions {
            println!("    check {} = {:?}", assertion.path, assertion.expected);
        }
    }
}
