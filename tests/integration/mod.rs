//! Integration tests for acceptance test synthesis.
//!
//! Each module drives the public API end to end; none of them reach into
//! crate internals.

pub mod manifest;
pub mod runner;
pub mod scenarios;
