//! Test infrastructure for the LDIF parser
//!
//! Provides fixture loading, stochastic test generation, and assertion helpers.

#![allow(dead_code)]

mod generators;
mod harness;
mod loader;

pub use generators::Gen;
pub use harness::{collect, collect_chunked, raw_of_parts, run_test, run_with_variations, summarize};
pub use loader::{load_fixtures_by_name, ExpectedContainer, TestCase};
