//! Test harness for running fixture cases with stochastic variations

use crate::common::{ExpectedContainer, Gen, TestCase};
use ldif_core::token::unfold;
use ldif_core::{ContainerKind, LdifContainer, LdifDocument, LdifEnumeration, ScannerOptions};

/// Result of running a test
#[derive(Debug)]
pub struct TestResult {
    pub passed: bool,
    pub input: String,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
    pub seed: u64,
    pub errors: Vec<String>,
}

/// Parse text into containers through the incremental API
pub fn collect(input: &str) -> Vec<LdifContainer> {
    collect_chunked(input, ScannerOptions::default().chunk_size)
}

/// Parse with a given reader chunk size
pub fn collect_chunked(input: &str, chunk_size: usize) -> Vec<LdifContainer> {
    LdifEnumeration::with_options(input.as_bytes(), ScannerOptions::with_chunk_size(chunk_size))
        .collect::<Result<Vec<_>, _>>()
        .expect("byte slices never fail to read")
}

/// Concatenated raw text of every part, in document order
pub fn raw_of_parts(containers: &[LdifContainer]) -> String {
    containers
        .iter()
        .flat_map(|c| c.parts())
        .map(|p| p.raw().into_owned())
        .collect()
}

/// Summarize a container as `(kind, detail)` for comparison
pub fn summarize(container: &LdifContainer) -> (String, Option<String>) {
    let detail = match container.kind() {
        ContainerKind::Version { line, .. } => line.version().map(|v| v.to_string()),
        ContainerKind::Comment(lines) => Some(
            lines
                .iter()
                .filter_map(|l| match l.kind() {
                    ldif_core::LineKind::Comment { text, .. } => Some(unfold(text.text())),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        ContainerKind::Invalid(part) => Some(part.raw().to_string()),
        ContainerKind::Record(record) => Some(match record.dn_value() {
            Some(dn) => format!("{} {}", record.kind().name(), dn),
            None => record.kind().name().to_string(),
        }),
        ContainerKind::Separator(_) | ContainerKind::Eof(_) => None,
    };
    (container.name().to_string(), detail)
}

fn format_actual(actual: &(String, Option<String>)) -> String {
    match &actual.1 {
        Some(detail) => format!("{} {:?}", actual.0, detail),
        None => actual.0.clone(),
    }
}

/// Run a single test case (canonical, no variations)
pub fn run_test(case: &TestCase) -> TestResult {
    let containers = collect(&case.ldif);
    let actual: Vec<(String, Option<String>)> = containers.iter().map(summarize).collect();

    let mut errors = Vec::new();

    if actual.len() != case.containers.len() {
        errors.push(format!(
            "Container count mismatch: expected {}, got {}",
            case.containers.len(),
            actual.len()
        ));
    }

    for (i, (act, exp)) in actual.iter().zip(case.containers.iter()).enumerate() {
        if !exp.matches(act) {
            errors.push(format!("Container {}: expected '{}', got '{}'", i, exp, format_actual(act)));
        }
    }

    let raw = raw_of_parts(&containers);
    if raw != case.ldif {
        errors.push(format!("Round trip mismatch: got {:?}", raw));
    }

    if let Some(valid) = case.valid {
        let doc = LdifDocument::parse(&case.ldif);
        if doc.is_valid() != valid {
            errors.push(format!("Expected is_valid() == {}", valid));
        }
    }

    TestResult {
        passed: errors.is_empty(),
        input: case.ldif.clone(),
        expected: case.containers.iter().map(ExpectedContainer::to_string).collect(),
        actual: actual.iter().map(format_actual).collect(),
        seed: 0,
        errors,
    }
}

/// Run test with stochastic variations
///
/// Applies independent variations:
/// - 40% chance of a comment block above
/// - 40% chance of a content record below
/// - random reader chunk size
pub fn run_with_variations(case: &TestCase, gen: &mut Gen) -> TestResult {
    let mut input = String::new();

    if gen.chance(0.4) && !case.ldif.starts_with(' ') {
        input.push_str(&gen.comment());
        input.push('\n');
    }

    input.push_str(&case.ldif);

    if gen.chance(0.4) && case.ldif.ends_with('\n') {
        input.push('\n');
        input.push_str(&gen.content_record());
    }

    let containers = collect_chunked(&input, gen.chunk_size());
    let actual: Vec<(String, Option<String>)> = containers.iter().map(summarize).collect();

    // Extra containers come from the wrapping context, so the expected
    // ones only need to appear in order.
    let mut errors = Vec::new();
    let mut exp_idx = 0;
    for act in &actual {
        if exp_idx < case.containers.len() && case.containers[exp_idx].matches(act) {
            exp_idx += 1;
        }
    }
    if exp_idx < case.containers.len() {
        errors.push(format!(
            "Missing expected containers starting at index {}: {:?}",
            exp_idx,
            &case.containers[exp_idx..]
        ));
    }

    if actual.last().map(|a| a.0.as_str()) != Some("eof") {
        errors.push("Last container is not eof".to_string());
    }

    let raw = raw_of_parts(&containers);
    if raw != input {
        errors.push(format!("Round trip mismatch: got {:?}", raw));
    }

    TestResult {
        passed: errors.is_empty(),
        input,
        expected: case.containers.iter().map(ExpectedContainer::to_string).collect(),
        actual: actual.iter().map(format_actual).collect(),
        seed: gen.seed,
        errors,
    }
}

impl TestResult {
    /// Print detailed failure info
    pub fn print_failure(&self, case_id: &str) {
        eprintln!("\n=== FAILED: {} ===", case_id);
        eprintln!("Seed: {} (set LDIF_TEST_SEED={} to reproduce)", self.seed, self.seed);
        eprintln!("\nInput:");
        eprintln!("{:?}", self.input);
        eprintln!("\nExpected containers:");
        for (i, e) in self.expected.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nActual containers:");
        for (i, e) in self.actual.iter().enumerate() {
            eprintln!("  {}: {}", i, e);
        }
        eprintln!("\nErrors:");
        for e in &self.errors {
            eprintln!("  - {}", e);
        }
    }
}
