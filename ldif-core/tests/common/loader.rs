//! Fixture loading from YAML files

use serde::Deserialize;
use std::path::Path;

/// A single test case from a fixture file
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub desc: String,
    pub ldif: String,
    pub containers: Vec<ExpectedContainer>,
    /// Expected `LdifDocument::is_valid`, when the case cares
    #[serde(default)]
    pub valid: Option<bool>,
}

/// Expected container - either a bare kind name or [name, detail]
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExpectedContainer {
    /// Only the container kind is checked
    Bare(String),
    /// Kind and summary detail must both match
    WithDetail(String, String),
}

impl ExpectedContainer {
    pub fn name(&self) -> &str {
        match self {
            ExpectedContainer::Bare(name) => name,
            ExpectedContainer::WithDetail(name, _) => name,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ExpectedContainer::Bare(_) => None,
            ExpectedContainer::WithDetail(_, detail) => Some(detail),
        }
    }

    /// Compare against an actual `(name, detail)` summary.
    pub fn matches(&self, actual: &(String, Option<String>)) -> bool {
        if self.name() != actual.0 {
            return false;
        }
        match self.detail() {
            None => true,
            Some(detail) => actual.1.as_deref() == Some(detail),
        }
    }
}

impl std::fmt::Display for ExpectedContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpectedContainer::Bare(name) => write!(f, "{}", name),
            ExpectedContainer::WithDetail(name, detail) => write!(f, "{} {:?}", name, detail),
        }
    }
}

/// Load all test cases from a YAML fixture file
pub fn load_fixtures(path: &Path) -> Vec<TestCase> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));
    serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e))
}

/// Load fixtures from the standard fixtures directory
pub fn load_fixtures_by_name(name: &str) -> Vec<TestCase> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.yaml", name));
    load_fixtures(&path)
}
