//! Checks a test log against the mustpass list it was run from.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::qpa::{TestCaseResult, TestLog};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verification {
    /// Mustpass cases with no result in the log.
    pub missing: Vec<String>,
    /// Results for cases outside the mustpass list.
    pub unexpected: Vec<String>,
    /// Results with a status that does not count as passing.
    pub failed: Vec<TestCaseResult>,
    pub passed: usize,
}

impl Verification {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.failed.is_empty()
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for case in &self.missing {
            writeln!(f, "missing: {}", case)?;
        }
        for case in &self.unexpected {
            writeln!(f, "unexpected: {}", case)?;
        }
        for result in &self.failed {
            writeln!(f, "{}: {} ({})", result.status, result.name, result.details)?;
        }
        write!(
            f,
            "{} passed, {} failed, {} missing, {} unexpected",
            self.passed,
            self.failed.len(),
            self.missing.len(),
            self.unexpected.len()
        )
    }
}

/// Compares `log` with `must_pass`. When a case appears more than once in
/// the log, its last result counts.
pub fn verify(log: &TestLog, must_pass: &[String]) -> Verification {
    let expected: HashSet<&str> = must_pass.iter().map(String::as_str).collect();
    let mut latest: HashMap<&str, &TestCaseResult> = HashMap::new();
    let mut order = Vec::new();
    for result in &log.results {
        if latest.insert(result.name.as_str(), result).is_none() {
            order.push(result.name.as_str());
        }
    }

    let mut verification = Verification::default();
    for case in must_pass {
        if !latest.contains_key(case.as_str()) {
            verification.missing.push(case.clone());
        }
    }
    for name in order {
        if !expected.contains(name) {
            verification.unexpected.push(name.to_string());
            continue;
        }
        let result = latest[name];
        if result.is_allowed() {
            verification.passed += 1;
        } else {
            verification.failed.push(result.clone());
        }
    }
    verification
}
