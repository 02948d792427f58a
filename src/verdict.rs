//! Verdict types and suite rollup logic

use std::time::Duration;

use colored::Colorize;

/// Severity-coded outcome of a full suite run.
///
/// The three states are distinct on purpose: a slow pass is functionally
/// correct but still fails downstream packaging, and collapsing it into
/// either neighbor loses information the operator relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every case passed and the suite finished inside the time budget
    Success,
    /// Every case passed but the suite overran the time budget
    SlowPass,
    /// At least one group had a failing case
    Failed,
}

impl Outcome {
    /// Get short code for the outcome
    pub fn code(&self) -> &'static str {
        match self {
            Outcome::Success => "OK",
            Outcome::SlowPass => "WARN",
            Outcome::Failed => "ERROR",
        }
    }

    /// Only a full success unlocks packaging and export.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Result of running a single test case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    /// Input file name
    pub name: String,
    pub passed: bool,
    pub elapsed: Duration,
    /// Unified diff of actual vs. expected output; empty iff `passed`.
    /// Informational only, never feeds the pass/fail bool.
    pub diff: String,
}

impl CaseResult {
    /// Create a passing result
    pub fn passed(name: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            name: name.into(),
            passed: true,
            elapsed,
            diff: String::new(),
        }
    }

    /// Create a failing result with its diff
    pub fn failed(name: impl Into<String>, elapsed: Duration, diff: String) -> Self {
        Self {
            name: name.into(),
            passed: false,
            elapsed,
            diff,
        }
    }
}

/// Aggregated result for one named group of cases.
#[derive(Debug, Clone)]
pub struct GroupResult {
    pub name: String,
    /// AND of every contained case result; an empty group passes
    /// vacuously
    pub passed: bool,
    pub passed_count: usize,
    pub total_count: usize,
}

impl GroupResult {
    /// Roll case results up into a group result.
    pub fn from_cases(name: impl Into<String>, results: &[CaseResult]) -> Self {
        let passed_count = results.iter().filter(|r| r.passed).count();
        Self {
            name: name.into(),
            passed: passed_count == results.len(),
            passed_count,
            total_count: results.len(),
        }
    }
}

/// Final verdict for a suite run, derived once after all groups finish.
#[derive(Debug, Clone)]
pub struct SuiteVerdict {
    pub outcome: Outcome,
    pub all_passed: bool,
    /// Wall-clock time across all groups, including bundle preparation
    pub elapsed: Duration,
    pub time_limit: Duration,
    pub within_time_limit: bool,
    pub groups: Vec<GroupResult>,
}

impl SuiteVerdict {
    /// Combine group results with the measured wall-clock time.
    pub fn from_groups(
        groups: Vec<GroupResult>,
        elapsed: Duration,
        time_limit: Duration,
    ) -> Self {
        let all_passed = groups.iter().all(|g| g.passed);
        let within_time_limit = elapsed < time_limit;
        let outcome = if !all_passed {
            Outcome::Failed
        } else if !within_time_limit {
            Outcome::SlowPass
        } else {
            Outcome::Success
        };
        Self {
            outcome,
            all_passed,
            elapsed,
            time_limit,
            within_time_limit,
            groups,
        }
    }

    /// Summary line for the operator, colored by severity.
    pub fn status_line(&self) -> String {
        let elapsed = format!("{:.2}s", self.elapsed.as_secs_f64());
        match self.outcome {
            Outcome::Failed => format!("ERROR: Test(s) failed in {elapsed}")
                .red()
                .bold()
                .to_string(),
            Outcome::SlowPass => format!(
                "WARNING: All tests passed but exceeded time limit: {elapsed} ({:.2}s over max {}s)",
                (self.elapsed - self.time_limit).as_secs_f64(),
                self.time_limit.as_secs_f64(),
            )
            .yellow()
            .bold()
            .to_string(),
            Outcome::Success => format!("All tests passed in {elapsed}")
                .green()
                .bold()
                .to_string(),
        }
    }
}
