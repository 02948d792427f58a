//! Group and suite orchestration
//!
//! Everything here is deliberately sequential: one subprocess, one case,
//! one group at a time, so the measured wall-clock time stays a
//! meaningful proxy for the evaluation environment's budget.

use std::io::Write;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use colored::Colorize;

use crate::discovery::TestCase;
use crate::error::Result;
use crate::runner::CaseRunner;
use crate::scratch::Scratch;
use crate::verdict::{CaseResult, GroupResult, SuiteVerdict};

/// A named, ordered collection of cases sharing one discovery convention.
#[derive(Debug, Clone)]
pub struct CaseGroup {
    pub name: String,
    pub cases: Vec<TestCase>,
}

/// Produces one or more case groups, performing whatever preparation
/// (download, extraction into scratch) is needed to materialize them.
///
/// Sources run in caller order and are never reordered or parallelized;
/// a later source may rely on filesystem state an earlier one prepared.
#[async_trait]
pub trait GroupSource: Send + Sync {
    async fn produce(&self, scratch: &Scratch) -> Result<Vec<CaseGroup>>;
}

/// Runs groups and rolls their results into a suite verdict.
pub struct SuiteAggregator<'a> {
    runner: &'a CaseRunner,
    /// Passing cases slower than this render yellow
    slow_case: Duration,
}

impl<'a> SuiteAggregator<'a> {
    pub fn new(runner: &'a CaseRunner, slow_case: Duration) -> Self {
        Self { runner, slow_case }
    }

    /// Run every case in the group in discovery order.
    ///
    /// A mismatch never stops the group: the operator should see every
    /// diff in one invocation. An execution fault does stop it, because
    /// a crashing artifact is assumed to crash on the remaining inputs
    /// as well.
    pub async fn run_group(&self, group: &CaseGroup) -> Result<GroupResult> {
        if group.cases.is_empty() {
            tracing::debug!(group = %group.name, "no cases discovered; group passes vacuously");
        }

        let mut results = Vec::with_capacity(group.cases.len());
        for case in &group.cases {
            print!("{}... ", case.name);
            std::io::stdout().flush().ok();

            let result = self.runner.run(case).await?;
            self.report_case(&result);
            results.push(result);
        }

        Ok(GroupResult::from_cases(group.name.as_str(), &results))
    }

    /// Run every group from every source in order, measuring total
    /// wall-clock time across the whole suite. Bundle preparation done
    /// by each source counts toward the measured time on purpose: the
    /// budget approximates the grading environment's total, not pure
    /// execution time.
    pub async fn run_suite(
        &self,
        sources: &[Box<dyn GroupSource>],
        scratch: &Scratch,
        time_limit: Duration,
    ) -> Result<SuiteVerdict> {
        let start = Instant::now();

        let mut groups = Vec::new();
        for source in sources {
            for group in source.produce(scratch).await? {
                println!();
                println!("Running {} cases...", group.name);
                println!();
                groups.push(self.run_group(&group).await?);
            }
        }

        let elapsed = start.elapsed();
        let verdict = SuiteVerdict::from_groups(groups, elapsed, time_limit);
        tracing::info!(
            outcome = %verdict.outcome,
            elapsed_ms = elapsed.as_millis() as u64,
            "suite finished"
        );
        Ok(verdict)
    }

    fn report_case(&self, result: &CaseResult) {
        if !result.diff.is_empty() {
            println!();
            println!("{}", result.diff);
        }

        let status = format!(
            "{} in {:.2}s",
            if result.passed { "passed" } else { "failed" },
            result.elapsed.as_secs_f64()
        );
        let line = if !result.passed {
            status.red()
        } else if result.elapsed >= self.slow_case {
            status.yellow()
        } else {
            status.green()
        };
        println!("{}", line.bold());
    }
}
