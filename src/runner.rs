//! Runs single cases against the built artifact

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;

use crate::diff;
use crate::discovery::TestCase;
use crate::error::{Error, Result};
use crate::verdict::CaseResult;

/// Executes the built artifact against individual cases.
///
/// The artifact contract: invoked as `artifact <input_file>`, reads
/// nothing from stdin, writes case output to stdout, exits 0.
pub struct CaseRunner {
    artifact_path: PathBuf,
}

impl CaseRunner {
    pub fn new(artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
        }
    }

    /// Check the artifact exists before any case runs.
    pub fn verify_artifact(&self) -> Result<()> {
        if !self.artifact_path.is_file() {
            return Err(Error::ArtifactMissing(self.artifact_path.clone()));
        }
        Ok(())
    }

    /// Run one case: spawn the artifact on the input file, capture its
    /// stdout, and compare the bytes against the expected-output file.
    ///
    /// A non-zero exit is a harness fault, not a failed case; there is
    /// nothing meaningful to diff after a crash, so the error aborts the
    /// surrounding group and suite.
    pub async fn run(&self, case: &TestCase) -> Result<CaseResult> {
        tracing::debug!(case = %case.name, "running case");
        let start = Instant::now();
        let output = Command::new(&self.artifact_path)
            .arg(&case.input_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            // stderr passes through so crash messages reach the operator
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::ArtifactMissing(self.artifact_path.clone()),
                _ => Error::Io(e),
            })?;
        let elapsed = start.elapsed();

        if !output.status.success() {
            return Err(Error::CaseExecution {
                case: case.name.clone(),
                status: output.status,
            });
        }

        let expected = tokio::fs::read(&case.expected_path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::ExpectedOutputMissing(case.expected_path.clone())
            } else {
                Error::Io(e)
            }
        })?;

        let comparison = diff::compare(&output.stdout, &expected);
        tracing::debug!(
            case = %case.name,
            passed = comparison.matched,
            elapsed_ms = elapsed.as_millis() as u64,
            "case finished"
        );

        Ok(if comparison.matched {
            CaseResult::passed(case.name.as_str(), elapsed)
        } else {
            CaseResult::failed(case.name.as_str(), elapsed, comparison.diff)
        })
    }
}
