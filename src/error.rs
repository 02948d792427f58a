//! Error types for the harness.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Harness error type.
///
/// Case mismatches are not errors; a failing test case is recorded as data
/// in its [`crate::verdict::CaseResult`]. Every variant here aborts the
/// current run.
#[derive(Error, Debug)]
pub enum Error {
    /// Build prerequisites missing or malformed
    #[error("build setup failed: {0}")]
    BuildSetup(String),

    /// The compiler itself reported failure
    #[error("project failed to compile")]
    CompileFailed,

    /// No executable artifact to run cases against
    #[error("artifact not found at {}", .0.display())]
    ArtifactMissing(PathBuf),

    /// The artifact exited non-zero while running a case. A crash
    /// invalidates comparison semantics, so this is fatal to the whole
    /// run rather than a failed case.
    #[error("artifact exited with {status} on case {case}")]
    CaseExecution { case: String, status: ExitStatus },

    /// A case's expected-output file was missing at run time
    #[error("expected output file not found: {}", .0.display())]
    ExpectedOutputMissing(PathBuf),

    /// Test bundle download failed
    #[error("failed to download {url}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Test bundle or submission archive could not be read or written
    #[error("archive error for {}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Bad harness configuration (e.g. empty case prefixes)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
