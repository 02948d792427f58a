//! Harness configuration

use std::env;
use std::path::PathBuf;

/// Default suite time limit in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: f64 = 60.0;

/// Harness configuration: built-in defaults with environment overrides.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of the project under test
    pub project_dir: PathBuf,

    /// Base URL test bundles are downloaded from
    pub bundle_base_url: String,

    /// Suite wall-clock budget in seconds
    pub time_limit_secs: f64,

    /// Parallel jobs handed to the CMake build
    pub build_jobs: u32,

    /// A passing case slower than this renders yellow in the report
    pub slow_case_secs: f64,

    /// Base URL for published submission links
    pub share_base_url: String,

    /// Filesystem source marker that enables the share-link export path
    pub export_marker: String,

    /// SSH host name printed in the copy hint when a link is published
    pub export_host: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// built-in defaults.
    pub fn from_env() -> Self {
        Self {
            project_dir: env::var("LABTEST_PROJECT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            bundle_base_url: env::var("LABTEST_BUNDLE_URL").unwrap_or_else(|_| {
                "https://students.cs.byu.edu/~th443/cs236_files".to_string()
            }),
            time_limit_secs: env::var("LABTEST_TIME_LIMIT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIME_LIMIT_SECS),
            build_jobs: env::var("LABTEST_BUILD_JOBS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6),
            slow_case_secs: env::var("LABTEST_SLOW_CASE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10.0),
            share_base_url: env::var("LABTEST_SHARE_BASE_URL")
                .unwrap_or_else(|_| "https://students.cs.byu.edu".to_string()),
            export_marker: env::var("LABTEST_EXPORT_MARKER")
                .unwrap_or_else(|_| "dead.cs.byu.edu".to_string()),
            export_host: env::var("LABTEST_EXPORT_HOST")
                .unwrap_or_else(|_| "schizo".to_string()),
        }
    }

    /// Full download URL for a named test bundle.
    pub fn bundle_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.bundle_base_url.trim_end_matches('/'), file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_url_joins_without_double_slash() {
        let mut config = Config::from_env();
        config.bundle_base_url = "https://example.edu/files/".to_string();
        assert_eq!(
            config.bundle_url("project1-exampleIO.zip"),
            "https://example.edu/files/project1-exampleIO.zip"
        );
    }
}
