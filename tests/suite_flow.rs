//! End-to-end suite flow against a real subprocess.
//!
//! `/bin/cat <input>` satisfies the artifact contract (input path as the
//! sole argument, output on stdout, exit 0), so a case passes exactly
//! when its input bytes equal its expected bytes. A crashing artifact is
//! simulated with a small shell script.

#![cfg(unix)]

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use labtest::discovery;
use labtest::error::{Error, Result};
use labtest::runner::CaseRunner;
use labtest::scratch::Scratch;
use labtest::suite::{CaseGroup, GroupSource, SuiteAggregator};
use labtest::verdict::Outcome;

struct DirSource {
    name: &'static str,
    dir: std::path::PathBuf,
    input_prefix: &'static str,
    output_prefix: &'static str,
}

#[async_trait]
impl GroupSource for DirSource {
    async fn produce(&self, _scratch: &Scratch) -> Result<Vec<CaseGroup>> {
        Ok(vec![CaseGroup {
            name: self.name.to_string(),
            cases: discovery::discover(&self.dir, self.input_prefix, self.output_prefix)?,
        }])
    }
}

fn write_pair(dir: &Path, input: &str, expected: &str, actual: &[u8], wanted: &[u8]) {
    std::fs::write(dir.join(input), actual).unwrap();
    std::fs::write(dir.join(expected), wanted).unwrap();
}

fn echo_runner() -> CaseRunner {
    CaseRunner::new("/bin/cat")
}

/// Script that echoes every input except the one it crashes on.
fn crashing_artifact(dir: &Path, crash_on: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("artifact.sh");
    let script = format!(
        "#!/bin/sh\nif [ \"$(basename \"$1\")\" = \"{crash_on}\" ]; then exit 2; fi\ncat \"$1\"\n"
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
async fn passing_suite_within_budget_is_success() {
    let dir = tempfile::tempdir().unwrap();
    write_pair(dir.path(), "in1", "out1", b"1\n", b"1\n");
    write_pair(dir.path(), "in2", "out2", b"2\n", b"2\n");

    let runner = echo_runner();
    let aggregator = SuiteAggregator::new(&runner, Duration::from_secs(10));
    let sources: Vec<Box<dyn GroupSource>> = vec![Box::new(DirSource {
        name: "example IO",
        dir: dir.path().to_path_buf(),
        input_prefix: "in",
        output_prefix: "out",
    })];

    let scratch = Scratch::new().unwrap();
    let verdict = aggregator
        .run_suite(&sources, &scratch, Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(verdict.outcome, Outcome::Success);
    assert!(verdict.all_passed);
    assert!(verdict.within_time_limit);
    assert_eq!(verdict.groups.len(), 1);
    assert_eq!(verdict.groups[0].passed_count, 2);
}

#[tokio::test]
async fn one_mismatch_fails_the_suite_but_every_case_runs() {
    let dir = tempfile::tempdir().unwrap();
    write_pair(dir.path(), "in1", "out1", b"match\n", b"match\n");
    write_pair(dir.path(), "in2", "out2", b"actual\n", b"wanted\n");

    let runner = echo_runner();
    let aggregator = SuiteAggregator::new(&runner, Duration::from_secs(10));
    let sources: Vec<Box<dyn GroupSource>> = vec![Box::new(DirSource {
        name: "example IO",
        dir: dir.path().to_path_buf(),
        input_prefix: "in",
        output_prefix: "out",
    })];

    let scratch = Scratch::new().unwrap();
    let verdict = aggregator
        .run_suite(&sources, &scratch, Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(verdict.outcome, Outcome::Failed);
    // Mismatch on in2 did not stop in1 or the rollup
    assert_eq!(verdict.groups[0].total_count, 2);
    assert_eq!(verdict.groups[0].passed_count, 1);
}

#[tokio::test]
async fn crash_mid_group_aborts_and_skips_later_cases() {
    let dir = tempfile::tempdir().unwrap();
    write_pair(dir.path(), "in1", "out1", b"1\n", b"1\n");
    write_pair(dir.path(), "in2", "out2", b"2\n", b"2\n");
    write_pair(dir.path(), "in3", "out3", b"3\n", b"3\n");
    let artifact = crashing_artifact(dir.path(), "in2");

    let runner = CaseRunner::new(&artifact);
    let aggregator = SuiteAggregator::new(&runner, Duration::from_secs(10));
    let sources: Vec<Box<dyn GroupSource>> = vec![Box::new(DirSource {
        name: "example IO",
        dir: dir.path().to_path_buf(),
        input_prefix: "in",
        output_prefix: "out",
    })];

    let scratch = Scratch::new().unwrap();
    let err = aggregator
        .run_suite(&sources, &scratch, Duration::from_secs(60))
        .await
        .unwrap_err();

    match err {
        Error::CaseExecution { case, status } => {
            assert_eq!(case, "in2");
            assert_eq!(status.code(), Some(2));
        }
        other => panic!("expected CaseExecution, got {other:?}"),
    }
}

#[tokio::test]
async fn later_sources_run_after_earlier_ones_in_order() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    write_pair(first.path(), "in1", "out1", b"a\n", b"a\n");
    write_pair(second.path(), "input1", "answer1", b"b\n", b"b\n");

    let runner = echo_runner();
    let aggregator = SuiteAggregator::new(&runner, Duration::from_secs(10));
    let sources: Vec<Box<dyn GroupSource>> = vec![
        Box::new(DirSource {
            name: "example IO",
            dir: first.path().to_path_buf(),
            input_prefix: "in",
            output_prefix: "out",
        }),
        Box::new(DirSource {
            name: "80% pass-off",
            dir: second.path().to_path_buf(),
            input_prefix: "input",
            output_prefix: "answer",
        }),
    ];

    let scratch = Scratch::new().unwrap();
    let verdict = aggregator
        .run_suite(&sources, &scratch, Duration::from_secs(60))
        .await
        .unwrap();

    let names: Vec<_> = verdict.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["example IO", "80% pass-off"]);
    assert_eq!(verdict.outcome, Outcome::Success);
}

#[tokio::test]
async fn passing_suite_over_budget_is_a_slow_pass() {
    let dir = tempfile::tempdir().unwrap();
    write_pair(dir.path(), "in1", "out1", b"1\n", b"1\n");

    let runner = echo_runner();
    let aggregator = SuiteAggregator::new(&runner, Duration::from_secs(10));
    let sources: Vec<Box<dyn GroupSource>> = vec![Box::new(DirSource {
        name: "example IO",
        dir: dir.path().to_path_buf(),
        input_prefix: "in",
        output_prefix: "out",
    })];

    // A zero budget makes any real run overrun it
    let scratch = Scratch::new().unwrap();
    let verdict = aggregator
        .run_suite(&sources, &scratch, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(verdict.outcome, Outcome::SlowPass);
    assert!(verdict.all_passed);
    assert!(!verdict.within_time_limit);
}
