//! Test case discovery

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// One input/expected-output file pair. Identity is the input path; the
/// expected file is allowed to be missing until the case actually runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Input file name, shown to the operator
    pub name: String,
    pub input_path: PathBuf,
    pub expected_path: PathBuf,
}

/// Enumerate every file in `dir` whose name starts with `input_prefix`,
/// pairing each with the expected-output path derived by replacing the
/// first occurrence of `input_prefix` in the file name with
/// `output_prefix`.
///
/// Results are sorted by file name: directory listing order is not
/// reproducible across filesystems, and run order is what the operator
/// sees on screen.
pub fn discover(dir: &Path, input_prefix: &str, output_prefix: &str) -> Result<Vec<TestCase>> {
    if input_prefix.is_empty() || output_prefix.is_empty() {
        return Err(Error::InvalidConfig(
            "case file prefixes must be non-empty".to_string(),
        ));
    }

    let mut cases = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.starts_with(input_prefix) {
            continue;
        }
        let expected_name = file_name.replacen(input_prefix, output_prefix, 1);
        cases.push(TestCase {
            name: file_name,
            input_path: entry.path().to_path_buf(),
            expected_path: dir.join(expected_name),
        });
    }

    cases.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(
        dir = %dir.display(),
        input_prefix,
        output_prefix,
        count = cases.len(),
        "discovered test cases"
    );
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn pairs_inputs_with_expected_outputs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "in1");
        touch(dir.path(), "out1");
        touch(dir.path(), "in2");
        touch(dir.path(), "out2");
        touch(dir.path(), "readme.txt");

        let cases = discover(dir.path(), "in", "out").unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].name, "in1");
        assert_eq!(cases[0].expected_path, dir.path().join("out1"));
        assert_eq!(cases[1].name, "in2");
    }

    #[test]
    fn ordering_is_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "input30.txt");
        touch(dir.path(), "input10.txt");
        touch(dir.path(), "input20.txt");

        let cases = discover(dir.path(), "input", "answer").unwrap();
        let names: Vec<_> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["input10.txt", "input20.txt", "input30.txt"]);
    }

    #[test]
    fn only_first_prefix_occurrence_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "input_input5.txt");

        let cases = discover(dir.path(), "input", "answer").unwrap();
        assert_eq!(cases[0].expected_path, dir.path().join("answer_input5.txt"));
    }

    #[test]
    fn missing_expected_file_is_still_discovered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "in7");

        let cases = discover(dir.path(), "in", "out").unwrap();
        assert_eq!(cases.len(), 1);
        assert!(!cases[0].expected_path.exists());
    }

    #[test]
    fn subdirectories_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("in_subdir")).unwrap();
        touch(dir.path(), "in1");

        let cases = discover(dir.path(), "in", "out").unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].name, "in1");
    }

    #[test]
    fn empty_prefix_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            discover(dir.path(), "", "out"),
            Err(Error::InvalidConfig(_))
        ));
    }
}
