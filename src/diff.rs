//! Output comparison
//!
//! The pass criterion is byte equality between captured stdout and the
//! expected file, with no whitespace or newline normalization. The
//! rendered diff is lossy UTF-8 and exists only for operator display.

use similar::TextDiff;

/// Outcome of comparing actual output against expected bytes.
#[derive(Debug)]
pub struct Comparison {
    pub matched: bool,
    /// Unified line diff, empty iff `matched`
    pub diff: String,
}

/// Compare captured output against the expected bytes.
pub fn compare(actual: &[u8], expected: &[u8]) -> Comparison {
    if actual == expected {
        return Comparison {
            matched: true,
            diff: String::new(),
        };
    }

    let expected_text = String::from_utf8_lossy(expected);
    let actual_text = String::from_utf8_lossy(actual);
    let mut diff = TextDiff::from_lines(expected_text.as_ref(), actual_text.as_ref())
        .unified_diff()
        .context_radius(3)
        .header("expected", "actual")
        .to_string();

    // Byte differences can vanish in the lossy conversion (two invalid
    // sequences render to the same replacement character); the mismatch
    // still needs a visible diff.
    if diff.trim().is_empty() {
        diff = "outputs differ in bytes that do not render as text\n".to_string();
    }

    Comparison {
        matched: false,
        diff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_match_with_empty_diff() {
        let cmp = compare(b"1\n2\n3\n", b"1\n2\n3\n");
        assert!(cmp.matched);
        assert!(cmp.diff.is_empty());
    }

    #[test]
    fn mismatch_produces_non_empty_diff() {
        let cmp = compare(b"1\n2\n4\n", b"1\n2\n3\n");
        assert!(!cmp.matched);
        assert!(!cmp.diff.is_empty());
        assert!(cmp.diff.contains("-3"));
        assert!(cmp.diff.contains("+4"));
    }

    #[test]
    fn trailing_newline_difference_is_a_mismatch() {
        let cmp = compare(b"1\n2\n3", b"1\n2\n3\n");
        assert!(!cmp.matched);
        assert!(!cmp.diff.is_empty());
    }

    #[test]
    fn trailing_whitespace_is_not_normalized() {
        let cmp = compare(b"ok \n", b"ok\n");
        assert!(!cmp.matched);
        assert!(!cmp.diff.is_empty());
    }

    #[test]
    fn non_utf8_difference_still_reports_a_diff() {
        // Both sides render to the same replacement character but the
        // bytes differ, so the case must fail with a visible diff.
        let cmp = compare(&[0xff, b'\n'], &[0xfe, b'\n']);
        assert!(!cmp.matched);
        assert!(!cmp.diff.is_empty());
    }

    #[test]
    fn empty_outputs_match() {
        let cmp = compare(b"", b"");
        assert!(cmp.matched);
        assert!(cmp.diff.is_empty());
    }
}
