use thiserror::Error;

use super::hunk::{parse_patch, DiffHunk, LineType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructError {
    /// A hunk references original lines that do not exist. Usually means the
    /// original content is stale relative to the patch.
    #[error("hunk references original line {line} but the original has {original_lines} lines")]
    OutOfBounds { line: usize, original_lines: usize },
}

/// Reconstruct the modified file content from the original content and a
/// unified-diff patch body.
///
/// The original is split line-ending-agnostically, so a trailing terminator
/// on the original does not survive into the output; output lines are joined
/// with `\n`.
#[allow(dead_code)]
pub fn modified_content(original: &str, patch: &str) -> Result<String, ReconstructError> {
    modified_content_from_hunks(original, &parse_patch(patch))
}

/// Same as [`modified_content`], starting from already-parsed hunks (the form
/// stored on an in-memory file change).
pub fn modified_content_from_hunks(
    original: &str,
    hunks: &[DiffHunk],
) -> Result<String, ReconstructError> {
    let left: Vec<&str> = original.lines().collect();
    let mut right: Vec<&str> = Vec::new();
    // 1-based watermark of original lines already consumed
    let mut last_common = 0usize;

    for hunk in hunks {
        // Copy the untouched span between the previous hunk and this one
        for j in last_common + 1..hunk.old_start {
            let line = left.get(j - 1).ok_or(ReconstructError::OutOfBounds {
                line: j,
                original_lines: left.len(),
            })?;
            right.push(line);
        }

        last_common = (hunk.old_start + hunk.old_len).saturating_sub(1);
        if last_common > left.len() {
            return Err(ReconstructError::OutOfBounds {
                line: last_common,
                original_lines: left.len(),
            });
        }

        // Context text comes from the hunk, not the original; a valid patch
        // guarantees they agree
        for line in &hunk.lines {
            match line.line_type {
                LineType::Delete | LineType::Control => {}
                LineType::Add | LineType::Context => right.push(line.text()),
            }
        }
    }

    // Whatever the last hunk did not reach is copied verbatim
    for j in last_common + 1..=left.len() {
        right.push(left[j - 1]);
    }

    Ok(right.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_a_single_line() {
        let result = modified_content("a\nb\nc\n", "@@ -2,1 +2,1 @@\n-b\n+B\n");
        assert_eq!(result.unwrap(), "a\nB\nc");
    }

    #[test]
    fn empty_patch_returns_original() {
        assert_eq!(modified_content("a\nb\nc", "").unwrap(), "a\nb\nc");
    }

    #[test]
    fn applies_multiple_hunks_in_order() {
        let original = "one\ntwo\nthree\nfour\nfive\nsix\nseven";
        let patch = "@@ -2,1 +2,2 @@\n two\n+two and a half\n@@ -6,1 +7,1 @@\n-six\n+SIX\n";
        let result = modified_content(original, patch).unwrap();
        assert_eq!(result, "one\ntwo\ntwo and a half\nthree\nfour\nfive\nSIX\nseven");
    }

    #[test]
    fn new_file_hunk_against_empty_original() {
        let patch = "@@ -0,0 +1,2 @@\n+fn hello() {}\n+fn world() {}\n";
        let result = modified_content("", patch).unwrap();
        assert_eq!(result, "fn hello() {}\nfn world() {}");
    }

    #[test]
    fn delete_only_hunk_drops_lines() {
        let patch = "@@ -2,2 +1,0 @@\n-b\n-c\n";
        let result = modified_content("a\nb\nc\nd", patch).unwrap();
        assert_eq!(result, "a\nd");
    }

    #[test]
    fn deletes_entire_file() {
        let patch = "@@ -1,2 +0,0 @@\n-a\n-b\n";
        assert_eq!(modified_content("a\nb", patch).unwrap(), "");
    }

    #[test]
    fn context_text_comes_from_the_hunk() {
        // A well-formed patch agrees with the original; when it does not,
        // the hunk wins
        let patch = "@@ -1,2 +1,2 @@\n CONTEXT\n-b\n+B\n";
        let result = modified_content("a\nb", patch).unwrap();
        assert_eq!(result, "CONTEXT\nB");
    }

    #[test]
    fn hunk_past_end_of_original_fails() {
        let patch = "@@ -10,1 +10,1 @@\n-x\n+y\n";
        let err = modified_content("a\nb", patch).unwrap_err();
        assert_eq!(err, ReconstructError::OutOfBounds { line: 3, original_lines: 2 });
    }

    #[test]
    fn hunk_claiming_too_many_old_lines_fails() {
        let patch = "@@ -2,5 +2,5 @@\n-b\n+B\n";
        let err = modified_content("a\nb\nc", patch).unwrap_err();
        assert_eq!(err, ReconstructError::OutOfBounds { line: 6, original_lines: 3 });
    }

    #[test]
    fn both_entry_points_agree() {
        let original = "a\nb\nc\nd\ne";
        let patch = "@@ -2,2 +2,2 @@\n-b\n+B\n c\n";
        let hunks = parse_patch(patch);
        assert_eq!(
            modified_content(original, patch),
            modified_content_from_hunks(original, &hunks)
        );
    }

    #[test]
    fn round_trips_a_before_after_pair() {
        let before = "use std::io;\n\nfn main() {\n    let x = 1;\n    println!(\"{x}\");\n}";
        let after = "use std::io;\n\nfn main() {\n    let x = 2;\n    let y = x + 1;\n    println!(\"{y}\");\n}";
        let patch = "@@ -1,6 +1,7 @@\n use std::io;\n \n fn main() {\n-    let x = 1;\n-    println!(\"{x}\");\n+    let x = 2;\n+    let y = x + 1;\n+    println!(\"{y}\");\n }\n";
        assert_eq!(modified_content(before, patch).unwrap(), after);
    }
}
