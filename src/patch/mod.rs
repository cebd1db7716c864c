mod hunk;
mod reconstruct;

#[allow(unused_imports)]
pub use hunk::{
    classify_line, count_carriage_returns, parse_diff_hunks, parse_patch, DiffHunk, DiffHunkIter,
    DiffLine, LineType,
};
#[allow(unused_imports)]
pub use reconstruct::{modified_content, modified_content_from_hunks, ReconstructError};

use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of a raw patch body (for staleness detection by
/// downstream tooling)
pub fn compute_patch_hash(patch: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(patch.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_hash_is_stable_and_content_sensitive() {
        let a = compute_patch_hash("@@ -1,1 +1,1 @@\n-a\n+b\n");
        let b = compute_patch_hash("@@ -1,1 +1,1 @@\n-a\n+b\n");
        let c = compute_patch_hash("@@ -1,1 +1,1 @@\n-a\n+c\n");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
