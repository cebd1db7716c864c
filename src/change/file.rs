use serde::{Deserialize, Serialize};

use super::status::{classify, ChangeStatus, ProviderStatus};
use crate::patch::{parse_patch, DiffHunk};

/// One file-change record as delivered by the review provider
#[derive(Debug, Clone, Deserialize)]
pub struct RawFileChange {
    pub filename: String,
    #[serde(default)]
    pub previous_filename: Option<String>,
    pub status: ProviderStatus,
    /// Unified-diff patch body; absent for binary or oversized files
    #[serde(default)]
    pub patch: Option<String>,
    pub head_commit: String,
    #[serde(default)]
    pub blob_url: Option<String>,
    #[serde(default)]
    pub file_sha: Option<String>,
    #[serde(default)]
    pub previous_file_sha: Option<String>,
}

/// A change whose patch was delivered and parsed
#[derive(Debug, Clone, Serialize)]
pub struct InMemoryChange {
    pub status: ChangeStatus,
    pub filename: String,
    pub previous_filename: Option<String>,
    pub base_commit: String,
    pub head_commit: String,
    pub hunks: Vec<DiffHunk>,
    /// True when the pre-image could not be located; reconstruction must be
    /// skipped and the blob fetched from the remote store instead
    pub is_partial: bool,
    pub blob_url: Option<String>,
    pub file_sha: Option<String>,
    pub previous_file_sha: Option<String>,
}

/// A change the provider sent without patch content; the blob has to be
/// fetched from the remote store
#[derive(Debug, Clone, Serialize)]
pub struct SlimChange {
    pub status: ChangeStatus,
    pub filename: String,
    pub previous_filename: Option<String>,
    pub base_commit: String,
    pub head_commit: String,
    pub blob_url: Option<String>,
    pub file_sha: Option<String>,
    pub previous_file_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileChange {
    InMemory(InMemoryChange),
    Slim(SlimChange),
}

impl FileChange {
    pub fn status(&self) -> ChangeStatus {
        match self {
            FileChange::InMemory(c) => c.status,
            FileChange::Slim(c) => c.status,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            FileChange::InMemory(c) => &c.filename,
            FileChange::Slim(c) => &c.filename,
        }
    }

    pub fn previous_filename(&self) -> Option<&str> {
        match self {
            FileChange::InMemory(c) => c.previous_filename.as_deref(),
            FileChange::Slim(c) => c.previous_filename.as_deref(),
        }
    }

    pub fn is_partial(&self) -> bool {
        match self {
            FileChange::InMemory(c) => c.is_partial,
            FileChange::Slim(_) => false,
        }
    }

    pub fn adds(&self) -> usize {
        match self {
            FileChange::InMemory(c) => c.hunks.iter().map(|h| h.adds()).sum(),
            FileChange::Slim(_) => 0,
        }
    }

    pub fn dels(&self) -> usize {
        match self {
            FileChange::InMemory(c) => c.hunks.iter().map(|h| h.dels()).sum(),
            FileChange::Slim(_) => 0,
        }
    }
}

/// Resolve one raw provider record into the normalized change model.
///
/// `base_has` probes whether a path exists at the base commit; the repository
/// lookup itself stays with the caller. A modify probes the file's own name,
/// a rename or delete probes the name it had before.
pub fn resolve_file_change<F>(raw: &RawFileChange, base_commit: &str, base_has: F) -> FileChange
where
    F: Fn(&str) -> bool,
{
    let status = classify(raw.status);

    let patch = match &raw.patch {
        Some(patch) => patch,
        None => {
            return FileChange::Slim(SlimChange {
                status,
                filename: raw.filename.clone(),
                previous_filename: raw.previous_filename.clone(),
                base_commit: base_commit.to_string(),
                head_commit: raw.head_commit.clone(),
                blob_url: raw.blob_url.clone(),
                file_sha: raw.file_sha.clone(),
                previous_file_sha: raw.previous_file_sha.clone(),
            });
        }
    };

    let original_exists = match status {
        ChangeStatus::Modify => base_has(&raw.filename),
        ChangeStatus::Rename | ChangeStatus::Delete => raw
            .previous_filename
            .as_deref()
            .map(|name| base_has(name))
            .unwrap_or(false),
        _ => false,
    };
    let is_partial = !original_exists && status != ChangeStatus::Add;

    FileChange::InMemory(InMemoryChange {
        status,
        filename: raw.filename.clone(),
        previous_filename: raw.previous_filename.clone(),
        base_commit: base_commit.to_string(),
        head_commit: raw.head_commit.clone(),
        hunks: parse_patch(patch),
        is_partial,
        blob_url: raw.blob_url.clone(),
        file_sha: raw.file_sha.clone(),
        previous_file_sha: raw.previous_file_sha.clone(),
    })
}

/// Resolve a whole change set against one base commit.
pub fn resolve_file_changes<F>(
    raws: &[RawFileChange],
    base_commit: &str,
    base_has: F,
) -> Vec<FileChange>
where
    F: Fn(&str) -> bool,
{
    raws.iter()
        .map(|raw| resolve_file_change(raw, base_commit, &base_has))
        .collect()
}
