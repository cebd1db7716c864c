use serde::{Deserialize, Serialize};

/// Normalized file-level change classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Add,
    Copy,
    Delete,
    Modify,
    Rename,
    TypeChange,
    Unmerged,
    Unknown,
}

impl ChangeStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            ChangeStatus::Add => "+",
            ChangeStatus::Copy => "C",
            ChangeStatus::Delete => "-",
            ChangeStatus::Modify => "~",
            ChangeStatus::Rename => "R",
            ChangeStatus::TypeChange => "T",
            ChangeStatus::Unmerged => "U",
            ChangeStatus::Unknown => "?",
        }
    }
}

/// Bit-flagged change-type word as reported by the review provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderStatus(pub u32);

#[allow(dead_code)]
impl ProviderStatus {
    pub const NONE: ProviderStatus = ProviderStatus(0);
    pub const ADD: ProviderStatus = ProviderStatus(1);
    pub const EDIT: ProviderStatus = ProviderStatus(1 << 1);
    pub const ENCODING: ProviderStatus = ProviderStatus(1 << 2);
    pub const RENAME: ProviderStatus = ProviderStatus(1 << 3);
    pub const DELETE: ProviderStatus = ProviderStatus(1 << 4);
    pub const UNDELETE: ProviderStatus = ProviderStatus(1 << 5);
    pub const BRANCH: ProviderStatus = ProviderStatus(1 << 6);
    pub const MERGE: ProviderStatus = ProviderStatus(1 << 7);
    pub const LOCK: ProviderStatus = ProviderStatus(1 << 8);
    pub const ROLLBACK: ProviderStatus = ProviderStatus(1 << 9);
    pub const SOURCE_RENAME: ProviderStatus = ProviderStatus(1 << 10);
    pub const TARGET_RENAME: ProviderStatus = ProviderStatus(1 << 11);
    pub const PROPERTY: ProviderStatus = ProviderStatus(1 << 12);

    pub fn contains(self, flag: ProviderStatus) -> bool {
        self.0 & flag.0 != 0
    }
}

impl std::ops::BitOr for ProviderStatus {
    type Output = ProviderStatus;

    fn bitor(self, rhs: ProviderStatus) -> ProviderStatus {
        ProviderStatus(self.0 | rhs.0)
    }
}

/// Normalize a provider status word.
///
/// The rules run in order, first match wins: the vacated side of a rename
/// must surface as a delete, and a rename that also carries edits stays a
/// rename. Unmatched words classify as Unknown, which is a valid displayable
/// state, not an error.
pub fn classify(status: ProviderStatus) -> ChangeStatus {
    let rules = [
        (
            status.contains(ProviderStatus::DELETE) || status.contains(ProviderStatus::SOURCE_RENAME),
            ChangeStatus::Delete,
        ),
        (status.contains(ProviderStatus::RENAME), ChangeStatus::Rename),
        // Exact equality: an add combined with other flags is not a pure add
        (status == ProviderStatus::ADD, ChangeStatus::Add),
        (status.contains(ProviderStatus::EDIT), ChangeStatus::Modify),
    ];

    rules
        .into_iter()
        .find(|(matched, _)| *matched)
        .map(|(_, status)| status)
        .unwrap_or(ChangeStatus::Unknown)
}

/// Normalize the provider's textual status labels.
#[allow(dead_code)]
pub fn classify_label(label: &str) -> ChangeStatus {
    match label {
        "removed" => ChangeStatus::Delete,
        "added" => ChangeStatus::Add,
        "renamed" => ChangeStatus::Rename,
        "modified" => ChangeStatus::Modify,
        _ => ChangeStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_bit_wins() {
        assert_eq!(classify(ProviderStatus::DELETE), ChangeStatus::Delete);
        assert_eq!(classify(ProviderStatus::DELETE | ProviderStatus::EDIT), ChangeStatus::Delete);
    }

    #[test]
    fn rename_source_side_is_a_delete() {
        // The vacated side of a rename carries both flags and must never
        // surface as a rename
        assert_eq!(
            classify(ProviderStatus::DELETE | ProviderStatus::RENAME),
            ChangeStatus::Delete
        );
        assert_eq!(classify(ProviderStatus::SOURCE_RENAME), ChangeStatus::Delete);
    }

    #[test]
    fn rename_with_edits_stays_a_rename() {
        assert_eq!(
            classify(ProviderStatus::RENAME | ProviderStatus::EDIT),
            ChangeStatus::Rename
        );
    }

    #[test]
    fn add_requires_exact_equality() {
        assert_eq!(classify(ProviderStatus::ADD), ChangeStatus::Add);
        // Add plus edit is not a pure add; the edit rule catches it
        assert_eq!(classify(ProviderStatus::ADD | ProviderStatus::EDIT), ChangeStatus::Modify);
    }

    #[test]
    fn edit_bit_maps_to_modify() {
        assert_eq!(classify(ProviderStatus::EDIT), ChangeStatus::Modify);
        assert_eq!(
            classify(ProviderStatus::EDIT | ProviderStatus::ENCODING),
            ChangeStatus::Modify
        );
    }

    #[test]
    fn unmatched_words_are_unknown() {
        assert_eq!(classify(ProviderStatus::NONE), ChangeStatus::Unknown);
        assert_eq!(classify(ProviderStatus::ENCODING), ChangeStatus::Unknown);
        assert_eq!(classify(ProviderStatus::LOCK | ProviderStatus::PROPERTY), ChangeStatus::Unknown);
    }

    #[test]
    fn textual_labels_map_to_the_same_taxonomy() {
        assert_eq!(classify_label("removed"), ChangeStatus::Delete);
        assert_eq!(classify_label("added"), ChangeStatus::Add);
        assert_eq!(classify_label("renamed"), ChangeStatus::Rename);
        assert_eq!(classify_label("modified"), ChangeStatus::Modify);
        assert_eq!(classify_label("exploded"), ChangeStatus::Unknown);
    }

    #[test]
    fn symbols_are_single_width() {
        for status in [
            ChangeStatus::Add,
            ChangeStatus::Copy,
            ChangeStatus::Delete,
            ChangeStatus::Modify,
            ChangeStatus::Rename,
            ChangeStatus::TypeChange,
            ChangeStatus::Unmerged,
            ChangeStatus::Unknown,
        ] {
            assert_eq!(status.symbol().chars().count(), 1);
        }
    }
}
