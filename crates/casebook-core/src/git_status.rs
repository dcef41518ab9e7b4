use serde::{Deserialize, Serialize};

/// Version-control status of a single test case.
///
/// Transitions:
/// ```text
/// New ──(push)──> Unmodified
/// New ──(edit)──> New
/// Unmodified ──(edit)──> Modified
/// Modified ──(push)──> Unmodified
/// Unmodified|Modified ──(pull)──> Conflicted
/// Conflicted ──(resolve)──> Modified
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GitStatus {
    /// Committed and untouched since
    Unmodified,
    /// Edited since the last commit
    Modified,
    /// Never committed
    #[default]
    New,
    /// Local and remote versions diverge; needs resolution before push
    Conflicted,
}

impl GitStatus {
    /// Status after a user edit.
    ///
    /// `New` stays `New` until its first commit. A conflicted case keeps its
    /// conflict; only resolution clears it.
    pub fn after_edit(self) -> GitStatus {
        match self {
            GitStatus::Unmodified | GitStatus::Modified => GitStatus::Modified,
            GitStatus::New => GitStatus::New,
            GitStatus::Conflicted => GitStatus::Conflicted,
        }
    }

    /// Returns true if the case has uncommitted work that a push would carry.
    pub fn is_pending(self) -> bool {
        matches!(self, GitStatus::New | GitStatus::Modified)
    }

    /// Returns true if the case is waiting on conflict resolution.
    pub fn is_conflicted(self) -> bool {
        self == GitStatus::Conflicted
    }

    /// Returns a human-readable name for the status.
    pub fn display_name(&self) -> &'static str {
        match self {
            GitStatus::Unmodified => "Unmodified",
            GitStatus::Modified => "Modified",
            GitStatus::New => "New",
            GitStatus::Conflicted => "Conflict",
        }
    }

    /// One-line explanation shown next to a case.
    pub fn description(&self) -> &'static str {
        match self {
            GitStatus::Unmodified => "Up to date.",
            GitStatus::Modified => "Changes have not been committed.",
            GitStatus::New => "New, uncommitted file.",
            GitStatus::Conflicted => "Merge conflict detected.",
        }
    }

    /// Suffix appended to a case title: `" *"` for modified, `" +"` for new.
    pub fn title_marker(&self) -> &'static str {
        match self {
            GitStatus::Modified => " *",
            GitStatus::New => " +",
            GitStatus::Unmodified | GitStatus::Conflicted => "",
        }
    }
}

impl std::fmt::Display for GitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_transitions() {
        assert_eq!(GitStatus::Unmodified.after_edit(), GitStatus::Modified);
        assert_eq!(GitStatus::Modified.after_edit(), GitStatus::Modified);
        assert_eq!(GitStatus::New.after_edit(), GitStatus::New);
        assert_eq!(GitStatus::Conflicted.after_edit(), GitStatus::Conflicted);
    }

    #[test]
    fn test_pending() {
        assert!(GitStatus::New.is_pending());
        assert!(GitStatus::Modified.is_pending());
        assert!(!GitStatus::Unmodified.is_pending());
        assert!(!GitStatus::Conflicted.is_pending());
    }

    #[test]
    fn test_default_is_new() {
        assert_eq!(GitStatus::default(), GitStatus::New);
    }

    #[test]
    fn test_serializes_as_variant_name() {
        let json = serde_json::to_string(&GitStatus::Conflicted).unwrap();
        assert_eq!(json, "\"Conflicted\"");
    }

    #[test]
    fn test_title_marker() {
        assert_eq!(GitStatus::Modified.title_marker(), " *");
        assert_eq!(GitStatus::New.title_marker(), " +");
        assert_eq!(GitStatus::Unmodified.title_marker(), "");
    }
}
