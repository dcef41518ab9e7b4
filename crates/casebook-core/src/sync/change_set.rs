use crate::git_status::GitStatus;
use crate::test_case::TestCase;

/// Test cases partitioned by git status.
///
/// Borrowed from the collection it was computed over, so it can never go
/// stale: recompute after every change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangeSet<'a> {
    /// `New` or `Modified`; what a push would commit
    pub changed: Vec<&'a TestCase>,
    /// Waiting on resolution; never pushed
    pub conflicted: Vec<&'a TestCase>,
    pub unmodified: Vec<&'a TestCase>,
}

impl<'a> ChangeSet<'a> {
    /// Partitions `cases`, keeping their order within each group.
    pub fn compute(cases: &'a [TestCase]) -> Self {
        let mut set = ChangeSet::default();
        for case in cases {
            match case.git_status {
                GitStatus::New | GitStatus::Modified => set.changed.push(case),
                GitStatus::Conflicted => set.conflicted.push(case),
                GitStatus::Unmodified => set.unmodified.push(case),
            }
        }
        set
    }

    /// Nothing to push and nothing to resolve.
    pub fn is_clean(&self) -> bool {
        self.changed.is_empty() && self.conflicted.is_empty()
    }

    /// Number of cases needing attention (changed plus conflicted).
    pub fn total_changes(&self) -> usize {
        self.changed.len() + self.conflicted.len()
    }
}
