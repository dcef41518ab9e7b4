use crate::suite::TestSuite;
use crate::sync::ChangeSet;
use crate::test_case::TestCase;

/// In-memory snapshot of the store's test cases and suites.
///
/// Every change to a case goes through [`Workspace::apply`], which replaces
/// the case with the same identity (or adds it at the front if unknown).
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    cases: Vec<TestCase>,
    suites: Vec<TestSuite>,
}

impl Workspace {
    /// Builds a workspace from freshly fetched data.
    ///
    /// Cases are ordered by last run, most recent first; never-run cases go
    /// last.
    pub fn new(mut cases: Vec<TestCase>, suites: Vec<TestSuite>) -> Self {
        cases.sort_by(|a, b| b.last_run_date.cmp(&a.last_run_date));
        Self { cases, suites }
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn suites(&self) -> &[TestSuite] {
        &self.suites
    }

    pub fn get(&self, id: &str) -> Option<&TestCase> {
        self.cases.iter().find(|tc| tc.id == id)
    }

    pub fn suite(&self, id: &str) -> Option<&TestSuite> {
        self.suites.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Cases whose name or tags match `query`, case-insensitively.
    pub fn search(&self, query: &str) -> Vec<&TestCase> {
        self.cases.iter().filter(|tc| tc.matches(query)).collect()
    }

    /// Partitions the current cases by git status.
    pub fn change_set(&self) -> ChangeSet<'_> {
        ChangeSet::compute(&self.cases)
    }

    /// Writes a store-confirmed case into the snapshot.
    pub(crate) fn apply(&mut self, case: TestCase) {
        match self.cases.iter_mut().find(|tc| tc.id == case.id) {
            Some(slot) => *slot = case,
            None => self.cases.insert(0, case),
        }
    }
}
