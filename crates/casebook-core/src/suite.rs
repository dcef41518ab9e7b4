use serde::{Deserialize, Serialize};

use crate::test_case::{RunStatus, TestCase};

/// A named group of test cases that run together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub test_case_ids: Vec<String>,
}

impl TestSuite {
    /// Member cases present in `cases`, in suite order. Unknown ids are skipped.
    pub fn members<'a>(&self, cases: &'a [TestCase]) -> Vec<&'a TestCase> {
        self.test_case_ids
            .iter()
            .filter_map(|id| cases.iter().find(|tc| &tc.id == id))
            .collect()
    }

    /// Aggregate run status of the suite.
    ///
    /// Running wins over Failed, which wins over Passed. An empty suite, or
    /// one with any skipped member and no failures, is Skipped.
    pub fn status(&self, cases: &[TestCase]) -> RunStatus {
        let members = self.members(cases);
        if members.iter().any(|tc| tc.last_run == RunStatus::Running) {
            return RunStatus::Running;
        }
        if members.iter().any(|tc| tc.last_run == RunStatus::Failed) {
            return RunStatus::Failed;
        }
        if !members.is_empty() && members.iter().all(|tc| tc.last_run == RunStatus::Passed) {
            return RunStatus::Passed;
        }
        RunStatus::Skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_case::{NewTestCase, TestType};

    fn case(id: &str, last_run: RunStatus) -> TestCase {
        let mut tc = TestCase::from_new(id, NewTestCase::new(id, TestType::Ui));
        tc.last_run = last_run;
        tc
    }

    fn suite(ids: &[&str]) -> TestSuite {
        TestSuite {
            id: "ts-1".to_string(),
            name: "Smoke".to_string(),
            description: String::new(),
            test_case_ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_members_skip_unknown_ids() {
        let cases = vec![case("a", RunStatus::Passed), case("b", RunStatus::Passed)];
        let members = suite(&["b", "missing", "a"]).members(&cases);
        let ids: Vec<_> = members.iter().map(|tc| tc.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_status_precedence() {
        let cases = vec![
            case("a", RunStatus::Passed),
            case("b", RunStatus::Failed),
            case("c", RunStatus::Running),
            case("d", RunStatus::Skipped),
        ];
        assert_eq!(suite(&["a", "b", "c"]).status(&cases), RunStatus::Running);
        assert_eq!(suite(&["a", "b"]).status(&cases), RunStatus::Failed);
        assert_eq!(suite(&["a"]).status(&cases), RunStatus::Passed);
        assert_eq!(suite(&["a", "d"]).status(&cases), RunStatus::Skipped);
        assert_eq!(suite(&[]).status(&cases), RunStatus::Skipped);
    }
}
