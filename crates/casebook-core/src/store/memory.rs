use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use crate::commit::Commit;
use crate::git_status::GitStatus;
use crate::step::{ApiMethod, StepKind, TestStep};
use crate::suite::TestSuite;
use crate::test_case::{CaseStatus, NewTestCase, RunStatus, TestCase, TestType};

use super::{SaveKind, StoreError, TestCaseStore};

/// A call received by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FetchCases,
    FetchSuites,
    Persist { id: String, kind: SaveKind },
    Create { name: String },
}

/// In-process store.
///
/// Keeps everything in memory and records every call. Persists for chosen
/// identities can be made to fail, and the whole store can be taken offline
/// so fetches fail.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    cases: Vec<TestCase>,
    suites: Vec<TestSuite>,
    failing: HashSet<String>,
    offline: bool,
    next_id: usize,
    calls: Vec<StoreCall>,
}

impl MemoryStore {
    /// Creates a store holding the given cases and suites.
    pub fn new(cases: Vec<TestCase>, suites: Vec<TestSuite>) -> Self {
        let next_id = cases.len() + 1;
        Self {
            state: Mutex::new(MemoryState {
                cases,
                suites,
                next_id,
                ..MemoryState::default()
            }),
        }
    }

    /// Creates a store seeded with a small login/checkout collection.
    pub fn sample() -> Self {
        Self::new(sample_cases(), sample_suites())
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes every persist of `id` fail until [`MemoryStore::heal`] is called.
    pub fn fail_persists_for(&self, id: impl Into<String>) {
        self.state().failing.insert(id.into());
    }

    /// Clears all injected persist failures.
    pub fn heal(&self) {
        self.state().failing.clear();
    }

    /// Makes fetches fail with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Stored version of a case.
    pub fn get(&self, id: &str) -> Option<TestCase> {
        self.state().cases.iter().find(|tc| tc.id == id).cloned()
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state().calls.clone()
    }

    /// Number of persist calls received so far.
    pub fn persist_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, StoreCall::Persist { .. }))
            .count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }
}

impl MemoryState {
    fn unreachable(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Network("store is offline".to_string()));
        }
        Ok(())
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let id = format!("tc-{:03}", self.next_id);
            self.next_id += 1;
            if !self.cases.iter().any(|tc| tc.id == id) {
                return id;
            }
        }
    }
}

#[async_trait]
impl TestCaseStore for MemoryStore {
    async fn fetch_all_test_cases(&self) -> Result<Vec<TestCase>, StoreError> {
        let mut state = self.state();
        state.calls.push(StoreCall::FetchCases);
        state.unreachable()?;
        Ok(state.cases.clone())
    }

    async fn fetch_all_suites(&self) -> Result<Vec<TestSuite>, StoreError> {
        let mut state = self.state();
        state.calls.push(StoreCall::FetchSuites);
        state.unreachable()?;
        Ok(state.suites.clone())
    }

    async fn persist_test_case(
        &self,
        case: &TestCase,
        kind: SaveKind,
    ) -> Result<TestCase, StoreError> {
        let mut state = self.state();
        state.calls.push(StoreCall::Persist {
            id: case.id.clone(),
            kind,
        });
        state.unreachable()?;

        if state.failing.contains(&case.id) {
            return Err(StoreError::Rejected {
                id: case.id.clone(),
                reason: "injected failure".to_string(),
            });
        }

        let slot = state
            .cases
            .iter_mut()
            .find(|tc| tc.id == case.id)
            .ok_or_else(|| StoreError::NotFound(case.id.clone()))?;
        *slot = case.clone();
        Ok(slot.clone())
    }

    async fn create_test_case(&self, new: &NewTestCase) -> Result<TestCase, StoreError> {
        let mut state = self.state();
        state.calls.push(StoreCall::Create {
            name: new.name.clone(),
        });
        state.unreachable()?;

        let id = state.fresh_id();
        let created = TestCase::from_new(id, new.clone());
        state.cases.push(created.clone());
        Ok(created)
    }
}

fn sample_cases() -> Vec<TestCase> {
    let initial = Commit {
        hash: "9f1c2ab".to_string(),
        message: "Initial test suite".to_string(),
        author: "QA Engineer".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap_or(NaiveDate::MIN),
    };
    let ran_at = |day: u32, hour: u32| Utc.with_ymd_and_hms(2024, 7, day, hour, 0, 0).single();

    let mut login = TestCase::from_new(
        "tc-001",
        NewTestCase::new("Login with valid credentials", TestType::Ui)
            .with_description("User signs in with a known account and lands on the dashboard.")
            .with_tags(["auth", "smoke"])
            .with_status(CaseStatus::Active)
            .with_creator("QA Engineer"),
    );
    login.steps = vec![
        TestStep::new(StepKind::Navigate, "Open login page", "/login"),
        TestStep::new(
            StepKind::Input {
                value: "qa@example.com".to_string(),
            },
            "Enter email",
            "#email",
        ),
        TestStep::new(StepKind::Click, "Submit", "button[type=submit]"),
        TestStep::new(StepKind::Assert, "Dashboard visible", "#dashboard"),
    ];

    let mut bad_password = TestCase::from_new(
        "tc-002",
        NewTestCase::new("Login with invalid password", TestType::Ui)
            .with_description("Shows an error message when the password is wrong.")
            .with_tags(["auth", "negative"])
            .with_status(CaseStatus::Active)
            .with_creator("QA Engineer"),
    );
    bad_password.steps = vec![
        TestStep::new(StepKind::Navigate, "Open login page", "/login"),
        TestStep::new(StepKind::Assert, "Error shown", ".login-error"),
    ];

    let mut users_api = TestCase::from_new(
        "tc-003",
        NewTestCase::new("List users endpoint", TestType::Api)
            .with_tags(["api", "users"])
            .with_status(CaseStatus::Active)
            .with_creator("QA Engineer"),
    );
    users_api.steps = vec![TestStep::new(
        StepKind::ApiCall {
            method: ApiMethod::Get,
            body: None,
        },
        "Fetch users",
        "/api/users",
    )];

    let checkout = TestCase::from_new(
        "tc-004",
        NewTestCase::new("Checkout with saved card", TestType::Ui)
            .with_tags(["payments"])
            .with_creator("QA Engineer"),
    );

    for (case, last_run, day) in [
        (&mut login, RunStatus::Passed, 20),
        (&mut bad_password, RunStatus::Failed, 19),
        (&mut users_api, RunStatus::Passed, 18),
    ] {
        case.last_run = last_run;
        case.last_run_date = ran_at(day, 9);
        case.history = vec![initial.clone()];
        case.git_status = GitStatus::Unmodified;
    }

    vec![login, bad_password, users_api, checkout]
}

fn sample_suites() -> Vec<TestSuite> {
    vec![
        TestSuite {
            id: "ts-001".to_string(),
            name: "Authentication".to_string(),
            description: "Sign-in happy and unhappy paths.".to_string(),
            test_case_ids: vec!["tc-001".to_string(), "tc-002".to_string()],
        },
        TestSuite {
            id: "ts-002".to_string(),
            name: "Regression".to_string(),
            description: "Everything that must pass before a release.".to_string(),
            test_case_ids: vec![
                "tc-001".to_string(),
                "tc-002".to_string(),
                "tc-003".to_string(),
                "tc-004".to_string(),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_fresh_id() {
        let store = MemoryStore::sample();
        let created = store
            .create_test_case(&NewTestCase::new("Logout", TestType::Ui))
            .await
            .unwrap();
        assert_eq!(created.id, "tc-005");
        assert_eq!(created.git_status, GitStatus::New);
        assert!(store.get("tc-005").is_some());
    }

    #[tokio::test]
    async fn test_persist_unknown_is_not_found() {
        let store = MemoryStore::default();
        let ghost = TestCase::from_new("ghost", NewTestCase::new("ghost", TestType::Ui));
        let err = store
            .persist_test_case(&ghost, SaveKind::Edit)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_injected_failure_and_heal() {
        let store = MemoryStore::sample();
        let case = store.get("tc-001").unwrap();

        store.fail_persists_for("tc-001");
        assert!(store
            .persist_test_case(&case, SaveKind::Structural)
            .await
            .is_err());

        store.heal();
        assert!(store
            .persist_test_case(&case, SaveKind::Structural)
            .await
            .is_ok());
        assert_eq!(store.persist_count(), 2);
    }

    #[tokio::test]
    async fn test_offline_fetch_fails() {
        let store = MemoryStore::sample();
        store.set_offline(true);
        assert!(matches!(
            store.fetch_all_test_cases().await,
            Err(StoreError::Network(_))
        ));
        assert_eq!(store.calls(), vec![StoreCall::FetchCases]);
    }

    #[test]
    fn test_sample_has_conflict_candidate() {
        let store = MemoryStore::sample();
        let candidate = store.get("tc-002").unwrap();
        assert_eq!(candidate.git_status, GitStatus::Unmodified);
    }
}
