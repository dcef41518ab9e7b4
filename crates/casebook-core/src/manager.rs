use chrono::Utc;
use futures::future::join_all;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::runner::{SimulatedRunner, TestRunner};
use crate::store::{SaveKind, StoreError, TestCaseStore};
use crate::suite::TestSuite;
use crate::sync::{ChangeSet, Conflict, PersistFailure, PushOutcome, Side, SyncEngine, SyncError};
use crate::test_case::{CaseError, NewTestCase, RunStatus, TestCase};
use crate::workspace::Workspace;

/// Manages test cases and their sync lifecycle.
///
/// Owns the workspace snapshot and is the only thing that writes to it. Every
/// operation takes `&mut self`, so push, pull, resolve, and edits can never
/// interleave on the same collection.
pub struct CaseManager<S: TestCaseStore> {
    store: S,
    workspace: Workspace,
    sync: SyncEngine,
    runner: Box<dyn TestRunner>,
    author: String,
}

/// Result of running a suite.
#[derive(Debug, Clone, Default)]
pub struct SuiteRunReport {
    /// Cases whose result was recorded
    pub recorded: Vec<TestCase>,
    /// Cases whose running or result state could not be saved
    pub failed: Vec<PersistFailure>,
}

impl<S: TestCaseStore> CaseManager<S> {
    /// Loads all test cases and suites from the store.
    ///
    /// Both fetches must succeed; otherwise nothing is loaded and a
    /// connectivity error is returned.
    pub async fn connect(store: S, config: &Config) -> Result<Self, ManagerError> {
        let workspace = Self::fetch(&store).await?;
        info!(
            cases = workspace.len(),
            suites = workspace.suites().len(),
            "Loaded test cases"
        );

        Ok(Self {
            store,
            workspace,
            sync: SyncEngine::new(config.sync.clone()),
            runner: Box::new(SimulatedRunner::new(config.runner.clone())),
            author: config.sync.author.clone(),
        })
    }

    /// Replaces the test runner.
    pub fn with_runner(mut self, runner: impl TestRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    async fn fetch(store: &S) -> Result<Workspace, ManagerError> {
        let (cases, suites) =
            tokio::try_join!(store.fetch_all_test_cases(), store.fetch_all_suites())
                .map_err(ManagerError::Connectivity)?;
        Ok(Workspace::new(cases, suites))
    }

    /// Fetches everything again, discarding the current snapshot.
    ///
    /// On failure the current snapshot is kept.
    pub async fn reload(&mut self) -> Result<(), ManagerError> {
        self.workspace = Self::fetch(&self.store).await?;
        Ok(())
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cases(&self) -> &[TestCase] {
        self.workspace.cases()
    }

    pub fn suites(&self) -> &[TestSuite] {
        self.workspace.suites()
    }

    /// Gets a test case by ID.
    pub fn get_test_case(&self, id: &str) -> Result<&TestCase, ManagerError> {
        self.workspace
            .get(id)
            .ok_or_else(|| ManagerError::UnknownTestCase(id.to_string()))
    }

    /// Current changed/conflicted partition.
    pub fn change_set(&self) -> ChangeSet<'_> {
        self.workspace.change_set()
    }

    /// Writes a case through the store and into the workspace.
    ///
    /// User edits go through the modified-on-write rule here, based on the
    /// canonical status rather than whatever the caller passed in.
    async fn save(&mut self, mut case: TestCase, kind: SaveKind) -> Result<TestCase, ManagerError> {
        if kind == SaveKind::Edit {
            if let Some(current) = self.workspace.get(&case.id) {
                case.git_status = current.git_status.after_edit();
            }
        }

        let saved = self
            .store
            .persist_test_case(&case, kind)
            .await
            .map_err(|source| {
                warn!(id = %case.id, error = %source, "Failed to save test case");
                ManagerError::Persist {
                    id: case.id.clone(),
                    source,
                }
            })?;
        self.workspace.apply(saved.clone());
        Ok(saved)
    }

    /// Creates a new test case and persists it.
    ///
    /// The case starts `New` with an empty history, credited to the
    /// configured author.
    pub async fn create_test_case(&mut self, new: NewTestCase) -> Result<TestCase, ManagerError> {
        new.validate()?;
        let new = new.with_creator(self.author.clone());

        let created = self
            .store
            .create_test_case(&new)
            .await
            .map_err(|source| ManagerError::Persist {
                id: new.name.clone(),
                source,
            })?;
        self.workspace.apply(created.clone());
        info!(id = %created.id, "Created test case");
        Ok(created)
    }

    /// Saves a user edit to an existing case.
    ///
    /// The status follows the edit rule (`Unmodified` becomes `Modified`,
    /// `New` stays `New`). History cannot be edited and is kept as stored.
    pub async fn update_test_case(&mut self, mut case: TestCase) -> Result<TestCase, ManagerError> {
        let current = self.get_test_case(&case.id)?;
        case.history = current.history.clone();
        self.save(case, SaveKind::Edit).await
    }

    /// Runs one test case and records the outcome.
    ///
    /// The case is saved as `Running` first, then with its final status and
    /// run time. Both are structural saves: running a test does not change
    /// its git status. If the result cannot be saved, the case goes back to
    /// its pre-run state and the error is returned.
    pub async fn run_test(&mut self, id: &str) -> Result<TestCase, ManagerError> {
        let case = self.get_test_case(id)?.clone();
        if case.is_running() {
            return Err(ManagerError::AlreadyRunning(id.to_string()));
        }

        let running = self
            .save(
                TestCase {
                    last_run: RunStatus::Running,
                    ..case.clone()
                },
                SaveKind::Structural,
            )
            .await?;

        let status = self.runner.run(&running).await;
        let finished = match self
            .save(
                TestCase {
                    last_run: status,
                    last_run_date: Some(Utc::now()),
                    ..running
                },
                SaveKind::Structural,
            )
            .await
        {
            Ok(finished) => finished,
            Err(err) => {
                self.roll_back_run(case).await;
                return Err(err);
            }
        };

        info!(id, %status, "Test run finished");
        Ok(finished)
    }

    /// Runs every case of a suite together.
    ///
    /// Members that cannot be marked running are left out of the run. Members
    /// whose result cannot be saved go back to their pre-run state. Both kinds
    /// of failure are listed in the report.
    pub async fn run_suite(&mut self, suite_id: &str) -> Result<SuiteRunReport, ManagerError> {
        let suite = self
            .workspace
            .suite(suite_id)
            .cloned()
            .ok_or_else(|| ManagerError::UnknownSuite(suite_id.to_string()))?;
        if suite.status(self.workspace.cases()) == RunStatus::Running {
            return Err(ManagerError::AlreadyRunning(suite_id.to_string()));
        }

        let before: Vec<TestCase> = suite
            .members(self.workspace.cases())
            .into_iter()
            .cloned()
            .collect();
        let marked: Vec<TestCase> = before
            .iter()
            .map(|tc| TestCase {
                last_run: RunStatus::Running,
                ..tc.clone()
            })
            .collect();

        let mut report = SuiteRunReport::default();
        let running = self.save_all(marked, &mut report.failed).await;
        let unmarked = report.failed.len();

        let statuses = self.runner.run_suite(&running).await;
        let now = Utc::now();
        let finished: Vec<TestCase> = running
            .into_iter()
            .zip(statuses)
            .map(|(tc, status)| TestCase {
                last_run: status,
                last_run_date: Some(now),
                ..tc
            })
            .collect();

        report.recorded = self.save_all(finished, &mut report.failed).await;

        let unrecorded: Vec<String> = report.failed[unmarked..]
            .iter()
            .map(|f| f.id.clone())
            .collect();
        for original in before.into_iter().filter(|tc| unrecorded.contains(&tc.id)) {
            self.roll_back_run(original).await;
        }

        info!(
            suite = suite_id,
            recorded = report.recorded.len(),
            failed = report.failed.len(),
            "Suite run finished"
        );
        Ok(report)
    }

    /// Puts a case back to how it was before a run whose result could not be
    /// saved, so it is not left `Running`.
    ///
    /// The store gets the old version back if it accepts it. Either way the
    /// workspace does, which keeps the case runnable once the store recovers.
    async fn roll_back_run(&mut self, original: TestCase) {
        if let Err(error) = self
            .store
            .persist_test_case(&original, SaveKind::Structural)
            .await
        {
            warn!(id = %original.id, %error, "Could not restore pre-run state in store");
        }
        self.workspace.apply(original);
    }

    /// Structural saves issued concurrently; returns the ones that stuck.
    async fn save_all(
        &mut self,
        cases: Vec<TestCase>,
        failed: &mut Vec<PersistFailure>,
    ) -> Vec<TestCase> {
        let results = join_all(
            cases
                .iter()
                .map(|tc| self.store.persist_test_case(tc, SaveKind::Structural)),
        )
        .await;

        let mut saved = Vec::new();
        for (case, result) in cases.into_iter().zip(results) {
            match result {
                Ok(stored) => {
                    self.workspace.apply(stored.clone());
                    saved.push(stored);
                }
                Err(error) => {
                    warn!(id = %case.id, %error, "Failed to save run state");
                    failed.push(PersistFailure { id: case.id, error });
                }
            }
        }
        saved
    }

    /// Commits and pushes every `New`/`Modified` case.
    pub async fn push(&mut self, message: &str) -> Result<PushOutcome, ManagerError> {
        Ok(self.sync.push(&self.store, &mut self.workspace, message).await?)
    }

    /// Pulls remote changes, returning a conflict if one needs resolving.
    pub async fn pull(&mut self) -> Result<Option<Conflict>, ManagerError> {
        Ok(self.sync.pull(&self.store, &mut self.workspace).await?)
    }

    /// Resolves a conflict by keeping one side.
    pub async fn resolve(&mut self, conflict: Conflict, side: Side) -> Result<TestCase, ManagerError> {
        Ok(self
            .sync
            .resolve(&self.store, &mut self.workspace, conflict, side)
            .await?)
    }
}

/// Errors that can occur in CaseManager operations.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Could not connect to the test case store ({0}). Make sure the API server is running, then try again.")]
    Connectivity(#[source] StoreError),

    #[error("Validation failed: {0}")]
    Validation(#[from] CaseError),

    #[error("Failed to persist {id}: {source}")]
    Persist {
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("Unknown test case: {0}")]
    UnknownTestCase(String),

    #[error("Unknown test suite: {0}")]
    UnknownSuite(String),

    #[error("Already running: {0}")]
    AlreadyRunning(String),
}

impl From<SyncError> for ManagerError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Validation(e) => ManagerError::Validation(e),
            SyncError::Persist { id, source } => ManagerError::Persist { id, source },
        }
    }
}
