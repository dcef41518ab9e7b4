use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::commit::Commit;
use crate::config::SyncConfig;
use crate::git_status::GitStatus;
use crate::store::{SaveKind, TestCaseStore};
use crate::test_case::{CaseError, TestCase};
use crate::workspace::Workspace;

use super::{Conflict, PersistFailure, Side, SyncError};

/// Result of a push.
#[derive(Debug, Clone)]
pub enum PushOutcome {
    /// The changed set was empty; the store was not contacted.
    NothingToCommit,
    Pushed(PushReport),
}

/// What a push committed and what it could not.
#[derive(Debug, Clone)]
pub struct PushReport {
    /// The commit shared by every pushed case
    pub commit: Commit,
    /// Cases now `Unmodified` with `commit` at the head of their history
    pub committed: Vec<String>,
    /// Cases left exactly as they were before the push
    pub failed: Vec<PersistFailure>,
}

impl PushReport {
    /// True when every staged case was committed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs push, pull, and resolve against a store and a workspace.
///
/// The engine holds no case state of its own. Callers must not run two
/// operations over the same workspace at once; taking `&mut Workspace`
/// enforces that.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Commits every `New`/`Modified` case with one shared commit.
    ///
    /// Persists run concurrently. Only cases whose persist succeeded are
    /// updated in the workspace; the rest keep their status and history and
    /// are listed in [`PushReport::failed`].
    pub async fn push<S>(
        &self,
        store: &S,
        workspace: &mut Workspace,
        message: &str,
    ) -> Result<PushOutcome, SyncError>
    where
        S: TestCaseStore + ?Sized,
    {
        let message = message.trim();
        if message.is_empty() {
            return Err(CaseError::EmptyCommitMessage.into());
        }

        let commit = Commit::new(message, self.config.author.as_str());
        let staged: Vec<TestCase> = workspace
            .change_set()
            .changed
            .into_iter()
            .map(|tc| {
                let mut tc = tc.clone();
                tc.record_commit(commit.clone());
                tc
            })
            .collect();

        if staged.is_empty() {
            info!("Nothing to commit");
            return Ok(PushOutcome::NothingToCommit);
        }

        let results = join_all(
            staged
                .iter()
                .map(|tc| store.persist_test_case(tc, SaveKind::Structural)),
        )
        .await;

        let mut report = PushReport {
            commit,
            committed: Vec::new(),
            failed: Vec::new(),
        };

        for (staged, result) in staged.into_iter().zip(results) {
            match result {
                Ok(saved) => {
                    debug!(id = %saved.id, hash = %report.commit.hash, "Committed");
                    report.committed.push(saved.id.clone());
                    workspace.apply(saved);
                }
                Err(error) => {
                    warn!(id = %staged.id, %error, "Push failed for test case");
                    report.failed.push(PersistFailure {
                        id: staged.id,
                        error,
                    });
                }
            }
        }

        info!(
            hash = %report.commit.hash,
            committed = report.committed.len(),
            failed = report.failed.len(),
            "Push finished"
        );
        Ok(PushOutcome::Pushed(report))
    }

    /// Fetches remote state.
    ///
    /// The remote only ever differs on the configured conflict case. If that
    /// case is present, whatever its status, it is marked `Conflicted` in the
    /// store and the two versions are returned. The remote version keeps the
    /// status the case had before the pull.
    pub async fn pull<S>(
        &self,
        store: &S,
        workspace: &mut Workspace,
    ) -> Result<Option<Conflict>, SyncError>
    where
        S: TestCaseStore + ?Sized,
    {
        let id = self.config.conflict_case_id.as_str();
        let Some(current) = workspace.get(id).cloned() else {
            debug!(id, "Pull found no remote changes");
            return Ok(None);
        };

        let remote = TestCase {
            description: Some(self.config.remote_description.clone()),
            ..current.clone()
        };
        let local = TestCase {
            description: Some(self.config.local_description.clone()),
            git_status: GitStatus::Conflicted,
            ..current
        };

        let persisted = store
            .persist_test_case(&local, SaveKind::Structural)
            .await
            .map_err(|source| {
                warn!(id, error = %source, "Could not record pulled conflict");
                SyncError::Persist {
                    id: id.to_string(),
                    source,
                }
            })?;
        workspace.apply(persisted.clone());

        info!(id, "Pull detected a conflict");
        Ok(Some(Conflict::new(persisted, remote)))
    }

    /// Keeps one side of a conflict.
    ///
    /// The kept version becomes `Modified`: the resolution is itself a change
    /// that the next push commits. If the persist fails the case stays
    /// `Conflicted`; pull again to get a fresh conflict.
    pub async fn resolve<S>(
        &self,
        store: &S,
        workspace: &mut Workspace,
        conflict: Conflict,
        side: Side,
    ) -> Result<TestCase, SyncError>
    where
        S: TestCaseStore + ?Sized,
    {
        let mut resolved = conflict.into_side(side);
        resolved.git_status = GitStatus::Modified;

        let saved = store
            .persist_test_case(&resolved, SaveKind::Structural)
            .await
            .map_err(|source| {
                warn!(id = %resolved.id, error = %source, "Could not record resolution");
                SyncError::Persist {
                    id: resolved.id.clone(),
                    source,
                }
            })?;
        workspace.apply(saved.clone());

        info!(id = %saved.id, ?side, "Conflict resolved");
        Ok(saved)
    }
}
