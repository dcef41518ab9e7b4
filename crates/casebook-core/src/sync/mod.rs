//! Simulated git workflow over test cases.
//!
//! A push commits every `New`/`Modified` case at once, a pull reports a remote
//! edit on one configured case, and resolving the resulting conflict leaves
//! the chosen version as a pending modification.

mod change_set;
mod conflict;
mod engine;

pub use change_set::ChangeSet;
pub use conflict::{Conflict, Side};
pub use engine::{PushOutcome, PushReport, SyncEngine};

use thiserror::Error;

use crate::store::StoreError;
use crate::test_case::CaseError;

/// A persist that did not go through.
#[derive(Debug, Clone)]
pub struct PersistFailure {
    pub id: String,
    pub error: StoreError,
}

/// Errors from push, pull, and resolve.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Validation failed: {0}")]
    Validation(#[from] CaseError),

    #[error("Failed to persist {id}: {source}")]
    Persist {
        id: String,
        #[source]
        source: StoreError,
    },
}
