pub mod commit;
pub mod config;
pub mod git_status;
pub mod manager;
pub mod runner;
pub mod step;
pub mod store;
pub mod suite;
pub mod sync;
pub mod test_case;
pub mod workspace;

pub use commit::Commit;
pub use config::{Config, ConfigError, RunnerConfig, StoreConfig, SyncConfig};
pub use git_status::GitStatus;
pub use manager::{CaseManager, ManagerError, SuiteRunReport};
pub use runner::{SimulatedRunner, TestRunner};
pub use step::{ApiMethod, StepKind, StepType, TestStep};
pub use store::{HttpStore, MemoryStore, SaveKind, StoreCall, StoreError, TestCaseStore};
pub use suite::TestSuite;
pub use sync::{
    ChangeSet, Conflict, PersistFailure, PushOutcome, PushReport, Side, SyncEngine, SyncError,
};
pub use test_case::{CaseError, CaseStatus, NewTestCase, RunStatus, TestCase, TestType};
pub use workspace::Workspace;
