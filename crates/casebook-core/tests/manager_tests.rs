use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use casebook_core::{
    ApiMethod, CaseManager, Config, GitStatus, ManagerError, MemoryStore, NewTestCase,
    RunStatus, RunnerConfig, SimulatedRunner, StepKind, StepType, StoreError, TestCase,
    TestRunner, TestStep, TestType,
};

fn runner(pass_rate: f64) -> SimulatedRunner {
    SimulatedRunner::with_rng_seed(
        RunnerConfig {
            pass_rate,
            suite_pass_rate: pass_rate,
            min_delay_ms: 0,
            max_delay_ms: 0,
            suite_min_delay_ms: 0,
            suite_max_delay_ms: 0,
        },
        5,
    )
}

async fn create_test_manager(pass_rate: f64) -> CaseManager<MemoryStore> {
    CaseManager::connect(MemoryStore::sample(), &Config::default())
        .await
        .unwrap()
        .with_runner(runner(pass_rate))
}

#[tokio::test]
async fn test_cases_load_most_recent_run_first() {
    let manager = create_test_manager(1.0).await;
    let ids: Vec<_> = manager.cases().iter().map(|tc| tc.id.as_str()).collect();
    assert_eq!(ids, vec!["tc-001", "tc-002", "tc-003", "tc-004"]);
}

#[tokio::test]
async fn test_authoring_steps() {
    let mut manager = create_test_manager(1.0).await;
    let created = manager
        .create_test_case(NewTestCase::new("Create order", TestType::Api))
        .await
        .unwrap();

    let mut case = created.clone();
    let mut step = TestStep::new(StepKind::empty(StepType::ApiCall), "Post order", "/api/orders");
    step.set_method(ApiMethod::Post);
    assert!(step.set_body(r#"{"sku":"A-1"}"#));
    case.steps.push(step);
    case.steps.push(TestStep::new(StepKind::Assert, "Order listed", "/api/orders"));

    let saved = manager.update_test_case(case).await.unwrap();

    assert_eq!(saved.steps.len(), 2);
    assert_eq!(saved.steps[0].step_type(), StepType::ApiCall);
    assert_eq!(saved.git_status, GitStatus::New);
    assert_eq!(manager.store().get(&created.id).unwrap().steps, saved.steps);
}

#[tokio::test]
async fn test_update_unknown_case() {
    let mut manager = create_test_manager(1.0).await;
    let mut case = manager.get_test_case("tc-001").unwrap().clone();
    case.id = "tc-999".to_string();

    let result = manager.update_test_case(case).await;
    assert!(matches!(result, Err(ManagerError::UnknownTestCase(id)) if id == "tc-999"));
}

#[tokio::test]
async fn test_failed_edit_keeps_previous_version() {
    let mut manager = create_test_manager(1.0).await;
    manager.store().fail_persists_for("tc-001");
    let mut case = manager.get_test_case("tc-001").unwrap().clone();
    case.name = "Will not stick".to_string();

    let result = manager.update_test_case(case).await;

    assert!(matches!(result, Err(ManagerError::Persist { .. })));
    let current = manager.get_test_case("tc-001").unwrap();
    assert_eq!(current.name, "Login with valid credentials");
    assert_eq!(current.git_status, GitStatus::Unmodified);
}

#[tokio::test]
async fn test_failing_run_is_recorded() {
    let mut manager = create_test_manager(0.0).await;

    let finished = manager.run_test("tc-001").await.unwrap();

    assert_eq!(finished.last_run, RunStatus::Failed);
    assert_eq!(
        manager.store().get("tc-001").unwrap().last_run,
        RunStatus::Failed
    );
}

#[tokio::test]
async fn test_suite_run_with_failing_member_persist() {
    let mut manager = create_test_manager(1.0).await;
    manager.store().fail_persists_for("tc-002");

    let report = manager.run_suite("ts-001").await.unwrap();

    assert_eq!(report.recorded.len(), 1);
    assert_eq!(report.recorded[0].id, "tc-001");
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].id, "tc-002");
    assert_eq!(
        manager.get_test_case("tc-002").unwrap().last_run,
        RunStatus::Failed
    );
}

#[tokio::test]
async fn test_search() {
    let manager = create_test_manager(1.0).await;
    let hits: Vec<_> = manager
        .workspace()
        .search("AUTH")
        .iter()
        .map(|tc| tc.id.clone())
        .collect();
    assert_eq!(hits, vec!["tc-001", "tc-002"]);
}

#[tokio::test]
async fn test_reload_picks_up_store_state() {
    let mut manager = create_test_manager(1.0).await;
    manager.pull().await.unwrap().unwrap();

    manager.reload().await.unwrap();

    assert_eq!(
        manager.get_test_case("tc-002").unwrap().git_status,
        GitStatus::Conflicted
    );
}

#[tokio::test]
async fn test_reload_failure_keeps_snapshot() {
    let mut manager = create_test_manager(1.0).await;
    manager.store().set_offline(true);

    let result = manager.reload().await;

    assert!(matches!(result, Err(ManagerError::Connectivity(_))));
    assert_eq!(manager.cases().len(), 4);
}

/// Passes every case. The first time it runs, it makes the store reject
/// saves of `flaky` until healed.
struct StoreOutageRunner {
    store: Arc<MemoryStore>,
    flaky: &'static str,
    armed: AtomicBool,
}

impl StoreOutageRunner {
    fn trip(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.store.fail_persists_for(self.flaky);
        }
    }
}

#[async_trait]
impl TestRunner for StoreOutageRunner {
    async fn run(&self, _case: &TestCase) -> RunStatus {
        self.trip();
        RunStatus::Passed
    }

    async fn run_suite(&self, cases: &[TestCase]) -> Vec<RunStatus> {
        self.trip();
        vec![RunStatus::Passed; cases.len()]
    }
}

async fn create_outage_manager(flaky: &'static str) -> CaseManager<Arc<MemoryStore>> {
    let store = Arc::new(MemoryStore::sample());
    CaseManager::connect(store.clone(), &Config::default())
        .await
        .unwrap()
        .with_runner(StoreOutageRunner {
            store,
            flaky,
            armed: AtomicBool::new(true),
        })
}

#[tokio::test]
async fn test_unsaved_run_result_restores_previous_state() {
    let mut manager = create_outage_manager("tc-001").await;
    let before = manager.get_test_case("tc-001").unwrap().clone();

    let result = manager.run_test("tc-001").await;

    assert!(matches!(
        result,
        Err(ManagerError::Persist {
            source: StoreError::Rejected { .. },
            ..
        })
    ));
    assert_eq!(manager.get_test_case("tc-001").unwrap(), &before);
    assert!(!manager.get_test_case("tc-001").unwrap().is_running());

    manager.store().heal();
    let rerun = manager.run_test("tc-001").await.unwrap();

    assert_eq!(rerun.last_run, RunStatus::Passed);
    assert_eq!(
        manager.store().get("tc-001").unwrap().last_run,
        RunStatus::Passed
    );
}

#[tokio::test]
async fn test_unsaved_suite_result_restores_member() {
    let mut manager = create_outage_manager("tc-002").await;
    let before = manager.get_test_case("tc-002").unwrap().clone();

    let report = manager.run_suite("ts-001").await.unwrap();

    assert_eq!(report.recorded.len(), 1);
    assert_eq!(report.recorded[0].id, "tc-001");
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].id, "tc-002");
    assert_eq!(manager.get_test_case("tc-002").unwrap(), &before);
    let suite = manager.workspace().suite("ts-001").unwrap();
    assert_ne!(suite.status(manager.cases()), RunStatus::Running);

    manager.store().heal();
    let rerun = manager.run_suite("ts-001").await.unwrap();

    assert_eq!(rerun.recorded.len(), 2);
    assert!(rerun.failed.is_empty());
    assert_eq!(
        manager.store().get("tc-002").unwrap().last_run,
        RunStatus::Passed
    );
}
