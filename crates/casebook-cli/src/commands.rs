use std::future::Future;
use std::time::Duration;

use color_eyre::eyre::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use casebook_core::{
    CaseManager, Config, HttpStore, MemoryStore, NewTestCase, PushOutcome, Side, TestCaseStore,
    TestType,
};

use crate::render;

pub type Manager = CaseManager<Box<dyn TestCaseStore>>;

/// Shows a spinner while `fut` runs.
async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let output = fut.await;
    spinner.finish_and_clear();
    output
}

pub async fn connect(config: &Config, offline: bool) -> Result<Manager> {
    let store: Box<dyn TestCaseStore> = if offline {
        debug!("using the in-memory sample store");
        Box::new(MemoryStore::sample())
    } else {
        debug!(api_url = %config.store.api_url, "using the HTTP store");
        Box::new(HttpStore::with_config(&config.store))
    };
    let manager = with_spinner("Connecting to API...", CaseManager::connect(store, config)).await?;
    Ok(manager)
}

pub fn list(manager: &Manager, query: Option<&str>) {
    let cases = manager.workspace().search(query.unwrap_or_default());
    if cases.is_empty() {
        println!("No test cases found.");
        return;
    }
    for case in cases {
        println!("{}", render::case_row(case));
    }
}

pub fn suites(manager: &Manager) {
    if manager.suites().is_empty() {
        println!("No test suites found.");
        return;
    }
    for suite in manager.suites() {
        println!("{}", render::suite_row(suite, manager.cases()));
    }
}

pub fn show(manager: &Manager, id: &str, json: bool) -> Result<()> {
    let case = manager.get_test_case(id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(case)?);
    } else {
        print!("{}", render::case_detail(case));
    }
    Ok(())
}

pub async fn create(
    manager: &mut Manager,
    name: String,
    kind: TestType,
    description: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let mut new = NewTestCase::new(name, kind).with_tags(tags);
    if let Some(description) = description {
        new = new.with_description(description);
    }

    let created = with_spinner("Saving...", manager.create_test_case(new)).await?;
    println!("Created test case: {}", created.title());
    println!("  ID: {}", created.id);
    Ok(())
}

pub async fn run(manager: &mut Manager, id: &str) -> Result<()> {
    let finished = with_spinner("Running...", manager.run_test(id)).await?;
    println!("{}: {}", finished.name, finished.last_run);
    Ok(())
}

pub async fn run_suite(manager: &mut Manager, id: &str) -> Result<()> {
    let report = with_spinner("Running suite...", manager.run_suite(id)).await?;
    for case in &report.recorded {
        println!("{}: {}", case.name, case.last_run);
    }
    for failure in &report.failed {
        println!("{}: not recorded ({})", failure.id, failure.error);
    }
    Ok(())
}

pub fn status(manager: &Manager) {
    let set = manager.change_set();
    println!("Changes ({})", set.total_changes());
    if set.is_clean() {
        println!("  No changes to commit.");
        return;
    }
    for case in set.conflicted.iter().chain(set.changed.iter()) {
        println!("  {}", render::status_row(case));
    }
}

pub async fn push(manager: &mut Manager, message: &str) -> Result<()> {
    match with_spinner("Pushing...", manager.push(message)).await? {
        PushOutcome::NothingToCommit => println!("No changes to commit."),
        PushOutcome::Pushed(report) => {
            println!(
                "[{}] {} ({} file(s))",
                report.commit.hash,
                report.commit.message,
                report.committed.len()
            );
            for failure in &report.failed {
                println!("  not pushed: {} ({})", failure.id, failure.error);
            }
            if !report.is_complete() {
                bail!("{} case(s) could not be pushed", report.failed.len());
            }
        }
    }
    Ok(())
}

pub async fn pull(manager: &mut Manager, keep: Option<Side>) -> Result<()> {
    let conflict = match with_spinner("Pulling...", manager.pull()).await? {
        Some(conflict) => conflict,
        None => {
            println!("Already up to date.");
            return Ok(());
        }
    };

    print!("{}", render::conflict(&conflict));
    match keep {
        Some(side) => {
            let resolved = manager.resolve(conflict, side).await?;
            println!("Kept {:?} version of {}.", side, resolved.title());
        }
        None => println!("Re-run with --keep local or --keep remote to resolve."),
    }
    Ok(())
}

pub fn history(manager: &Manager, id: &str) -> Result<()> {
    let case = manager.get_test_case(id)?;
    if case.history.is_empty() {
        println!("No commit history for this test case.");
        return Ok(());
    }
    for commit in &case.history {
        println!("{}", render::commit_row(commit));
    }
    Ok(())
}
