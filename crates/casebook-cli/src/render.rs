//! Plain-text rendering of cases, suites, and conflicts.

use casebook_core::{Commit, Conflict, StepKind, TestCase, TestStep, TestSuite, TestType};

fn kind_label(kind: TestType) -> &'static str {
    match kind {
        TestType::Ui => "UI",
        TestType::Api => "API",
    }
}

fn last_run_label(case: &TestCase) -> String {
    match case.last_run_date {
        Some(date) => date.format("%Y-%m-%d %H:%M").to_string(),
        None => "N/A".to_string(),
    }
}

pub fn case_row(case: &TestCase) -> String {
    let tags = if case.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", case.tags.join(", "))
    };
    format!(
        "{:<8} {:<3} {:<8} {:<16} {}{}",
        case.id,
        kind_label(case.kind),
        case.last_run.to_string(),
        last_run_label(case),
        case.title(),
        tags
    )
}

pub fn suite_row(suite: &TestSuite, cases: &[TestCase]) -> String {
    let members: Vec<String> = suite
        .members(cases)
        .iter()
        .map(|tc| format!("{} ({})", tc.name, tc.last_run))
        .collect();
    format!(
        "{:<8} {:<8} {} - {}",
        suite.id,
        suite.status(cases).to_string(),
        suite.name,
        members.join(", ")
    )
}

pub fn status_row(case: &TestCase) -> String {
    format!("{:<10} {} ({})", case.git_status.display_name(), case.name, case.id)
}

fn step_row(index: usize, step: &TestStep) -> String {
    let detail = match &step.kind {
        StepKind::Input { value } => format!(" = {value:?}"),
        StepKind::ApiCall { method, body } => match body {
            Some(body) => format!(" {method} {body}"),
            None => format!(" {method}"),
        },
        StepKind::Navigate | StepKind::Click | StepKind::Assert => String::new(),
    };
    format!(
        "  {}. {:?} {} -> {}{}",
        index + 1,
        step.step_type(),
        step.name,
        step.target,
        detail
    )
}

pub fn case_detail(case: &TestCase) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", case.title()));
    if let Some(description) = &case.description {
        out.push_str(&format!("{description}\n"));
    }
    out.push_str(&format!(
        "Type: {}  Status: {:?}  Creator: {}\n",
        kind_label(case.kind),
        case.status,
        case.creator
    ));
    out.push_str(&format!(
        "Last run: {} ({})\n",
        case.last_run,
        last_run_label(case)
    ));
    out.push_str(&format!("Git: {}\n", case.git_status.description()));
    if !case.tags.is_empty() {
        out.push_str(&format!("Tags: {}\n", case.tags.join(", ")));
    }
    out.push_str("Steps:\n");
    if case.steps.is_empty() {
        out.push_str("  (none)\n");
    }
    for (i, step) in case.steps.iter().enumerate() {
        out.push_str(&step_row(i, step));
        out.push('\n');
    }
    out
}

pub fn commit_row(commit: &Commit) -> String {
    format!(
        "{} {} {} - {}",
        commit.hash, commit.date, commit.author, commit.message
    )
}

pub fn conflict(conflict: &Conflict) -> String {
    let describe = |case: &TestCase| case.description.clone().unwrap_or_default();
    format!(
        "Merge conflict: {}\n  local:  {}\n  remote: {}\n",
        conflict.local().name,
        describe(conflict.local()),
        describe(conflict.remote())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use casebook_core::{ApiMethod, NewTestCase, StepType};

    #[test]
    fn test_case_row_marks_new() {
        let case = TestCase::from_new("tc-9", NewTestCase::new("Signup", TestType::Ui).with_tags(["auth"]));
        let row = case_row(&case);
        assert!(row.contains("Signup +"));
        assert!(row.contains("[auth]"));
        assert!(row.contains("N/A"));
    }

    #[test]
    fn test_step_row_shows_api_body() {
        let mut step = TestStep::new(StepKind::empty(StepType::ApiCall), "Create", "/api/users");
        step.set_method(ApiMethod::Post);
        step.set_body("{}");
        assert_eq!(step_row(0, &step), "  1. ApiCall Create -> /api/users POST {}");
    }

    #[test]
    fn test_step_row_shows_wire_method() {
        let step = TestStep::new(StepKind::empty(StepType::ApiCall), "Remove", "/api/users/1");
        assert!(step_row(2, &step).ends_with("/api/users/1 GET"));
    }
}
