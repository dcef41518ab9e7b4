use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::commit::Commit;
use crate::git_status::GitStatus;
use crate::step::TestStep;

/// Kind of system a test case exercises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestType {
    #[default]
    #[serde(rename = "UI")]
    Ui,
    #[serde(rename = "API")]
    Api,
}

/// Authoring status of a test case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

/// Outcome of the most recent run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Passed,
    Failed,
    Running,
    #[default]
    Skipped,
}

impl RunStatus {
    /// Returns true for outcomes a finished run can report.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Passed | RunStatus::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Passed => "Passed",
            RunStatus::Failed => "Failed",
            RunStatus::Running => "Running",
            RunStatus::Skipped => "Skipped",
        };
        f.write_str(s)
    }
}

/// A test case under version control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Store-assigned identifier; never changes
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TestType,
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub last_run: RunStatus,
    /// `None` means the case has never run
    #[serde(default, with = "run_date")]
    pub last_run_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub steps: Vec<TestStep>,
    #[serde(default)]
    pub git_status: GitStatus,
    /// Commits touching this case, newest first
    #[serde(default)]
    pub history: Vec<Commit>,
}

impl TestCase {
    /// Builds the stored case from a draft and the identifier the store chose.
    pub fn from_new(id: impl Into<String>, new: NewTestCase) -> Self {
        Self {
            id: id.into(),
            name: new.name,
            description: new.description,
            kind: new.kind,
            status: new.status,
            tags: new.tags,
            last_run: RunStatus::Skipped,
            last_run_date: None,
            creator: new.creator,
            steps: new.steps,
            git_status: GitStatus::New,
            history: Vec::new(),
        }
    }

    /// Name followed by the pending-change marker.
    pub fn title(&self) -> String {
        format!("{}{}", self.name, self.git_status.title_marker())
    }

    pub fn is_running(&self) -> bool {
        self.last_run == RunStatus::Running
    }

    /// Most recent commit, if any.
    pub fn head_commit(&self) -> Option<&Commit> {
        self.history.first()
    }

    /// Case-insensitive match against the name or any tag.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }

    /// Records a commit: prepends it to history and marks the case clean.
    pub(crate) fn record_commit(&mut self, commit: Commit) {
        self.history.insert(0, commit);
        self.git_status = GitStatus::Unmodified;
    }
}

/// A test case that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTestCase {
    pub name: String,
    pub description: Option<String>,
    pub kind: TestType,
    pub status: CaseStatus,
    pub tags: Vec<String>,
    pub creator: String,
    pub steps: Vec<TestStep>,
}

impl NewTestCase {
    pub fn new(name: impl Into<String>, kind: TestType) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
            status: CaseStatus::Draft,
            tags: Vec::new(),
            creator: String::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.trim().is_empty()).then_some(description);
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: CaseStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    /// Checks the draft can be stored.
    pub fn validate(&self) -> Result<(), CaseError> {
        if self.name.trim().is_empty() {
            return Err(CaseError::EmptyName);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaseError {
    #[error("Test case name is required")]
    EmptyName,

    #[error("Commit message is required")]
    EmptyCommitMessage,
}

/// Serde adapter for the last-run timestamp.
///
/// Never-run cases are written as `"N/A"`. Reading accepts RFC 3339 as well
/// as plain `YYYY-MM-DD HH:MM[:SS]` timestamps, taken as UTC.
mod run_date {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const NEVER: &str = "N/A";
    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

    pub fn serialize<S: Serializer>(
        date: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&date.to_rfc3339()),
            None => serializer.serialize_str(NEVER),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let raw = match raw {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let raw = raw.trim();
        if raw.is_empty() || raw == NEVER {
            return Ok(None);
        }

        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(date.with_timezone(&Utc)));
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Ok(Some(naive.and_utc()));
            }
        }
        Err(de::Error::custom(format!("invalid last run date: {raw}")))
    }
}
