use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the short hash given to new commits.
const HASH_LEN: usize = 7;

/// A commit recorded in a test case's history.
///
/// Commits are never mutated once created. The same commit is shared by
/// every case pushed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Short unique token identifying the commit
    pub hash: String,
    /// User-supplied commit message
    pub message: String,
    /// Who made the commit
    pub author: String,
    /// Day the commit was made
    pub date: NaiveDate,
}

impl Commit {
    /// Creates a commit dated today with a fresh hash.
    pub fn new(message: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            hash: Self::fresh_hash(),
            message: message.into(),
            author: author.into(),
            date: Utc::now().date_naive(),
        }
    }

    fn fresh_hash() -> String {
        let mut hash = Uuid::new_v4().simple().to_string();
        hash.truncate(HASH_LEN);
        hash
    }
}
