mod error;
mod http;
mod memory;

pub use error::StoreError;
pub use http::HttpStore;
pub use memory::{MemoryStore, StoreCall};

use std::sync::Arc;

use async_trait::async_trait;

use crate::suite::TestSuite;
use crate::test_case::{NewTestCase, TestCase};

/// Why a test case is being written.
///
/// Only user edits count as modifications. Structural saves record status or
/// history transitions (running a test, committing, conflicts) and must never
/// trigger the modified-on-write rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Edit,
    Structural,
}

impl SaveKind {
    pub fn is_structural(self) -> bool {
        self == SaveKind::Structural
    }
}

/// Trait for test case store backends.
///
/// The store owns the canonical copy of every case and suite. Each persist
/// returns the store's version, which replaces the in-memory one.
#[async_trait]
pub trait TestCaseStore: Send + Sync {
    /// Fetches every test case.
    async fn fetch_all_test_cases(&self) -> Result<Vec<TestCase>, StoreError>;

    /// Fetches every test suite.
    async fn fetch_all_suites(&self) -> Result<Vec<TestSuite>, StoreError>;

    /// Writes one existing test case and returns the stored version.
    async fn persist_test_case(
        &self,
        case: &TestCase,
        kind: SaveKind,
    ) -> Result<TestCase, StoreError>;

    /// Stores a new test case; the store assigns its identifier.
    async fn create_test_case(&self, new: &NewTestCase) -> Result<TestCase, StoreError>;
}

#[async_trait]
impl TestCaseStore for Box<dyn TestCaseStore> {
    async fn fetch_all_test_cases(&self) -> Result<Vec<TestCase>, StoreError> {
        (**self).fetch_all_test_cases().await
    }

    async fn fetch_all_suites(&self) -> Result<Vec<TestSuite>, StoreError> {
        (**self).fetch_all_suites().await
    }

    async fn persist_test_case(
        &self,
        case: &TestCase,
        kind: SaveKind,
    ) -> Result<TestCase, StoreError> {
        (**self).persist_test_case(case, kind).await
    }

    async fn create_test_case(&self, new: &NewTestCase) -> Result<TestCase, StoreError> {
        (**self).create_test_case(new).await
    }
}

#[async_trait]
impl<S: TestCaseStore + ?Sized> TestCaseStore for Arc<S> {
    async fn fetch_all_test_cases(&self) -> Result<Vec<TestCase>, StoreError> {
        (**self).fetch_all_test_cases().await
    }

    async fn fetch_all_suites(&self) -> Result<Vec<TestSuite>, StoreError> {
        (**self).fetch_all_suites().await
    }

    async fn persist_test_case(
        &self,
        case: &TestCase,
        kind: SaveKind,
    ) -> Result<TestCase, StoreError> {
        (**self).persist_test_case(case, kind).await
    }

    async fn create_test_case(&self, new: &NewTestCase) -> Result<TestCase, StoreError> {
        (**self).create_test_case(new).await
    }
}
