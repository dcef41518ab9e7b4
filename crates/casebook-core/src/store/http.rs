use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::StoreConfig;
use crate::suite::TestSuite;
use crate::test_case::{NewTestCase, TestCase};

use super::{SaveKind, StoreError, TestCaseStore};

/// REST client for a json-server style backend.
///
/// ```text
/// GET  {api_url}/testCases
/// GET  {api_url}/testSuites
/// PUT  {api_url}/testCases/{id}
/// POST {api_url}/testCases
/// ```
pub struct HttpStore {
    base_url: String,
    cases_path: String,
    suites_path: String,
    client: Client,
}

impl HttpStore {
    /// Creates a client for the given base URL with default resource paths.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(&StoreConfig {
            api_url: base_url.into(),
            ..StoreConfig::default()
        })
    }

    /// Creates a client from store configuration.
    pub fn with_config(config: &StoreConfig) -> Self {
        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            cases_path: config.cases_path.trim_matches('/').to_string(),
            suites_path: config.suites_path.trim_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn cases_url(&self) -> String {
        format!("{}/{}", self.base_url, self.cases_path)
    }

    fn case_url(&self, id: &str) -> String {
        format!("{}/{}", self.cases_url(), id)
    }

    fn suites_url(&self) -> String {
        format!("{}/{}", self.base_url, self.suites_path)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }
}

#[async_trait]
impl TestCaseStore for HttpStore {
    async fn fetch_all_test_cases(&self) -> Result<Vec<TestCase>, StoreError> {
        let response = self.client.get(self.cases_url()).send().await?;
        let cases: Vec<TestCase> = Self::read_json(response).await?;
        debug!("Fetched {} test cases", cases.len());
        Ok(cases)
    }

    async fn fetch_all_suites(&self) -> Result<Vec<TestSuite>, StoreError> {
        let response = self.client.get(self.suites_url()).send().await?;
        let suites: Vec<TestSuite> = Self::read_json(response).await?;
        debug!("Fetched {} test suites", suites.len());
        Ok(suites)
    }

    async fn persist_test_case(
        &self,
        case: &TestCase,
        kind: SaveKind,
    ) -> Result<TestCase, StoreError> {
        debug!(id = %case.id, structural = kind.is_structural(), "Persisting test case");

        let response = self
            .client
            .put(self.case_url(&case.id))
            .json(case)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(case.id.clone()));
        }
        Self::read_json(response).await
    }

    async fn create_test_case(&self, new: &NewTestCase) -> Result<TestCase, StoreError> {
        let mut payload = serde_json::to_value(TestCase::from_new(String::new(), new.clone()))
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        if let Some(fields) = payload.as_object_mut() {
            fields.remove("id");
        }

        let response = self
            .client
            .post(self.cases_url())
            .json(&payload)
            .send()
            .await?;

        let created: TestCase = Self::read_json(response).await?;
        debug!(id = %created.id, "Created test case");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let store = HttpStore::new("http://localhost:3001/");
        assert_eq!(store.base_url(), "http://localhost:3001");
        assert_eq!(store.cases_url(), "http://localhost:3001/testCases");
        assert_eq!(store.case_url("tc-001"), "http://localhost:3001/testCases/tc-001");
        assert_eq!(store.suites_url(), "http://localhost:3001/testSuites");
    }

    #[test]
    fn test_custom_paths() {
        let store = HttpStore::with_config(&StoreConfig {
            api_url: "http://qa.internal/api".to_string(),
            cases_path: "/cases/".to_string(),
            suites_path: "suites".to_string(),
        });
        assert_eq!(store.cases_url(), "http://qa.internal/api/cases");
        assert_eq!(store.suites_url(), "http://qa.internal/api/suites");
    }
}
