//! REST client for the Algolia search API

use super::{SearchBackend, SearchRequest, SearchResponse};
use crate::config::SearchServiceConfig;
use crate::error::{Result, RfpScoutError};
use async_trait::async_trait;
use std::time::Duration;

/// Algolia index client
pub struct AlgoliaClient {
    http_client: reqwest::Client,
    config: SearchServiceConfig,
    query_url: reqwest::Url,
}

impl AlgoliaClient {
    /// Create new client from configuration
    pub fn new(config: SearchServiceConfig) -> Result<Self> {
        let (Some(_), Some(_)) = (&config.app_id, &config.api_key) else {
            return Err(RfpScoutError::Config(
                "Missing Algolia configuration".to_string(),
            ));
        };

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RfpScoutError::Http)?;

        let query_url = build_query_url(&config.base_url(), &config.index_name)?;

        Ok(Self {
            http_client,
            config,
            query_url,
        })
    }

    /// Endpoint queried by [`SearchBackend::search`]
    pub fn query_url(&self) -> &str {
        self.query_url.as_str()
    }
}

fn build_query_url(base: &str, index_name: &str) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| RfpScoutError::Config(format!("Invalid search host '{}': {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| RfpScoutError::Config(format!("Invalid search host '{}'", base)))?
        .pop_if_empty()
        .extend(["1", "indexes", index_name, "query"]);
    Ok(url)
}

#[async_trait]
impl SearchBackend for AlgoliaClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        tracing::debug!(
            index = %self.config.index_name,
            query = %request.query,
            filters = ?request.filters,
            "Querying search index"
        );

        let response = self
            .http_client
            .post(self.query_url.clone())
            .header(
                "X-Algolia-Application-Id",
                self.config.app_id.as_deref().unwrap_or_default(),
            )
            .header(
                "X-Algolia-API-Key",
                self.config.api_key.as_deref().unwrap_or_default(),
            )
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RfpScoutError::ExternalError(format!(
                "Search service error (HTTP {}): {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    fn index_name(&self) -> &str {
        &self.config.index_name
    }
}
