//! Hosted search index access
//!
//! [`SearchBackend`] is the consumed contract: ranked retrieval and faceted
//! aggregation over one index. [`AlgoliaClient`] implements it over REST.

mod algolia;

pub use algolia::AlgoliaClient;

use crate::error::Result;
use crate::filter::FilterExpr;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One retrieved index document
pub type Hit = Map<String, Value>;

/// Search parameters sent to the index
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub hits_per_page: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes_to_retrieve: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, hits_per_page: usize) -> Self {
        Self {
            query: query.into(),
            hits_per_page,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: Option<&FilterExpr>) -> Self {
        self.filters = filter.map(FilterExpr::render);
        self
    }

    pub fn retrieve_all_attributes(mut self) -> Self {
        self.attributes_to_retrieve = vec!["*".to_string()];
        self
    }

    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facets.push(facet.into());
        self
    }
}

/// Search results
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<Hit>,

    /// Total number of matching documents
    #[serde(default)]
    pub nb_hits: Option<u64>,

    /// Per-facet value counts
    #[serde(default)]
    pub facets: BTreeMap<String, BTreeMap<String, u64>>,
}

/// Trait for search service clients
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one query against the configured index
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Name of the configured index
    fn index_name(&self) -> &str;
}
