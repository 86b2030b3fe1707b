//! Index schema discovery by sampling documents
//!
//! One cheap query (empty text, three hits) tells which fields of the index
//! hold millisecond timestamps. The result is cached; any failure falls back
//! to a known default schema, reported as [`SchemaSource::Defaulted`].

use crate::search::{SearchBackend, SearchRequest};
use serde::Serialize;
use tokio::sync::Mutex;

/// Number of documents sampled
const SAMPLE_SIZE: usize = 3;

/// Lowercased field names treated as dates when they hold integers
const DATE_FIELD_NAMES: [&str; 5] = ["publishdate", "closingdate", "created", "updated", "posteddate"];

/// Where the cached schema came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSource {
    Discovered,
    Defaulted,
}

/// Fields known to exist in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaInfo {
    pub date_fields: Vec<String>,
    pub sample_keys: Vec<String>,
    pub source: SchemaSource,
}

impl SchemaInfo {
    /// Schema used when discovery fails
    pub fn fallback() -> Self {
        Self {
            date_fields: ["publishDate", "closingDate", "created", "updated"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sample_keys: ["title", "location", "site", "categories", "keywords"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            source: SchemaSource::Defaulted,
        }
    }

    pub fn is_discovered(&self) -> bool {
        self.source == SchemaSource::Discovered
    }
}

/// Cached schema discovery
#[derive(Default)]
pub struct SchemaSampler {
    cached: Mutex<Option<SchemaInfo>>,
}

impl SchemaSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached schema, sampling the index on first use
    pub async fn discover(&self, backend: &dyn SearchBackend) -> SchemaInfo {
        let mut cached = self.cached.lock().await;
        if let Some(info) = cached.as_ref() {
            return info.clone();
        }

        let info = sample(backend).await;
        *cached = Some(info.clone());
        info
    }

    /// Drop the cached schema so the next call samples again
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

async fn sample(backend: &dyn SearchBackend) -> SchemaInfo {
    let request = SearchRequest::new("", SAMPLE_SIZE);

    match backend.search(&request).await {
        Ok(response) => match response.hits.first() {
            Some(hit) => {
                let date_fields: Vec<String> = hit
                    .iter()
                    .filter(|(key, value)| {
                        (value.is_i64() || value.is_u64())
                            && DATE_FIELD_NAMES.contains(&key.to_lowercase().as_str())
                    })
                    .map(|(key, _)| key.clone())
                    .collect();

                tracing::info!(
                    index = backend.index_name(),
                    "Discovered schema - date fields: {}",
                    date_fields.join(", ")
                );

                SchemaInfo {
                    date_fields,
                    sample_keys: hit.keys().cloned().collect(),
                    source: SchemaSource::Discovered,
                }
            }
            None => {
                tracing::warn!(
                    index = backend.index_name(),
                    "Schema discovery found no documents, using default schema"
                );
                SchemaInfo::fallback()
            }
        },
        Err(e) => {
            tracing::warn!("Schema discovery failed: {}, using default schema", e);
            SchemaInfo::fallback()
        }
    }
}
