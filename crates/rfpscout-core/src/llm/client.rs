//! HTTP client for the Gemini generateContent API

use super::types::{Content, GenerateRequest, GenerateResponse, ROLE_MODEL};
use crate::config::LLMServiceConfig;
use crate::error::{Result, RfpScoutError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for chat model clients
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate the next model turn for a transcript
    async fn generate(&self, request: &GenerateRequest) -> Result<Content>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// API metrics for monitoring
#[derive(Debug, Default)]
pub struct APIMetrics {
    pub total_requests: AtomicU64,
    pub total_errors: AtomicU64,
    pub total_latency_ms: AtomicU64,
}

/// Snapshot of API metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub avg_latency_ms: f64,
}

/// Gemini REST client
pub struct GeminiClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    metrics: Arc<APIMetrics>,
}

impl GeminiClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        if config.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(RfpScoutError::Config("Missing Gemini API key".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RfpScoutError::Http)?;

        Ok(Self {
            http_client,
            config,
            metrics: Arc::new(APIMetrics::default()),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(LLMServiceConfig::default())
    }

    /// generateContent endpoint for the configured model
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Get current API metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        let total = self.metrics.total_requests.load(Ordering::Relaxed);

        MetricsSnapshot {
            total_requests: total,
            total_errors: self.metrics.total_errors.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                self.metrics.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    fn record_error(&self) {
        self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<Content> {
        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", self.config.api_key.as_deref().unwrap_or_default())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                self.record_error();
                RfpScoutError::Http(e)
            })?;

        if !response.status().is_success() {
            self.record_error();
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RfpScoutError::ExternalError(format!(
                "LLM service error (HTTP {}): {}",
                status, body
            )));
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            self.record_error();
            RfpScoutError::Http(e)
        })?;

        let elapsed = start.elapsed().as_millis() as u64;
        self.metrics
            .total_latency_ms
            .fetch_add(elapsed, Ordering::Relaxed);

        first_candidate(generated).inspect_err(|_| self.record_error())
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

fn first_candidate(response: GenerateResponse) -> Result<Content> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| RfpScoutError::Llm("No response from model".to_string()))?;

    let mut content = candidate.content.unwrap_or_default();
    if content.parts.is_empty() {
        if let Some(reason) = candidate.finish_reason {
            tracing::warn!("Model returned no content (finish reason: {})", reason);
        }
    }
    content.role = Some(ROLE_MODEL.to_string());
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::Candidate;

    fn config() -> LLMServiceConfig {
        LLMServiceConfig {
            url: "https://generativelanguage.googleapis.com/".to_string(),
            model: "gemini-flash-latest".to_string(),
            api_key: Some("key".to_string()),
            temperature: 0.7,
            max_output_tokens: 2048,
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(config()).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-flash-latest:generateContent"
        );
        assert_eq!(client.model_name(), "gemini-flash-latest");
        assert_eq!(client.metrics().total_requests, 0);
    }

    #[test]
    fn test_missing_key_rejected() {
        let mut cfg = config();
        cfg.api_key = Some(String::new());
        assert!(matches!(GeminiClient::new(cfg), Err(RfpScoutError::Config(_))));
    }

    #[test]
    fn test_no_candidates_is_an_error() {
        let err = first_candidate(GenerateResponse::default()).unwrap_err();
        assert!(err.to_string().contains("No response from model"));
    }

    #[test]
    fn test_empty_candidate_yields_empty_model_turn() {
        let response = GenerateResponse {
            candidates: vec![Candidate {
                content: None,
                finish_reason: Some("SAFETY".to_string()),
            }],
        };
        let content = first_candidate(response).unwrap();
        assert_eq!(content.role.as_deref(), Some("model"));
        assert!(content.text().is_empty());
    }
}
