//! Tool executors against the search backend

use super::{
    FacetCount, FacetField, RfpRecord, SearchArgs, SearchEnvelope, StatisticsArgs,
    StatisticsEnvelope, ToolEnvelope, MAX_HITS_PER_PAGE, SEARCH_TOOL, STATISTICS_TOOL,
};
use crate::date_range::date_range_filter;
use crate::error::Result;
use crate::filter::FilterExpr;
use crate::llm::FunctionCall;
use crate::search::{Hit, SearchBackend, SearchRequest};
use chrono::{Local, TimeZone};
use serde_json::Value;

/// Run the search tool
pub async fn search_rfps(backend: &dyn SearchBackend, args: &SearchArgs) -> ToolEnvelope {
    match try_search(backend, args).await {
        Ok(envelope) => ToolEnvelope::Search(envelope),
        Err(e) => {
            tracing::warn!("Search tool failed: {}", e);
            ToolEnvelope::failure(e.to_string())
        }
    }
}

/// Run the statistics tool
pub async fn rfp_statistics(backend: &dyn SearchBackend, args: &StatisticsArgs) -> ToolEnvelope {
    let Some(facet) = FacetField::parse(&args.facet_by) else {
        let allowed: Vec<&str> = FacetField::ALL.iter().map(|f| f.as_str()).collect();
        return ToolEnvelope::failure(format!(
            "Unsupported facet field: {} (expected one of {})",
            args.facet_by,
            allowed.join(", ")
        ));
    };

    match try_statistics(backend, facet, args).await {
        Ok(envelope) => ToolEnvelope::Statistics(envelope),
        Err(e) => {
            tracing::warn!("Statistics tool failed: {}", e);
            ToolEnvelope::failure(e.to_string())
        }
    }
}

/// Route a model's tool invocation to its executor by name
pub async fn dispatch(backend: &dyn SearchBackend, call: &FunctionCall) -> ToolEnvelope {
    tracing::info!(function = %call.name, "Executing tool call");
    tracing::debug!(args = ?call.args, "Tool call arguments");

    match call.name.as_str() {
        SEARCH_TOOL => search_rfps(backend, &SearchArgs::from_args(&call.args)).await,
        STATISTICS_TOOL => rfp_statistics(backend, &StatisticsArgs::from_args(&call.args)).await,
        other => ToolEnvelope::failure(format!("Unknown function: {}", other)),
    }
}

/// Date filter AND caller filter
fn combined_filter(filters: Option<&str>, date_range: Option<&str>) -> Result<Option<FilterExpr>> {
    let date = date_range.and_then(|phrase| date_range_filter(phrase, &Local::now()));
    let caller = filters
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(FilterExpr::raw)
        .transpose()?;
    Ok(FilterExpr::combine(date, caller))
}

async fn try_search(backend: &dyn SearchBackend, args: &SearchArgs) -> Result<SearchEnvelope> {
    let filter = combined_filter(args.filters.as_deref(), args.date_range.as_deref())?;
    let hits_per_page = args.hits_per_page.clamp(1, MAX_HITS_PER_PAGE);

    let request = SearchRequest::new(args.query.clone(), hits_per_page)
        .with_filter(filter.as_ref())
        .retrieve_all_attributes();
    let response = backend.search(&request).await?;

    let results: Vec<RfpRecord> = response.hits.iter().map(to_record).collect();
    let total = response.nb_hits.unwrap_or(results.len() as u64);

    Ok(SearchEnvelope {
        success: true,
        total_matching_rfps: total,
        returned_results: results.len(),
        results,
    })
}

async fn try_statistics(
    backend: &dyn SearchBackend,
    facet: FacetField,
    args: &StatisticsArgs,
) -> Result<StatisticsEnvelope> {
    let filter = combined_filter(args.filters.as_deref(), args.date_range.as_deref())?;

    let request = SearchRequest::new("", 0)
        .with_filter(filter.as_ref())
        .with_facet(facet.as_str());
    let response = backend.search(&request).await?;

    let total = response.nb_hits.unwrap_or(0);
    let counts = response.facets.get(facet.as_str()).cloned().unwrap_or_default();

    Ok(StatisticsEnvelope {
        success: true,
        total_rfps: total,
        facet_field: facet.as_str().to_string(),
        date_range: args
            .date_range
            .clone()
            .unwrap_or_else(|| "all_time".to_string()),
        breakdown: breakdown(counts, total),
    })
}

/// Facet counts with percentages, largest first, ties by value name
fn breakdown(counts: impl IntoIterator<Item = (String, u64)>, total: u64) -> Vec<FacetCount> {
    let mut rows: Vec<FacetCount> = counts
        .into_iter()
        .map(|(value, count)| FacetCount {
            percentage: if total > 0 {
                round2(count as f64 / total as f64 * 100.0)
            } else {
                0.0
            },
            value,
            count,
        })
        .collect();

    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    rows
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn to_record(hit: &Hit) -> RfpRecord {
    let text = |key: &str| {
        hit.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let list = |key: &str| -> Vec<String> {
        hit.get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    };
    let date = |key: &str| format_timestamp(hit.get(key));

    RfpRecord {
        title: hit
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Untitled")
            .to_string(),
        description: text("description"),
        issuer: text("issuer"),
        location: text("location"),
        site: text("site"),
        site_url: text("siteUrl"),
        scraped_date: date("created"),
        closing_date: date("closingDate"),
        publish_date: date("publishDate"),
        questions_due_by_date: date("questionsDueByDate"),
        cn_status: text("cnStatus"),
        cn_type: text("cnType"),
        categories: list("categories"),
        keywords: list("keywords"),
    }
}

/// Millisecond epoch to a local `YYYY-MM-DD`; missing, zero or non-numeric values give `None`
fn format_timestamp(value: Option<&Value>) -> Option<String> {
    let millis = value.and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))?;
    if millis == 0 {
        return None;
    }
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_defaults() {
        let hit = json!({}).as_object().unwrap().clone();
        let record = to_record(&hit);
        assert_eq!(record.title, "Untitled");
        assert_eq!(record.description, "");
        assert!(record.categories.is_empty());
        assert!(record.scraped_date.is_none());
    }

    #[test]
    fn test_record_reads_fields() {
        let created = Local
            .with_ymd_and_hms(2025, 1, 15, 12, 0, 0)
            .earliest()
            .unwrap()
            .timestamp_millis();
        let hit = json!({
            "title": "Network refresh",
            "issuer": "City of Austin",
            "siteUrl": "https://example.gov/rfp/1",
            "created": created,
            "closingDate": 0,
            "publishDate": "soon",
            "categories": ["IT Services", 7],
            "keywords": "not-a-list",
        })
        .as_object()
        .unwrap()
        .clone();

        let record = to_record(&hit);
        assert_eq!(record.title, "Network refresh");
        assert_eq!(record.issuer, "City of Austin");
        assert_eq!(record.site_url, "https://example.gov/rfp/1");
        assert_eq!(record.scraped_date.as_deref(), Some("2025-01-15"));
        assert!(record.closing_date.is_none());
        assert!(record.publish_date.is_none());
        assert_eq!(record.categories, vec!["IT Services".to_string()]);
        assert!(record.keywords.is_empty());
    }

    #[test]
    fn test_breakdown_orders_by_count_then_value() {
        let counts = vec![
            ("monitor".to_string(), 5),
            ("pursuing".to_string(), 20),
            ("declined".to_string(), 5),
            ("submitted".to_string(), 1),
        ];
        let rows = breakdown(counts, 40);

        let order: Vec<&str> = rows.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(order, vec!["pursuing", "declined", "monitor", "submitted"]);
        assert_eq!(rows[0].percentage, 50.0);
        assert_eq!(rows[1].percentage, 12.5);
        assert_eq!(rows[3].percentage, 2.5);
    }

    #[test]
    fn test_breakdown_rounds_and_handles_zero_total() {
        let rows = breakdown(vec![("a".to_string(), 1)], 3);
        assert_eq!(rows[0].percentage, 33.33);

        let rows = breakdown(vec![("a".to_string(), 4)], 0);
        assert_eq!(rows[0].percentage, 0.0);
    }

    #[test]
    fn test_combined_filter_rejects_malformed_caller_filter() {
        assert!(combined_filter(Some("(location:Texas"), None).is_err());
        assert!(combined_filter(None, Some("next week")).unwrap().is_none());
    }

    #[test]
    fn test_blank_caller_filter_means_no_filter() {
        assert!(combined_filter(Some(""), None).unwrap().is_none());
        assert!(combined_filter(Some("   "), None).unwrap().is_none());
    }

    /// Fails every query, counting them
    #[derive(Default)]
    struct DownBackend {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SearchBackend for DownBackend {
        async fn search(&self, _request: &SearchRequest) -> Result<crate::search::SearchResponse> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err(crate::error::RfpScoutError::ExternalError(
                "Search service error (HTTP 503): unavailable".to_string(),
            ))
        }

        fn index_name(&self) -> &str {
            "down"
        }
    }

    #[tokio::test]
    async fn test_unknown_facet_never_queries() {
        let backend = DownBackend::default();
        let envelope = rfp_statistics(&backend, &StatisticsArgs::new("issuer")).await;

        let ToolEnvelope::Failure(failure) = envelope else {
            panic!("expected failure envelope");
        };
        assert!(failure.error.contains("Unsupported facet field: issuer"));
        assert!(failure.error.contains("cnStatus, cnType, location, site"));
        assert_eq!(backend.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_backend_errors_become_failure_envelopes() {
        let backend = DownBackend::default();

        let search = search_rfps(&backend, &SearchArgs::new("erp")).await;
        assert!(!search.is_success());
        assert!(search.to_value()["error"]
            .as_str()
            .unwrap()
            .contains("HTTP 503"));

        let stats = rfp_statistics(&backend, &StatisticsArgs::new("site")).await;
        assert!(!stats.is_success());
    }

    #[tokio::test]
    async fn test_blank_filter_still_queries() {
        let backend = DownBackend::default();
        let mut args = SearchArgs::new("erp");
        args.filters = Some(String::new());

        let envelope = search_rfps(&backend, &args).await;
        let error = envelope.to_value()["error"].as_str().unwrap().to_string();
        assert!(error.contains("HTTP 503"));
        assert!(!error.contains("Invalid filter"));
        assert_eq!(backend.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let backend = DownBackend::default();
        let call = FunctionCall {
            name: "summarize_everything".to_string(),
            args: Default::default(),
        };
        let envelope = dispatch(&backend, &call).await;
        assert_eq!(
            envelope.to_value(),
            json!({"success": false, "error": "Unknown function: summarize_everything"})
        );
    }
}
