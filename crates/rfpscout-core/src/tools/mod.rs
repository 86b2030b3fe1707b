//! The two operations exposed to the model
//!
//! - `search_rfp_database`: ranked retrieval reshaped into [`RfpRecord`]s
//! - `get_rfp_statistics`: faceted counts with percentages
//!
//! Executors never fail: every error becomes a `{success: false, error}`
//! envelope that is handed back to the model as-is.

mod declaration;
mod executor;

pub use declaration::build_tool_declaration;
pub use executor::{dispatch, rfp_statistics, search_rfps};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the search tool
pub const SEARCH_TOOL: &str = "search_rfp_database";

/// Name of the statistics tool
pub const STATISTICS_TOOL: &str = "get_rfp_statistics";

pub const DEFAULT_HITS_PER_PAGE: usize = 5;
pub const MAX_HITS_PER_PAGE: usize = 50;

/// Field a statistics breakdown can group by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FacetField {
    #[serde(rename = "cnStatus")]
    CnStatus,
    #[serde(rename = "cnType")]
    CnType,
    #[serde(rename = "location")]
    Location,
    #[serde(rename = "site")]
    Site,
}

impl FacetField {
    pub const ALL: [FacetField; 4] = [
        FacetField::CnStatus,
        FacetField::CnType,
        FacetField::Location,
        FacetField::Site,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FacetField::CnStatus => "cnStatus",
            FacetField::CnType => "cnType",
            FacetField::Location => "location",
            FacetField::Site => "site",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }
}

/// Arguments of `search_rfp_database`
#[derive(Debug, Clone, PartialEq)]
pub struct SearchArgs {
    pub query: String,
    pub filters: Option<String>,
    pub hits_per_page: usize,
    pub date_range: Option<String>,
}

impl SearchArgs {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: None,
            hits_per_page: DEFAULT_HITS_PER_PAGE,
            date_range: None,
        }
    }

    /// Read arguments from a tool invocation
    pub fn from_args(args: &Map<String, Value>) -> Self {
        Self {
            query: string_arg(args, "query").unwrap_or_default(),
            filters: string_arg(args, "filters"),
            hits_per_page: args
                .get("hits_per_page")
                .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64)))
                .map(|n| n as usize)
                .unwrap_or(DEFAULT_HITS_PER_PAGE),
            date_range: string_arg(args, "date_range"),
        }
    }
}

/// Arguments of `get_rfp_statistics`
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsArgs {
    pub facet_by: String,
    pub filters: Option<String>,
    pub date_range: Option<String>,
}

impl StatisticsArgs {
    pub fn new(facet_by: impl Into<String>) -> Self {
        Self {
            facet_by: facet_by.into(),
            filters: None,
            date_range: None,
        }
    }

    /// Read arguments from a tool invocation
    pub fn from_args(args: &Map<String, Value>) -> Self {
        Self {
            facet_by: string_arg(args, "facet_by")
                .unwrap_or_else(|| FacetField::CnStatus.as_str().to_string()),
            filters: string_arg(args, "filters"),
            date_range: string_arg(args, "date_range"),
        }
    }
}

/// Non-empty string argument
fn string_arg(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// One search hit in the fixed output shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfpRecord {
    pub title: String,
    pub description: String,
    pub issuer: String,
    pub location: String,
    pub site: String,
    pub site_url: String,
    pub scraped_date: Option<String>,
    pub closing_date: Option<String>,
    pub publish_date: Option<String>,
    pub questions_due_by_date: Option<String>,
    pub cn_status: String,
    pub cn_type: String,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
}

impl RfpRecord {
    /// Source entry summarizing a statistics call
    pub fn statistics_summary(total: u64, facet_field: &str) -> Self {
        Self {
            title: format!("Statistical Analysis of {} RFPs", total),
            description: format!("Analyzed by {}", facet_field),
            issuer: String::new(),
            location: String::new(),
            site: "Statistics".to_string(),
            site_url: String::new(),
            scraped_date: None,
            closing_date: None,
            publish_date: None,
            questions_due_by_date: None,
            cn_status: String::new(),
            cn_type: String::new(),
            categories: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

/// One row of a statistics breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEnvelope {
    pub success: bool,
    pub total_matching_rfps: u64,
    pub returned_results: usize,
    pub results: Vec<RfpRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsEnvelope {
    pub success: bool,
    pub total_rfps: u64,
    pub facet_field: String,
    pub date_range: String,
    pub breakdown: Vec<FacetCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureEnvelope {
    pub success: bool,
    pub error: String,
}

/// Result of one tool invocation, as handed back to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolEnvelope {
    Search(SearchEnvelope),
    Statistics(StatisticsEnvelope),
    Failure(FailureEnvelope),
}

impl ToolEnvelope {
    pub fn failure(error: impl Into<String>) -> Self {
        ToolEnvelope::Failure(FailureEnvelope {
            success: false,
            error: error.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ToolEnvelope::Failure(_))
    }

    /// Records this result contributes to a reply's sources
    pub fn sources(&self) -> Vec<RfpRecord> {
        match self {
            ToolEnvelope::Search(s) => s.results.clone(),
            ToolEnvelope::Statistics(s) if s.total_rfps > 0 => {
                vec![RfpRecord::statistics_summary(s.total_rfps, &s.facet_field)]
            }
            _ => Vec::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "success": false, "error": e.to_string() })
        })
    }

    /// Pretty JSON document sent to the model
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!("{{\"success\": false, \"error\": \"{}\"}}", e)
        })
    }
}
