//! RFP Scout Core Library
//!
//! Conversational search over a hosted index of RFPs and government
//! solicitations.
//!
//! # Features
//! - Tool-calling chat sessions against Gemini, one per conversation thread
//! - Ranked search and faceted statistics over an Algolia index
//! - Natural-language date windows translated to epoch-millisecond filters
//! - Index schema sampling to describe date fields to the model

pub mod agent;
pub mod config;
pub mod date_range;
pub mod error;
pub mod filter;
pub mod llm;
pub mod schema;
pub mod search;
pub mod sink;
pub mod tools;

pub use agent::{AgentReply, RfpAgent, SessionStore, DEFAULT_THREAD_ID};
pub use config::{Config, ConfigOverrides, LLMServiceConfig, SearchServiceConfig};
pub use date_range::{date_range_filter, parse_date_range, DateRange};
pub use error::{Error, Result, RfpScoutError};
pub use filter::{FilterExpr, FilterOp, FilterValue};
pub use llm::{ChatModel, ChatSession, GeminiClient, MetricsSnapshot};
pub use schema::{SchemaInfo, SchemaSampler, SchemaSource};
pub use search::{AlgoliaClient, SearchBackend, SearchRequest, SearchResponse};
pub use sink::{BufferSink, OutputSink};
pub use tools::{
    build_tool_declaration, dispatch, rfp_statistics, search_rfps, FacetField, RfpRecord,
    SearchArgs, StatisticsArgs, ToolEnvelope,
};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "rfpscout";
