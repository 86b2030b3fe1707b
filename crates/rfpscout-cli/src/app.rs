//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use rfpscout_core::ConfigOverrides;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rfpscout")]
#[command(
    author,
    version,
    about = "Conversational search over RFPs and government solicitations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub service: ServiceArgs,
}

/// Overrides for the config file and environment
#[derive(Args)]
pub struct ServiceArgs {
    /// Config file path
    #[arg(long, global = true, env = "RFPSCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Algolia application id
    #[arg(long, global = true)]
    pub app_id: Option<String>,

    /// Algolia search-only API key
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Index to search
    #[arg(long, global = true)]
    pub index: Option<String>,

    /// Gemini API key
    #[arg(long, global = true)]
    pub gemini_key: Option<String>,

    /// Gemini model name
    #[arg(long, global = true)]
    pub model: Option<String>,
}

impl ServiceArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            algolia_app_id: self.app_id.clone(),
            algolia_search_api_key: self.api_key.clone(),
            algolia_index: self.index.clone(),
            gemini_api_key: self.gemini_key.clone(),
            model: self.model.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chat with the RFP assistant
    Chat(ChatArgs),

    /// Ask a single question
    Ask(AskArgs),

    /// Search the index without the model
    Search(SearchArgs),

    /// Facet statistics without the model
    Stats(StatsArgs),

    /// Show the sampled index schema
    Schema,

    /// Print the tool declarations sent to the model
    Tools,

    /// Start MCP server
    Mcp,
}

#[derive(Args)]
pub struct ChatArgs {
    /// Conversation thread id
    #[arg(long, default_value = "default")]
    pub thread: String,
}

#[derive(Args)]
pub struct AskArgs {
    /// Question
    #[arg(required = true)]
    pub query: Vec<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search keywords
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of results
    #[arg(short = 'n', default_value = "5")]
    pub limit: usize,

    /// Raw index filter, e.g. 'location:Texas'
    #[arg(long)]
    pub filters: Option<String>,

    /// today, yesterday, past_week, past_month, past_3_months or YYYY-MM-DD_to_YYYY-MM-DD
    #[arg(long)]
    pub date_range: Option<String>,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Field to group by (cnStatus, cnType, location, site)
    #[arg(long, default_value = "cnStatus")]
    pub facet: String,

    /// Raw index filter
    #[arg(long)]
    pub filters: Option<String>,

    /// Time period, same forms as `search --date-range`
    #[arg(long)]
    pub date_range: Option<String>,
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Cli,
    Json,
}
