//! Output formatters

pub mod json;
mod stream;
pub mod terminal;

pub use stream::StdoutSink;

use crate::app::OutputFormat;
use rfpscout_core::{AgentReply, RfpRecord, SchemaInfo, ToolEnvelope};

/// Format a search or statistics result
pub fn format_envelope(envelope: &ToolEnvelope, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_value(envelope),
        OutputFormat::Cli => match envelope {
            ToolEnvelope::Search(search) => terminal::format_search(search),
            ToolEnvelope::Statistics(stats) => terminal::format_statistics(stats),
            ToolEnvelope::Failure(failure) => format!("Error: {}\n", failure.error),
        },
    }
}

/// Format an agent reply
pub fn format_reply(reply: &AgentReply, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_value(reply),
        OutputFormat::Cli => {
            let mut output = format!("{}\n", reply.response);
            output.push_str(&terminal::format_sources(&reply.sources));
            output
        }
    }
}

/// Sources listed under a streamed reply
pub fn format_sources(sources: &[RfpRecord]) -> String {
    terminal::format_sources(sources)
}

pub fn format_schema(schema: &SchemaInfo, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_value(schema),
        OutputFormat::Cli => terminal::format_schema(schema),
    }
}
