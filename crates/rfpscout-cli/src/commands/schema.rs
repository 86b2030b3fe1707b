//! Index schema, tool declarations and the MCP server

use crate::app::OutputFormat;
use crate::output::format_schema;
use anyhow::Result;
use rfpscout_core::{build_tool_declaration, AlgoliaClient, Config, SchemaInfo, SchemaSampler};
use std::sync::Arc;

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let client = AlgoliaClient::new(config.search.clone())?;
    let schema = SchemaSampler::new().discover(&client).await;

    print!("{}", format_schema(&schema, format));
    Ok(())
}

/// Print the declarations; without search credentials the default schema is used
pub async fn run_tools(config: &Config) -> Result<()> {
    let schema = match AlgoliaClient::new(config.search.clone()) {
        Ok(client) => SchemaSampler::new().discover(&client).await,
        Err(e) => {
            tracing::warn!("Using default schema: {}", e);
            SchemaInfo::fallback()
        }
    };

    let tool = build_tool_declaration(&schema);
    println!("{}", serde_json::to_string_pretty(&tool)?);
    Ok(())
}

pub async fn run_mcp(config: &Config) -> Result<()> {
    let client = AlgoliaClient::new(config.search.clone())?;
    rfpscout_mcp::start_server(Arc::new(client)).await
}
