//! MCP resource handlers

use crate::protocol::{ResourceContent, ResourceDescriptor};
use anyhow::Result;
use rfpscout_core::SchemaInfo;

/// URI of the sampled index schema
pub const SCHEMA_URI: &str = "rfpscout://schema";

pub fn list_resources() -> Vec<ResourceDescriptor> {
    vec![ResourceDescriptor {
        uri: SCHEMA_URI.to_string(),
        name: "Index schema".to_string(),
        description: "Date fields and sample keys of the RFP index, and whether they were discovered or defaulted"
            .to_string(),
        mime_type: "application/json".to_string(),
    }]
}

/// Read a resource by URI
pub fn read_resource(uri: &str, schema: &SchemaInfo) -> Result<ResourceContent> {
    if uri != SCHEMA_URI {
        anyhow::bail!("Resource not found: {}", uri);
    }

    Ok(ResourceContent {
        uri: uri.to_string(),
        mime_type: "application/json".to_string(),
        text: serde_json::to_string_pretty(schema)?,
    })
}
