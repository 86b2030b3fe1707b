//! MCP tool definitions and handlers

use crate::protocol::*;
use anyhow::Result;
use rfpscout_core::llm::FunctionCall;
use rfpscout_core::{build_tool_declaration, dispatch, SchemaInfo, SearchBackend, ToolEnvelope};
use serde_json::{Map, Value};

/// The model's function declarations, as MCP tools
pub fn tool_definitions(schema: &SchemaInfo) -> Vec<ToolDefinition> {
    build_tool_declaration(schema)
        .function_declarations
        .into_iter()
        .map(|declaration| ToolDefinition {
            name: declaration.name,
            description: declaration.description,
            input_schema: declaration.parameters.to_json_schema(),
        })
        .collect()
}

/// Run a tool; unknown names come back as an error result, not an `Err`
pub async fn handle_call(
    backend: &dyn SearchBackend,
    name: &str,
    arguments: Value,
) -> Result<ToolResult> {
    let args = match arguments {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => anyhow::bail!("Tool arguments must be an object, got: {}", other),
    };

    let call = FunctionCall {
        name: name.to_string(),
        args,
    };
    Ok(envelope_result(&dispatch(backend, &call).await))
}

fn envelope_result(envelope: &ToolEnvelope) -> ToolResult {
    ToolResult {
        content: vec![Content::Text {
            text: envelope.to_json_string(),
        }],
        structured_content: Some(envelope.to_value()),
        is_error: Some(!envelope.is_success()),
    }
}
