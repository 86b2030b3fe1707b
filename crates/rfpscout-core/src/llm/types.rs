//! Wire types of the generateContent API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const ROLE_USER: &str = "user";
pub const ROLE_MODEL: &str = "model";

/// One turn of a conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some(ROLE_USER.to_string()),
            parts,
        }
    }

    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Some(ROLE_MODEL.to_string()),
            parts,
        }
    }

    /// Role-less content, as used for system instructions
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }

    /// Tool invocations requested in this turn
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(|p| p.function_call.as_ref())
            .collect()
    }
}

/// Part of a turn: text, a tool invocation, or a tool result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
    /// Opaque token the model requires back on replayed turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn function_call(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            function_call: Some(FunctionCall {
                name: name.into(),
                args,
            }),
            ..Default::default()
        }
    }

    pub fn function_response(name: impl Into<String>, response: Value) -> Self {
        Self {
            function_response: Some(FunctionResponse {
                name: name.into(),
                response,
            }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

/// Parameter schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl SchemaType {
    /// JSON Schema spelling
    pub fn json_name(&self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
        }
    }
}

/// Parameter schema (OpenAPI subset)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Schema {
    pub fn object() -> Self {
        Self::of(SchemaType::Object, None)
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::of(SchemaType::String, Some(description.into()))
    }

    pub fn integer(description: impl Into<String>) -> Self {
        Self::of(SchemaType::Integer, Some(description.into()))
    }

    fn of(schema_type: SchemaType, description: Option<String>) -> Self {
        Self {
            schema_type,
            description,
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    pub fn property(mut self, name: &str, schema: Schema) -> Self {
        self.properties.insert(name.to_string(), schema);
        self
    }

    pub fn require(mut self, name: &str) -> Self {
        self.required.push(name.to_string());
        self
    }

    /// Render as a JSON Schema document
    pub fn to_json_schema(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::String(self.schema_type.json_name().into()));
        if let Some(description) = &self.description {
            out.insert("description".into(), Value::String(description.clone()));
        }
        if !self.properties.is_empty() {
            let props: Map<String, Value> = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_json_schema()))
                .collect();
            out.insert("properties".into(), Value::Object(props));
        }
        if !self.required.is_empty() {
            out.insert(
                "required".into(),
                Value::Array(self.required.iter().cloned().map(Value::String).collect()),
            );
        }
        Value::Object(out)
    }
}

/// Callable operation described to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Schema,
}

/// Set of callable operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FunctionCallingMode {
    Auto,
    Any,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallingConfig {
    pub mode: FunctionCallingMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub function_calling_config: FunctionCallingConfig,
}

impl ToolConfig {
    pub fn auto() -> Self {
        Self {
            function_calling_config: FunctionCallingConfig {
                mode: FunctionCallingMode::Auto,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 2048,
        }
    }
}

/// Request body of generateContent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Response body of generateContent
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_function_call_turn() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"functionCall": {"name": "search_rfp_database", "args": {"query": "Infor"}}},
                        {"text": "Looking that up."}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"totalTokenCount": 10}
        }))
        .unwrap();

        let content = response.candidates[0].content.clone().unwrap();
        let calls = content.function_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "search_rfp_database");
        assert_eq!(calls[0].args["query"], "Infor");
        assert_eq!(content.text(), "Looking that up.");
    }

    #[test]
    fn test_replayed_turn_keeps_thought_signature() {
        let raw = serde_json::json!({
            "role": "model",
            "parts": [{
                "functionCall": {"name": "search_rfp_database", "args": {"query": "Infor"}},
                "thoughtSignature": "CsYBAbc123"
            }, {
                "text": "planning",
                "thought": true
            }]
        });
        let content: Content = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(content.parts[0].thought_signature.as_deref(), Some("CsYBAbc123"));

        let replayed = serde_json::to_value(&content).unwrap();
        assert_eq!(replayed, raw);
    }

    #[test]
    fn test_function_response_part_serializes_camel_case() {
        let part = Part::function_response("get_rfp_statistics", serde_json::json!({"result": "{}"}));
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["functionResponse"]["name"], "get_rfp_statistics");
        assert!(json.get("text").is_none());
    }

    #[test]
    fn test_schema_renders_both_dialects() {
        let schema = Schema::object()
            .property("query", Schema::string("keywords"))
            .property("hits_per_page", Schema::integer("count"))
            .require("query");

        let gemini = serde_json::to_value(&schema).unwrap();
        assert_eq!(gemini["type"], "OBJECT");
        assert_eq!(gemini["properties"]["hits_per_page"]["type"], "INTEGER");

        let json_schema = schema.to_json_schema();
        assert_eq!(json_schema["type"], "object");
        assert_eq!(json_schema["properties"]["query"]["type"], "string");
        assert_eq!(json_schema["required"], serde_json::json!(["query"]));
    }

    #[test]
    fn test_request_skips_empty_fields() {
        let request = GenerateRequest {
            contents: vec![Content::user(vec![Part::text("hi")])],
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("systemInstruction").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
    }

    #[test]
    fn test_tool_config_auto() {
        let json = serde_json::to_value(ToolConfig::auto()).unwrap();
        assert_eq!(json["functionCallingConfig"]["mode"], "AUTO");
    }
}
