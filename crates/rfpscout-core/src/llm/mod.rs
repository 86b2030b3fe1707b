//! LLM integration
//!
//! Provides:
//! - The generateContent wire types (turns, parts, tool declarations)
//! - A Gemini REST client behind the [`ChatModel`] trait
//! - [`ChatSession`], a stateful transcript on top of it

mod client;
mod session;
pub mod types;

pub use client::{APIMetrics, ChatModel, GeminiClient, MetricsSnapshot};
pub use session::ChatSession;
pub use types::{
    Content, FunctionCall, FunctionDeclaration, FunctionResponse, GenerateRequest,
    GenerationConfig, Part, Schema, SchemaType, Tool, ToolConfig,
};
