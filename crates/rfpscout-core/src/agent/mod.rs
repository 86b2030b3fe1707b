//! Conversational agent over the RFP index
//!
//! One turn: send the user message, run every tool the model asks for,
//! send all tool results back in a single turn, and deliver the model's
//! final text to an [`OutputSink`].

mod prompt;
mod store;

pub use prompt::{system_instruction, ONE_SHOT_INSTRUCTION};
pub use store::{SessionStore, SharedSession};

use crate::config::Config;
use crate::error::Result;
use crate::llm::{ChatModel, ChatSession, FunctionCall, GeminiClient, GenerationConfig, Part, Tool};
use crate::schema::{SchemaInfo, SchemaSampler};
use crate::search::{AlgoliaClient, SearchBackend};
use crate::sink::{BufferSink, OutputSink};
use crate::tools::{build_tool_declaration, dispatch, RfpRecord};
use chrono::Local;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Thread id used when the caller gives none
pub const DEFAULT_THREAD_ID: &str = "default";

/// Outcome of one agent turn
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReply {
    pub success: bool,
    pub response: String,
    /// Number of tool invocations the model made
    pub function_calls: usize,
    pub sources: Vec<RfpRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct TurnOutcome {
    text: String,
    function_calls: usize,
    sources: Vec<RfpRecord>,
}

/// Chat agent holding per-thread sessions
pub struct RfpAgent {
    search: Arc<dyn SearchBackend>,
    model: Arc<dyn ChatModel>,
    schema: SchemaSampler,
    sessions: SessionStore,
    generation: GenerationConfig,
}

impl RfpAgent {
    pub fn new(search: Arc<dyn SearchBackend>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            search,
            model,
            schema: SchemaSampler::new(),
            sessions: SessionStore::new(),
            generation: GenerationConfig::default(),
        }
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    /// Build the agent with the hosted search index and Gemini
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let search = AlgoliaClient::new(config.search.clone())?;
        let model = GeminiClient::new(config.llm.clone())?;
        info!(
            index = %search.index_name(),
            model = %config.llm.model,
            "Initialized RFP agent"
        );

        Ok(Self::new(Arc::new(search), Arc::new(model)).with_generation(GenerationConfig {
            temperature: config.llm.temperature,
            max_output_tokens: config.llm.max_output_tokens,
        }))
    }

    pub fn search_backend(&self) -> Arc<dyn SearchBackend> {
        Arc::clone(&self.search)
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Index schema, sampled once and cached
    pub async fn schema(&self) -> SchemaInfo {
        self.schema.discover(self.search.as_ref()).await
    }

    /// Tool surface declared to the model
    pub async fn tool_declaration(&self) -> Tool {
        build_tool_declaration(&self.schema().await)
    }

    /// Answer `query` within the conversation of `thread_id`
    ///
    /// Never fails: errors are written to the sink and reported in the reply.
    /// Turns on the same thread run one at a time.
    pub async fn respond(
        &self,
        query: &str,
        thread_id: Option<&str>,
        sink: &mut dyn OutputSink,
    ) -> AgentReply {
        let thread_id = thread_id
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_THREAD_ID);
        info!(thread = thread_id, "Processing query: {}", query);

        let session = self.thread_session(thread_id).await;
        let outcome = {
            let mut session = session.lock().await;
            self.run_turn(&mut session, query).await
        };

        deliver(outcome, sink).await
    }

    /// Answer `query` without conversation state
    pub async fn ask(&self, query: &str) -> AgentReply {
        let tool = self.tool_declaration().await;
        let mut session = ChatSession::new(ONE_SHOT_INSTRUCTION, vec![tool], self.generation.clone());

        let outcome = self.run_turn(&mut session, query).await;
        let mut sink = BufferSink::new();
        deliver(outcome, &mut sink).await
    }

    /// Forget the conversation of `thread_id`
    pub async fn end_session(&self, thread_id: &str) -> bool {
        let removed = self.sessions.remove(thread_id).await;
        if removed {
            info!(thread = thread_id, "Ended chat session");
        }
        removed
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }

    /// Drop every session
    pub async fn close(&self) {
        let count = self.sessions.len().await;
        self.sessions.clear().await;
        info!("Closed {} chat session(s)", count);
    }

    async fn thread_session(&self, thread_id: &str) -> SharedSession {
        if let Some(existing) = self.sessions.get(thread_id).await {
            return existing;
        }

        let tool = self.tool_declaration().await;
        let instruction = system_instruction(&Local::now());
        let generation = self.generation.clone();

        let (session, created) = self
            .sessions
            .get_or_create(thread_id, move || {
                ChatSession::new(instruction, vec![tool], generation)
            })
            .await;
        if created {
            info!(thread = thread_id, "Created new chat session");
        }
        session
    }

    async fn run_turn(&self, session: &mut ChatSession, query: &str) -> Result<TurnOutcome> {
        let checkpoint = session.history().len();
        let first = session.send_text(self.model.as_ref(), query).await?;

        let calls: Vec<FunctionCall> = first.function_calls().into_iter().cloned().collect();
        if calls.is_empty() {
            return Ok(TurnOutcome {
                text: first.text(),
                function_calls: 0,
                sources: Vec::new(),
            });
        }
        info!("Model requested {} tool call(s)", calls.len());

        let mut sources = Vec::new();
        let mut responses = Vec::with_capacity(calls.len());
        for call in &calls {
            let envelope = dispatch(self.search.as_ref(), call).await;
            if !envelope.is_success() {
                warn!(function = %call.name, "Tool call returned a failure envelope");
            }
            sources.extend(envelope.sources());
            responses.push(Part::function_response(
                call.name.clone(),
                json!({ "result": envelope.to_json_string() }),
            ));
        }

        // A model turn holding calls must be answered, so a failed follow-up drops the whole exchange
        let last = match session.send(self.model.as_ref(), responses).await {
            Ok(content) => content,
            Err(e) => {
                session.rollback_to(checkpoint);
                return Err(e);
            }
        };

        Ok(TurnOutcome {
            text: last.text(),
            function_calls: calls.len(),
            sources,
        })
    }
}

async fn deliver(outcome: Result<TurnOutcome>, sink: &mut dyn OutputSink) -> AgentReply {
    let reply = match outcome {
        Ok(turn) => {
            if !turn.text.is_empty() {
                if let Err(e) = sink.send_text(&turn.text).await {
                    warn!("Failed to deliver reply text: {}", e);
                }
            }
            AgentReply {
                success: true,
                response: turn.text,
                function_calls: turn.function_calls,
                sources: turn.sources,
                error: None,
            }
        }
        Err(e) => {
            error!("Error generating response: {}", e);
            let message = format!("Error generating response: {}", e);
            if let Err(send_err) = sink.send_text(&message).await {
                warn!("Failed to deliver error text: {}", send_err);
            }
            AgentReply {
                success: false,
                response: message,
                function_calls: 0,
                sources: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    };

    if let Err(e) = sink.finalize().await {
        warn!("Failed to finalize reply: {}", e);
    }
    reply
}
