//! End-to-end agent turns against in-memory search and model fakes

use async_trait::async_trait;
use rfpscout_core::llm::{Content, GenerateRequest, Part};
use rfpscout_core::{
    parse_date_range, BufferSink, ChatModel, Result, RfpAgent, RfpScoutError, SearchBackend,
    SearchRequest, SearchResponse,
};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Returns canned hits and facet counts, recording every request
#[derive(Default)]
struct FakeIndex {
    hits: Vec<Map<String, Value>>,
    total: u64,
    facets: BTreeMap<String, BTreeMap<String, u64>>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl FakeIndex {
    fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for FakeIndex {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(SearchResponse {
            hits: self.hits.clone(),
            nb_hits: Some(self.total),
            facets: if request.facets.is_empty() {
                BTreeMap::new()
            } else {
                self.facets.clone()
            },
        })
    }

    fn index_name(&self) -> &str {
        "solicitations"
    }
}

/// Plays back scripted model turns, recording every request
#[derive(Default)]
struct ScriptedModel {
    turns: Mutex<VecDeque<Result<Content>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    fn new(turns: Vec<Result<Content>>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn generate(&self, request: &GenerateRequest) -> Result<Content> {
        self.requests.lock().unwrap().push(request.clone());
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RfpScoutError::Llm("script exhausted".to_string())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn text_turn(text: &str) -> Result<Content> {
    Ok(Content::model(vec![Part::text(text)]))
}

fn call_turn(calls: Vec<(&str, Value)>) -> Result<Content> {
    Ok(Content::model(
        calls
            .into_iter()
            .map(|(name, args)| Part::function_call(name, args.as_object().unwrap().clone()))
            .collect(),
    ))
}

fn hit(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

fn agent(index: &Arc<FakeIndex>, model: &Arc<ScriptedModel>) -> RfpAgent {
    RfpAgent::new(index.clone(), model.clone())
}

#[tokio::test]
async fn test_plain_answer_without_tool_calls() {
    let index = Arc::new(FakeIndex::default());
    let model = Arc::new(ScriptedModel::new(vec![text_turn("Hello! Ask me about RFPs.")]));
    let agent = agent(&index, &model);

    let mut sink = BufferSink::new();
    let reply = agent.respond("hi", None, &mut sink).await;

    assert!(reply.success);
    assert_eq!(reply.response, "Hello! Ask me about RFPs.");
    assert_eq!(reply.function_calls, 0);
    assert!(reply.sources.is_empty());
    assert_eq!(sink.text(), "Hello! Ask me about RFPs.");
    assert!(sink.is_finalized());
    assert_eq!(agent.session_count().await, 1);

    let requests = model.requests();
    let instruction = requests[0].system_instruction.as_ref().unwrap().text();
    assert!(instruction.contains("TODAY'S DATE:"));
    assert_eq!(requests[0].tools[0].function_declarations.len(), 2);
}

#[tokio::test]
async fn test_search_call_combines_date_and_caller_filters() {
    let index = Arc::new(FakeIndex {
        hits: vec![hit(json!({
            "title": "Cloud migration services",
            "location": "California",
            "siteUrl": "https://example.gov/rfp/42",
            "cnStatus": "pursuing",
        }))],
        total: 17,
        ..Default::default()
    });
    let model = Arc::new(ScriptedModel::new(vec![
        call_turn(vec![(
            "search_rfp_database",
            json!({
                "query": "cloud",
                "filters": "location:California",
                "date_range": "2025-01-01_to_2025-01-31",
                "hits_per_page": 500,
            }),
        )]),
        text_turn("I found 17 cloud RFPs in California."),
    ]));
    let agent = agent(&index, &model);

    let mut sink = BufferSink::new();
    let reply = agent.respond("cloud RFPs in California in January", Some("t1"), &mut sink).await;

    assert!(reply.success);
    assert_eq!(reply.function_calls, 1);
    assert_eq!(reply.sources.len(), 1);
    assert_eq!(reply.sources[0].title, "Cloud migration services");
    assert_eq!(sink.text(), "I found 17 cloud RFPs in California.");

    // first request samples the schema, the second is the tool's search
    let requests = index.requests();
    assert_eq!(requests.len(), 2);
    let search = &requests[1];
    assert_eq!(search.query, "cloud");
    assert_eq!(search.hits_per_page, 50);
    assert_eq!(
        search.filters.as_deref(),
        Some(format!("({}) AND (location:California)", parse_date_range("2025-01-01_to_2025-01-31")).as_str())
    );

    // tool results go back as one user turn wrapping the envelope JSON
    let model_requests = model.requests();
    let follow_up = model_requests[1].contents.last().unwrap();
    assert_eq!(follow_up.role.as_deref(), Some("user"));
    let response = follow_up.parts[0].function_response.as_ref().unwrap();
    assert_eq!(response.name, "search_rfp_database");
    let envelope: Value =
        serde_json::from_str(response.response["result"].as_str().unwrap()).unwrap();
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["total_matching_rfps"], 17);
    assert_eq!(envelope["returned_results"], 1);
}

#[tokio::test]
async fn test_statistics_and_unknown_tool_in_one_turn() {
    let mut counts = BTreeMap::new();
    counts.insert("pursuing".to_string(), 3);
    counts.insert("monitor".to_string(), 5);
    counts.insert("notPursuing".to_string(), 2);
    let mut facets = BTreeMap::new();
    facets.insert("cnStatus".to_string(), counts);

    let index = Arc::new(FakeIndex {
        total: 10,
        facets,
        ..Default::default()
    });
    let model = Arc::new(ScriptedModel::new(vec![
        call_turn(vec![
            ("get_rfp_statistics", json!({"facet_by": "cnStatus"})),
            ("delete_everything", json!({})),
        ]),
        text_turn("Half of the RFPs are being monitored."),
    ]));
    let agent = agent(&index, &model);

    let mut sink = BufferSink::new();
    let reply = agent.respond("what are we pursuing?", None, &mut sink).await;

    assert!(reply.success);
    assert_eq!(reply.function_calls, 2);
    assert_eq!(reply.sources.len(), 1);
    assert_eq!(reply.sources[0].title, "Statistical Analysis of 10 RFPs");

    let model_requests = model.requests();
    let parts = &model_requests[1].contents.last().unwrap().parts;
    assert_eq!(parts.len(), 2);

    let stats: Value = serde_json::from_str(
        parts[0].function_response.as_ref().unwrap().response["result"]
            .as_str()
            .unwrap(),
    )
    .unwrap();
    assert_eq!(stats["date_range"], "all_time");
    let breakdown = stats["breakdown"].as_array().unwrap();
    assert_eq!(breakdown[0]["value"], "monitor");
    assert_eq!(breakdown[0]["percentage"], 50.0);
    let total: f64 = breakdown
        .iter()
        .map(|row| row["percentage"].as_f64().unwrap())
        .sum();
    assert!(total <= 100.0);

    let unknown: Value = serde_json::from_str(
        parts[1].function_response.as_ref().unwrap().response["result"]
            .as_str()
            .unwrap(),
    )
    .unwrap();
    assert_eq!(
        unknown,
        json!({"success": false, "error": "Unknown function: delete_everything"})
    );
}

#[tokio::test]
async fn test_model_failure_is_reported_and_transcript_kept_clean() {
    let index = Arc::new(FakeIndex::default());
    let model = Arc::new(ScriptedModel::new(vec![
        call_turn(vec![("search_rfp_database", json!({"query": "erp"}))]),
        Err(RfpScoutError::Llm("quota exceeded".to_string())),
        text_turn("Recovered."),
    ]));
    let agent = agent(&index, &model);

    let mut sink = BufferSink::new();
    let reply = agent.respond("erp", Some("t"), &mut sink).await;

    assert!(!reply.success);
    assert!(reply.error.as_deref().unwrap().contains("quota exceeded"));
    assert!(sink.text().starts_with("Error generating response: "));
    assert!(sink.is_finalized());

    let mut sink = BufferSink::new();
    let reply = agent.respond("try again", Some("t"), &mut sink).await;
    assert!(reply.success);

    // the failed exchange left nothing behind in the transcript
    let requests = model.requests();
    assert_eq!(requests[2].contents.len(), 1);
}

#[tokio::test]
async fn test_threads_keep_separate_transcripts() {
    let index = Arc::new(FakeIndex::default());
    let model = Arc::new(ScriptedModel::new(vec![
        text_turn("a1"),
        text_turn("b1"),
        text_turn("a2"),
    ]));
    let agent = agent(&index, &model);

    agent.respond("first", Some("a"), &mut BufferSink::new()).await;
    agent.respond("first", Some("b"), &mut BufferSink::new()).await;
    agent.respond("second", Some("a"), &mut BufferSink::new()).await;

    let requests = model.requests();
    assert_eq!(requests[0].contents.len(), 1);
    assert_eq!(requests[1].contents.len(), 1);
    assert_eq!(requests[2].contents.len(), 3);
    assert_eq!(agent.session_count().await, 2);

    assert!(agent.end_session("a").await);
    assert_eq!(agent.session_count().await, 1);
    agent.close().await;
    assert_eq!(agent.session_count().await, 0);
}

#[tokio::test]
async fn test_ask_is_stateless() {
    let index = Arc::new(FakeIndex::default());
    let model = Arc::new(ScriptedModel::new(vec![text_turn("one"), text_turn("two")]));
    let agent = agent(&index, &model);

    assert_eq!(agent.ask("q1").await.response, "one");
    assert_eq!(agent.ask("q2").await.response, "two");
    assert_eq!(agent.session_count().await, 0);
    assert_eq!(model.requests()[1].contents.len(), 1);
}

#[tokio::test]
async fn test_malformed_caller_filter_becomes_failure_envelope() {
    let index = Arc::new(FakeIndex::default());
    let model = Arc::new(ScriptedModel::new(vec![
        call_turn(vec![(
            "search_rfp_database",
            json!({"query": "x", "filters": "(location:Texas"}),
        )]),
        text_turn("That filter did not work."),
    ]));
    let agent = agent(&index, &model);

    let reply = agent.respond("x", None, &mut BufferSink::new()).await;
    assert!(reply.success);
    assert!(reply.sources.is_empty());

    // only the schema sample reached the index
    assert_eq!(index.requests().len(), 1);

    let requests = model.requests();
    let result = requests[1].contents.last().unwrap().parts[0]
        .function_response
        .as_ref()
        .unwrap()
        .response["result"]
        .as_str()
        .unwrap()
        .to_string();
    let envelope: Value = serde_json::from_str(&result).unwrap();
    assert_eq!(envelope["success"], false);
}
