//! Stateful multi-turn chat over the stateless generateContent API

use super::client::ChatModel;
use super::types::{Content, GenerateRequest, GenerationConfig, Part, Tool, ToolConfig};
use crate::error::Result;

/// Conversation transcript plus the declared tool surface
#[derive(Debug, Clone)]
pub struct ChatSession {
    system_instruction: Content,
    tools: Vec<Tool>,
    generation: GenerationConfig,
    history: Vec<Content>,
}

impl ChatSession {
    pub fn new(
        system_instruction: impl Into<String>,
        tools: Vec<Tool>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            system_instruction: Content::instruction(system_instruction),
            tools,
            generation,
            history: Vec::new(),
        }
    }

    /// Send one user turn and record the model's reply
    ///
    /// The user turn is removed again when the model call fails, so the
    /// transcript never ends on an unanswered turn.
    pub async fn send(&mut self, model: &dyn ChatModel, parts: Vec<Part>) -> Result<Content> {
        self.history.push(Content::user(parts));

        let request = GenerateRequest {
            contents: self.history.clone(),
            system_instruction: Some(self.system_instruction.clone()),
            tools: self.tools.clone(),
            tool_config: (!self.tools.is_empty()).then(ToolConfig::auto),
            generation_config: Some(self.generation.clone()),
        };

        match model.generate(&request).await {
            Ok(reply) => {
                self.history.push(reply.clone());
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }

    /// Send plain user text
    pub async fn send_text(&mut self, model: &dyn ChatModel, text: &str) -> Result<Content> {
        self.send(model, vec![Part::text(text)]).await
    }

    /// Drop every turn after the first `len`
    pub fn rollback_to(&mut self, len: usize) {
        self.history.truncate(len);
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    pub fn system_instruction(&self) -> String {
        self.system_instruction.text()
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RfpScoutError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Echoes the number of turns it was sent, or fails when asked to
    struct CountingModel {
        fail: bool,
        seen: Mutex<Vec<GenerateRequest>>,
    }

    #[async_trait]
    impl ChatModel for CountingModel {
        async fn generate(&self, request: &GenerateRequest) -> Result<Content> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(RfpScoutError::Llm("quota exceeded".to_string()));
            }
            Ok(Content::model(vec![Part::text(format!(
                "turns={}",
                request.contents.len()
            ))]))
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_transcript_grows_per_turn() {
        let model = CountingModel {
            fail: false,
            seen: Mutex::new(Vec::new()),
        };
        let mut session = ChatSession::new("be brief", vec![], GenerationConfig::default());

        let first = session.send_text(&model, "hello").await.unwrap();
        assert_eq!(first.text(), "turns=1");
        let second = session.send_text(&model, "again").await.unwrap();
        assert_eq!(second.text(), "turns=3");
        assert_eq!(session.history().len(), 4);

        let seen = model.seen.lock().unwrap();
        assert_eq!(
            seen[0].system_instruction.as_ref().unwrap().text(),
            "be brief"
        );
        assert!(seen[0].tool_config.is_none());
    }

    #[tokio::test]
    async fn test_failed_turn_is_rolled_back() {
        let model = CountingModel {
            fail: true,
            seen: Mutex::new(Vec::new()),
        };
        let mut session = ChatSession::new("x", vec![], GenerationConfig::default());

        assert!(session.send_text(&model, "hello").await.is_err());
        assert!(session.history().is_empty());
    }

    /// Answers the first turn with a signed tool call, then with text
    struct SignedCallModel {
        seen: Mutex<Vec<GenerateRequest>>,
    }

    #[async_trait]
    impl ChatModel for SignedCallModel {
        async fn generate(&self, request: &GenerateRequest) -> Result<Content> {
            let mut seen = self.seen.lock().unwrap();
            seen.push(request.clone());
            if seen.len() == 1 {
                let mut call = Part::function_call("search_rfp_database", Default::default());
                call.thought_signature = Some("CsYBAbc123".to_string());
                Ok(Content::model(vec![call]))
            } else {
                Ok(Content::model(vec![Part::text("done")]))
            }
        }

        fn model_name(&self) -> &str {
            "signed"
        }
    }

    #[tokio::test]
    async fn test_tool_round_replays_thought_signature() {
        let model = SignedCallModel {
            seen: Mutex::new(Vec::new()),
        };
        let mut session = ChatSession::new("x", vec![], GenerationConfig::default());

        session.send_text(&model, "find Infor RFPs").await.unwrap();
        let result = Part::function_response("search_rfp_database", serde_json::json!({"result": "{}"}));
        session.send(&model, vec![result]).await.unwrap();

        let seen = model.seen.lock().unwrap();
        let replayed = serde_json::to_value(&seen[1].contents[1]).unwrap();
        assert_eq!(replayed["role"], "model");
        assert_eq!(replayed["parts"][0]["thoughtSignature"], "CsYBAbc123");
    }
}
