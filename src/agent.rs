use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::debug;

use crate::capability::{render_documents, Capability};
use crate::errors::{TeamError, TeamResult};
use crate::models::event::TeamEvent;
use crate::models::message::{Message, ToolRequest};
use crate::models::tool::{Tool, ToolCall};
use crate::providers::base::Provider;

/// A named role bound to a generation backend, an optional set of
/// capabilities, and a role-defining instruction. Immutable once the team
/// is assembled.
pub struct Agent {
    name: String,
    instruction: String,
    provider: Box<dyn Provider>,
    capabilities: Vec<Box<dyn Capability>>,
    streaming: bool,
}

impl Agent {
    pub fn new<N: Into<String>, I: Into<String>>(
        name: N,
        instruction: I,
        provider: Box<dyn Provider>,
    ) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
            provider,
            capabilities: Vec::new(),
            streaming: true,
        }
    }

    /// Add a capability to the agent
    pub fn with_capability(mut self, capability: Box<dyn Capability>) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Toggle live streaming; a non-streaming agent emits its whole text as
    /// one fragment
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn tools(&self) -> Vec<Tool> {
        self.capabilities.iter().map(|c| c.tool()).collect()
    }

    fn capability_for(&self, name: &str) -> Option<&dyn Capability> {
        self.capabilities
            .iter()
            .find(|c| c.tool().name == name)
            .map(|c| &**c)
    }

    fn generation_error<E: ToString>(&self, err: E) -> TeamError {
        TeamError::generation(&self.name, err.to_string())
    }

    /// Dispatch a single tool call to the matching capability and render the
    /// documents for the agent's context
    async fn dispatch_tool_call(&self, call: ToolCall) -> TeamResult<String> {
        let capability = self
            .capability_for(&call.name)
            .ok_or_else(|| TeamError::Capability(format!("Unknown capability: {}", call.name)))?;

        debug!(agent = %self.name, capability = %call.name, "dispatching tool call");
        let documents = capability.call(call).await?;
        Ok(render_documents(&documents))
    }

    /// Take one turn: given the prior conversation, emit this agent's events.
    ///
    /// An agent with capabilities may open with a tool round (request event,
    /// capability execution, acknowledgement event) whose results are folded
    /// back into its own context before the text phase. Any backend or
    /// capability failure ends the turn with a Generation error.
    pub fn speak(&self, context: &[Message]) -> BoxStream<'_, TeamResult<TeamEvent>> {
        let mut messages = context.to_vec();

        Box::pin(async_stream::try_stream! {
            let tools = self.tools();
            let mut answered = false;

            if !tools.is_empty() {
                let (response, _) = self
                    .provider
                    .complete(&self.instruction, &messages, &tools)
                    .await
                    .map_err(|e| self.generation_error(e))?;

                let tool_requests: Vec<ToolRequest> =
                    response.tool_requests().into_iter().cloned().collect();

                if tool_requests.is_empty() {
                    // The backend answered directly; its text is the turn.
                    yield TeamEvent::chunk(&self.name, response.text());
                    answered = true;
                } else {
                    let mut calls = Vec::new();
                    for request in &tool_requests {
                        let call = request
                            .tool_call
                            .clone()
                            .map_err(|e| self.generation_error(e))?;
                        calls.push(call);
                    }

                    yield TeamEvent::ToolCallRequest {
                        source: self.name.clone(),
                        calls: calls.clone(),
                    };

                    let mut tool_response = Message::user();
                    for (request, call) in tool_requests.iter().zip(calls) {
                        let output = self
                            .dispatch_tool_call(call)
                            .await
                            .map_err(|e| self.generation_error(e))?;
                        tool_response =
                            tool_response.with_tool_response(request.id.clone(), Ok(output));
                    }

                    yield TeamEvent::ToolCallExecution {
                        source: self.name.clone(),
                    };

                    messages.push(response);
                    messages.push(tool_response);
                }
            }

            // Text phase. The tool round, if any, is complete; no tools are
            // offered here so the backend produces prose.
            if !answered {
                if self.streaming {
                    let mut fragments = self
                        .provider
                        .stream(&self.instruction, &messages, &[])
                        .await
                        .map_err(|e| self.generation_error(e))?;

                    while let Some(fragment) = fragments.next().await {
                        let fragment = fragment.map_err(|e| self.generation_error(e))?;
                        yield TeamEvent::chunk(&self.name, fragment);
                    }
                } else {
                    let (message, _) = self
                        .provider
                        .complete(&self.instruction, &messages, &[])
                        .await
                        .map_err(|e| self.generation_error(e))?;
                    yield TeamEvent::chunk(&self.name, message.text());
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Document;
    use crate::providers::mock::{FailingProvider, MockProvider};
    use async_trait::async_trait;
    use futures::TryStreamExt;
    use serde_json::json;

    struct StubSearch {
        documents: Vec<Document>,
        fail: bool,
    }

    impl StubSearch {
        fn new() -> Self {
            Self {
                documents: vec![Document {
                    title: "A Study".to_string(),
                    authors: vec!["A. Author".to_string()],
                    published: "2024-01-01".to_string(),
                    summary: "Summary.".to_string(),
                    pdf_url: "http://arxiv.org/pdf/1".to_string(),
                }],
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                documents: Vec::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl Capability for StubSearch {
        fn tool(&self) -> Tool {
            Tool::new(
                "search",
                "Search for papers",
                json!({"type": "object", "properties": {"query": {"type": "string"}}, "required": ["query"]}),
            )
        }

        async fn call(&self, _call: ToolCall) -> TeamResult<Vec<Document>> {
            if self.fail {
                Err(TeamError::Capability("service unavailable".to_string()))
            } else {
                Ok(self.documents.clone())
            }
        }
    }

    async fn drain(agent: &Agent, context: &[Message]) -> TeamResult<Vec<TeamEvent>> {
        agent.speak(context).try_collect().await
    }

    #[tokio::test]
    async fn test_simple_response() -> TeamResult<()> {
        let provider = MockProvider::new(vec![Message::assistant().with_text("Hello!")]);
        let agent = Agent::new("Writer", "You write.", Box::new(provider));

        let context = vec![Message::user().with_text("Hi")];
        let events = drain(&agent, &context).await?;

        assert_eq!(events, vec![TeamEvent::chunk("Writer", "Hello!")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_chunked_response() -> TeamResult<()> {
        let provider = MockProvider::chunked(vec![Message::assistant().with_text("one two three")]);
        let agent = Agent::new("Writer", "You write.", Box::new(provider));

        let context = vec![Message::user().with_text("Hi")];
        let events = drain(&agent, &context).await?;

        assert_eq!(events.len(), 3);
        let text: String = events
            .iter()
            .map(|e| match e {
                TeamEvent::StreamingChunk { text, .. } => text.as_str(),
                _ => panic!("expected only chunks"),
            })
            .collect();
        assert_eq!(text, "one two three");
        Ok(())
    }

    #[tokio::test]
    async fn test_non_streaming_single_chunk() -> TeamResult<()> {
        let provider = MockProvider::chunked(vec![Message::assistant().with_text("all at once")]);
        let agent = Agent::new("Writer", "You write.", Box::new(provider)).with_streaming(false);

        let context = vec![Message::user().with_text("Hi")];
        let events = drain(&agent, &context).await?;

        assert_eq!(events, vec![TeamEvent::chunk("Writer", "all at once")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_tool_round() -> TeamResult<()> {
        let provider = MockProvider::new(vec![
            Message::assistant().with_tool_request(
                "1",
                Ok(ToolCall::new("search", json!({"query": "agents"}))),
            ),
            Message::assistant().with_text("Found 1 relevant paper."),
        ]);
        let agent = Agent::new("Researcher", "You search.", Box::new(provider))
            .with_capability(Box::new(StubSearch::new()));

        let context = vec![Message::user().with_text("Find papers")];
        let events = drain(&agent, &context).await?;

        assert_eq!(events.len(), 3);
        match &events[0] {
            TeamEvent::ToolCallRequest { source, calls } => {
                assert_eq!(source, "Researcher");
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].name, "search");
            }
            other => panic!("expected tool call request, got {:?}", other),
        }
        assert_eq!(
            events[1],
            TeamEvent::ToolCallExecution {
                source: "Researcher".to_string()
            }
        );
        assert_eq!(
            events[2],
            TeamEvent::chunk("Researcher", "Found 1 relevant paper.")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_tool_capable_agent_may_answer_directly() -> TeamResult<()> {
        let provider = MockProvider::new(vec![Message::assistant().with_text("No search needed.")]);
        let agent = Agent::new("Researcher", "You search.", Box::new(provider))
            .with_capability(Box::new(StubSearch::new()));

        let context = vec![Message::user().with_text("Just say hi")];
        let events = drain(&agent, &context).await?;

        assert_eq!(events, vec![TeamEvent::chunk("Researcher", "No search needed.")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_capability_failure_folds_into_generation() {
        let provider = MockProvider::new(vec![Message::assistant().with_tool_request(
            "1",
            Ok(ToolCall::new("search", json!({"query": "agents"}))),
        )]);
        let agent = Agent::new("Researcher", "You search.", Box::new(provider))
            .with_capability(Box::new(StubSearch::failing()));

        let context = vec![Message::user().with_text("Find papers")];
        let mut stream = agent.speak(&context);

        // The request event is still observed before the failure surfaces
        let first = stream.try_next().await.unwrap();
        assert!(matches!(first, Some(TeamEvent::ToolCallRequest { .. })));

        let err = stream.try_next().await.unwrap_err();
        match err {
            TeamError::Generation { role, detail } => {
                assert_eq!(role, "Researcher");
                assert!(detail.contains("service unavailable"));
            }
            other => panic!("expected generation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_backend_failure_mid_stream() {
        let provider = FailingProvider::new(vec!["partial ", "text"]);
        let agent = Agent::new("Writer", "You write.", Box::new(provider));

        let context = vec![Message::user().with_text("Go")];
        let mut stream = agent.speak(&context);

        assert_eq!(
            stream.try_next().await.unwrap(),
            Some(TeamEvent::chunk("Writer", "partial "))
        );
        assert_eq!(
            stream.try_next().await.unwrap(),
            Some(TeamEvent::chunk("Writer", "text"))
        );

        let err = stream.try_next().await.unwrap_err();
        assert!(matches!(err, TeamError::Generation { .. }));
    }

    #[tokio::test]
    async fn test_unknown_capability_is_a_failed_turn() {
        let provider = MockProvider::new(vec![Message::assistant()
            .with_tool_request("1", Ok(ToolCall::new("delete_files", json!({}))))]);
        let agent = Agent::new("Researcher", "You search.", Box::new(provider))
            .with_capability(Box::new(StubSearch::new()));

        let context = vec![Message::user().with_text("Go")];
        let events: TeamResult<Vec<TeamEvent>> = agent.speak(&context).try_collect().await;

        let err = events.unwrap_err();
        match err {
            TeamError::Generation { detail, .. } => {
                assert!(detail.contains("Unknown capability"));
            }
            other => panic!("expected generation error, got {:?}", other),
        }
    }
}
