use std::sync::Arc;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Provider, TextStream, Usage};

/// A mock provider that returns pre-configured responses for testing
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Message>>>,
    chunked: bool,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            chunked: false,
        }
    }

    /// Like `new`, but `stream` delivers each response word by word
    pub fn chunked(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            chunked: true,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        _messages: &[Message],
        _tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Ok((Message::assistant().with_text(""), Usage::default()))
        } else {
            Ok((responses.remove(0), Usage::default()))
        }
    }

    async fn stream(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<TextStream> {
        let (message, _) = self.complete(system, messages, tools).await?;
        let text = message.text();

        let fragments: Vec<String> = if self.chunked {
            text.split_inclusive(' ').map(String::from).collect()
        } else {
            vec![text]
        };

        Ok(Box::pin(futures::stream::iter(
            fragments.into_iter().map(Ok),
        )))
    }
}

/// A provider whose stream yields some fragments and then fails, for
/// exercising mid-turn connectivity loss
pub struct FailingProvider {
    fragments: Vec<String>,
}

impl FailingProvider {
    pub fn new<S: Into<String>>(fragments: Vec<S>) -> Self {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Provider for FailingProvider {
    async fn complete(
        &self,
        _system: &str,
        _messages: &[Message],
        _tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        Err(anyhow!("connection refused"))
    }

    async fn stream(
        &self,
        _system: &str,
        _messages: &[Message],
        _tools: &[Tool],
    ) -> Result<TextStream> {
        let fragments = self.fragments.clone();
        Ok(Box::pin(async_stream::try_stream! {
            for fragment in fragments {
                yield fragment;
            }
            Err::<(), _>(anyhow!("connection reset mid-stream"))?;
        }))
    }
}
