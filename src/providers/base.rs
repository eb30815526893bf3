use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::models::message::Message;
use crate::models::tool::Tool;

/// Incremental fragments of one response's text
pub type TextStream = BoxStream<'static, Result<String>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Base trait for generation backends (Ollama and other OpenAI-compatible endpoints)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next complete message, which may carry tool requests
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)>;

    /// Stream the text of the next response as incremental fragments.
    ///
    /// Backends without live streaming fall back to a single fragment
    /// carrying the full completion text.
    async fn stream(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<TextStream> {
        let (message, _) = self.complete(system, messages, tools).await?;
        Ok(Box::pin(futures::stream::once(async move {
            Ok(message.text())
        })))
    }
}
