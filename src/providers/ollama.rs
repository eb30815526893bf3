use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::base::{Provider, TextStream, Usage};
use super::configs::OllamaProviderConfig;
use super::utils::{
    messages_to_openai_spec, openai_response_to_message, streaming_line_to_delta,
    tools_to_openai_spec,
};
use crate::models::message::Message;
use crate::models::tool::Tool;

pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        )
    }

    fn build_payload(&self, system: &str, messages: &[Message], tools: &[Tool]) -> Result<Value> {
        let system_message = json!({
            "role": "system",
            "content": system
        });

        let messages_spec = messages_to_openai_spec(messages);
        let tools_spec = tools_to_openai_spec(tools)?;

        let mut messages_array = vec![system_message];
        messages_array.extend(messages_spec);

        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_array
        });

        if !tools_spec.is_empty() {
            payload
                .as_object_mut()
                .unwrap()
                .insert("tools".to_string(), json!(tools_spec));
        }
        if let Some(temp) = self.config.temperature {
            payload
                .as_object_mut()
                .unwrap()
                .insert("temperature".to_string(), json!(temp));
        }
        if let Some(tokens) = self.config.max_tokens {
            payload
                .as_object_mut()
                .unwrap()
                .insert("max_tokens".to_string(), json!(tokens));
        }

        Ok(payload)
    }

    fn get_usage(data: &Value) -> Usage {
        let input_tokens = data["usage"]["prompt_tokens"]
            .as_i64()
            .map(|v| v as i32);
        let output_tokens = data["usage"]["completion_tokens"]
            .as_i64()
            .map(|v| v as i32);
        let total_tokens = data["usage"]["total_tokens"]
            .as_i64()
            .map(|v| v as i32)
            .or_else(|| match (input_tokens, output_tokens) {
                (Some(input), Some(output)) => Some(input + output),
                _ => None,
            });

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    async fn post(&self, payload: Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.completions_url())
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            status => Err(anyhow!("Request failed: {}\nPayload: {}", status, payload)),
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        let payload = self.build_payload(system, messages, tools)?;
        let response: Value = self.post(payload).await?.json().await?;

        let message = openai_response_to_message(response.clone())?;
        let usage = Self::get_usage(&response);

        Ok((message, usage))
    }

    async fn stream(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<TextStream> {
        let mut payload = self.build_payload(system, messages, tools)?;
        payload
            .as_object_mut()
            .unwrap()
            .insert("stream".to_string(), json!(true));

        let response = self.post(payload).await?;
        let mut bytes = response.bytes_stream();

        Ok(Box::pin(async_stream::try_stream! {
            let mut buffer = String::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // Server-sent events are newline framed; hold back any
                // partial line until the rest of it arrives.
                while let Some(pos) = buffer.find('\n') {
                    let line: String = buffer.drain(..=pos).collect();
                    if let Some(delta) = streaming_line_to_delta(&line)? {
                        yield delta;
                    }
                }
            }
            if let Some(delta) = streaming_line_to_delta(&buffer)? {
                yield delta;
            }
        }))
    }
}
