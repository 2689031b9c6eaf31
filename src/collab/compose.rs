//! Compose/send collaborator: OpenAI-compatible chat completions
//!
//! Replies are requested with `stream: true` and read as server-sent events.
//! Each text fragment goes to the caller's delta callback as it arrives; a
//! server that ignores the stream flag and answers with one JSON body is
//! handled as a single fragment.

use super::{excerpt, CollaboratorError};
use crate::model::{Message, Role};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Receives reply text as it arrives
pub type DeltaSink<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Produces the assistant reply for a conversation history
#[async_trait]
pub trait ComposeService: Send + Sync {
    /// Hands each fragment to `on_delta` and returns the complete reply
    async fn complete(
        &self,
        history: &[Message],
        on_delta: DeltaSink<'_>,
    ) -> Result<String, CollaboratorError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// One decoded `data:` payload
#[derive(Debug, PartialEq)]
enum StreamItem {
    Text(String),
    /// Role-only or finish chunks
    Empty,
    Done,
}

/// Splits a byte stream into SSE `data:` payloads
///
/// Events may be split across network chunks; incomplete lines stay in the
/// buffer until their newline arrives.
#[derive(Debug, Default)]
struct SseLines {
    buffer: Vec<u8>,
}

impl SseLines {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            payloads.extend(data_payload(&line));
        }
        payloads
    }

    /// Whatever is left once the body has ended
    fn finish(&mut self) -> Option<String> {
        data_payload(&std::mem::take(&mut self.buffer))
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    line.trim()
        .strip_prefix("data:")
        .map(|payload| payload.trim().to_string())
        .filter(|payload| !payload.is_empty())
}

fn parse_stream_payload(payload: &str) -> Result<StreamItem, CollaboratorError> {
    if payload == "[DONE]" {
        return Ok(StreamItem::Done);
    }
    let chunk: StreamChunk =
        serde_json::from_str(payload).map_err(|e| CollaboratorError::Decode(e.to_string()))?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|text| !text.is_empty())
        .map_or(StreamItem::Empty, StreamItem::Text))
}

/// Accumulates fragments and forwards them to the caller
struct ReplyBuilder<'a> {
    text: String,
    on_delta: DeltaSink<'a>,
}

impl ReplyBuilder<'_> {
    /// Returns true once the stream has signalled its end
    fn apply(&mut self, payload: &str) -> Result<bool, CollaboratorError> {
        match parse_stream_payload(payload)? {
            StreamItem::Text(text) => {
                (self.on_delta)(&text);
                self.text.push_str(&text);
                Ok(false)
            }
            StreamItem::Empty => Ok(false),
            StreamItem::Done => Ok(true),
        }
    }

    fn finish(self) -> Result<String, CollaboratorError> {
        if self.text.is_empty() {
            return Err(CollaboratorError::Decode(
                "stream ended without content".to_string(),
            ));
        }
        Ok(self.text)
    }
}

/// `POST {base}/v1/chat/completions`
#[derive(Debug, Clone)]
pub struct HttpComposeService {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpComposeService {
    pub fn new(base_url: &str, model: impl Into<String>, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            model: model.into(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body<'a>(&'a self, history: &'a [Message]) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            messages: history
                .iter()
                // Placeholder for a reply still streaming in is not history yet
                .filter(|m| !(m.role == Role::Assistant && m.streaming))
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            stream: true,
        }
    }
}

fn extract_reply(body: &str) -> Result<String, CollaboratorError> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| CollaboratorError::Decode(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| CollaboratorError::Decode("response has no choices".to_string()))
}

#[async_trait]
impl ComposeService for HttpComposeService {
    async fn complete(
        &self,
        history: &[Message],
        on_delta: DeltaSink<'_>,
    ) -> Result<String, CollaboratorError> {
        let mut request = self.client.post(&self.endpoint).json(&self.request_body(history));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!("Sending {} messages to {}", history.len(), self.endpoint);
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let is_event_stream = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/event-stream"));
        if !is_event_stream {
            let reply = extract_reply(&response.text().await?)?;
            on_delta(&reply);
            return Ok(reply);
        }

        let mut lines = SseLines::default();
        let mut reply = ReplyBuilder {
            text: String::new(),
            on_delta,
        };
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            for payload in lines.push(&chunk?) {
                if reply.apply(&payload)? {
                    return reply.finish();
                }
            }
        }
        if let Some(payload) = lines.finish() {
            reply.apply(&payload)?;
        }
        reply.finish()
    }
}
