//! Multi-model chat endpoints.
//!
//! The fan-out to the selected model implementations happens server-side;
//! `send_multi` is one batched HTTP call that returns the confirmed turn plus
//! one response per requested implementation. Response selection and deletion
//! are independent follow-up calls.

use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::api::client::ApiClient;
use crate::api::types::{MultiChatRequest, MultiChatResponse};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone)]
pub struct ChatService {
    client: Arc<ApiClient>,
}

impl ChatService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `POST /chat/multi`: send one message to several implementations and
    /// wait for all their responses in a single round trip.
    pub async fn send_multi(&self, request: &MultiChatRequest) -> ApiResult<MultiChatResponse> {
        self.client.post("/chat/multi", request).await
    }

    /// Mark a response as the selected context for follow-up turns.
    pub async fn select_response(&self, turn_id: Uuid, response_id: Uuid) -> ApiResult<()> {
        let path = format!("/chat/turns/{}/select-response/{}", turn_id, response_id);
        self.client.put_empty(&path).await
    }

    /// Soft-delete a single response within a turn.
    pub async fn delete_response(&self, turn_id: Uuid, response_id: Uuid) -> ApiResult<()> {
        let path = format!("/chat/turns/{}/responses/{}", turn_id, response_id);
        self.client.delete(&path).await
    }

    /// `GET /chat/multi/stream`: EventSource streaming variant of
    /// [`send_multi`]. Declared for parity with the gateway API but not wired
    /// into any console flow; the console always uses the batched call.
    pub async fn stream_multi(
        &self,
        request: &MultiChatRequest,
    ) -> ApiResult<mpsc::Receiver<ChatStreamEvent>> {
        let url = format!("{}/chat/multi/stream", self.client.base_url());
        let http = reqwest::Client::new();
        let implementations = request
            .model_implementations
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let response = http
            .get(&url)
            .query(&[
                ("conversation_id", request.conversation_id.to_string()),
                ("model_implementations", implementations),
                ("message", request.message.clone()),
            ])
            .header("Accept", "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("").to_string();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(status.as_u16(), &body, &reason));
        }

        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut decoder = SseDecoder::default();
            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(bytes) => {
                        for payload in decoder.feed(&String::from_utf8_lossy(&bytes)) {
                            let parsed = parse_stream_event(&payload);
                            let done = matches!(parsed, ChatStreamEvent::Done { .. });
                            if tx.send(parsed).await.is_err() || done {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(ChatStreamEvent::Error(e.to_string())).await;
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }
}

/// Incremental SSE frame decoder. Chunks go in as they arrive; complete
/// `data:` payloads come out once the blank separator line is seen. Comment
/// lines and other fields are skipped.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: String,
    data: String,
    saw_data: bool,
}

impl SseDecoder {
    fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);
        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                if self.saw_data {
                    payloads.push(std::mem::take(&mut self.data));
                    self.saw_data = false;
                }
            } else if let Some(rest) = line.strip_prefix("data:") {
                // Multi-line data fields are joined with newlines.
                if self.saw_data {
                    self.data.push('\n');
                }
                self.data.push_str(rest.strip_prefix(' ').unwrap_or(rest));
                self.saw_data = true;
            }
        }
        payloads
    }
}

/// Events emitted by the streaming chat endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatStreamEvent {
    /// Incremental content from one implementation.
    Chunk {
        model_implementation_id: Uuid,
        content: String,
    },
    /// All implementations finished; the turn is confirmed.
    Done { turn_id: Uuid },
    Error(String),
}

#[derive(Debug, Deserialize)]
struct StreamPayload {
    #[serde(default)]
    model_implementation_id: Option<Uuid>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    turn_id: Option<Uuid>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse one SSE data payload from the streaming endpoint.
fn parse_stream_event(data: &str) -> ChatStreamEvent {
    let payload: StreamPayload = match serde_json::from_str(data) {
        Ok(p) => p,
        Err(e) => return ChatStreamEvent::Error(format!("bad stream payload: {}", e)),
    };

    if let Some(error) = payload.error {
        return ChatStreamEvent::Error(error);
    }
    if let Some(turn_id) = payload.turn_id {
        return ChatStreamEvent::Done { turn_id };
    }
    match (payload.model_implementation_id, payload.content) {
        (Some(id), Some(content)) => ChatStreamEvent::Chunk {
            model_implementation_id: id,
            content,
        },
        _ => ChatStreamEvent::Error("incomplete stream payload".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_chunk_event() {
        let data = r#"{"model_implementation_id": "4a3c9b1e-0000-0000-0000-000000000001", "content": "Hello"}"#;
        let event = parse_stream_event(data);
        assert_eq!(
            event,
            ChatStreamEvent::Chunk {
                model_implementation_id: "4a3c9b1e-0000-0000-0000-000000000001".parse().unwrap(),
                content: "Hello".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_done_event() {
        let data = r#"{"turn_id": "4a3c9b1e-0000-0000-0000-000000000002"}"#;
        assert_eq!(
            parse_stream_event(data),
            ChatStreamEvent::Done {
                turn_id: "4a3c9b1e-0000-0000-0000-000000000002".parse().unwrap()
            }
        );
    }

    #[test]
    fn test_decoder_reassembles_split_frames() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.feed("data: {\"con").is_empty());
        assert!(decoder.feed("tent\": \"hi\"}\n").is_empty());
        let payloads = decoder.feed("\ndata: second\n\n");
        assert_eq!(payloads, vec!["{\"content\": \"hi\"}".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_decoder_handles_crlf_and_comments() {
        let mut decoder = SseDecoder::default();
        let payloads = decoder.feed(": keepalive\r\n\r\ndata: one\r\n\r\n");
        assert_eq!(payloads, vec!["one".to_string()]);
    }

    #[test]
    fn test_decoder_joins_multiline_data() {
        let mut decoder = SseDecoder::default();
        let payloads = decoder.feed("data: a\ndata: b\n\n");
        assert_eq!(payloads, vec!["a\nb".to_string()]);
    }

    #[test]
    fn test_parse_error_event() {
        assert_eq!(
            parse_stream_event(r#"{"error": "model unavailable"}"#),
            ChatStreamEvent::Error("model unavailable".to_string())
        );
        assert!(matches!(parse_stream_event("not json"), ChatStreamEvent::Error(_)));
    }
}
