// Claude Messages API client.
//
// Replies are requested with `stream: true` and folded into one `Completion`
// as the Server-Sent Events arrive. Every consumer in this crate wants the
// finished text (a rating line, a JSON object, a short paragraph), so the
// client never exposes individual tokens.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Error, PartialEq)]
pub enum LlmError {
    #[error("Claude is not configured")]
    Disabled,

    #[error("could not open the reply stream: {0}")]
    Request(String),

    #[error("API returned status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Transport(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("reply stream failed: {0}")]
    Stream(String),

    #[error("reply ended before any text arrived")]
    EmptyReply,
}

impl From<reqwest_eventsource::Error> for LlmError {
    fn from(err: reqwest_eventsource::Error) -> Self {
        match err {
            reqwest_eventsource::Error::InvalidStatusCode(status, _) => {
                LlmError::Status(status.as_u16())
            }
            reqwest_eventsource::Error::Transport(e) => LlmError::Transport(e.to_string()),
            other => LlmError::Stream(other.to_string()),
        }
    }
}

/// One system + user exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

impl MessageRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens,
        }
    }

    fn body(&self, model: &str) -> Value {
        serde_json::json!({
            "model": model,
            "max_tokens": self.max_tokens,
            "stream": true,
            "system": self.system,
            "messages": [{ "role": "user", "content": self.user }]
        })
    }
}

/// The finished reply and what it cost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub stop_reason: Option<String>,
}

impl Completion {
    /// The model stopped because it ran out of `max_tokens`.
    pub fn is_truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }
}

// ---------------------------------------------------------------------------
// Reply assembly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Pending,
    Finished,
}

/// Folds Messages API stream events into a `Completion`.
#[derive(Debug, Default)]
struct ReplyBuilder {
    completion: Completion,
}

impl ReplyBuilder {
    fn apply(&mut self, event: &str, data: &str) -> Result<Progress, LlmError> {
        let json: Value = match serde_json::from_str(data) {
            Ok(json) => json,
            Err(_) => {
                debug!(event, "skipping unreadable stream payload");
                return Ok(Progress::Pending);
            }
        };
        let reply = &mut self.completion;
        match event {
            "message_start" => {
                if let Some(n) = json.pointer("/message/usage/input_tokens").and_then(as_u32) {
                    reply.input_tokens = n;
                }
            }
            "content_block_delta" => {
                if let Some(text) = json.pointer("/delta/text").and_then(Value::as_str) {
                    reply.text.push_str(text);
                }
            }
            "message_delta" => {
                if let Some(n) = json.pointer("/usage/output_tokens").and_then(as_u32) {
                    reply.output_tokens = n;
                }
                if let Some(reason) = json.pointer("/delta/stop_reason").and_then(Value::as_str) {
                    reply.stop_reason = Some(reason.to_string());
                }
            }
            "message_stop" => return Ok(Progress::Finished),
            "error" => {
                let message = json
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .unwrap_or("API reported an error");
                return Err(LlmError::Api(message.to_string()));
            }
            // ping, content_block_start, content_block_stop
            _ => {}
        }
        Ok(Progress::Pending)
    }

    fn finish(self) -> Result<Completion, LlmError> {
        if self.completion.text.is_empty() {
            Err(LlmError::EmptyReply)
        } else {
            Ok(self.completion)
        }
    }
}

fn as_u32(v: &Value) -> Option<u32> {
    v.as_u64().and_then(|n| u32::try_from(n).ok())
}

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            api_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Point the client at a different Messages endpoint (proxies, tests).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `request` and wait for the whole reply.
    pub async fn complete(&self, request: &MessageRequest) -> Result<Completion, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::Disabled);
        }

        let mut source = self
            .http
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request.body(&self.model))
            .eventsource()
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let mut reply = ReplyBuilder::default();
        while let Some(event) = source.next().await {
            match event {
                Ok(Event::Open) => debug!(model = %self.model, "reply stream opened"),
                Ok(Event::Message(msg)) => match reply.apply(&msg.event, &msg.data) {
                    Ok(Progress::Pending) => {}
                    Ok(Progress::Finished) => break,
                    Err(e) => {
                        source.close();
                        warn!(error = %e, "claude reported an error mid-reply");
                        return Err(e);
                    }
                },
                // The server hung up without message_stop; keep what arrived.
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(err) => {
                    source.close();
                    warn!(?err, "reply stream failed");
                    return Err(err.into());
                }
            }
        }
        source.close();

        let completion = reply.finish()?;
        debug!(
            input_tokens = completion.input_tokens,
            output_tokens = completion.output_tokens,
            stop_reason = completion.stop_reason.as_deref().unwrap_or("none"),
            "reply complete"
        );
        if completion.is_truncated() {
            warn!(max_tokens = request.max_tokens, "reply cut off at the token limit");
        }
        Ok(completion)
    }
}

// ---------------------------------------------------------------------------
// LlmClient
// ---------------------------------------------------------------------------

/// Either a configured Claude client or nothing at all. Every Claude feature
/// checks `is_active` and falls back to the plain calculator when disabled.
pub enum LlmClient {
    Active(ClaudeClient),
    Disabled,
}

impl LlmClient {
    /// `Active` when a non-empty API key is given, otherwise `Disabled`.
    pub fn from_key(api_key: Option<&str>, model: &str) -> Self {
        match api_key {
            Some(key) if !key.trim().is_empty() => {
                LlmClient::Active(ClaudeClient::new(key.trim().to_string(), model.to_string()))
            }
            _ => LlmClient::Disabled,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LlmClient::Active(_))
    }

    pub async fn complete(&self, request: &MessageRequest) -> Result<Completion, LlmError> {
        match self {
            LlmClient::Active(client) => client.complete(request).await,
            LlmClient::Disabled => Err(LlmError::Disabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn fold(events: &[(&str, &str)]) -> Result<Completion, LlmError> {
        let mut reply = ReplyBuilder::default();
        for (event, data) in events {
            if reply.apply(event, data)? == Progress::Finished {
                break;
            }
        }
        reply.finish()
    }

    // -- Reply assembly --

    #[test]
    fn events_fold_into_a_completion() {
        let completion = fold(&[
            (
                "message_start",
                r#"{"type":"message_start","message":{"id":"msg_1","usage":{"input_tokens":42,"output_tokens":1}}}"#,
            ),
            ("ping", r#"{"type":"ping"}"#),
            (
                "content_block_delta",
                r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Overall: "}}"#,
            ),
            (
                "content_block_delta",
                r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"93"}}"#,
            ),
            (
                "message_delta",
                r#"{"type":"message_delta","delta":{"stop_reason":"end_turn"},"usage":{"output_tokens":6}}"#,
            ),
            ("message_stop", r#"{"type":"message_stop"}"#),
            (
                "content_block_delta",
                r#"{"type":"content_block_delta","delta":{"text":"ignored"}}"#,
            ),
        ])
        .unwrap();
        assert_eq!(
            completion,
            Completion {
                text: "Overall: 93".into(),
                input_tokens: 42,
                output_tokens: 6,
                stop_reason: Some("end_turn".into()),
            }
        );
        assert!(!completion.is_truncated());
    }

    #[test]
    fn token_limit_marks_reply_truncated() {
        let completion = fold(&[
            ("content_block_delta", r#"{"delta":{"text":"{\"team1\":"}}"#),
            ("message_delta", r#"{"delta":{"stop_reason":"max_tokens"},"usage":{"output_tokens":300}}"#),
        ])
        .unwrap();
        assert!(completion.is_truncated());
        assert_eq!(completion.output_tokens, 300);
    }

    #[test]
    fn error_event_stops_the_reply() {
        let err = fold(&[
            ("content_block_delta", r#"{"delta":{"text":"Team"}}"#),
            ("error", r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#),
        ])
        .unwrap_err();
        assert_eq!(err, LlmError::Api("Overloaded".into()));

        let err = fold(&[("error", "{}")]).unwrap_err();
        assert_eq!(err, LlmError::Api("API reported an error".into()));
    }

    #[test]
    fn unreadable_payloads_are_skipped() {
        let completion = fold(&[
            ("content_block_delta", "{broken"),
            ("content_block_delta", r#"{"delta":{"text":"ok"}}"#),
            ("message_start", r#"{"message":{"usage":{"input_tokens":"many"}}}"#),
        ])
        .unwrap();
        assert_eq!(completion.text, "ok");
        assert_eq!(completion.input_tokens, 0);
    }

    #[test]
    fn reply_without_text_is_empty() {
        assert_eq!(
            fold(&[("message_stop", r#"{"type":"message_stop"}"#)]),
            Err(LlmError::EmptyReply)
        );
    }

    #[test]
    fn request_body_asks_for_a_stream() {
        let body = MessageRequest::new("sys", "Value Sauce Gardner", 150).body("claude-test");
        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["max_tokens"], 150);
        assert_eq!(body["stream"], true);
        assert_eq!(body["system"], "sys");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Value Sauce Gardner");
    }

    // -- Client construction --

    #[test]
    fn from_key_with_api_key_returns_active() {
        let client = LlmClient::from_key(Some("sk-ant-test"), "claude-sonnet-4-5-20250929");
        assert!(client.is_active());
        match client {
            LlmClient::Active(inner) => assert_eq!(inner.model(), "claude-sonnet-4-5-20250929"),
            LlmClient::Disabled => panic!("expected active client"),
        }
    }

    #[test]
    fn from_key_without_or_with_blank_key_is_disabled() {
        assert!(!LlmClient::from_key(None, "m").is_active());
        assert!(!LlmClient::from_key(Some("  "), "m").is_active());
    }

    #[tokio::test]
    async fn disabled_client_never_answers() {
        let request = MessageRequest::new("sys", "user", 100);
        assert_eq!(
            LlmClient::Disabled.complete(&request).await,
            Err(LlmError::Disabled)
        );
        let keyless = ClaudeClient::new(String::new(), "m".into());
        assert_eq!(keyless.complete(&request).await, Err(LlmError::Disabled));
    }

    // -- Local SSE server --

    /// Serve one HTTP response on a local port and return its URL.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn streamed_reply_is_collected() {
        let url = serve_once(concat!(
            "HTTP/1.1 200 OK\r\n",
            "Content-Type: text/event-stream\r\n",
            "Cache-Control: no-cache\r\n",
            "\r\n",
            "event: message_start\r\n",
            "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"usage\":{\"input_tokens\":15}}}\r\n",
            "\r\n",
            "event: content_block_delta\r\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Team 2\"}}\r\n",
            "\r\n",
            "event: content_block_delta\r\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\" wins this one.\"}}\r\n",
            "\r\n",
            "event: message_delta\r\n",
            "data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":7}}\r\n",
            "\r\n",
            "event: message_stop\r\n",
            "data: {\"type\":\"message_stop\"}\r\n",
            "\r\n",
        ))
        .await;

        let client = LlmClient::Active(
            ClaudeClient::new("sk-test".into(), "test".into()).with_api_url(url),
        );
        let completion = client
            .complete(&MessageRequest::new("sys", "user", 100))
            .await
            .unwrap();
        assert_eq!(
            completion,
            Completion {
                text: "Team 2 wins this one.".into(),
                input_tokens: 15,
                output_tokens: 7,
                stop_reason: Some("end_turn".into()),
            }
        );
    }

    #[tokio::test]
    async fn error_status_fails_the_request() {
        let url = serve_once(concat!(
            "HTTP/1.1 401 Unauthorized\r\n",
            "Content-Type: application/json\r\n",
            "Content-Length: 2\r\n",
            "\r\n",
            "{}",
        ))
        .await;

        let client = ClaudeClient::new("sk-bad".into(), "test".into()).with_api_url(url);
        let err = client
            .complete(&MessageRequest::new("sys", "user", 100))
            .await
            .unwrap_err();
        assert_eq!(err, LlmError::Status(401));
        assert!(err.to_string().contains("401"));
    }
}
