//! Streaming client for the recognition backend.
//!
//! One accepted send opens one chunked-response request; tokens are parsed
//! incrementally and forwarded in server order. The session token is checked
//! at every suspension point so a superseded stream stops without emitting
//! further events.

use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::capture::EncodedFrame;
use crate::defaults;
use crate::error::{Result, SignBridgeError};
use crate::stream::session::SessionToken;
use crate::stream::sse::SseParser;
use crate::stream::token::{TokenEvent, decode_payload};

/// How a stream session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The server closed the stream (including a reported HTTP error).
    Completed,
    /// The session was superseded or torn down; nothing further was emitted.
    Cancelled,
}

/// Configuration for the streaming client.
#[derive(Debug, Clone)]
pub struct StreamClientConfig {
    /// Backend base URL, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Maximum bytes of an error body carried into a diagnostic token.
    pub diagnostic_limit: usize,
}

impl Default for StreamClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BACKEND_BASE_URL.to_string(),
            diagnostic_limit: defaults::DIAGNOSTIC_LIMIT,
        }
    }
}

/// HTTP client for frame upload and token streaming.
#[derive(Debug, Clone)]
pub struct StreamClient {
    http: reqwest::Client,
    config: StreamClientConfig,
}

impl StreamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(StreamClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    pub fn with_config(config: StreamClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Uploads the latest frame for the backend's debug snapshot.
    ///
    /// Fire-and-forget: all failures are ignored.
    pub async fn upload_snapshot(&self, frame: &EncodedFrame) {
        let Ok(part) = frame_part(frame) else {
            return;
        };
        let form = reqwest::multipart::Form::new().part("frame", part);
        let url = format!("{}/api/stream/frame", self.config.base_url);
        let _ = self.http.post(url).multipart(form).send().await;
    }

    /// Uploads a frame and consumes the token stream it produces.
    ///
    /// Tokens are sent through `events` in server order. A non-2xx response
    /// surfaces the server's body as a single diagnostic token and counts as
    /// a completed stream. Transport failures surface a diagnostic token and
    /// return [`SignBridgeError::StreamTransport`]. Cancellation (superseded
    /// or torn-down session) stops the read loop silently.
    pub async fn stream_tokens(
        &self,
        frame: &EncodedFrame,
        token: &SessionToken,
        events: &mpsc::Sender<TokenEvent>,
    ) -> Result<StreamOutcome> {
        if !token.is_live() {
            return Ok(StreamOutcome::Cancelled);
        }

        let form = reqwest::multipart::Form::new().part("frame", frame_part(frame)?);
        let url = format!("{}/api/stream/frame-sse", self.config.base_url);
        let response = match self.http.post(url).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => {
                if !token.is_live() {
                    return Ok(StreamOutcome::Cancelled);
                }
                return self
                    .transport_failure(format!("request failed: {e}"), token, events)
                    .await;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if token.is_live() {
                let diagnostic = truncate(&body, self.config.diagnostic_limit);
                let _ = events.send(TokenEvent::Diagnostic(diagnostic)).await;
                return Ok(StreamOutcome::Completed);
            }
            return Ok(StreamOutcome::Cancelled);
        }

        let mut parser = SseParser::new();
        let mut stream = response.bytes_stream();

        loop {
            // Waking on supersession drops the response and releases the
            // connection even while the server is quiet.
            let chunk = tokio::select! {
                chunk = stream.next() => chunk,
                _ = token.superseded() => return Ok(StreamOutcome::Cancelled),
            };
            let Some(chunk) = chunk else {
                break;
            };
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    return self
                        .transport_failure(format!("read failed: {e}"), token, events)
                        .await;
                }
            };
            for payload in parser.push(&chunk) {
                if !token.is_live() {
                    return Ok(StreamOutcome::Cancelled);
                }
                if events.send(decode_payload(&payload)).await.is_err() {
                    // Receiver dropped: the pipeline is gone.
                    return Ok(StreamOutcome::Cancelled);
                }
            }
        }

        Ok(StreamOutcome::Completed)
    }

    /// Surfaces a transport failure as a diagnostic token and an error.
    async fn transport_failure(
        &self,
        message: String,
        token: &SessionToken,
        events: &mpsc::Sender<TokenEvent>,
    ) -> Result<StreamOutcome> {
        if token.is_live() {
            let diagnostic = truncate(&message, self.config.diagnostic_limit);
            let _ = events.send(TokenEvent::Diagnostic(diagnostic)).await;
        }
        Err(SignBridgeError::StreamTransport { message })
    }
}

fn frame_part(frame: &EncodedFrame) -> Result<reqwest::multipart::Part> {
    reqwest::multipart::Part::bytes(frame.bytes.clone())
        .file_name(frame.file_name)
        .mime_str(frame.content_type)
        .map_err(|e| SignBridgeError::StreamTransport {
            message: format!("invalid frame part: {e}"),
        })
}

/// Truncates to at most `limit` bytes on a character boundary.
fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
