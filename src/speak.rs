//! Text-to-speech client.
//!
//! Posts recognized text to the backend's `/api/speak` endpoint and returns
//! the synthesized audio bytes. Single-flight: a call made while another is
//! outstanding is rejected, not queued, matching the send discipline used for
//! frame capture.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::defaults;
use crate::error::{Result, SignBridgeError};

/// Client for the backend's speech synthesis endpoint.
#[derive(Debug, Clone)]
pub struct SpeakClient {
    http: reqwest::Client,
    base_url: String,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag on every exit path.
struct FlightGuard(Arc<AtomicBool>);

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SpeakClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn default_backend() -> Self {
        Self::new(defaults::BACKEND_BASE_URL)
    }

    /// True while a speech request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Synthesizes speech for `text`, returning the audio byte stream.
    ///
    /// Returns [`SignBridgeError::SpeakBusy`] if a request is already
    /// outstanding.
    pub async fn speak(&self, text: &str) -> Result<Vec<u8>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SignBridgeError::SpeakBusy);
        }
        let _guard = FlightGuard(Arc::clone(&self.in_flight));

        let url = format!("{}/api/speak", self.base_url);
        let response = self
            .http
            .post(url)
            .form(&[("text", text)])
            .send()
            .await
            .map_err(|e| SignBridgeError::Speak {
                message: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SignBridgeError::Speak {
                message: format!("HTTP {status}: {body}"),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SignBridgeError::Speak {
                message: format!("read failed: {e}"),
            })?;
        Ok(bytes.to_vec())
    }
}
