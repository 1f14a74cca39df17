//! Output aggregator: assembles token events into displayable text.
//!
//! The buffer is reset exactly when a new stream session begins, then appended
//! to as tokens arrive. Consumers read the latest text through a watch
//! channel at any time.

use tokio::sync::watch;

use crate::stream::TokenEvent;

/// Accumulates stream tokens into a newline-separated text buffer.
#[derive(Debug)]
pub struct OutputAggregator {
    buffer: String,
    publish: watch::Sender<String>,
}

impl OutputAggregator {
    /// Creates an aggregator and the receiver consumers read from.
    pub fn new() -> (Self, watch::Receiver<String>) {
        let (publish, subscribe) = watch::channel(String::new());
        (
            Self {
                buffer: String::new(),
                publish,
            },
            subscribe,
        )
    }

    /// Clears the buffer; called at the start of each new stream.
    pub fn reset(&mut self) {
        self.buffer.clear();
        let _ = self.publish.send(self.buffer.clone());
    }

    /// Appends one token, newline-separated from previous content.
    pub fn push(&mut self, event: &TokenEvent) {
        let text = event.display_text();
        if self.buffer.is_empty() {
            self.buffer = text;
        } else {
            self.buffer.push('\n');
            self.buffer.push_str(&text);
        }
        let _ = self.publish.send(self.buffer.clone());
    }

    /// Current buffer contents.
    pub fn text(&self) -> &str {
        &self.buffer
    }
}
