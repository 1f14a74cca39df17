//! Incremental parser for the backend's chunked token stream.
//!
//! Records are delimited by a blank line (`\n\n`); within a completed record,
//! lines prefixed `data: ` carry payload. Input arrives as arbitrary byte
//! chunks: a record (or a multi-byte UTF-8 character) split across reads is
//! buffered until completed by a later chunk.

const DATA_PREFIX: &str = "data: ";
const RECORD_DELIMITER: &[u8] = b"\n\n";

/// Buffering parser over the `data: <payload>\n\n` record format.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk of raw bytes and returns the payloads of all records
    /// completed by it, in order.
    ///
    /// Trailing partial records remain buffered for the next call.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = find_delimiter(&self.buffer) {
            let record: Vec<u8> = self.buffer.drain(..pos + RECORD_DELIMITER.len()).collect();
            let text = String::from_utf8_lossy(&record[..pos]);
            for line in text.lines() {
                if let Some(payload) = line.strip_prefix(DATA_PREFIX) {
                    payloads.push(payload.to_string());
                }
            }
        }
        payloads
    }

    /// Bytes currently buffered as an incomplete record.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn find_delimiter(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(RECORD_DELIMITER.len())
        .position(|window| window == RECORD_DELIMITER)
}
