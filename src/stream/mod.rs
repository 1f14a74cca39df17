//! Token streaming: sessions, wire parsing, payload decoding, HTTP client.

pub mod client;
pub mod session;
pub mod sse;
pub mod token;

pub use client::{StreamClient, StreamClientConfig, StreamOutcome};
pub use session::{SessionRegistry, SessionToken};
pub use sse::SseParser;
pub use token::{TokenEvent, decode_payload};
