//! signbridge - Sign language frame streaming for the Speak-Bridge backend
//!
//! Captures hand landmark frames, decides which ones are worth analyzing
//! (motion-gated, single-flight), and assembles the backend's token stream
//! into displayable text.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod capture;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod detect;
pub mod error;
pub mod gate;
pub mod output;
pub mod pipeline;
pub mod speak;
pub mod stream;

// Core traits (source → detect → gate → send)
pub use detect::{CameraFrame, Detection, FrameSource, GestureStatus, HandDetector};

// Pipeline
pub use pipeline::{PipelineConfig, PipelineHandle, SignPipeline};

// Stages
pub use capture::{CaptureScheduler, FrameEncoder, SchedulerConfig};
pub use gate::{MotionEstimator, StabilityGate};
pub use output::OutputAggregator;
pub use speak::SpeakClient;
pub use stream::{StreamClient, TokenEvent};

// Error handling
pub use error::{Result, SignBridgeError};

// Config
pub use config::Config;

/// Build version string.
pub fn version_string() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
