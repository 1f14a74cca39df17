//! Default constants used across the pipeline.
//!
//! Every value here can be overridden through the configuration file; these
//! are the tuned defaults the system ships with.

/// Recognition backend base URL.
pub const BACKEND_BASE_URL: &str = "http://localhost:8000";

/// Motion at or below this fraction of the frame diagonal counts as still.
pub const STILL_THRESHOLD: f64 = 0.006;

/// Motion above this fraction of the frame diagonal breaks stability.
pub const MOVE_THRESHOLD: f64 = 0.012;

/// Consecutive still frames required before a pose counts as stable.
pub const REQUIRED_STILL_FRAMES: u32 = 3;

/// Minimum interval between accepted frame sends, in milliseconds.
pub const MIN_SEND_INTERVAL_MS: u64 = 800;

/// Detection loop tick interval, in milliseconds (roughly 30 fps).
pub const TICK_INTERVAL_MS: u64 = 33;

/// Maximum encoded frame width in pixels.
pub const MAX_FRAME_WIDTH: u32 = 640;

/// Maximum encoded frame height in pixels.
pub const MAX_FRAME_HEIGHT: u32 = 480;

/// JPEG quality for encoded frames (1-100).
pub const JPEG_QUALITY: u8 = 80;

/// Maximum bytes of an error body carried into a diagnostic token.
pub const DIAGNOSTIC_LIMIT: usize = 512;
