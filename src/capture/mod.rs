//! Frame capture scheduling and encoding.

pub mod encoder;
pub mod scheduler;

pub use encoder::{EncodedFrame, EncoderConfig, FrameEncoder, FrameFormat};
pub use scheduler::{CaptureScheduler, Clock, SchedulerConfig, SendTicket, SystemClock};
