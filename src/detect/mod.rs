//! Hand detection types and trait seams.
//!
//! The landmark detector and the camera are external collaborators; this
//! module defines the data they produce and the async traits the pipeline
//! consumes them through.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::time::Instant;

/// One landmark point in normalized 0-1 image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Ordered landmark points for one detected hand.
///
/// Point order follows the detector's reported order. Across frames with
/// multiple hands the per-hand ordering is not guaranteed stable; motion
/// estimation matches hands by index and accepts the resulting inaccuracy
/// when the detector reshuffles them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkSet {
    pub points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Detection result for one frame: zero or more hands with confidences.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// One landmark set per detected hand.
    pub hands: Vec<LandmarkSet>,
    /// Per-hand detection confidence, parallel to `hands`.
    pub confidences: Vec<f32>,
}

impl Detection {
    /// Detection with no hands.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_hands(&self) -> bool {
        !self.hands.is_empty()
    }
}

/// A captured video frame with metadata for tracking through the pipeline.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    /// Sequence number for ordering frames.
    pub sequence: u64,
    /// Timestamp when the frame was captured.
    pub timestamp: Instant,
    /// Raw RGB pixels.
    pub image: image::RgbImage,
}

impl CameraFrame {
    /// Creates a new camera frame stamped with the current time.
    pub fn new(sequence: u64, image: image::RgbImage) -> Self {
        Self {
            sequence,
            timestamp: Instant::now(),
            image,
        }
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Source of video frames (camera, file replay, test fixture).
#[async_trait]
pub trait FrameSource: Send {
    /// Returns the next frame, or `None` when the source is exhausted.
    async fn next_frame(&mut self) -> Result<Option<CameraFrame>>;
}

/// Hand landmark detector.
///
/// Implementations wrap an external capability (MediaPipe-style model,
/// remote service) that maps an image to per-hand landmark sets.
#[async_trait]
pub trait HandDetector: Send {
    /// Detects hands in the given frame.
    async fn detect(&mut self, frame: &CameraFrame) -> Result<Detection>;
}

/// User-visible pipeline status.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureStatus {
    /// No hands in view.
    #[default]
    WaitingForHands,
    /// Hands detected, recognition in progress.
    Translating,
    /// The landmark detector or camera cannot be reached.
    DetectorUnavailable(String),
    /// The token stream failed; carries the transport error text.
    StreamError(String),
}

impl fmt::Display for GestureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureStatus::WaitingForHands => write!(f, "Waiting for hand signs…"),
            GestureStatus::Translating => write!(f, "Hand(s) detected — translating…"),
            GestureStatus::DetectorUnavailable(msg) => write!(f, "Camera error: {msg}"),
            GestureStatus::StreamError(msg) => write!(f, "Stream error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_empty_has_no_hands() {
        let detection = Detection::empty();
        assert!(!detection.has_hands());
    }

    #[test]
    fn test_landmark_set_len() {
        let set = LandmarkSet::new(vec![Landmark::new(0.1, 0.2, 0.0); 21]);
        assert_eq!(set.len(), 21);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_camera_frame_dimensions() {
        let frame = CameraFrame::new(0, image::RgbImage::new(320, 240));
        assert_eq!(frame.width(), 320);
        assert_eq!(frame.height(), 240);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            GestureStatus::WaitingForHands.to_string(),
            "Waiting for hand signs…"
        );
        assert_eq!(
            GestureStatus::Translating.to_string(),
            "Hand(s) detected — translating…"
        );
        assert!(
            GestureStatus::StreamError("timeout".into())
                .to_string()
                .contains("timeout")
        );
    }
}
