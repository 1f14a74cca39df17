//! Motion estimation between consecutive landmark frames.
//!
//! Produces a single scalar per frame: the mean per-landmark displacement in
//! pixel space, normalized by the frame diagonal. The stability gate consumes
//! this signal.

use crate::detect::LandmarkSet;

/// Estimates normalized motion between the current and previous landmark sets.
///
/// Owns the previous-frame baseline. The first call after construction or
/// [`reset`](MotionEstimator::reset) returns `f64::INFINITY` so a freshly
/// appeared hand is never classified as stable on its first frame.
#[derive(Debug, Default)]
pub struct MotionEstimator {
    prev: Option<Vec<LandmarkSet>>,
}

impl MotionEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the motion sample for the current frame and replaces the
    /// baseline with `curr`.
    ///
    /// Hands are matched by index; when hand counts differ only the common
    /// prefix is compared. The baseline is replaced even on a count mismatch,
    /// so the next sample is measured against the new set. Returns `0.0` when
    /// there are no landmarks to compare.
    pub fn estimate(&mut self, curr: &[LandmarkSet], frame_width: u32, frame_height: u32) -> f64 {
        let motion = match &self.prev {
            None => f64::INFINITY,
            Some(prev) => mean_displacement(prev, curr, frame_width, frame_height),
        };
        self.prev = Some(curr.to_vec());
        motion
    }

    /// Clears the baseline so the next call reports infinite motion.
    ///
    /// Called when hands leave the frame; the next appearance restarts the
    /// stability count from scratch.
    pub fn reset(&mut self) {
        self.prev = None;
    }

    /// Returns true if a baseline from a previous frame is held.
    pub fn has_baseline(&self) -> bool {
        self.prev.is_some()
    }
}

/// Mean per-landmark pixel displacement divided by the frame diagonal.
fn mean_displacement(
    prev: &[LandmarkSet],
    curr: &[LandmarkSet],
    frame_width: u32,
    frame_height: u32,
) -> f64 {
    let w = frame_width as f64;
    let h = frame_height as f64;
    let diagonal = (w * w + h * h).sqrt();
    if diagonal == 0.0 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut count = 0u32;

    for (prev_hand, curr_hand) in prev.iter().zip(curr.iter()) {
        for (p, c) in prev_hand.points.iter().zip(curr_hand.points.iter()) {
            let dx = (c.x - p.x) as f64 * w;
            let dy = (c.y - p.y) as f64 * h;
            total += (dx * dx + dy * dy).sqrt();
            count += 1;
        }
    }

    if count == 0 {
        return 0.0;
    }
    total / count as f64 / diagonal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Landmark;

    fn hand(points: &[(f32, f32)]) -> LandmarkSet {
        LandmarkSet::new(
            points
                .iter()
                .map(|&(x, y)| Landmark::new(x, y, 0.0))
                .collect(),
        )
    }

    #[test]
    fn test_first_frame_is_infinite_motion() {
        let mut estimator = MotionEstimator::new();
        let hands = vec![hand(&[(0.5, 0.5)])];
        let motion = estimator.estimate(&hands, 640, 480);
        assert!(motion.is_infinite());
        assert!(estimator.has_baseline());
    }

    #[test]
    fn test_identical_frames_report_zero_motion() {
        let mut estimator = MotionEstimator::new();
        let hands = vec![hand(&[(0.1, 0.2), (0.3, 0.4)])];
        estimator.estimate(&hands, 640, 480);
        let motion = estimator.estimate(&hands, 640, 480);
        assert_eq!(motion, 0.0);
    }

    #[test]
    fn test_displacement_normalized_by_diagonal() {
        let mut estimator = MotionEstimator::new();
        estimator.estimate(&[hand(&[(0.0, 0.0)])], 640, 480);
        // Move one landmark by the full frame width: 640px on an 800px diagonal.
        let motion = estimator.estimate(&[hand(&[(1.0, 0.0)])], 640, 480);
        assert!((motion - 640.0 / 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_restores_infinite_sentinel() {
        let mut estimator = MotionEstimator::new();
        let hands = vec![hand(&[(0.5, 0.5)])];
        estimator.estimate(&hands, 640, 480);
        estimator.reset();
        assert!(!estimator.has_baseline());
        let motion = estimator.estimate(&hands, 640, 480);
        assert!(motion.is_infinite());
    }

    #[test]
    fn test_hand_count_mismatch_compares_common_prefix() {
        let mut estimator = MotionEstimator::new();
        estimator.estimate(&[hand(&[(0.1, 0.1)]), hand(&[(0.9, 0.9)])], 640, 480);
        // Second hand disappeared; only the first is compared.
        let motion = estimator.estimate(&[hand(&[(0.1, 0.1)])], 640, 480);
        assert_eq!(motion, 0.0);
        // Baseline was replaced with the one-hand set.
        let motion = estimator.estimate(&[hand(&[(0.1, 0.1)]), hand(&[(0.9, 0.9)])], 640, 480);
        assert_eq!(motion, 0.0);
    }

    #[test]
    fn test_no_landmarks_to_compare_is_zero() {
        let mut estimator = MotionEstimator::new();
        estimator.estimate(&[hand(&[])], 640, 480);
        let motion = estimator.estimate(&[hand(&[])], 640, 480);
        assert_eq!(motion, 0.0);
    }

    #[test]
    fn test_mean_over_multiple_landmarks() {
        let mut estimator = MotionEstimator::new();
        estimator.estimate(&[hand(&[(0.0, 0.0), (0.5, 0.5)])], 640, 480);
        // First landmark moves 64px horizontally, second stays put.
        let motion = estimator.estimate(&[hand(&[(0.1, 0.0), (0.5, 0.5)])], 640, 480);
        let expected = (64.0 / 2.0) / 800.0;
        assert!((motion - expected).abs() < 1e-6);
    }
}
