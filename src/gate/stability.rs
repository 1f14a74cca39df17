//! Stability gate: hysteresis state machine over the motion signal.
//!
//! Converts a sequence of motion samples into a boolean "stable" signal:
//! - Entry: `required_still_frames` consecutive samples at or below
//!   `still_threshold`.
//! - Exit: a single sample above `move_threshold`.
//!
//! The asymmetric thresholds form a hysteresis band; samples inside the band
//! neither build toward stability nor break it.

use crate::defaults;

/// Configuration for the stability gate.
#[derive(Debug, Clone, Copy)]
pub struct GateConfig {
    /// Motion at or below this (fraction of frame diagonal) counts as still.
    pub still_threshold: f64,
    /// Motion above this breaks an established stable state.
    pub move_threshold: f64,
    /// Consecutive still samples required to enter the stable state.
    pub required_still_frames: u32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            still_threshold: defaults::STILL_THRESHOLD,
            move_threshold: defaults::MOVE_THRESHOLD,
            required_still_frames: defaults::REQUIRED_STILL_FRAMES,
        }
    }
}

/// Gate state, owned by one pipeline instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateState {
    /// True once the pose has settled.
    pub is_stable: bool,
    /// Count of consecutive still samples (saturates at `required_still_frames`).
    pub consecutive_still: u32,
}

/// Pure transition function: applies one motion sample to a gate state.
pub fn step(state: GateState, motion: f64, config: &GateConfig) -> GateState {
    if state.is_stable {
        if motion > config.move_threshold {
            GateState {
                is_stable: false,
                consecutive_still: 0,
            }
        } else {
            GateState {
                is_stable: true,
                consecutive_still: (state.consecutive_still + 1)
                    .min(config.required_still_frames),
            }
        }
    } else if motion <= config.still_threshold {
        let count = state.consecutive_still + 1;
        GateState {
            is_stable: count >= config.required_still_frames,
            consecutive_still: count,
        }
    } else {
        GateState {
            is_stable: false,
            consecutive_still: 0,
        }
    }
}

/// Stateful wrapper around [`step`].
#[derive(Debug, Default)]
pub struct StabilityGate {
    config: GateConfig,
    state: GateState,
}

impl StabilityGate {
    pub fn new() -> Self {
        Self::with_config(GateConfig::default())
    }

    pub fn with_config(config: GateConfig) -> Self {
        Self {
            config,
            state: GateState::default(),
        }
    }

    /// Applies one motion sample and returns whether the pose is now stable.
    pub fn observe(&mut self, motion: f64) -> bool {
        self.state = step(self.state, motion, &self.config);
        self.state.is_stable
    }

    /// Forces the gate out of the stable state.
    ///
    /// Called when the current frame contains no hands; the caller also resets
    /// the motion estimator baseline so the next appearance restarts from
    /// infinite motion.
    pub fn hands_lost(&mut self) {
        self.state = GateState::default();
    }

    pub fn is_stable(&self) -> bool {
        self.state.is_stable
    }

    pub fn state(&self) -> GateState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> StabilityGate {
        StabilityGate::with_config(GateConfig {
            still_threshold: 0.006,
            move_threshold: 0.012,
            required_still_frames: 3,
        })
    }

    #[test]
    fn test_gate_starts_unstable() {
        assert!(!gate().is_stable());
    }

    #[test]
    fn test_stable_only_after_required_consecutive_still_samples() {
        let mut gate = gate();
        assert!(!gate.observe(0.001));
        assert!(!gate.observe(0.001));
        assert!(gate.observe(0.001));
    }

    #[test]
    fn test_never_stable_early_for_any_sample_sequence() {
        // Interleave still samples with excursions; stability requires three
        // consecutive still samples since the last disturbance.
        let mut gate = gate();
        let samples = [0.001, 0.001, 0.02, 0.001, 0.001, 0.009, 0.001, 0.001];
        for &s in &samples {
            assert!(!gate.observe(s), "became stable too early at sample {s}");
        }
        assert!(gate.observe(0.001));
    }

    #[test]
    fn test_single_large_excursion_breaks_stability_immediately() {
        let mut gate = gate();
        for _ in 0..3 {
            gate.observe(0.001);
        }
        assert!(gate.is_stable());
        assert!(!gate.observe(0.013));
        assert_eq!(gate.state().consecutive_still, 0);
    }

    #[test]
    fn test_hysteresis_band_does_not_break_stability() {
        let mut gate = gate();
        for _ in 0..3 {
            gate.observe(0.001);
        }
        // Between still and move thresholds: stays stable.
        assert!(gate.observe(0.010));
        assert!(gate.observe(0.011));
    }

    #[test]
    fn test_hysteresis_band_does_not_build_stability() {
        let mut gate = gate();
        // Above still threshold while unstable: count resets every sample.
        for _ in 0..10 {
            assert!(!gate.observe(0.010));
        }
        assert_eq!(gate.state().consecutive_still, 0);
    }

    #[test]
    fn test_count_saturates_while_stable() {
        let mut gate = gate();
        for _ in 0..20 {
            gate.observe(0.001);
        }
        assert_eq!(gate.state().consecutive_still, 3);
    }

    #[test]
    fn test_hands_lost_resets_gate() {
        let mut gate = gate();
        for _ in 0..3 {
            gate.observe(0.001);
        }
        assert!(gate.is_stable());
        gate.hands_lost();
        assert!(!gate.is_stable());
        assert_eq!(gate.state().consecutive_still, 0);
    }

    #[test]
    fn test_infinite_motion_never_stabilizes() {
        let mut gate = gate();
        for _ in 0..10 {
            assert!(!gate.observe(f64::INFINITY));
        }
    }

    #[test]
    fn test_step_is_pure() {
        let config = GateConfig::default();
        let state = GateState {
            is_stable: false,
            consecutive_still: 2,
        };
        let a = step(state, 0.001, &config);
        let b = step(state, 0.001, &config);
        assert_eq!(a, b);
        assert!(a.is_stable);
    }
}
