//! Motion estimation and pose stability gating.

pub mod motion;
pub mod stability;

pub use motion::MotionEstimator;
pub use stability::{GateConfig, GateState, StabilityGate, step};
