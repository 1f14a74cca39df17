//! Capture scheduler: decides per frame whether to emit a send.
//!
//! Combines the stability signal with a minimum-interval timer and a
//! single-flight guard. Frames arriving while a send cycle is still running
//! are dropped, never queued.

use std::time::{Duration, Instant};

use crate::defaults;

/// Trait for time operations, allowing mock time in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Real system clock using `std::time::Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Configuration for the capture scheduler.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Minimum interval between accepted sends.
    pub min_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(defaults::MIN_SEND_INTERVAL_MS),
        }
    }
}

/// Proof that the scheduler accepted a send; returned to
/// [`CaptureScheduler::complete`] when the cycle terminates.
///
/// Tickets carry the generation they were issued under so that a completion
/// report from a superseded cycle cannot clear the in-flight flag of a newer
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendTicket {
    generation: u64,
}

impl SendTicket {
    /// The scheduler generation this ticket was issued under.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Single-flight, rate-limited send scheduler.
pub struct CaptureScheduler<C: Clock = SystemClock> {
    config: SchedulerConfig,
    clock: C,
    last_sent_at: Option<Instant>,
    in_flight: bool,
    generation: u64,
}

impl<C: Clock> CaptureScheduler<C> {
    /// Creates a scheduler with the given configuration and clock.
    pub fn with_clock(config: SchedulerConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            last_sent_at: None,
            in_flight: false,
            generation: 0,
        }
    }

    /// Called once per processed frame; returns a ticket when a send should
    /// be emitted.
    ///
    /// Emits iff the gate reports stable, no send is in flight, and at least
    /// `min_interval` has elapsed since the last accepted send. On emission
    /// the in-flight flag is set and the interval timer restarts.
    pub fn should_send(&mut self, gate_stable: bool) -> Option<SendTicket> {
        if !gate_stable || self.in_flight {
            return None;
        }
        let now = self.clock.now();
        if let Some(last) = self.last_sent_at
            && now.duration_since(last) <= self.config.min_interval
        {
            return None;
        }
        self.last_sent_at = Some(now);
        self.in_flight = true;
        self.generation += 1;
        Some(SendTicket {
            generation: self.generation,
        })
    }

    /// Reports that the cycle for `ticket` terminated (success, error, or
    /// cancellation of its own request).
    ///
    /// A stale ticket from an earlier generation is ignored.
    pub fn complete(&mut self, ticket: SendTicket) {
        if ticket.generation == self.generation {
            self.in_flight = false;
        }
    }

    /// Returns true while a send cycle is running.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}

impl CaptureScheduler<SystemClock> {
    /// Creates a scheduler with the system clock.
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}
