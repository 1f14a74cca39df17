//! Pipeline orchestrator.
//!
//! Connects the stages together and manages the per-frame flow:
//! Frame Source → Hand Detector → Motion Estimator → Stability Gate →
//! Capture Scheduler → (on an accepted send) Frame Encoder → Streaming
//! Client → Output Aggregator.
//!
//! The loop is ticker-driven with explicit shutdown; teardown is one
//! operation that cancels the live stream session.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::capture::{CaptureScheduler, FrameEncoder, SchedulerConfig, SendTicket};
use crate::capture::{EncoderConfig, FrameFormat};
use crate::config::Config;
use crate::detect::{CameraFrame, Detection, FrameSource, GestureStatus, HandDetector};
use crate::error::Result;
use crate::gate::{GateConfig, MotionEstimator, StabilityGate};
use crate::output::OutputAggregator;
use crate::stream::{SessionRegistry, StreamClient, StreamClientConfig, TokenEvent};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub gate: GateConfig,
    pub scheduler: SchedulerConfig,
    pub encoder: EncoderConfig,
    pub stream: StreamClientConfig,
    /// Detection tick interval.
    pub tick_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gate: GateConfig::default(),
            scheduler: SchedulerConfig::default(),
            encoder: EncoderConfig::default(),
            stream: StreamClientConfig::default(),
            tick_interval: Duration::from_millis(crate::defaults::TICK_INTERVAL_MS),
        }
    }
}

impl PipelineConfig {
    /// Creates pipeline configuration from app config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            gate: GateConfig {
                still_threshold: config.gate.still_threshold,
                move_threshold: config.gate.move_threshold,
                required_still_frames: config.gate.required_still_frames,
            },
            scheduler: SchedulerConfig {
                min_interval: Duration::from_millis(config.capture.min_interval_ms),
            },
            encoder: EncoderConfig {
                max_width: config.capture.max_width,
                max_height: config.capture.max_height,
                format: config.capture.format,
                quality: config.capture.quality,
            },
            stream: StreamClientConfig {
                base_url: config.backend.base_url.clone(),
                ..Default::default()
            },
            tick_interval: Duration::from_millis(config.capture.tick_interval_ms),
        }
    }

    /// Overrides the backend base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.stream.base_url = base_url.into();
        self
    }

    /// Overrides the output format (JPEG by default).
    pub fn with_format(mut self, format: FrameFormat) -> Self {
        self.encoder.format = format;
        self
    }
}

/// Handle to a running pipeline.
pub struct PipelineHandle {
    shutdown: watch::Sender<bool>,
    output: watch::Receiver<String>,
    status: watch::Receiver<GestureStatus>,
}

impl PipelineHandle {
    /// Stops the pipeline and cancels any live stream session.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Latest aggregated output text.
    pub fn output(&self) -> watch::Receiver<String> {
        self.output.clone()
    }

    /// Latest gesture status.
    pub fn status(&self) -> watch::Receiver<GestureStatus> {
        self.status.clone()
    }
}

/// Events reported by a send cycle back to the pipeline loop.
#[derive(Debug)]
enum CycleEvent {
    Token(TokenEvent),
    Done {
        ticket: SendTicket,
        error: Option<String>,
    },
}

/// Motion-gated frame capture and streaming pipeline.
pub struct SignPipeline {
    config: PipelineConfig,
    estimator: MotionEstimator,
    gate: StabilityGate,
    scheduler: CaptureScheduler,
    encoder: FrameEncoder,
    client: StreamClient,
    sessions: SessionRegistry,
    aggregator: OutputAggregator,
    status_tx: watch::Sender<GestureStatus>,
    shutdown_rx: watch::Receiver<bool>,
}

impl SignPipeline {
    /// Creates a pipeline and the handle used to observe and stop it.
    pub fn new(config: PipelineConfig) -> (Self, PipelineHandle) {
        let (aggregator, output_rx) = OutputAggregator::new();
        let (status_tx, status_rx) = watch::channel(GestureStatus::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let pipeline = Self {
            estimator: MotionEstimator::new(),
            gate: StabilityGate::with_config(config.gate),
            scheduler: CaptureScheduler::new(config.scheduler),
            encoder: FrameEncoder::with_config(config.encoder),
            client: StreamClient::with_config(config.stream.clone()),
            sessions: SessionRegistry::new(),
            aggregator,
            status_tx,
            shutdown_rx,
            config,
        };
        let handle = PipelineHandle {
            shutdown: shutdown_tx,
            output: output_rx,
            status: status_rx,
        };
        (pipeline, handle)
    }

    /// Runs the pipeline until the frame source is exhausted or the handle
    /// stops it.
    ///
    /// On natural exhaustion the outstanding send cycle (if any) is drained
    /// so its tokens reach the output; on explicit stop the live session is
    /// cancelled instead.
    pub async fn run<S, D>(mut self, mut source: S, mut detector: D) -> Result<()>
    where
        S: FrameSource,
        D: HandDetector,
    {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let (cycle_tx, mut cycle_rx) = mpsc::channel::<CycleEvent>(32);
        let mut shutdown = self.shutdown_rx.clone();
        let mut stopped = false;

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    stopped = true;
                    break;
                }
                Some(event) = cycle_rx.recv() => {
                    self.handle_cycle_event(event);
                }
                _ = ticker.tick() => {
                    let frame = match source.next_frame().await {
                        Ok(Some(frame)) => frame,
                        Ok(None) => break,
                        Err(e) => {
                            self.set_status(GestureStatus::DetectorUnavailable(e.to_string()));
                            continue;
                        }
                    };
                    match detector.detect(&frame).await {
                        Ok(detection) => self.process_frame(&frame, &detection, &cycle_tx),
                        Err(e) => {
                            self.set_status(GestureStatus::DetectorUnavailable(e.to_string()));
                        }
                    }
                }
            }
        }

        if !stopped {
            // Let the outstanding cycle finish delivering its tokens.
            while self.scheduler.in_flight() {
                match cycle_rx.recv().await {
                    Some(event) => self.handle_cycle_event(event),
                    None => break,
                }
            }
        }
        self.sessions.cancel_all();
        Ok(())
    }

    /// Applies one frame's detection to the gate and scheduler, spawning a
    /// send cycle when the scheduler accepts.
    fn process_frame(
        &mut self,
        frame: &CameraFrame,
        detection: &Detection,
        cycle_tx: &mpsc::Sender<CycleEvent>,
    ) {
        if !detection.has_hands() {
            self.set_status(GestureStatus::WaitingForHands);
            self.gate.hands_lost();
            self.estimator.reset();
            return;
        }
        self.set_status(GestureStatus::Translating);

        let motion = self
            .estimator
            .estimate(&detection.hands, frame.width(), frame.height());
        let stable = self.gate.observe(motion);

        let Some(ticket) = self.scheduler.should_send(stable) else {
            return;
        };

        let encoded = match self.encoder.encode(&frame.image) {
            Ok(encoded) => encoded,
            Err(_) => {
                // Transient; expected to self-correct on a later frame.
                self.scheduler.complete(ticket);
                return;
            }
        };

        // New stream session: reset output, cancel any prior session.
        self.aggregator.reset();
        let session = self.sessions.begin();
        let client = self.client.clone();
        let events = cycle_tx.clone();

        let snapshot_client = client.clone();
        let snapshot = encoded.clone();
        tokio::spawn(async move {
            snapshot_client.upload_snapshot(&snapshot).await;
        });

        tokio::spawn(async move {
            let (token_tx, mut token_rx) = mpsc::channel::<TokenEvent>(32);
            let forward = {
                let events = events.clone();
                tokio::spawn(async move {
                    while let Some(token) = token_rx.recv().await {
                        if events.send(CycleEvent::Token(token)).await.is_err() {
                            break;
                        }
                    }
                })
            };

            let result = client.stream_tokens(&encoded, &session, &token_tx).await;
            drop(token_tx);
            let _ = forward.await;

            let error = result.err().map(|e| e.to_string());
            let _ = events.send(CycleEvent::Done { ticket, error }).await;
        });
    }

    fn handle_cycle_event(&mut self, event: CycleEvent) {
        match event {
            CycleEvent::Token(token) => self.aggregator.push(&token),
            CycleEvent::Done { ticket, error } => {
                self.scheduler.complete(ticket);
                if let Some(message) = error {
                    self.set_status(GestureStatus::StreamError(message));
                }
            }
        }
    }

    fn set_status(&self, status: GestureStatus) {
        self.status_tx.send_if_modified(|current| {
            if *current != status {
                *current = status;
                true
            } else {
                false
            }
        });
    }
}
