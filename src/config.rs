//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::capture::FrameFormat;
use crate::defaults;
use crate::error::SignBridgeError;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub gate: GateSettings,
    pub capture: CaptureSettings,
}

/// Recognition backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
}

/// Stability gate tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateSettings {
    pub still_threshold: f64,
    pub move_threshold: f64,
    pub required_still_frames: u32,
}

/// Frame capture and encoding tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureSettings {
    pub min_interval_ms: u64,
    pub tick_interval_ms: u64,
    pub max_width: u32,
    pub max_height: u32,
    pub format: FrameFormat,
    pub quality: u8,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BACKEND_BASE_URL.to_string(),
        }
    }
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            still_threshold: defaults::STILL_THRESHOLD,
            move_threshold: defaults::MOVE_THRESHOLD,
            required_still_frames: defaults::REQUIRED_STILL_FRAMES,
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            min_interval_ms: defaults::MIN_SEND_INTERVAL_MS,
            tick_interval_ms: defaults::TICK_INTERVAL_MS,
            max_width: defaults::MAX_FRAME_WIDTH,
            max_height: defaults::MAX_FRAME_HEIGHT,
            format: FrameFormat::Jpeg,
            quality: defaults::JPEG_QUALITY,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file is missing
    ///
    /// Invalid TOML or invalid values are still errors.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Default config file path: `~/.config/signbridge/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("signbridge")
            .join("config.toml")
    }

    /// Config file path from the `SIGNBRIDGE_CONFIG` environment variable.
    ///
    /// Ranks between the `--config` flag and [`Config::default_path`].
    pub fn env_path() -> Option<PathBuf> {
        match std::env::var("SIGNBRIDGE_CONFIG") {
            Ok(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => None,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SIGNBRIDGE_BACKEND_URL → backend.base_url
    /// - SIGNBRIDGE_CONFIG → config file path (see [`Config::env_path`])
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("SIGNBRIDGE_BACKEND_URL")
            && !url.is_empty()
        {
            self.backend.base_url = url;
        }
        self
    }

    /// Checks cross-field constraints the type system cannot express.
    pub fn validate(&self) -> Result<(), SignBridgeError> {
        if self.gate.still_threshold >= self.gate.move_threshold {
            return Err(SignBridgeError::ConfigInvalidValue {
                key: "gate.still_threshold".to_string(),
                message: "must be below gate.move_threshold (hysteresis band)".to_string(),
            });
        }
        if self.gate.required_still_frames == 0 {
            return Err(SignBridgeError::ConfigInvalidValue {
                key: "gate.required_still_frames".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.capture.quality == 0 || self.capture.quality > 100 {
            return Err(SignBridgeError::ConfigInvalidValue {
                key: "capture.quality".to_string(),
                message: "must be in 1..=100".to_string(),
            });
        }
        if self.capture.max_width == 0 || self.capture.max_height == 0 {
            return Err(SignBridgeError::ConfigInvalidValue {
                key: "capture.max_width".to_string(),
                message: "frame bounds must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
