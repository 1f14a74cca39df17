//! Error types for signbridge.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignBridgeError {
    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    // Detection errors
    #[error("Hand detector unavailable: {message}")]
    DetectorUnavailable { message: String },

    #[error("Frame source failed: {message}")]
    FrameSource { message: String },

    // Capture errors
    #[error("Frame encoding failed: {message}")]
    EncodeFailure { message: String },

    // Streaming errors
    #[error("Stream transport error: {message}")]
    StreamTransport { message: String },

    // Speech synthesis errors
    #[error("A speech request is already in progress")]
    SpeakBusy,

    #[error("Speech synthesis failed: {message}")]
    Speak { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SignBridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_unavailable_display() {
        let error = SignBridgeError::DetectorUnavailable {
            message: "model files missing".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Hand detector unavailable: model files missing"
        );
    }

    #[test]
    fn test_encode_failure_display() {
        let error = SignBridgeError::EncodeFailure {
            message: "empty output".to_string(),
        };
        assert_eq!(error.to_string(), "Frame encoding failed: empty output");
    }

    #[test]
    fn test_stream_transport_display() {
        let error = SignBridgeError::StreamTransport {
            message: "connection reset".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Stream transport error: connection reset"
        );
    }

    #[test]
    fn test_speak_busy_display() {
        assert_eq!(
            SignBridgeError::SpeakBusy.to_string(),
            "A speech request is already in progress"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = SignBridgeError::ConfigInvalidValue {
            key: "gate.still_threshold".to_string(),
            message: "must be below move_threshold".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for gate.still_threshold: must be below move_threshold"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: SignBridgeError = io_err.into();
        assert!(matches!(error, SignBridgeError::Io(_)));
    }
}
