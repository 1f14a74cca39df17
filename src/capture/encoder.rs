//! Frame encoder: downscales and re-encodes frames for transmission.
//!
//! Scaling never upscales; a source smaller than the bounds is re-encoded at
//! its original size.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, imageops};
use std::io::Cursor;

use crate::defaults;
use crate::error::{Result, SignBridgeError};

/// Wire format for encoded frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    #[default]
    Jpeg,
    Png,
}

impl FrameFormat {
    /// MIME type for multipart upload.
    pub fn content_type(&self) -> &'static str {
        match self {
            FrameFormat::Jpeg => "image/jpeg",
            FrameFormat::Png => "image/png",
        }
    }

    /// File name reported to the backend.
    pub fn file_name(&self) -> &'static str {
        match self {
            FrameFormat::Jpeg => "frame.jpg",
            FrameFormat::Png => "frame.png",
        }
    }
}

/// Configuration for the frame encoder.
#[derive(Debug, Clone, Copy)]
pub struct EncoderConfig {
    /// Maximum output width in pixels.
    pub max_width: u32,
    /// Maximum output height in pixels.
    pub max_height: u32,
    /// Output format.
    pub format: FrameFormat,
    /// JPEG quality (1-100); ignored for PNG.
    pub quality: u8,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            max_width: defaults::MAX_FRAME_WIDTH,
            max_height: defaults::MAX_FRAME_HEIGHT,
            format: FrameFormat::Jpeg,
            quality: defaults::JPEG_QUALITY,
        }
    }
}

/// An encoded frame ready for upload.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: &'static str,
}

/// Re-encodes RGB frames into a compact transmissible image.
#[derive(Debug, Clone, Default)]
pub struct FrameEncoder {
    config: EncoderConfig,
}

impl FrameEncoder {
    pub fn new() -> Self {
        Self::with_config(EncoderConfig::default())
    }

    pub fn with_config(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Encodes a frame, downscaling to fit the configured bounds.
    ///
    /// Pure with respect to its inputs aside from the scratch buffer. An
    /// empty or failed encode is an [`SignBridgeError::EncodeFailure`]; the
    /// caller skips the send without side effects.
    pub fn encode(&self, image: &RgbImage) -> Result<EncodedFrame> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SignBridgeError::EncodeFailure {
                message: "source frame has zero dimensions".to_string(),
            });
        }

        let scale = f64::min(
            self.config.max_width as f64 / width as f64,
            self.config.max_height as f64 / height as f64,
        )
        .min(1.0);
        let target_w = ((width as f64 * scale).round() as u32).max(1);
        let target_h = ((height as f64 * scale).round() as u32).max(1);

        let scratch;
        let source: &RgbImage = if scale < 1.0 {
            scratch = imageops::resize(image, target_w, target_h, imageops::FilterType::Triangle);
            &scratch
        } else {
            image
        };

        let mut buf = Cursor::new(Vec::new());
        match self.config.format {
            FrameFormat::Jpeg => {
                JpegEncoder::new_with_quality(&mut buf, self.config.quality)
                    .write_image(
                        source.as_raw(),
                        source.width(),
                        source.height(),
                        ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| SignBridgeError::EncodeFailure {
                        message: format!("JPEG encode failed: {e}"),
                    })?;
            }
            FrameFormat::Png => {
                PngEncoder::new(&mut buf)
                    .write_image(
                        source.as_raw(),
                        source.width(),
                        source.height(),
                        ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| SignBridgeError::EncodeFailure {
                        message: format!("PNG encode failed: {e}"),
                    })?;
            }
        }

        let bytes = buf.into_inner();
        if bytes.is_empty() {
            return Err(SignBridgeError::EncodeFailure {
                message: "encoder produced no output".to_string(),
            });
        }

        Ok(EncodedFrame {
            bytes,
            content_type: self.config.format.content_type(),
            file_name: self.config.format.file_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb([120, 80, 40]))
    }

    #[test]
    fn test_encode_produces_jpeg_bytes() {
        let encoder = FrameEncoder::new();
        let frame = encoder.encode(&solid_image(320, 240)).unwrap();
        assert!(!frame.bytes.is_empty());
        assert_eq!(frame.content_type, "image/jpeg");
        assert_eq!(frame.file_name, "frame.jpg");
        // JPEG SOI marker.
        assert_eq!(&frame.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_png_format() {
        let encoder = FrameEncoder::with_config(EncoderConfig {
            format: FrameFormat::Png,
            ..Default::default()
        });
        let frame = encoder.encode(&solid_image(64, 64)).unwrap();
        assert_eq!(frame.content_type, "image/png");
        assert_eq!(&frame.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_oversized_frame_is_downscaled() {
        let encoder = FrameEncoder::with_config(EncoderConfig {
            max_width: 640,
            max_height: 480,
            format: FrameFormat::Png,
            quality: 80,
        });
        let frame = encoder.encode(&solid_image(1280, 960)).unwrap();
        let decoded = image::load_from_memory(&frame.bytes).unwrap();
        assert_eq!(decoded.width(), 640);
        assert_eq!(decoded.height(), 480);
    }

    #[test]
    fn test_scale_preserves_aspect_ratio() {
        let encoder = FrameEncoder::with_config(EncoderConfig {
            max_width: 640,
            max_height: 480,
            format: FrameFormat::Png,
            quality: 80,
        });
        // 1920x1080: width is the binding constraint (scale = 1/3).
        let frame = encoder.encode(&solid_image(1920, 1080)).unwrap();
        let decoded = image::load_from_memory(&frame.bytes).unwrap();
        assert_eq!(decoded.width(), 640);
        assert_eq!(decoded.height(), 360);
    }

    #[test]
    fn test_small_frame_is_never_upscaled() {
        let encoder = FrameEncoder::with_config(EncoderConfig {
            max_width: 640,
            max_height: 480,
            format: FrameFormat::Png,
            quality: 80,
        });
        let frame = encoder.encode(&solid_image(100, 80)).unwrap();
        let decoded = image::load_from_memory(&frame.bytes).unwrap();
        assert_eq!(decoded.width(), 100);
        assert_eq!(decoded.height(), 80);
    }

    #[test]
    fn test_zero_dimension_frame_is_encode_failure() {
        let encoder = FrameEncoder::new();
        let empty = RgbImage::new(0, 0);
        let err = encoder.encode(&empty).unwrap_err();
        assert!(matches!(err, SignBridgeError::EncodeFailure { .. }));
    }
}
