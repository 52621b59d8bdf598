//! Export presets applied by [`Image::optimize`](crate::Image::optimize).
//!
//! Presets are plain serde structs so callers can load them from JSON or
//! TOML. The defaults describe a progressive, web-sized JPEG.

use serde::{Deserialize, Serialize};

use crate::engine::{ColorType, Interlace};

/// Settings applied when the image is a JPEG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JpegPreset {
    pub interlace: Interlace,
    pub color_type: ColorType,
    /// Output format name, e.g. `PJPEG`.
    pub format: String,
    /// Compression quality (1 to 100)
    pub quality: u8,
    /// Ask the encoder for optimized Huffman tables.
    pub optimize_coding: bool,
    /// DCT implementation hint (`float`, `int`, `fast`). Stored as a coder
    /// option; the raster engine's encoder has a single DCT.
    pub dct_method: String,
}

impl Default for JpegPreset {
    fn default() -> Self {
        Self {
            interlace: Interlace::Plane,
            color_type: ColorType::Optimize,
            format: "PJPEG".to_string(),
            quality: 60,
            optimize_coding: true,
            dct_method: "float".to_string(),
        }
    }
}

impl JpegPreset {
    /// Encoder hints as `jpeg:*` coder options.
    pub fn coder_options(&self) -> Vec<(&'static str, String)> {
        vec![
            ("jpeg:optimize-coding", self.optimize_coding.to_string()),
            ("jpeg:dct-method", self.dct_method.clone()),
        ]
    }
}

/// Settings applied when the image is a PNG. Currently empty: PNG output is
/// only stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PngPreset {}
