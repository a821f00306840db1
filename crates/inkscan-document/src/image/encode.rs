// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output encoding — PNG (lossless, with alpha) and JPEG (lossy, quality factor).

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{RgbImage, RgbaImage};
use inkscan_core::config::DEFAULT_JPEG_QUALITY;
use inkscan_core::error::{InkscanError, Result};
use inkscan_core::types::OutputFormat;
use tracing::{debug, warn};

/// Prefix of every processed file name.
const OUTPUT_PREFIX: &str = "enhanced_";

/// Encode `image` as `format`. `quality` (0..=1) only affects JPEG.
pub fn encode(image: &RgbaImage, format: OutputFormat, quality: Option<f32>) -> Result<Vec<u8>> {
    let buffer = match format {
        OutputFormat::Png => to_png_bytes(image)?,
        OutputFormat::Jpeg => to_jpeg_bytes(image, jpeg_quality(quality))?,
    };
    debug!(%format, bytes = buffer.len(), "Image encoded");
    Ok(buffer)
}

/// Map a 0..=1 quality factor onto the encoder's 1..=100 scale.
///
/// `None` and non-finite values use the default of 0.95; values outside
/// [0, 1] are clamped.
pub fn jpeg_quality(quality: Option<f32>) -> u8 {
    let factor = match quality {
        None => DEFAULT_JPEG_QUALITY,
        Some(q) if !q.is_finite() => {
            warn!(quality = q, "non-finite JPEG quality; using default");
            DEFAULT_JPEG_QUALITY
        }
        Some(q) if !(0.0..=1.0).contains(&q) => {
            warn!(quality = q, "JPEG quality outside [0, 1]; clamping");
            q.clamp(0.0, 1.0)
        }
        Some(q) => q,
    };
    ((factor * 100.0).round() as u8).clamp(1, 100)
}

/// `enhanced_<stem>.<ext>` for the requested format.
pub fn output_file_name(stem: &str, format: OutputFormat) -> String {
    format!("{OUTPUT_PREFIX}{stem}.{}", format.extension())
}

fn to_png_bytes(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image
        .write_with_encoder(PngEncoder::new(&mut buffer))
        .map_err(|err| InkscanError::Encode(format!("PNG encoding failed: {err}")))?;
    Ok(buffer)
}

fn to_jpeg_bytes(image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    // JPEG has no alpha channel.
    let rgb: RgbImage = image.convert();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| InkscanError::Encode(format!("JPEG encoding failed: {err}")))?;
    Ok(buffer)
}
