// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan binarization — turns a photographed page into a two-tone image using a
// global Otsu threshold with a fixed bias towards keeping faint ink.

use std::sync::Arc;
use std::time::Instant;

use image::{GrayImage, Luma, Rgba, RgbaImage};
use inkscan_core::config::{DEFAULT_MAX_PIXELS, ScanSettings};
use inkscan_core::error::Result;
use inkscan_core::types::{ImageHandle, OutputFormat};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::handles::HandleRegistry;
use crate::image::encode::{encode, output_file_name};
use crate::source::ImageSource;

/// Subtracted from the Otsu level so faint strokes land on the dark side.
pub const THRESHOLD_BIAS: i32 = 10;
/// Lowest threshold ever applied.
pub const MIN_THRESHOLD: u8 = 100;
/// Highest threshold ever applied.
pub const MAX_THRESHOLD: u8 = 200;
/// Level reported when no split improves on zero variance (uniform images).
const FALLBACK_THRESHOLD: u8 = 128;

/// Threshold statistics of one binarization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdReport {
    /// Otsu level before the bias is applied.
    pub raw: u8,
    /// Level actually used for the rewrite.
    pub adjusted: u8,
    pub total_pixels: u64,
    /// Pixels that became black.
    pub dark_pixels: u64,
}

/// Result of [`Binarizer::binarize`]: encoded bytes plus a display handle.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub bytes: Arc<[u8]>,
    pub format: OutputFormat,
    pub file_name: String,
    pub handle: ImageHandle,
    pub width: u32,
    pub height: u32,
    pub report: ThresholdReport,
}

/// Produces "scanned document" versions of uploaded photos.
///
/// Each call decodes, thresholds and encodes independently; the only state
/// kept here is the registry that hands out display handles.
#[derive(Debug, Clone)]
pub struct Binarizer {
    registry: HandleRegistry,
    max_pixels: u64,
}

impl Binarizer {
    pub fn new(registry: HandleRegistry) -> Self {
        Self {
            registry,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    /// Binarizer honouring the decode ceiling from `settings`.
    pub fn from_settings(settings: &ScanSettings, registry: HandleRegistry) -> Self {
        Self::new(registry).with_max_pixels(settings.max_pixels)
    }

    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    /// Decode `source`, binarize it and encode the result as `format`.
    ///
    /// `quality` only applies to lossy formats. Fails with `Decode` when the
    /// source cannot be loaded and with `PixelAccess` when its pixels may not
    /// be read. Nothing is registered unless every step succeeds.
    #[instrument(skip(self, source), fields(name = ?source.name()))]
    pub fn binarize(
        &self,
        source: &ImageSource,
        format: OutputFormat,
        quality: Option<f32>,
    ) -> Result<ProcessedImage> {
        let start = Instant::now();

        let rgba = source.decode(self.max_pixels)?.read_pixels()?;
        let (width, height) = rgba.dimensions();

        let (output, report) = binarize_rgba(&rgba);
        drop(rgba);

        let bytes: Arc<[u8]> = encode(&output, format, quality)?.into();
        let handle = self.registry.register(Arc::clone(&bytes), format.mime_type());

        info!(
            width,
            height,
            raw_threshold = report.raw,
            threshold = report.adjusted,
            dark_pixels = report.dark_pixels,
            encoded_bytes = bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Binarization complete"
        );

        Ok(ProcessedImage {
            bytes,
            format,
            file_name: output_file_name(&source.output_stem(), format),
            handle,
            width,
            height,
            report,
        })
    }
}

// -- Pixel pipeline -----------------------------------------------------------

/// Binarize an RGBA bitmap, returning the two-tone copy and its statistics.
///
/// R, G and B become 0 or 255; alpha is copied unchanged.
pub fn binarize_rgba(image: &RgbaImage) -> (RgbaImage, ThresholdReport) {
    let gray = grayscale_buffer(image);
    let hist = histogram(&gray);
    let total_pixels = u64::from(gray.width()) * u64::from(gray.height());

    let raw = otsu_threshold(&hist, total_pixels);
    let adjusted = adjust_threshold(raw);
    debug!(raw, adjusted, "Threshold computed");

    let mut output = image.clone();
    apply_threshold(&mut output, &gray, adjusted);

    let dark_pixels = hist[..=usize::from(adjusted)].iter().sum();
    (
        output,
        ThresholdReport {
            raw,
            adjusted,
            total_pixels,
            dark_pixels,
        },
    )
}

/// Weighted luminance `round(0.299 R + 0.587 G + 0.114 B)`.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)).round() as u8
}

/// Per-pixel luminance, computed once and reused by later passes.
pub fn grayscale_buffer(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, _]) = *image.get_pixel(x, y);
        Luma([luminance(r, g, b)])
    })
}

/// 256-bucket luminance histogram.
pub fn histogram(gray: &GrayImage) -> [u64; 256] {
    let stats = imageproc::stats::histogram(gray);
    let counts = &stats.channels[0];
    std::array::from_fn(|level| u64::from(counts[level]))
}

/// Otsu's level: the `t` maximizing `wB * wF * (mB - mF)^2`.
///
/// Ties keep the lowest `t`. Returns 128 when no split has positive variance.
pub fn otsu_threshold(histogram: &[u64; 256], total_pixels: u64) -> u8 {
    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut sum_background = 0.0f64;
    let mut weight_background = 0u64;
    let mut max_variance = 0.0f64;
    let mut best_threshold = FALLBACK_THRESHOLD;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count;
        if weight_background == 0 {
            continue;
        }
        let weight_foreground = total_pixels.saturating_sub(weight_background);
        if weight_foreground == 0 {
            break;
        }

        sum_background += t as f64 * count as f64;
        let mean_background = sum_background / weight_background as f64;
        let mean_foreground = (sum_total - sum_background) / weight_foreground as f64;

        let variance = weight_background as f64
            * weight_foreground as f64
            * (mean_background - mean_foreground).powi(2);

        if variance > max_variance {
            max_variance = variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

/// Apply the fixed bias: `clamp(raw - 10, 100, 200)`.
pub fn adjust_threshold(raw: u8) -> u8 {
    (i32::from(raw) - THRESHOLD_BIAS).clamp(i32::from(MIN_THRESHOLD), i32::from(MAX_THRESHOLD))
        as u8
}

/// White where luminance exceeds `threshold`, black elsewhere. Alpha is kept.
pub fn apply_threshold(image: &mut RgbaImage, gray: &GrayImage, threshold: u8) {
    for (pixel, level) in image.pixels_mut().zip(gray.pixels()) {
        let value = if level.0[0] > threshold { 255 } else { 0 };
        pixel.0[0] = value;
        pixel.0[1] = value;
        pixel.0[2] = value;
    }
}

// -- Tests --------------------------------------------------------------------
