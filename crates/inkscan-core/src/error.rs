// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for inkscan.

use thiserror::Error;

use crate::types::ImageHandle;

/// Top-level error type for all inkscan operations.
#[derive(Debug, Error)]
pub enum InkscanError {
    // -- Image errors --
    /// The source could not be loaded into a usable bitmap.
    #[error("image could not be decoded: {0}")]
    Decode(String),

    /// The bitmap decoded but its pixel buffer may not be read back.
    #[error("pixel data is not accessible: {0}")]
    PixelAccess(String),

    #[error("image has invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Handles --
    #[error("no image registered under handle {0}")]
    UnknownHandle(ImageHandle),

    // -- Settings / persistence --
    #[error("invalid settings: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl InkscanError {
    /// True for failures to load the source into a bitmap.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::InvalidDimensions { .. })
    }

    /// True when the bitmap exists but reading its pixels was refused.
    pub fn is_pixel_access(&self) -> bool {
        matches!(self, Self::PixelAccess(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, InkscanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_and_pixel_access_are_disjoint() {
        let decode = InkscanError::Decode("bad header".into());
        let pixels = InkscanError::PixelAccess("tainted".into());

        assert!(decode.is_decode());
        assert!(!decode.is_pixel_access());
        assert!(pixels.is_pixel_access());
        assert!(!pixels.is_decode());
    }

    #[test]
    fn zero_dimensions_count_as_decode_failure() {
        let err = InkscanError::InvalidDimensions { width: 0, height: 10 };
        assert!(err.is_decode());
        assert_eq!(err.to_string(), "image has invalid dimensions 0x10");
    }
}
