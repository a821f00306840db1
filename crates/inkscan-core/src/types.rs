// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for inkscan.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Locally resolvable reference to encoded image bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle(pub Uuid);

impl ImageHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "inkscan:{}", self.0)
    }
}

/// Raster encodings the binarizer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless, keeps the alpha channel.
    #[default]
    Png,
    /// Lossy, honours the quality factor. No alpha channel.
    Jpeg,
}

impl OutputFormat {
    /// MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// Parse a MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Whether the quality factor applies to this format.
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Jpeg)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            other => Self::from_mime(other).ok_or_else(|| format!("unsupported output format: {s}")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        })
    }
}

/// Where an image source came from.
///
/// Pixels of a remote image may only be read back when the remote host
/// explicitly allowed it (CORS). Otherwise the bitmap is considered tainted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Origin {
    /// Picked from this device (file, camera, clipboard).
    #[default]
    Local,
    /// Fetched from another origin by the caller.
    Remote { url: String, cors_approved: bool },
}

impl Origin {
    /// True when reading the decoded pixels would cross a security boundary.
    pub fn is_tainted(&self) -> bool {
        matches!(self, Self::Remote { cors_approved: false, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parses_names_and_mime_types() {
        assert_eq!("PNG".parse::<OutputFormat>(), Ok(OutputFormat::Png));
        assert_eq!("jpg".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!("image/jpeg".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert!("image/webp".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn png_is_the_default_lossless_format() {
        assert_eq!(OutputFormat::default(), OutputFormat::Png);
        assert!(!OutputFormat::Png.is_lossy());
        assert!(OutputFormat::Jpeg.is_lossy());
    }

    #[test]
    fn only_unapproved_remote_origins_are_tainted() {
        assert!(!Origin::Local.is_tainted());
        assert!(
            !Origin::Remote { url: "https://cdn.example/a.png".into(), cors_approved: true }.is_tainted()
        );
        assert!(
            Origin::Remote { url: "https://cdn.example/a.png".into(), cors_approved: false }.is_tainted()
        );
    }

    #[test]
    fn handles_are_unique() {
        assert_ne!(ImageHandle::new(), ImageHandle::new());
    }
}
