// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image sources — raw uploads (bytes or files) tagged with their origin, and
// scoped decoding into an in-memory bitmap.

use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, ImageReader, Limits, RgbaImage};
use inkscan_core::error::{InkscanError, Result};
use inkscan_core::types::Origin;
use tracing::{debug, instrument, warn};

/// Fallback stem for output names when the upload has no usable name.
const DEFAULT_STEM: &str = "document";

/// Encoded image payload.
#[derive(Debug, Clone)]
enum Payload {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// An undecoded image plus where it came from.
#[derive(Debug, Clone)]
pub struct ImageSource {
    payload: Payload,
    origin: Origin,
    name: Option<String>,
}

impl ImageSource {
    // -- Construction ---------------------------------------------------------

    /// Source backed by encoded bytes (JPEG, PNG, etc.).
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: Payload::Bytes(data.into()),
            origin: Origin::Local,
            name: None,
        }
    }

    /// Source backed by a file. The file is read lazily on decode.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
            payload: Payload::Path(path.to_path_buf()),
            origin: Origin::Local,
        }
    }

    /// Tag the source with its origin.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Attach the user-visible file name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    // -- Accessors ------------------------------------------------------------

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Stem used to build output file names.
    pub fn output_stem(&self) -> String {
        output_stem(self.name())
    }

    /// Read file-backed sources into memory so later steps can reuse the bytes.
    pub fn load(self) -> Result<Self> {
        match self.payload {
            Payload::Bytes(_) => Ok(self),
            Payload::Path(ref path) => {
                let data = read_file(path)?;
                Ok(Self {
                    payload: Payload::Bytes(data),
                    origin: self.origin,
                    name: self.name,
                })
            }
        }
    }

    /// The encoded bytes, if already in memory.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Bytes(data) => Some(data),
            Payload::Path(_) => None,
        }
    }

    // -- Decoding -------------------------------------------------------------

    /// Decode the source into a bitmap.
    ///
    /// Reader and decoder live only for the duration of this call, so the
    /// encoded source is released on every exit path before any pixel is read.
    /// Every failure here is a decode failure.
    #[instrument(skip(self), fields(name = ?self.name))]
    pub fn decode(&self, max_pixels: u64) -> Result<DecodedImage> {
        let data: Cow<'_, [u8]> = match &self.payload {
            Payload::Bytes(data) => Cow::Borrowed(data.as_slice()),
            Payload::Path(path) => Cow::Owned(read_file(path)?),
        };

        let (format, width, height) = probe(&data)?;
        if width == 0 || height == 0 {
            return Err(InkscanError::InvalidDimensions { width, height });
        }
        let pixels = u64::from(width) * u64::from(height);
        if pixels > max_pixels {
            return Err(InkscanError::Decode(format!(
                "{width}x{height} image exceeds the pixel limit of {max_pixels}"
            )));
        }

        let mut reader = ImageReader::with_format(Cursor::new(&*data), format);
        let mut limits = Limits::default();
        // 16-bit RGBA is the widest buffer a decoder may allocate.
        limits.max_alloc = Some(max_pixels.saturating_mul(8));
        reader.limits(limits);

        let image = reader.decode().map_err(|err| {
            InkscanError::Decode(format!("failed to decode {format:?} image: {err}"))
        })?;
        debug!(width, height, ?format, "image decoded; source released");

        Ok(DecodedImage {
            image,
            format,
            origin: self.origin.clone(),
        })
    }
}

/// A successfully decoded bitmap whose pixels have not been read yet.
#[derive(Debug)]
pub struct DecodedImage {
    image: DynamicImage,
    format: ImageFormat,
    origin: Origin,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Container format the source was encoded in.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Read the pixel buffer back as 8-bit RGBA.
    ///
    /// Fails with `PixelAccess` when the source is tainted by a foreign origin,
    /// even though decoding itself succeeded.
    pub fn read_pixels(self) -> Result<RgbaImage> {
        if let Origin::Remote { url, cors_approved: false } = &self.origin {
            warn!(%url, "refusing pixel read of cross-origin image");
            return Err(InkscanError::PixelAccess(format!(
                "image from {url} was not approved for cross-origin pixel access"
            )));
        }
        Ok(self.image.into_rgba8())
    }
}

/// Text before the first `.` of `name`, or `"document"` when that is empty.
pub fn output_stem(name: Option<&str>) -> String {
    name.and_then(|n| n.split('.').next())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(DEFAULT_STEM)
        .to_string()
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|err| {
        InkscanError::Decode(format!("failed to read {}: {}", path.display(), err))
    })
}

/// Sniff the container format and read the header dimensions.
fn probe(data: &[u8]) -> Result<(ImageFormat, u32, u32)> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|err| InkscanError::Decode(format!("failed to inspect image: {err}")))?;
    let format = reader.format().ok_or_else(|| {
        InkscanError::Decode("the image format could not be determined".into())
    })?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|err| InkscanError::Decode(format!("failed to read {format:?} header: {err}")))?;
    Ok((format, width, height))
}
