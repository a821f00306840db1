// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload preparation — the optional scan stage every uploaded photo passes
// through before it is handed to the solver, gated by the user's settings.

use std::sync::Arc;

use inkscan_core::config::ScanSettings;
use inkscan_core::error::Result;
use inkscan_core::types::ImageHandle;
use tracing::{info, instrument};

use crate::handles::HandleRegistry;
use crate::scan::binarize::{Binarizer, ThresholdReport};
use crate::source::ImageSource;

/// An upload ready to be displayed or sent on.
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub bytes: Arc<[u8]>,
    pub mime_type: &'static str,
    pub file_name: String,
    pub handle: ImageHandle,
    /// Whether the scan effect was applied.
    pub binarized: bool,
    /// Threshold statistics, present when `binarized`.
    pub report: Option<ThresholdReport>,
}

/// Applies [`ScanSettings`] to incoming uploads.
#[derive(Debug, Clone)]
pub struct UploadPreparer {
    settings: ScanSettings,
    binarizer: Binarizer,
}

impl UploadPreparer {
    pub fn new(settings: ScanSettings, registry: HandleRegistry) -> Self {
        let binarizer = Binarizer::from_settings(&settings, registry);
        Self { settings, binarizer }
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    pub fn registry(&self) -> &HandleRegistry {
        self.binarizer.registry()
    }

    /// Binarize `source` when the setting is on; otherwise pass its bytes
    /// through untouched after checking that they decode.
    #[instrument(skip(self, source), fields(name = ?source.name(), binarizing = self.settings.image_binarizing))]
    pub fn prepare(&self, source: ImageSource) -> Result<PreparedUpload> {
        if self.settings.image_binarizing {
            let processed = self.binarizer.binarize(
                &source,
                self.settings.output_format,
                self.settings.jpeg_quality,
            )?;
            return Ok(PreparedUpload {
                bytes: processed.bytes,
                mime_type: processed.format.mime_type(),
                file_name: processed.file_name,
                handle: processed.handle,
                binarized: true,
                report: Some(processed.report),
            });
        }

        let source = source.load()?;
        let decoded = source.decode(self.settings.max_pixels)?;
        let format = decoded.format();
        drop(decoded);

        let bytes: Arc<[u8]> = Arc::from(source.bytes().unwrap_or_default());
        let mime_type = format.to_mime_type();
        let file_name = match source.name() {
            Some(name) => name.to_string(),
            None => format!(
                "{}.{}",
                source.output_stem(),
                format.extensions_str().first().copied().unwrap_or("img")
            ),
        };
        let handle = self.registry().register(Arc::clone(&bytes), mime_type);
        info!(mime_type, bytes = bytes.len(), "Upload passed through unchanged");

        Ok(PreparedUpload {
            bytes,
            mime_type,
            file_name,
            handle,
            binarized: false,
            report: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use inkscan_core::types::{Origin, OutputFormat};
    use std::io::Cursor;

    fn photo_png() -> Vec<u8> {
        let img = RgbaImage::from_fn(20, 10, |x, y| {
            let v = (60 + x * 8 + y * 2) as u8;
            Rgba([v, v.saturating_sub(20), v / 2, 255])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn disabled_setting_passes_bytes_through() {
        let preparer = UploadPreparer::new(ScanSettings::default(), HandleRegistry::new());
        let original = photo_png();

        let upload = preparer.prepare(ImageSource::from_bytes(original.clone())).unwrap();

        assert!(!upload.binarized);
        assert!(upload.report.is_none());
        assert_eq!(&*upload.bytes, original.as_slice());
        assert_eq!(upload.mime_type, "image/png");
        assert_eq!(upload.file_name, "document.png");
        assert!(preparer.registry().resolve(&upload.handle).is_ok());
    }

    #[test]
    fn disabled_setting_still_rejects_broken_uploads() {
        let preparer = UploadPreparer::new(ScanSettings::default(), HandleRegistry::new());
        let err = preparer.prepare(ImageSource::from_bytes(b"GIF89a-garbage".to_vec())).unwrap_err();
        assert!(err.is_decode());
        assert!(preparer.registry().is_empty());
    }

    #[test]
    fn disabled_setting_does_not_read_pixels() {
        let preparer = UploadPreparer::new(ScanSettings::default(), HandleRegistry::new());
        let source = ImageSource::from_bytes(photo_png()).with_origin(Origin::Remote {
            url: "https://elsewhere.example/p.png".into(),
            cors_approved: false,
        });
        assert!(preparer.prepare(source).is_ok());
    }

    #[test]
    fn enabled_setting_binarizes() {
        let settings = ScanSettings {
            image_binarizing: true,
            output_format: OutputFormat::Jpeg,
            jpeg_quality: Some(0.7),
            ..ScanSettings::default()
        };
        let preparer = UploadPreparer::new(settings, HandleRegistry::new());

        let upload = preparer
            .prepare(ImageSource::from_bytes(photo_png()).with_name("q1.png"))
            .unwrap();

        assert!(upload.binarized);
        assert!(upload.report.is_some());
        assert_eq!(upload.mime_type, "image/jpeg");
        assert_eq!(upload.file_name, "enhanced_q1.jpg");
    }

    #[test]
    fn file_uploads_keep_their_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homework.png");
        std::fs::write(&path, photo_png()).unwrap();

        let preparer = UploadPreparer::new(ScanSettings::default(), HandleRegistry::new());
        let upload = preparer.prepare(ImageSource::from_path(&path)).unwrap();
        assert_eq!(upload.file_name, "homework.png");
    }
}
