// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan settings and their on-disk persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{InkscanError, Result};
use crate::types::OutputFormat;

/// File name of the persisted settings inside the data directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Quality used for lossy output when none is configured.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.95;

/// Decode ceiling: 64 Mi pixels.
pub const DEFAULT_MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// Persistent user settings for the scan preprocessing stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Turn uploads into two-tone "scanned" images before they are sent on.
    pub image_binarizing: bool,
    /// Encoding of binarized output.
    pub output_format: OutputFormat,
    /// Lossy quality in [0, 1]. `None` means [`DEFAULT_JPEG_QUALITY`].
    pub jpeg_quality: Option<f32>,
    /// Largest image (in pixels) the decoder will accept.
    pub max_pixels: u64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            image_binarizing: false,
            output_format: OutputFormat::Png,
            jpeg_quality: None,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl ScanSettings {
    /// Reject values that can never produce a usable image.
    pub fn validate(&self) -> Result<()> {
        if let Some(q) = self.jpeg_quality {
            if !(0.0..=1.0).contains(&q) {
                return Err(InkscanError::Config(format!(
                    "jpeg_quality must be within [0, 1], got {q}"
                )));
            }
        }
        if self.max_pixels == 0 {
            return Err(InkscanError::Config("max_pixels must be positive".into()));
        }
        Ok(())
    }

    /// Load settings from `data_dir`, falling back to defaults when the file
    /// is missing, unreadable or invalid.
    pub fn load_or_default(data_dir: &Path) -> Self {
        match Self::load(data_dir) {
            Ok(Some(settings)) => settings,
            Ok(None) => Self::default(),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable settings; using defaults");
                Self::default()
            }
        }
    }

    /// Load settings from `data_dir`. `Ok(None)` when no file exists yet.
    pub fn load(data_dir: &Path) -> Result<Option<Self>> {
        let path = data_dir.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        let settings: Self = serde_json::from_str(&data)?;
        settings.validate()?;
        debug!(path = %path.display(), "settings loaded");
        Ok(Some(settings))
    }

    /// Validate and persist settings as pretty JSON inside `data_dir`.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        self.validate()?;
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }
}

/// Return the application data directory (not created).
///
/// Uses `XDG_DATA_HOME`, then `$HOME/.local/share`, then `/tmp`.
pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        PathBuf::from("/tmp")
    };
    base.join("inkscan")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_binarizing_off() {
        let settings = ScanSettings::default();
        assert!(!settings.image_binarizing);
        assert_eq!(settings.output_format, OutputFormat::Png);
        assert!(settings.max_pixels >= 50_000_000);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ScanSettings {
            image_binarizing: true,
            output_format: OutputFormat::Jpeg,
            jpeg_quality: Some(0.8),
            ..ScanSettings::default()
        };
        settings.save(dir.path()).unwrap();

        let loaded = ScanSettings::load(dir.path()).unwrap();
        assert_eq!(loaded, Some(settings));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ScanSettings::load(dir.path()).unwrap(), None);
        assert_eq!(ScanSettings::load_or_default(dir.path()), ScanSettings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{"image_binarizing": true}"#).unwrap();

        let loaded = ScanSettings::load_or_default(dir.path());
        assert!(loaded.image_binarizing);
        assert_eq!(loaded.output_format, OutputFormat::Png);
        assert_eq!(loaded.max_pixels, DEFAULT_MAX_PIXELS);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();

        assert!(ScanSettings::load(dir.path()).is_err());
        assert_eq!(ScanSettings::load_or_default(dir.path()), ScanSettings::default());
    }

    #[test]
    fn out_of_range_quality_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ScanSettings { jpeg_quality: Some(1.5), ..ScanSettings::default() };
        assert!(matches!(settings.save(dir.path()), Err(InkscanError::Config(_))));
    }
}
