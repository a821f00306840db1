// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for students uploading homework photos.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the caller presents it.

use crate::error::InkscanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Disk hiccup or similar — trying again may work.
    Transient,
    /// User must do something (pick another photo, fix a setting).
    ActionRequired,
    /// The input itself cannot be used as-is.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether retrying the same operation unchanged can succeed.
    pub retriable: bool,
    /// Severity level.
    pub severity: Severity,
}

/// Convert an `InkscanError` into a `HumanError` a student can act on.
pub fn humanize_error(err: &InkscanError) -> HumanError {
    match err {
        // -- Image errors --
        InkscanError::Decode(detail) => humanize_decode_error(detail),

        InkscanError::PixelAccess(_) => HumanError {
            message: "This picture can't be edited here.".into(),
            suggestion: "It came from another website. Save it to your device first, then upload the saved copy.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        InkscanError::InvalidDimensions { width, height } => HumanError {
            message: "This picture is empty.".into(),
            suggestion: format!("The image has no visible pixels ({width}x{height}). Please take the photo again."),
            retriable: false,
            severity: Severity::Permanent,
        },

        InkscanError::Encode(_) => HumanError {
            message: "We couldn't save the cleaned-up picture.".into(),
            suggestion: "Try choosing PNG as the output format in Settings, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Handles --
        InkscanError::UnknownHandle(_) => HumanError {
            message: "That picture is no longer available.".into(),
            suggestion: "Please add the photo again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Settings / storage --
        InkscanError::Config(detail) => HumanError {
            message: "One of your settings isn't valid.".into(),
            suggestion: format!("Open Settings and check the scan options. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        InkscanError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "The app doesn't have permission to use that file.".into(),
                suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        InkscanError::Serialization(_) => HumanError {
            message: "Your saved settings couldn't be read.".into(),
            suggestion: "The settings will be reset to their defaults. Review them in Settings.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

/// Parse decoder error details into a more specific message.
fn humanize_decode_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("format") && (lower.contains("unsupported") || lower.contains("unknown") || lower.contains("not be determined")) {
        HumanError {
            message: "We don't recognise this type of picture.".into(),
            suggestion: "Please upload a JPEG or PNG photo.".into(),
            retriable: false,
            severity: Severity::Permanent,
        }
    } else if lower.contains("limit") {
        HumanError {
            message: "This picture is too large.".into(),
            suggestion: "Try a smaller photo, or lower your camera's resolution.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "This picture seems to be damaged.".into(),
            suggestion: "Try taking the photo again, or save it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        }
    }
}
