// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// inkscan-document — Image handling for homework photo uploads.
//
// Provides scoped decoding of uploaded images, the Otsu "scan" binarizer,
// PNG/JPEG output encoding, display handles for processed images, and the
// settings-gated upload preparation stage.

pub mod handles;
pub mod image;
pub mod pipeline;
pub mod scan;
pub mod source;

// Re-export the primary structs so callers can use `inkscan_document::Binarizer` etc.
pub use handles::{HandleRegistry, RegisteredImage};
pub use pipeline::{PreparedUpload, UploadPreparer};
pub use scan::binarize::{Binarizer, ProcessedImage, ThresholdReport};
pub use source::{DecodedImage, ImageSource};
