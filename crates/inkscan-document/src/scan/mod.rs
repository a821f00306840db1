// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — Otsu binarization of photographed pages.

pub mod binarize;

pub use binarize::{Binarizer, ProcessedImage, ThresholdReport, binarize_rgba};
