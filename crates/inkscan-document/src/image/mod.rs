// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — output encoding and file naming.

pub mod encode;

pub use encode::{encode, jpeg_quality, output_file_name};
