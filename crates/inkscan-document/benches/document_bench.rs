// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the inkscan-document crate: the pixel pipeline on
// its own and the full decode → binarize → encode path.

use std::io::Cursor;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use inkscan_core::types::OutputFormat;
use inkscan_document::scan::binarize_rgba;
use inkscan_document::{Binarizer, HandleRegistry, ImageSource};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 640x480 "photographed page": a lighting gradient with dark text-like
/// stripes every 24 rows.
fn synthetic_page() -> RgbaImage {
    RgbaImage::from_fn(640, 480, |x, y| {
        let paper = 170 + ((x + y) % 60) as u8;
        if y % 24 < 3 && x % 40 > 6 {
            Rgba([40, 38, 50, 255])
        } else {
            Rgba([paper, paper, paper.saturating_sub(12), 255])
        }
    })
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_binarize_pixels(c: &mut Criterion) {
    let page = synthetic_page();
    c.bench_function("binarize_rgba (640x480)", |b| {
        b.iter(|| black_box(binarize_rgba(black_box(&page))));
    });
}

fn bench_binarize_png(c: &mut Criterion) {
    let mut encoded = Vec::new();
    DynamicImage::ImageRgba8(synthetic_page())
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .expect("fixture encodes");
    let source = ImageSource::from_bytes(encoded);
    let registry = HandleRegistry::new();
    let binarizer = Binarizer::new(registry.clone());

    c.bench_function("binarize png -> png (640x480)", |b| {
        b.iter(|| {
            let processed = binarizer
                .binarize(black_box(&source), OutputFormat::Png, None)
                .expect("binarize succeeds");
            registry.revoke(&processed.handle);
            black_box(processed.bytes);
        });
    });
}

criterion_group!(benches, bench_binarize_pixels, bench_binarize_png);
criterion_main!(benches);
