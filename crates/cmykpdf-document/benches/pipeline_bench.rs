// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the per-image stage of the cmykpdf-document
// pipeline: RGB to CMYK conversion followed by CMYK JPEG encoding.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use cmykpdf_document::{ColorConverter, PrintImageEncoder};

/// A 256x256 gradient so the encoder sees real frequency content.
fn gradient() -> DynamicImage {
    let img = RgbImage::from_fn(256, 256, |x, y| Rgb([x as u8, y as u8, (x ^ y) as u8]));
    DynamicImage::ImageRgb8(img)
}

fn bench_convert(c: &mut Criterion) {
    let image = gradient();
    let converter = ColorConverter::new();

    c.bench_function("rgb_to_cmyk (256x256)", |b| {
        b.iter(|| black_box(converter.convert(black_box(&image)).unwrap()));
    });
}

fn bench_convert_and_encode(c: &mut Criterion) {
    let image = gradient();
    let converter = ColorConverter::new();
    let encoder = PrintImageEncoder::default();

    c.bench_function("rgb_to_cmyk_jpeg (256x256)", |b| {
        b.iter(|| {
            let pixels = converter.convert(black_box(&image)).unwrap();
            black_box(encoder.encode(pixels).unwrap());
        });
    });
}

criterion_group!(benches, bench_convert, bench_convert_and_encode);
criterion_main!(benches);
