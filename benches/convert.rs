// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use criterion::{criterion_group, criterion_main, Criterion};
use edgeviewer::{
    filter::{self, ProcessingMode},
    image::{nv21_to_rgba, Image, PixelFormat},
};

const DIMS: [(u32, u32); 5] = [
    (320, 240),
    (640, 480),
    (960, 540),
    (1920, 1080),
    (3840, 2160),
];

pub fn benchmark_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert/NV21");
    for dim in DIMS.iter() {
        let src = Image::new(dim.0, dim.1, PixelFormat::Nv21).unwrap();
        group.bench_with_input(format!("{}x{}", dim.0, dim.1), &src, |b, src| {
            b.iter(|| nv21_to_rgba(&src.view()))
        });
    }
}

pub fn benchmark_filter(c: &mut Criterion) {
    for mode in [
        ProcessingMode::Raw,
        ProcessingMode::Grayscale,
        ProcessingMode::EdgeDetection,
    ] {
        let mut group = c.benchmark_group(format!("filter/{}", mode));
        for dim in DIMS.iter() {
            let src = Image::new(dim.0, dim.1, PixelFormat::Rgba).unwrap();
            group.bench_with_input(format!("{}x{}", dim.0, dim.1), &src, |b, src| {
                b.iter(|| filter::apply(src, mode))
            });
        }
    }
}

criterion_group!(benches, benchmark_convert, benchmark_filter);
criterion_main!(benches);
