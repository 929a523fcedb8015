// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

mod args;

use args::Args;
use clap::Parser;
use edgeviewer::{
    ffi, filter,
    filter::ProcessingMode,
    image::{nv21_to_rgba, rotate_nv21, ImageRef, PixelFormat, Rotation},
    logging,
};
use serde_json::json;
use std::{
    error::Error,
    fs,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

/// Rolling frame rate over a fixed window of frames.
struct FpsMeter {
    prev: Instant,
    history: Vec<i64>,
    index: usize,
}

impl FpsMeter {
    fn new(window: usize) -> Self {
        Self {
            prev: Instant::now(),
            history: vec![0; window],
            index: 0,
        }
    }

    fn update(&mut self) -> i64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.prev);
        self.prev = now;

        self.history[self.index] = 1e9 as i64 / elapsed.as_nanos().max(1) as i64;
        self.index = (self.index + 1) % self.history.len();

        (self.history.iter().sum::<i64>() as f64 / self.history.len() as f64).round() as i64
    }
}

/// NV21 checkerboard of 32 pixel blocks with neutral chroma.
fn synthetic_frame(width: u32, height: u32) -> Vec<u8> {
    let (width, height) = (width as usize, height as usize);
    let mut frame = vec![128u8; width * height * 3 / 2];
    for (i, px) in frame[..width * height].iter_mut().enumerate() {
        let (x, y) = (i % width, i / width);
        *px = if (x / 32 + y / 32) % 2 == 0 { 48 } else { 208 };
    }
    frame
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::init(args.verbose);
    info!("{}", ffi::test_connection());

    let (width, height) = args.frame_size()?;
    let frame = match &args.input {
        Some(path) => fs::read(path)?,
        None => synthetic_frame(width, height),
    };
    let src = ImageRef::new(&frame, width, height, PixelFormat::Nv21)?;
    if frame.len() > src.as_slice().len() {
        warn!(
            "input holds {} bytes, only the first {} are used",
            frame.len(),
            src.as_slice().len()
        );
    }

    let rotation = Rotation::from(args.rotation);
    let rotated = rotate_nv21(&src, rotation)?;
    let mode = ProcessingMode::from(args.mode);

    let mut fps = FpsMeter::new(30);
    let mut rate = 0;
    let mut convert_total = Duration::ZERO;
    let mut filter_total = Duration::ZERO;
    let mut output = None;

    for _ in 0..args.iterations {
        let now = Instant::now();
        let rgba = nv21_to_rgba(&rotated.view())?;
        let convert_time = now.elapsed();

        let now = Instant::now();
        let processed = filter::apply(&rgba, mode)?;
        let filter_time = now.elapsed();

        rate = fps.update();
        convert_total += convert_time;
        filter_total += filter_time;
        debug!(
            "{} convert: {:?} {}: {:?} fps: {}",
            processed, convert_time, mode, filter_time, rate
        );
        output = Some(processed);
    }

    let iterations = args.iterations.max(1);
    let edge_pixels = output
        .as_ref()
        .filter(|_| mode == ProcessingMode::EdgeDetection)
        .map(|img| img.as_slice().chunks_exact(4).filter(|px| px[0] == 255).count());

    let summary = json!({
        "width": rotated.width(),
        "height": rotated.height(),
        "mode": mode.to_string(),
        "rotation": rotation.degrees(),
        "iterations": args.iterations,
        "convert_ms": convert_total.as_secs_f64() * 1e3 / iterations as f64,
        "filter_ms": filter_total.as_secs_f64() * 1e3 / iterations as f64,
        "fps": rate,
        "output_bytes": output.as_ref().map(|img| img.size()),
        "edge_pixels": edge_pixels,
    });

    if args.json {
        println!("{}", summary);
    } else {
        println!(
            "frame {}x{} rotation: {} mode: {} convert: {:.2}ms filter: {:.2}ms fps: {}",
            rotated.width(),
            rotated.height(),
            rotation.degrees(),
            mode,
            summary["convert_ms"].as_f64().unwrap_or_default(),
            summary["filter_ms"].as_f64().unwrap_or_default(),
            rate,
        );
    }

    Ok(())
}
