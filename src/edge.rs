// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Single channel stages used by edge detection: Gaussian smoothing and a
//! Canny style two-threshold edge extractor.

use crate::error::{Error, Result};
use ::image::GrayImage;

const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

const NONE: u8 = 0;
const WEAK: u8 = 1;
const STRONG: u8 = 2;

/// Normalized one dimensional Gaussian kernel of `size` taps.
///
/// # Errors
///
/// Returns [`Error::Conversion`] unless `size` is odd and `sigma` is a
/// positive finite number.
pub fn gaussian_kernel(size: usize, sigma: f32) -> Result<Vec<f32>> {
    if size % 2 == 0 {
        return Err(Error::Conversion(format!(
            "blur kernel size {size} must be odd"
        )));
    }
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(Error::Conversion(format!(
            "blur sigma {sigma} must be positive"
        )));
    }

    let half = (size / 2) as f32;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - half;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    Ok(kernel)
}

/// Mirrors an out of range index without repeating the edge sample
/// (`gfedcb|abcdefgh|gfedcba`).
fn reflect101(i: isize, n: usize) -> usize {
    let n = n as isize;
    if n == 1 {
        return 0;
    }
    let mut i = i;
    while i < 0 || i >= n {
        i = if i < 0 { -i } else { 2 * n - 2 - i };
    }
    i as usize
}

fn replicate(i: isize, n: usize) -> usize {
    i.clamp(0, n as isize - 1) as usize
}

/// Separable Gaussian blur with a `size` x `size` kernel.
pub fn gaussian_blur(src: &GrayImage, size: usize, sigma: f32) -> Result<GrayImage> {
    let kernel = gaussian_kernel(size, sigma)?;
    let (width, height) = (src.width() as usize, src.height() as usize);
    let half = (size / 2) as isize;
    let raw = src.as_raw();

    let mut rows = vec![0f32; width * height];
    for y in 0..height {
        let line = &raw[y * width..(y + 1) * width];
        for x in 0..width {
            rows[y * width + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * line[reflect101(x as isize + k as isize - half, width)] as f32)
                .sum();
        }
    }

    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let v: f32 = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| {
                    w * rows[reflect101(y as isize + k as isize - half, height) * width + x]
                })
                .sum();
            out[y * width + x] = v.round().clamp(0.0, 255.0) as u8;
        }
    }

    GrayImage::from_raw(src.width(), src.height(), out)
        .ok_or_else(|| Error::Conversion("blurred image size mismatch".to_string()))
}

/// Two-threshold edge extraction producing a binary map (255 edge, 0
/// background).
///
/// Gradients come from a 3x3 Sobel operator with replicated borders and are
/// measured as `|gx| + |gy|`. Only local maxima along the gradient direction
/// survive. Maxima above `high` are edges, maxima above `low` become edges
/// only when 8-connected to another edge. The thresholds are swapped if given
/// in the wrong order.
pub fn canny(src: &GrayImage, low: f32, high: f32) -> Result<GrayImage> {
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    let (width, height) = (src.width() as usize, src.height() as usize);
    let raw = src.as_raw();

    let px = |x: isize, y: isize| -> i32 {
        raw[replicate(y, height) * width + replicate(x, width)] as i32
    };

    let mut gx = vec![0i32; width * height];
    let mut gy = vec![0i32; width * height];
    let mut mag = vec![0i32; width * height];
    for y in 0..height as isize {
        for x in 0..width as isize {
            let i = y as usize * width + x as usize;
            gx[i] = (px(x + 1, y - 1) + 2 * px(x + 1, y) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x - 1, y) + px(x - 1, y + 1));
            gy[i] = (px(x - 1, y + 1) + 2 * px(x, y + 1) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x, y - 1) + px(x + 1, y - 1));
            mag[i] = gx[i].abs() + gy[i].abs();
        }
    }

    // Outside the image the magnitude is zero.
    let m = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
            0
        } else {
            mag[y as usize * width + x as usize]
        }
    };

    let mut state = vec![NONE; width * height];
    let mut stack = Vec::new();
    for y in 0..height as isize {
        for x in 0..width as isize {
            let i = y as usize * width + x as usize;
            let here = mag[i];
            if here as f32 <= low {
                continue;
            }

            let (ax, ay) = (gx[i].abs() as f32, gy[i].abs() as f32);
            let is_max = if ay <= ax * TAN_22_5 {
                here > m(x - 1, y) && here >= m(x + 1, y)
            } else if ay > ax * TAN_67_5 {
                here > m(x, y - 1) && here >= m(x, y + 1)
            } else {
                let s = if (gx[i] < 0) != (gy[i] < 0) { -1 } else { 1 };
                here > m(x - s, y - 1) && here > m(x + s, y + 1)
            };
            if !is_max {
                continue;
            }

            if here as f32 > high {
                state[i] = STRONG;
                stack.push(i);
            } else {
                state[i] = WEAK;
            }
        }
    }

    while let Some(i) = stack.pop() {
        let (x, y) = ((i % width) as isize, (i / width) as isize);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let j = ny as usize * width + nx as usize;
                if state[j] == WEAK {
                    state[j] = STRONG;
                    stack.push(j);
                }
            }
        }
    }

    let edges = state
        .into_iter()
        .map(|s| if s == STRONG { 255 } else { 0 })
        .collect();
    GrayImage::from_raw(src.width(), src.height(), edges)
        .ok_or_else(|| Error::Conversion("edge map size mismatch".to_string()))
}
