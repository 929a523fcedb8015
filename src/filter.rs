// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    edge,
    error::{Error, Result},
    image::{Image, PixelFormat},
    logging::LOG_TARGET,
};
use core::fmt;
use tracing::debug;

/// Per-frame processing applied after color conversion.
///
/// Boundary selectors map onto the variants through `From<i32>`; any value
/// other than 1 or 2 selects [`ProcessingMode::Raw`], it is never an error.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ProcessingMode {
    /// Converted frame returned unchanged
    #[default]
    Raw,
    /// Perceptual luminance replicated into R, G and B
    Grayscale,
    /// White edges on a black background
    EdgeDetection,
}

impl ProcessingMode {
    pub const RAW: i32 = 0;
    pub const GRAYSCALE: i32 = 1;
    pub const EDGE_DETECTION: i32 = 2;

    /// Boundary selector for this mode.
    pub const fn code(&self) -> i32 {
        match self {
            ProcessingMode::Raw => Self::RAW,
            ProcessingMode::Grayscale => Self::GRAYSCALE,
            ProcessingMode::EdgeDetection => Self::EDGE_DETECTION,
        }
    }

    /// The mode a viewer toggle switches to next.
    pub const fn next(&self) -> Self {
        match self {
            ProcessingMode::Raw => ProcessingMode::Grayscale,
            ProcessingMode::Grayscale => ProcessingMode::EdgeDetection,
            ProcessingMode::EdgeDetection => ProcessingMode::Raw,
        }
    }
}

impl From<i32> for ProcessingMode {
    fn from(code: i32) -> Self {
        match code {
            Self::GRAYSCALE => ProcessingMode::Grayscale,
            Self::EDGE_DETECTION => ProcessingMode::EdgeDetection,
            _ => ProcessingMode::Raw,
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ProcessingMode::Raw => "Raw",
            ProcessingMode::Grayscale => "Grayscale",
            ProcessingMode::EdgeDetection => "Canny",
        })
    }
}

/// Tuning for [`ProcessingMode::EdgeDetection`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeDetectionParameters {
    /// Gradient magnitude above which a pixel may join an edge
    pub low_threshold: f32,
    /// Gradient magnitude above which a pixel is always an edge
    pub high_threshold: f32,
    /// Width and height of the smoothing kernel, must be odd
    pub blur_kernel_size: usize,
    /// Standard deviation of the smoothing kernel
    pub blur_sigma: f32,
}

impl EdgeDetectionParameters {
    pub const LOW_THRESHOLD: f32 = 50.0;
    pub const HIGH_THRESHOLD: f32 = 150.0;
    pub const BLUR_KERNEL_SIZE: usize = 5;
    pub const BLUR_SIGMA: f32 = 1.5;
}

impl Default for EdgeDetectionParameters {
    fn default() -> Self {
        Self {
            low_threshold: Self::LOW_THRESHOLD,
            high_threshold: Self::HIGH_THRESHOLD,
            blur_kernel_size: Self::BLUR_KERNEL_SIZE,
            blur_sigma: Self::BLUR_SIGMA,
        }
    }
}

// BT.601 weights scaled by 2^14; they sum to exactly 1 << 14.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT + (1 << (LUMA_SHIFT - 1)))
        >> LUMA_SHIFT) as u8
}

/// Reduces an RGBA image to a [`PixelFormat::Grey`] luminance image.
pub fn luminance(src: &Image) -> Result<Image> {
    if src.format() != PixelFormat::Rgba {
        return Err(Error::InvalidBuffer(format!(
            "{src}: luminance expects an RGBA image"
        )));
    }
    let mut gray = Image::new(src.width(), src.height(), PixelFormat::Grey)?;
    for (l, px) in gray
        .as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().chunks_exact(4))
    {
        *l = luma(px[0], px[1], px[2]);
    }
    Ok(gray)
}

/// Expands a [`PixelFormat::Grey`] image to opaque RGBA with R = G = B.
pub fn gray_to_rgba(gray: &Image) -> Result<Image> {
    if gray.format() != PixelFormat::Grey {
        return Err(Error::InvalidBuffer(format!(
            "{gray}: expansion expects a GREY image"
        )));
    }
    let mut rgba = Image::new(gray.width(), gray.height(), PixelFormat::Rgba)?;
    for (px, &l) in rgba.as_slice_mut().chunks_exact_mut(4).zip(gray.as_slice()) {
        px.copy_from_slice(&[l, l, l, 255]);
    }
    Ok(rgba)
}

/// Runs the stages for `mode` with the default [`EdgeDetectionParameters`].
///
/// The result is always a newly allocated RGBA image with the dimensions of
/// `src`; `src` is only borrowed and stays valid independently of the result.
///
/// # Errors
///
/// Returns [`Error::InvalidBuffer`] if `src` is not RGBA.
///
/// # Example
///
/// ```
/// use edgeviewer::filter::{apply, ProcessingMode};
/// use edgeviewer::image::{Image, PixelFormat};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let rgba = Image::new(64, 48, PixelFormat::Rgba)?;
/// let edges = apply(&rgba, ProcessingMode::EdgeDetection)?;
/// assert!(edges.as_slice().chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
/// # Ok(())
/// # }
/// ```
pub fn apply(src: &Image, mode: ProcessingMode) -> Result<Image> {
    apply_with(src, mode, &EdgeDetectionParameters::default())
}

/// Runs the stages for `mode` with explicit edge detection parameters.
pub fn apply_with(
    src: &Image,
    mode: ProcessingMode,
    params: &EdgeDetectionParameters,
) -> Result<Image> {
    if src.format() != PixelFormat::Rgba {
        return Err(Error::InvalidBuffer(format!(
            "{src}: filters expect an RGBA image"
        )));
    }
    debug!(target: LOG_TARGET, "apply {} to {}", mode, src);

    match mode {
        ProcessingMode::Raw => Ok(src.clone()),
        ProcessingMode::Grayscale => gray_to_rgba(&luminance(src)?),
        ProcessingMode::EdgeDetection => {
            let gray = luminance(src)?.into_gray_image()?;
            let blurred = edge::gaussian_blur(&gray, params.blur_kernel_size, params.blur_sigma)?;
            let edges = edge::canny(&blurred, params.low_threshold, params.high_threshold)?;
            gray_to_rgba(&Image::from_gray_image(edges)?)
        }
    }
}
