// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::error::{Error, Result};
use ::image::GrayImage;
use core::fmt;

/// Pixel layouts understood by the frame pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// NV21 4:2:0 YUV semi-planar (luma plane followed by interleaved VU)
    Nv21,
    /// RGBA 32-bit pixel format (8 bits per channel, with alpha)
    Rgba,
    /// 8-bit single channel luminance
    Grey,
}

impl PixelFormat {
    /// The four character code used for this layout in log output.
    pub const fn fourcc(&self) -> [u8; 4] {
        match self {
            PixelFormat::Nv21 => *b"NV21",
            PixelFormat::Rgba => *b"RGBA",
            PixelFormat::Grey => *b"GREY",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let fourcc = self.fourcc();
        f.write_str(core::str::from_utf8(&fourcc).map_err(|_| fmt::Error)?)
    }
}

/// Number of bytes an image of the given dimensions and format occupies, or
/// `None` when the size does not fit in `usize`.
///
/// `height` is always the luma height; NV21 adds a half-height chroma plane.
pub fn image_size(width: u32, height: u32, format: PixelFormat) -> Option<usize> {
    let pixels = (width as usize).checked_mul(height as usize)?;
    match format {
        PixelFormat::Nv21 => pixels.checked_mul(3).map(|n| n / 2),
        PixelFormat::Rgba => pixels.checked_mul(4),
        PixelFormat::Grey => Some(pixels),
    }
}

fn checked_size(width: u32, height: u32, format: PixelFormat) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::Conversion(format!(
            "{width}x{height} {format}: dimensions must be positive"
        )));
    }
    if format == PixelFormat::Nv21 && (width % 2 != 0 || height % 2 != 0) {
        return Err(Error::Conversion(format!(
            "{width}x{height} {format}: chroma subsampling requires even dimensions"
        )));
    }
    image_size(width, height, format).ok_or_else(|| {
        Error::Conversion(format!("{width}x{height} {format}: image size overflows"))
    })
}

/// Owned image buffer.
///
/// The byte length always equals [`image_size`] for the image's dimensions
/// and format. Images produced by the pipeline are returned by value, so the
/// caller decides when the storage is released.
///
/// # Example
///
/// ```
/// use edgeviewer::image::{Image, PixelFormat};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = Image::new(1920, 1080, PixelFormat::Rgba)?;
/// assert_eq!(img.size(), 8294400);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl Image {
    /// Allocates a zero-filled image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conversion`] for zero dimensions, odd NV21 dimensions
    /// or a size that overflows.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let size = checked_size(width, height, format)?;
        Ok(Self {
            data: vec![0; size],
            width,
            height,
            format,
        })
    }

    /// Wraps an existing allocation, which must be exactly the required size.
    pub fn from_vec(data: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let size = checked_size(width, height, format)?;
        if data.len() != size {
            return Err(Error::InvalidBuffer(format!(
                "{width}x{height} {format} requires {size} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Moves a [`PixelFormat::Grey`] image into an `image` crate buffer
    /// without copying.
    pub fn into_gray_image(self) -> Result<GrayImage> {
        expect_format(self.format, PixelFormat::Grey)?;
        let (width, height) = (self.width, self.height);
        GrayImage::from_raw(width, height, self.data).ok_or_else(|| {
            Error::InvalidBuffer(format!("{width}x{height} GREY: buffer size mismatch"))
        })
    }

    /// Wraps an `image` crate buffer as a [`PixelFormat::Grey`] image.
    pub fn from_gray_image(gray: GrayImage) -> Result<Self> {
        let (width, height) = gray.dimensions();
        Self::from_vec(gray.into_raw(), width, height, PixelFormat::Grey)
    }

    /// Borrows the image as an [`ImageRef`].
    pub fn view(&self) -> ImageRef<'_> {
        ImageRef {
            data: &self.data,
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}x{} {} size:{}",
            self.width,
            self.height,
            self.format,
            self.data.len()
        )
    }
}

/// Borrowed, read-only view of image data owned by someone else.
///
/// The source region may be longer than the format requires (camera buffers
/// are often padded); only the leading [`image_size`] bytes are addressed.
#[derive(Copy, Clone, Debug)]
pub struct ImageRef<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl<'a> ImageRef<'a> {
    /// # Errors
    ///
    /// Returns [`Error::Conversion`] for unusable dimensions and
    /// [`Error::InvalidBuffer`] when `data` is shorter than the format
    /// requires.
    pub fn new(data: &'a [u8], width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let size = checked_size(width, height, format)?;
        let data = data.get(..size).ok_or_else(|| {
            Error::InvalidBuffer(format!(
                "{width}x{height} {format} requires {size} bytes, got {}",
                data.len()
            ))
        })?;
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Copies the viewed bytes into a new owned [`Image`].
    pub fn to_image(&self) -> Image {
        Image {
            data: self.data.to_vec(),
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }
}

fn expect_format(format: PixelFormat, expected: PixelFormat) -> Result<()> {
    if format != expected {
        return Err(Error::InvalidBuffer(format!(
            "expected {expected} image, got {format}"
        )));
    }
    Ok(())
}

/// Converts one full-range BT.601 YUV sample to RGB.
///
/// Fixed point with 16 fractional bits; neutral chroma (128, 128) maps every
/// luma value to the grey `(y, y, y)`.
#[inline]
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    const HALF: i32 = 1 << 15;
    let y = y as i32;
    let u = u as i32 - 128;
    let v = v as i32 - 128;

    let r = y + ((91881 * v + HALF) >> 16);
    let g = y + ((-22554 * u - 46802 * v + HALF) >> 16);
    let b = y + ((116130 * u + HALF) >> 16);

    (
        r.clamp(0, 255) as u8,
        g.clamp(0, 255) as u8,
        b.clamp(0, 255) as u8,
    )
}

/// Converts an NV21 frame into a newly allocated RGBA image.
///
/// The luma plane holds `width * height` bytes and is followed by a
/// `width * height / 2` byte plane of interleaved V,U pairs, one pair per
/// 2x2 block of pixels. Alpha is always 255.
///
/// # Errors
///
/// Returns [`Error::InvalidBuffer`] if `src` is not NV21. Nothing is
/// returned on failure, so a partially written image is never observable.
///
/// # Example
///
/// ```
/// use edgeviewer::image::{nv21_to_rgba, ImageRef, PixelFormat};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let frame = vec![128u8; 640 * 480 * 3 / 2];
/// let src = ImageRef::new(&frame, 640, 480, PixelFormat::Nv21)?;
/// let rgba = nv21_to_rgba(&src)?;
/// assert_eq!(rgba.size(), 640 * 480 * 4);
/// # Ok(())
/// # }
/// ```
pub fn nv21_to_rgba(src: &ImageRef<'_>) -> Result<Image> {
    expect_format(src.format(), PixelFormat::Nv21)?;

    let width = src.width() as usize;
    let mut dst = Image::new(src.width(), src.height(), PixelFormat::Rgba)?;
    let (luma, chroma) = src.as_slice().split_at(width * src.height() as usize);

    for (row, out) in dst.data.chunks_exact_mut(width * 4).enumerate() {
        let y_row = &luma[row * width..(row + 1) * width];
        let vu_row = &chroma[(row / 2) * width..(row / 2 + 1) * width];

        for (col, px) in out.chunks_exact_mut(4).enumerate() {
            let pair = col & !1;
            let (r, g, b) = yuv_to_rgb(y_row[col], vu_row[pair + 1], vu_row[pair]);
            px.copy_from_slice(&[r, g, b, 255]);
        }
    }

    Ok(dst)
}

/// Clockwise rotation applied to a frame before processing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    /// No rotation (0 degrees)
    #[default]
    Rotation0,
    /// Rotate 90 degrees clockwise
    Rotation90,
    /// Rotate 180 degrees
    Rotation180,
    /// Rotate 270 degrees clockwise (90 degrees counter-clockwise)
    Rotation270,
}

impl Rotation {
    /// Maps a sensor orientation in degrees to a rotation. Any multiple of
    /// 90 is accepted, including negative values.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Rotation0),
            90 => Some(Rotation::Rotation90),
            180 => Some(Rotation::Rotation180),
            270 => Some(Rotation::Rotation270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::Rotation0 => 0,
            Rotation::Rotation90 => 90,
            Rotation::Rotation180 => 180,
            Rotation::Rotation270 => 270,
        }
    }

    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Rotation::Rotation90 | Rotation::Rotation270)
    }
}

/// Rotates a row-major grid of `elem`-byte samples clockwise into `dst`.
fn rotate_plane(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    elem: usize,
    rot: Rotation,
) {
    let out_width = if rot.swaps_dimensions() { height } else { width };

    for (i, out) in dst.chunks_exact_mut(elem).enumerate() {
        let (ox, oy) = (i % out_width, i / out_width);
        let (x, y) = match rot {
            Rotation::Rotation0 => (ox, oy),
            Rotation::Rotation90 => (oy, height - 1 - ox),
            Rotation::Rotation180 => (width - 1 - ox, height - 1 - oy),
            Rotation::Rotation270 => (width - 1 - oy, ox),
        };
        let at = (y * width + x) * elem;
        out.copy_from_slice(&src[at..at + elem]);
    }
}

/// Rotates an NV21 frame, keeping each V,U pair together.
///
/// 90 and 270 degree rotations swap the output width and height.
pub fn rotate_nv21(src: &ImageRef<'_>, rot: Rotation) -> Result<Image> {
    expect_format(src.format(), PixelFormat::Nv21)?;

    let (width, height) = (src.width() as usize, src.height() as usize);
    let (out_width, out_height) = if rot.swaps_dimensions() {
        (src.height(), src.width())
    } else {
        (src.width(), src.height())
    };

    let mut dst = Image::new(out_width, out_height, PixelFormat::Nv21)?;
    let (luma_in, chroma_in) = src.as_slice().split_at(width * height);
    let (luma_out, chroma_out) = dst.data.split_at_mut(width * height);

    rotate_plane(luma_in, luma_out, width, height, 1, rot);
    rotate_plane(chroma_in, chroma_out, width / 2, height / 2, 2, rot);

    Ok(dst)
}

/// One plane of a 4:2:0 frame as delivered by a camera, with arbitrary row
/// padding and sample spacing.
#[derive(Copy, Clone, Debug)]
pub struct Plane<'a> {
    /// Plane bytes, starting at the first sample
    pub data: &'a [u8],
    /// Distance in bytes between the starts of two rows
    pub row_stride: usize,
    /// Distance in bytes between two samples of a row
    pub pixel_stride: usize,
}

impl<'a> Plane<'a> {
    pub fn new(data: &'a [u8], row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride,
        }
    }

    fn check(&self, name: &str, cols: usize, rows: usize) -> Result<()> {
        let span = (cols - 1).saturating_mul(self.pixel_stride).saturating_add(1);
        if self.pixel_stride == 0 || self.row_stride < span {
            return Err(Error::InvalidBuffer(format!(
                "{name} plane strides {}/{} cannot hold {cols} samples per row",
                self.row_stride, self.pixel_stride
            )));
        }
        let needed = (rows - 1)
            .checked_mul(self.row_stride)
            .and_then(|n| n.checked_add(span));
        match needed {
            Some(n) if n <= self.data.len() => Ok(()),
            _ => Err(Error::InvalidBuffer(format!(
                "{name} plane of {} bytes is too short for {cols}x{rows} samples",
                self.data.len()
            ))),
        }
    }

    #[inline]
    fn sample(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.row_stride + x * self.pixel_stride]
    }
}

/// Packs separately strided Y, U and V planes into a tightly packed NV21
/// image.
///
/// # Errors
///
/// Returns [`Error::InvalidBuffer`] when a plane is too short for its
/// strides and [`Error::Conversion`] for unusable dimensions.
pub fn pack_nv21(
    y: &Plane<'_>,
    u: &Plane<'_>,
    v: &Plane<'_>,
    width: u32,
    height: u32,
) -> Result<Image> {
    let mut dst = Image::new(width, height, PixelFormat::Nv21)?;
    let (width, height) = (width as usize, height as usize);

    y.check("Y", width, height)?;
    u.check("U", width / 2, height / 2)?;
    v.check("V", width / 2, height / 2)?;

    let (luma, chroma) = dst.data.split_at_mut(width * height);
    for (row, out) in luma.chunks_exact_mut(width).enumerate() {
        if y.pixel_stride == 1 {
            let start = row * y.row_stride;
            out.copy_from_slice(&y.data[start..start + width]);
        } else {
            for (col, px) in out.iter_mut().enumerate() {
                *px = y.sample(col, row);
            }
        }
    }

    let chroma_width = width / 2;
    for (i, vu) in chroma.chunks_exact_mut(2).enumerate() {
        let (cx, cy) = (i % chroma_width, i / chroma_width);
        vu[0] = v.sample(cx, cy);
        vu[1] = u.sample(cx, cy);
    }

    Ok(dst)
}
