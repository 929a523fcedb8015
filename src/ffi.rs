// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Boundary between the host runtime and the frame pipeline.
//!
//! The host passes the address and capacity of a direct buffer holding an
//! NV21 frame, together with its dimensions and a mode selector. The source
//! is only borrowed for the duration of the call. On success the host
//! receives an opaque [`FrameHandle`] that it owns: the pixel data stays valid
//! until the handle is passed to [`ev_frame_release`], exactly once.
//!
//! Every failure, including a panic inside the pipeline, is reported as a
//! null handle. The cause is written to the diagnostic log and never crosses
//! the boundary; the frame is simply dropped.

use crate::{
    error::{Error, Result},
    filter::{self, ProcessingMode},
    image::{nv21_to_rgba, Image, ImageRef, PixelFormat},
    logging::{self, LOG_TARGET},
};
use std::{
    any::Any,
    ffi::c_char,
    panic::{self, AssertUnwindSafe},
    ptr, slice,
    sync::atomic::{AtomicUsize, Ordering},
};
use tracing::{debug, error};

const CONNECTION_MESSAGE: &str = concat!(
    "EdgeViewer ",
    env!("CARGO_PKG_VERSION"),
    " loaded successfully (modes: Raw, Grayscale, Canny)\0"
);

static LIVE_FRAMES: AtomicUsize = AtomicUsize::new(0);

/// Human readable capability and version string.
pub fn test_connection() -> &'static str {
    let message = CONNECTION_MESSAGE.trim_end_matches('\0');
    debug!(target: LOG_TARGET, "{}", message);
    message
}

fn dimensions(width: i32, height: i32) -> Result<(u32, u32)> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(Error::Conversion(format!(
            "invalid frame dimensions {width}x{height}"
        ))),
    }
}

/// Converts an NV21 frame to RGBA without filtering.
pub fn convert_only(data: &[u8], width: i32, height: i32) -> Result<Image> {
    let (width, height) = dimensions(width, height)?;
    let src = ImageRef::new(data, width, height, PixelFormat::Nv21)?;
    nv21_to_rgba(&src)
}

/// Converts an NV21 frame to RGBA and applies the filter selected by `mode`.
///
/// Unknown selectors behave as [`ProcessingMode::Raw`].
pub fn process(data: &[u8], width: i32, height: i32, mode: i32) -> Result<Image> {
    let selected = ProcessingMode::from(mode);
    if selected.code() != mode {
        error!(target: LOG_TARGET, "unknown processing mode {}, using {}", mode, selected);
    }
    let rgba = convert_only(data, width, height)?;
    filter::apply(&rgba, selected)
}

/// Result buffer handed to the host.
///
/// The storage is allocated to exactly the size of the final image and
/// shares nothing with the intermediate buffers of the pipeline.
#[derive(Debug)]
pub struct FrameHandle {
    data: Box<[u8]>,
    width: u32,
    height: u32,
}

impl FrameHandle {
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn into_raw(self) -> *mut FrameHandle {
        Box::into_raw(Box::new(self))
    }
}

impl From<Image> for FrameHandle {
    fn from(image: Image) -> Self {
        let (width, height) = (image.width(), image.height());
        LIVE_FRAMES.fetch_add(1, Ordering::Relaxed);
        Self {
            data: image.into_vec().into_boxed_slice(),
            width,
            height,
        }
    }
}

impl Drop for FrameHandle {
    fn drop(&mut self) {
        LIVE_FRAMES.fetch_sub(1, Ordering::Relaxed);
        debug!(target: LOG_TARGET, "frame {}x{} released", self.width, self.height);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic with a non-string payload".to_string())
}

/// Runs one boundary operation and maps its outcome onto the null-handle
/// convention. This is the only place pipeline errors are consumed.
fn guard<F>(op: &str, run: F) -> *mut FrameHandle
where
    F: FnOnce() -> Result<Image>,
{
    let result = panic::catch_unwind(AssertUnwindSafe(run))
        .unwrap_or_else(|payload| Err(Error::UnknownFault(panic_message(payload.as_ref()))));

    match result {
        Ok(image) => {
            debug!(target: LOG_TARGET, "{}: {}", op, image);
            FrameHandle::from(image).into_raw()
        }
        Err(err) => {
            error!(target: LOG_TARGET, "{}: frame dropped: {}", op, err);
            ptr::null_mut()
        }
    }
}

/// Resolves the host's buffer address into a borrowed slice.
///
/// # Safety
///
/// A non-null `data` must point to `len` readable bytes that stay valid and
/// unmodified for the lifetime `'a`.
unsafe fn resolve<'a>(data: *const u8, len: usize) -> Result<&'a [u8]> {
    if data.is_null() {
        return Err(Error::InvalidBuffer(
            "failed to get source buffer address".to_string(),
        ));
    }
    if len > isize::MAX as usize {
        return Err(Error::InvalidBuffer(format!(
            "source buffer length {len} is not addressable"
        )));
    }
    Ok(slice::from_raw_parts(data, len))
}

/// Returns a static NUL terminated string; the caller must not free it.
#[no_mangle]
pub extern "C" fn ev_test_connection() -> *const c_char {
    test_connection();
    CONNECTION_MESSAGE.as_ptr().cast()
}

/// Converts and filters one frame. Returns null if the frame was dropped.
///
/// The returned handle must be released with [`ev_frame_release`].
///
/// # Safety
///
/// A non-null `data` must point to `len` readable bytes that are not written
/// to for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn ev_process(
    data: *const u8,
    len: usize,
    width: i32,
    height: i32,
    mode: i32,
) -> *mut FrameHandle {
    let source = resolve(data, len);
    guard("process", move || process(source?, width, height, mode))
}

/// Converts one frame to RGBA without filtering. Returns null if the frame
/// was dropped.
///
/// The returned handle follows the same ownership rule as [`ev_process`].
///
/// # Safety
///
/// Same requirements on `data` and `len` as [`ev_process`].
#[no_mangle]
pub unsafe extern "C" fn ev_convert_only(
    data: *const u8,
    len: usize,
    width: i32,
    height: i32,
) -> *mut FrameHandle {
    let source = resolve(data, len);
    guard("convert_only", move || convert_only(source?, width, height))
}

/// Address of the RGBA pixels, or null for a null handle.
///
/// # Safety
///
/// `frame` must be null or a live handle from [`ev_process`] or
/// [`ev_convert_only`]. The address is valid until the handle is released.
#[no_mangle]
pub unsafe extern "C" fn ev_frame_data(frame: *const FrameHandle) -> *const u8 {
    frame.as_ref().map_or(ptr::null(), |f| f.data.as_ptr())
}

/// Length of the pixel data in bytes (`width * height * 4`).
///
/// # Safety
///
/// `frame` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn ev_frame_len(frame: *const FrameHandle) -> usize {
    frame.as_ref().map_or(0, |f| f.data.len())
}

/// # Safety
///
/// `frame` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn ev_frame_width(frame: *const FrameHandle) -> u32 {
    frame.as_ref().map_or(0, |f| f.width)
}

/// # Safety
///
/// `frame` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn ev_frame_height(frame: *const FrameHandle) -> u32 {
    frame.as_ref().map_or(0, |f| f.height)
}

/// Frees a handle returned by [`ev_process`] or [`ev_convert_only`].
///
/// Null is ignored.
///
/// # Safety
///
/// `frame` must be null or a live handle, and is released exactly once. No
/// address obtained from [`ev_frame_data`] may be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn ev_frame_release(frame: *mut FrameHandle) {
    if frame.is_null() {
        return;
    }
    drop(Box::from_raw(frame));
}

/// Number of handles currently owned by the host.
#[no_mangle]
pub extern "C" fn ev_live_frames() -> usize {
    LIVE_FRAMES.load(Ordering::Relaxed)
}

#[no_mangle]
pub extern "C" fn ev_init_logging(verbose: bool) {
    logging::init(verbose);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_becomes_null() {
        let handle = guard("panic", || panic!("stage failed"));
        assert!(handle.is_null());

        let handle = guard("fault", || Err(Error::UnknownFault("injected".to_string())));
        assert!(handle.is_null());
    }
}
