// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # EdgeViewer Native Frame Processor
//!
//! This library turns live camera frames into display-ready pixels. Each call
//! converts one NV21 (YUV 4:2:0 semi-planar) frame into interleaved RGBA and
//! optionally applies a per-frame filter before handing the result back to
//! the host runtime that owns the display surface.
//!
//! ## Features
//!
//! - **Color Conversion**: Full-range BT.601 NV21 to RGBA, plus rotation and
//!   packing of strided camera planes into NV21.
//! - **Filters**: Raw passthrough, grayscale and Canny style edge detection,
//!   always returning RGBA with the input dimensions.
//! - **C ABI**: `ev_*` entry points with explicit ownership transfer of result
//!   buffers and a paired release function.
//!
//! ## Example
//!
//! ```
//! use edgeviewer::ffi::process;
//! use edgeviewer::filter::ProcessingMode;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 640x480 NV21 frame with mid grey luma and neutral chroma
//! let frame = vec![128u8; 640 * 480 * 3 / 2];
//!
//! let rgba = process(&frame, 640, 480, ProcessingMode::GRAYSCALE)?;
//! assert_eq!(rgba.size(), 640 * 480 * 4);
//! # Ok(())
//! # }
//! ```
//!
//! ## Threading
//!
//! Calls are synchronous and keep no state between frames. Concurrent calls
//! from several host threads are safe as long as each works on its own
//! buffers; the only shared state is a diagnostic counter of live handles.
//!
//! ## Safety
//!
//! `unsafe` code is limited to the [`ffi`] module, where host pointers are
//! resolved into borrowed slices and result handles are boxed and released.

pub mod edge;
pub mod error;
pub mod ffi;
pub mod filter;
pub mod image;
pub mod logging;
