// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use thiserror::Error;

/// Failures raised by the frame pipeline.
///
/// Every variant is caught at the boundary in [`crate::ffi`] and reported to
/// the host as a null handle; the message only reaches the diagnostic log.
#[derive(Debug, Error)]
pub enum Error {
    /// The source region is null, too small, or does not match its format.
    #[error("invalid buffer: {0}")]
    InvalidBuffer(String),

    /// The color-space transform or a filter stage cannot proceed with the
    /// given dimensions or parameters.
    #[error("conversion failed: {0}")]
    Conversion(String),

    /// Anything else, including panics caught at the boundary.
    #[error("unknown fault: {0}")]
    UnknownFault(String),
}

pub type Result<T> = std::result::Result<T, Error>;
