// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use edgeviewer::{filter::ProcessingMode, image::Rotation};
use std::path::PathBuf;

/// Frame processing mode.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
pub enum ModeSetting {
    /// Color converted frame without filtering
    Raw,
    /// Luminance only
    Grayscale,
    /// Edge detection (white edges on black)
    Canny,
}

impl From<ModeSetting> for ProcessingMode {
    fn from(mode: ModeSetting) -> Self {
        match mode {
            ModeSetting::Raw => ProcessingMode::Raw,
            ModeSetting::Grayscale => ProcessingMode::Grayscale,
            ModeSetting::Canny => ProcessingMode::EdgeDetection,
        }
    }
}

/// Clockwise rotation applied to the frame before conversion.
///
/// Matches the sensor orientation correction done by camera hosts.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
pub enum RotationSetting {
    /// No rotation
    None,
    /// 90 degrees clockwise (swaps width and height)
    Rot90,
    /// 180 degrees
    Rot180,
    /// 270 degrees clockwise (swaps width and height)
    Rot270,
}

impl From<RotationSetting> for Rotation {
    fn from(rot: RotationSetting) -> Self {
        match rot {
            RotationSetting::None => Rotation::Rotation0,
            RotationSetting::Rot90 => Rotation::Rotation90,
            RotationSetting::Rot180 => Rotation::Rotation180,
            RotationSetting::Rot270 => Rotation::Rotation270,
        }
    }
}

/// Command-line arguments for the EdgeViewer frame processor harness.
///
/// Runs the native pipeline over a single NV21 frame repeatedly and reports
/// per-stage latency. Arguments can be specified via command line or
/// environment variables.
///
/// # Example
///
/// ```bash
/// # Process a captured frame
/// edgeviewer --input frame.nv21 --size 1920 1080 --mode canny
///
/// # Via environment variables, with a synthetic frame
/// export MODE=grayscale
/// export FRAME_SIZE="640 480"
/// edgeviewer --json
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Raw NV21 frame file (a synthetic checkerboard is used when omitted)
    #[arg(short, long, env = "INPUT")]
    pub input: Option<PathBuf>,

    /// Frame resolution in pixels (width height)
    #[arg(
        short,
        long,
        env = "FRAME_SIZE",
        default_value = "1280 720",
        value_delimiter = ' ',
        num_args = 2
    )]
    pub size: Vec<u32>,

    /// Processing mode
    #[arg(short, long, env = "MODE", default_value = "canny", value_enum)]
    pub mode: ModeSetting,

    /// Frame rotation applied before processing
    #[arg(short, long, env = "ROTATION", default_value = "none", value_enum)]
    pub rotation: RotationSetting,

    /// Number of times the frame is processed
    #[arg(short = 'n', long, env = "ITERATIONS", default_value = "100")]
    pub iterations: u32,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Frame width and height from `--size`/`FRAME_SIZE`.
    ///
    /// Values coming from the environment bypass clap's argument count, so a
    /// lone `FRAME_SIZE=640` is reported here instead of indexing out of range.
    pub fn frame_size(&self) -> Result<(u32, u32), String> {
        match self.size[..] {
            [width, height] => Ok((width, height)),
            _ => Err(format!(
                "frame size needs a width and a height, got {:?}",
                self.size
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size() {
        let mut args = Args::try_parse_from(["edgeviewer", "--size", "640", "480"]).unwrap();
        assert_eq!(args.frame_size(), Ok((640, 480)));

        args.size = vec![640];
        assert!(args.frame_size().is_err());

        args.size = vec![640, 480, 2];
        assert!(args.frame_size().is_err());
    }
}
