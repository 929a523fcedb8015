// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use edgeviewer::{
    error::Error as PipelineError,
    image::{
        image_size, nv21_to_rgba, pack_nv21, rotate_nv21, yuv_to_rgb, Image, ImageRef,
        PixelFormat, Plane, Rotation,
    },
};
use std::error::Error;

#[test]
fn test_formats() -> Result<(), Box<dyn Error>> {
    let mut img = Image::new(1920, 1080, PixelFormat::Nv21)?;
    println!("{}", img);
    assert_eq!(img.size(), 3110400);

    img = Image::new(1920, 1080, PixelFormat::Rgba)?;
    println!("{}", img);
    assert_eq!(img.size(), 8294400);

    img = Image::new(1920, 1080, PixelFormat::Grey)?;
    println!("{}", img);
    assert_eq!(img.size(), 2073600);

    assert_eq!(image_size(4, 2, PixelFormat::Nv21), Some(12));
    assert_eq!(image_size(u32::MAX, u32::MAX, PixelFormat::Rgba), None);
    assert_eq!(PixelFormat::Nv21.to_string(), "NV21");

    Ok(())
}

#[test]
fn test_invalid_dimensions() {
    assert!(matches!(
        Image::new(0, 1080, PixelFormat::Rgba),
        Err(PipelineError::Conversion(_))
    ));
    assert!(matches!(
        Image::new(641, 480, PixelFormat::Nv21),
        Err(PipelineError::Conversion(_))
    ));
    assert!(matches!(
        Image::from_vec(vec![0; 10], 2, 2, PixelFormat::Rgba),
        Err(PipelineError::InvalidBuffer(_))
    ));
}

#[test]
fn test_undersized_source() {
    let frame = vec![0u8; 11];
    let src = ImageRef::new(&frame, 4, 2, PixelFormat::Nv21);
    assert!(matches!(src, Err(PipelineError::InvalidBuffer(_))));
}

#[test]
fn test_padded_source() -> Result<(), Box<dyn Error>> {
    let frame = vec![128u8; 64];
    let src = ImageRef::new(&frame, 4, 2, PixelFormat::Nv21)?;
    assert_eq!(src.as_slice().len(), 12);
    Ok(())
}

#[test]
fn test_convert_zeros() -> Result<(), Box<dyn Error>> {
    let expected = yuv_to_rgb(0, 0, 0);
    for (width, height) in [(2, 2), (4, 2), (64, 48), (640, 480)] {
        let frame = vec![0u8; width * height * 3 / 2];
        let src = ImageRef::new(&frame, width as u32, height as u32, PixelFormat::Nv21)?;
        let rgba = nv21_to_rgba(&src)?;

        assert_eq!(rgba.format(), PixelFormat::Rgba);
        assert_eq!(rgba.size(), width * height * 4);
        assert!(rgba
            .as_slice()
            .chunks_exact(4)
            .all(|px| px == [expected.0, expected.1, expected.2, 255]));
    }
    Ok(())
}

#[test]
fn test_convert_neutral_chroma() -> Result<(), Box<dyn Error>> {
    assert_eq!(yuv_to_rgb(0, 128, 128), (0, 0, 0));
    assert_eq!(yuv_to_rgb(255, 128, 128), (255, 255, 255));

    let (width, height) = (8, 4);
    let mut frame = vec![128u8; width * height * 3 / 2];
    for (i, y) in frame[..width * height].iter_mut().enumerate() {
        *y = (i * 7) as u8;
    }
    let src = ImageRef::new(&frame, width as u32, height as u32, PixelFormat::Nv21)?;
    let rgba = nv21_to_rgba(&src)?;

    for (i, px) in rgba.as_slice().chunks_exact(4).enumerate() {
        let y = frame[i];
        assert_eq!(px, [y, y, y, 255]);
    }
    Ok(())
}

#[test]
fn test_convert_chroma_order() -> Result<(), Box<dyn Error>> {
    // Strong V (red difference) stored first in each pair, U second.
    let mut frame = vec![128u8; 2 * 2 * 3 / 2];
    frame[4] = 255;
    frame[5] = 128;
    let src = ImageRef::new(&frame, 2, 2, PixelFormat::Nv21)?;
    let rgba = nv21_to_rgba(&src)?;

    for px in rgba.as_slice().chunks_exact(4) {
        assert_eq!(px[0], 255);
        assert!(px[1] < 128);
        assert_eq!(px[2], 128);
    }
    Ok(())
}

#[test]
fn test_convert_wrong_format() -> Result<(), Box<dyn Error>> {
    let img = Image::new(4, 2, PixelFormat::Rgba)?;
    assert!(matches!(
        nv21_to_rgba(&img.view()),
        Err(PipelineError::InvalidBuffer(_))
    ));
    Ok(())
}

fn numbered_frame(width: usize, height: usize) -> Vec<u8> {
    (0..width * height * 3 / 2).map(|i| i as u8).collect()
}

#[test]
fn test_rotate_90() -> Result<(), Box<dyn Error>> {
    let frame = numbered_frame(4, 2);
    let src = ImageRef::new(&frame, 4, 2, PixelFormat::Nv21)?;
    let rotated = rotate_nv21(&src, Rotation::Rotation90)?;

    assert_eq!(rotated.width(), 2);
    assert_eq!(rotated.height(), 4);
    assert_eq!(
        rotated.as_slice(),
        &[4u8, 0, 5, 1, 6, 2, 7, 3, 8, 9, 10, 11][..]
    );
    Ok(())
}

#[test]
fn test_rotate_180_270() -> Result<(), Box<dyn Error>> {
    let frame = numbered_frame(4, 2);
    let src = ImageRef::new(&frame, 4, 2, PixelFormat::Nv21)?;

    let half = rotate_nv21(&src, Rotation::Rotation180)?;
    assert_eq!(
        half.as_slice(),
        &[7u8, 6, 5, 4, 3, 2, 1, 0, 10, 11, 8, 9][..]
    );

    let ccw = rotate_nv21(&src, Rotation::Rotation270)?;
    assert_eq!((ccw.width(), ccw.height()), (2, 4));
    assert_eq!(
        ccw.as_slice(),
        &[3u8, 7, 2, 6, 1, 5, 0, 4, 10, 11, 8, 9][..]
    );
    Ok(())
}

#[test]
fn test_rotate_full_turn() -> Result<(), Box<dyn Error>> {
    let frame = numbered_frame(8, 6);
    let mut img = ImageRef::new(&frame, 8, 6, PixelFormat::Nv21)?.to_image();
    for _ in 0..4 {
        img = rotate_nv21(&img.view(), Rotation::Rotation90)?;
    }
    assert_eq!(img.as_slice(), &frame[..]);

    assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Rotation270));
    assert_eq!(Rotation::from_degrees(450), Some(Rotation::Rotation90));
    assert_eq!(Rotation::from_degrees(45), None);
    Ok(())
}

#[test]
fn test_pack_planes() -> Result<(), Box<dyn Error>> {
    // 4x2 luma with 2 bytes of row padding
    let y = [0u8, 1, 2, 3, 99, 99, 4, 5, 6, 7];
    // Chroma delivered as a shared interleaved buffer, pixel stride 2
    let uv = [20u8, 30, 21, 31];
    let u = Plane::new(&uv[0..], 4, 2);
    let v = Plane::new(&uv[1..], 4, 2);

    let packed = pack_nv21(&Plane::new(&y, 6, 1), &u, &v, 4, 2)?;
    assert_eq!(packed.format(), PixelFormat::Nv21);
    assert_eq!(
        packed.as_slice(),
        &[0u8, 1, 2, 3, 4, 5, 6, 7, 30, 20, 31, 21][..]
    );
    Ok(())
}

#[test]
fn test_pack_short_plane() {
    let y = [0u8; 7];
    let uv = [128u8; 4];
    let result = pack_nv21(
        &Plane::new(&y, 4, 1),
        &Plane::new(&uv, 4, 2),
        &Plane::new(&uv[1..], 4, 2),
        4,
        2,
    );
    assert!(matches!(result, Err(PipelineError::InvalidBuffer(_))));
}
