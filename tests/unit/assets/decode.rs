use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.size, PixelSize::new(1, 1));
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn pending_source_is_unavailable_until_decoded() {
    let src = SourceImage::from_bytes(png_bytes(3, 2, [1, 2, 3, 255]));
    assert!(!src.is_decoded());
    assert!(src.size().is_none());
    assert!(matches!(
        src.pixels().unwrap_err(),
        CompositorError::SourceUnavailable(_)
    ));

    assert_eq!(src.decode().unwrap(), PixelSize::new(3, 2));
    assert!(src.is_decoded());
    assert_eq!(src.decode().unwrap(), PixelSize::new(3, 2));
    assert_eq!(src.pixels().unwrap().rgba8_premul().len(), 3 * 2 * 4);
}

#[test]
fn garbage_bytes_fail_and_stay_pending() {
    let src = SourceImage::from_bytes(b"not an image".to_vec());
    assert!(matches!(src.decode().unwrap_err(), CompositorError::Other(_)));
    assert!(!src.is_decoded());

    let empty = SourceImage::from_bytes(Vec::new());
    assert!(empty.decode().is_err());
}

#[test]
fn from_rgba8_checks_length() {
    assert!(SourceImage::from_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(SourceImage::from_rgba8(0, 2, Vec::new()).is_err());
    let src = SourceImage::from_rgba8(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 51]).unwrap();
    assert!(src.is_decoded());
    assert_eq!(
        src.pixels().unwrap().rgba8_premul(),
        &[255, 0, 0, 255, 0, 0, 51, 51]
    );
}

#[test]
fn unpremultiply_inverts_premultiply_for_opaque_and_half() {
    let mut px = vec![200u8, 100, 50, 255, 200, 100, 50, 128];
    let orig = px.clone();
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    for (a, b) in px.iter().zip(orig.iter()) {
        assert!((i16::from(*a) - i16::from(*b)).abs() <= 1);
    }
}
