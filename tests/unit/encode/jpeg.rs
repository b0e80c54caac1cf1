use super::*;

fn noisy(w: u32, h: u32) -> Vec<u8> {
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    let mut out = Vec::with_capacity((w * h * 4) as usize);
    for _ in 0..w * h {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let v = state.to_le_bytes();
        out.extend_from_slice(&[v[0], v[1], v[2], 255]);
    }
    out
}

#[test]
fn encodes_decodable_jpeg_with_matching_dimensions() {
    let size = PixelSize::new(17, 9);
    let bytes = encode_jpeg(&noisy(17, 9), size, Quality::MAX).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    let img = image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg).unwrap();
    assert_eq!((img.width(), img.height()), (17, 9));
}

#[test]
fn higher_quality_is_not_smaller() {
    let size = PixelSize::new(64, 64);
    let px = noisy(64, 64);
    let hi = encode_jpeg(&px, size, Quality::MAX).unwrap();
    let lo = encode_jpeg(&px, size, Quality::SMART).unwrap();
    assert!(hi.len() >= lo.len(), "q1.0={} q0.8={}", hi.len(), lo.len());
}

#[test]
fn zero_size_and_mismatch_are_encode_errors() {
    assert!(matches!(
        encode_jpeg(&[], PixelSize::new(0, 0), Quality::MAX).unwrap_err(),
        CompositorError::Encode(_)
    ));
    assert!(matches!(
        encode_jpeg(&[0; 8], PixelSize::new(1, 1), Quality::MAX).unwrap_err(),
        CompositorError::Encode(_)
    ));
}
