use super::*;

fn src() -> PixelSize {
    PixelSize::new(800, 600)
}

#[test]
fn crop_inside_bounds_is_valid() {
    CropRect::new(100.0, 100.0, 400.0, 300.0)
        .validate_within(src())
        .unwrap();
    CropRect::full(src()).validate_within(src()).unwrap();
}

#[test]
fn crop_outside_bounds_is_rejected() {
    let cases = [
        CropRect::new(-1.0, 0.0, 10.0, 10.0),
        CropRect::new(0.0, -0.5, 10.0, 10.0),
        CropRect::new(700.0, 0.0, 101.0, 10.0),
        CropRect::new(0.0, 500.0, 10.0, 100.5),
        CropRect::new(900.0, 900.0, 10.0, 10.0),
        CropRect::new(0.0, 0.0, 0.0, 10.0),
        CropRect::new(0.0, 0.0, 10.0, -3.0),
        CropRect::new(f64::NAN, 0.0, 10.0, 10.0),
        CropRect::new(0.0, 0.0, f64::INFINITY, 10.0),
    ];
    for c in cases {
        let err = c.validate_within(src()).unwrap_err();
        assert!(
            matches!(err, CompositorError::InvalidCrop(_)),
            "{c:?} -> {err}"
        );
    }
}

#[test]
fn edge_within_epsilon_is_accepted() {
    CropRect::new(0.1 + 0.2, 0.0, 799.7, 600.0)
        .validate_within(src())
        .unwrap();
}

#[test]
fn output_size_rounds_half_up() {
    assert_eq!(
        CropRect::new(0.0, 0.0, 400.0, 300.0).output_size(),
        PixelSize::new(400, 300)
    );
    assert_eq!(
        CropRect::new(0.0, 0.0, 10.5, 2.49).output_size(),
        PixelSize::new(11, 2)
    );
    assert_eq!(round_half_up(0.3), 0);
    assert_eq!(round_half_up(0.5), 1);
    assert_eq!(round_half_up(-2.0), 0);
}

#[test]
fn pixel_alignment() {
    assert!(CropRect::new(1.0, 2.0, 3.0, 4.0).is_pixel_aligned());
    assert!(!CropRect::new(1.5, 2.0, 3.0, 4.0).is_pixel_aligned());
}

#[test]
fn quality_range_and_jpeg_scale() {
    assert!(Quality::new(0.0).is_err());
    assert!(Quality::new(1.01).is_err());
    assert!(Quality::new(f32::NAN).is_err());
    assert_eq!(Quality::MAX.jpeg_scale(), 100);
    assert_eq!(Quality::SMART.jpeg_scale(), 80);
    assert_eq!(Quality::new(0.001).unwrap().jpeg_scale(), 1);
}

#[test]
fn quality_deserializes_with_validation() {
    let q: Quality = serde_json::from_str("0.8").unwrap();
    assert_eq!(q, Quality::SMART);
    assert!(serde_json::from_str::<Quality>("1.5").is_err());
}
