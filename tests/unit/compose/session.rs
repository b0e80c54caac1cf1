use super::*;
use crate::effects::filter::FilterOp;

#[test]
fn parses_full_session_json() {
    let s = EditSession::from_json_str(
        r#"{
            "crop": {"x": 10, "y": 20, "width": 300.5, "height": 200},
            "filter": "grayscale(100%) brightness(1.2)",
            "watermark": {"text": "Pro", "font": "Georgia"},
            "quality": 0.9
        }"#,
    )
    .unwrap();
    assert_eq!(*s.crop(), CropRect::new(10.0, 20.0, 300.5, 200.0));
    assert_eq!(
        s.filter().unwrap().ops(),
        &[FilterOp::Grayscale(1.0), FilterOp::Brightness(1.2)]
    );
    let wm = s.watermark().unwrap();
    assert_eq!(wm.text, "Pro");
    assert_eq!(wm.font_family, "Georgia");
    assert_eq!(s.quality().get(), 0.9);
}

#[test]
fn quality_defaults_and_smart_compression() {
    let plain =
        EditSession::from_json_str(r#"{"crop": {"x": 0, "y": 0, "width": 1, "height": 1}}"#)
            .unwrap();
    assert_eq!(plain.quality(), Quality::MAX);
    assert!(plain.filter().is_none());
    assert!(plain.watermark().is_none());

    let smart = EditSession::from_json_str(
        r#"{"crop": {"x": 0, "y": 0, "width": 1, "height": 1}, "smart_compression": true}"#,
    )
    .unwrap();
    assert_eq!(smart.quality(), Quality::SMART);
}

#[test]
fn rejects_bad_sessions() {
    for json in [
        r#"{"crop": {"x": 0, "y": 0, "width": 1, "height": 1}, "quality": 1.5}"#,
        r#"{"crop": {"x": 0, "y": 0, "width": 1, "height": 1}, "quality": 0.5, "smart_compression": true}"#,
        r#"{"crop": {"x": 0, "y": 0, "width": 1, "height": 1}, "filter": "blur(3px)"}"#,
        r#"{"crop": {"x": 0, "y": 0, "width": 1, "height": 1}, "extra": 1}"#,
        r#"{"filter": "none"}"#,
        "not json",
    ] {
        let err = EditSession::from_json_str(json).unwrap_err();
        assert!(
            matches!(err, CompositorError::Validation(_)),
            "{json}: {err}"
        );
    }
}

#[test]
fn blank_watermark_and_identity_filter_are_dropped() {
    let s = EditSession::new(
        CropRect::new(0.0, 0.0, 2.0, 2.0),
        Some(FilterSpec::identity()),
        Some(WatermarkSpec::new("   ", "sans-serif")),
        Quality::MAX,
    );
    assert!(s.filter().is_none());
    assert!(s.watermark().is_none());
}

#[test]
fn serializes_back_to_loadable_json() {
    let s = EditSession::crop_only(CropRect::new(1.0, 2.0, 3.0, 4.0))
        .with_filter(FilterSpec::preset("sepia"))
        .with_quality(Quality::SMART);
    let json = serde_json::to_string(&s).unwrap();
    assert_eq!(EditSession::from_json_str(&json).unwrap(), s);
}

#[test]
fn from_path_reports_missing_file() {
    let err = EditSession::from_path("target/does-not-exist/session.json").unwrap_err();
    assert!(matches!(err, CompositorError::Validation(_)));
}
