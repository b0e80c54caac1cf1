use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CompositorError::invalid_crop("x")
            .to_string()
            .contains("invalid crop:")
    );
    assert!(
        CompositorError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        CompositorError::source_unavailable("x")
            .to_string()
            .contains("source unavailable:")
    );
    assert!(
        CompositorError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        CompositorError::font_unavailable("x")
            .to_string()
            .contains("font unavailable:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CompositorError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
