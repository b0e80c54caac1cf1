use super::*;

#[test]
fn empty_book_reports_font_unavailable() {
    let book = FontBook::empty();
    assert!(book.is_empty());
    let err = book.resolve("Standard").unwrap_err();
    assert!(matches!(err, CompositorError::FontUnavailable(_)));
}

#[test]
fn garbage_font_data_is_ignored() {
    let mut book = FontBook::empty();
    book.load_font_data(b"definitely not a font".to_vec());
    assert_eq!(book.face_count(), 0);
    assert!(book.resolve("anything").is_err());
}

#[test]
fn unknown_family_falls_back_when_any_face_exists() {
    let book = FontBook::with_system_fonts();
    if book.is_empty() {
        return;
    }
    let font = book
        .resolve("No Such Family Name For Galleria Tests")
        .unwrap();
    assert!(!font.exact);
    assert!(!font.bytes.is_empty());
}
