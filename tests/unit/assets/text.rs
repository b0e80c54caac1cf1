use std::sync::Arc;

use usvg::fontdb;

use super::*;
use crate::assets::fonts::FontBook;

const WHITE: TextBrushRgba8 = TextBrushRgba8 {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

fn system_sans() -> Option<ResolvedFont> {
    let book = FontBook::with_system_fonts();
    if book.is_empty() {
        eprintln!("skipping: no system fonts available");
        return None;
    }
    book.resolve("sans-serif").ok()
}

fn glyph_runs(
    layout: &parley::Layout<TextBrushRgba8>,
) -> Vec<parley::layout::GlyphRun<'_, TextBrushRgba8>> {
    layout
        .lines()
        .flat_map(|line| {
            line.items().filter_map(|item| match item {
                parley::layout::PositionedLayoutItem::GlyphRun(run) => Some(run),
                _ => None,
            })
        })
        .collect()
}

#[test]
fn rejects_bad_size_and_unusable_bytes() {
    let junk = ResolvedFont {
        family: "Junk".to_string(),
        bytes: Arc::new(b"not a font".to_vec()),
        index: 0,
        exact: true,
    };
    let mut engine = TextLayoutEngine::new();
    let err = engine.layout_line("Pro", &junk, 0.0, WHITE).err().unwrap();
    assert!(matches!(err, CompositorError::Validation(_)));
    let err = engine.layout_line("Pro", &junk, 12.0, WHITE).err().unwrap();
    assert!(matches!(err, CompositorError::FontUnavailable(_)));
}

#[test]
fn glyphs_advance_along_the_line() {
    let Some(font) = system_sans() else {
        return;
    };
    let mut engine = TextLayoutEngine::new();
    let layout = engine.layout_line("WWWW", &font, 20.0, WHITE).unwrap();
    let xs: Vec<f32> = glyph_runs(&layout)
        .iter()
        .flat_map(|run| run.positioned_glyphs().map(|g| g.x).collect::<Vec<_>>())
        .collect();
    assert_eq!(xs.len(), 4);
    for pair in xs.windows(2) {
        assert!(pair[1] - pair[0] > 5.0, "{xs:?}");
    }
    assert!(layout.width() > xs[3]);
}

#[test]
fn collection_faces_shape_with_the_resolved_index() {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let Some(face) = db.faces().find(|f| f.index > 0) else {
        eprintln!("skipping: no font collection installed");
        return;
    };
    let family = face
        .families
        .first()
        .map(|(name, _)| name.clone())
        .unwrap_or_default();
    let Some((bytes, index)) = db.with_face_data(face.id, |data, index| (data.to_vec(), index))
    else {
        return;
    };
    let font = ResolvedFont {
        family,
        bytes: Arc::new(bytes),
        index,
        exact: true,
    };

    let mut engine = TextLayoutEngine::new();
    let layout = engine.layout_line("Pro", &font, 16.0, WHITE).unwrap();
    let runs = glyph_runs(&layout);
    let first = runs.first().expect("layout has a glyph run");
    assert_eq!(first.run().font().index, index);
}
