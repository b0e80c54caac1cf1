use super::*;

#[test]
fn visibility_ignores_blank_text() {
    assert!(WatermarkSpec::new("Pro", "Standard").is_visible());
    assert!(!WatermarkSpec::new("", "Standard").is_visible());
    assert!(!WatermarkSpec::new("  \t", "Standard").is_visible());
}

#[test]
fn watermark_deserializes_with_aliases_and_default_family() {
    let w: WatermarkSpec = serde_json::from_str(r#"{"text":"Pro","font":"Standard"}"#).unwrap();
    assert_eq!(w, WatermarkSpec::new("Pro", "Standard"));
    let w: WatermarkSpec = serde_json::from_str(r#"{"text":"Pro","fontFamily":"Serif"}"#).unwrap();
    assert_eq!(w.font_family, "Serif");
    let w: WatermarkSpec = serde_json::from_str(r#"{"text":"Pro"}"#).unwrap();
    assert_eq!(w.font_family, "sans-serif");
}

#[test]
fn proportional_size_tracks_shorter_side() {
    let style = WatermarkStyle::default();
    assert!((style.font_size_px(PixelSize::new(400, 300)) - 18.0).abs() < 1e-3);
    assert!((style.font_size_px(PixelSize::new(4000, 3000)) - 180.0).abs() < 1e-2);
    assert_eq!(style.font_size_px(PixelSize::new(40, 30)), 8.0);

    let fixed = WatermarkStyle {
        sizing: WatermarkSizing::Fixed { px: 24.0 },
        ..WatermarkStyle::default()
    };
    assert_eq!(fixed.font_size_px(PixelSize::new(40, 30)), 24.0);
    assert_eq!(fixed.font_size_px(PixelSize::new(4000, 3000)), 24.0);
}

#[test]
fn anchor_is_ten_percent_in_from_bottom_right() {
    let style = WatermarkStyle::default();
    let canvas = PixelSize::new(400, 300);
    let (ax, ay) = style.anchor(canvas);
    assert!((ax - 360.0).abs() < 1e-3);
    assert!((ay - 270.0).abs() < 1e-3);

    let (ox, oy) = style.text_origin(canvas, 30.0, 20.0);
    assert!((ox - 330.0).abs() < 1e-3);
    assert!((oy - 250.0).abs() < 1e-3);
}

#[test]
fn style_validation() {
    WatermarkStyle::default().validate().unwrap();
    let bad_inset = WatermarkStyle {
        inset: 0.7,
        ..WatermarkStyle::default()
    };
    assert!(bad_inset.validate().is_err());
    let bad_size = WatermarkStyle {
        sizing: WatermarkSizing::Fixed { px: f32::NAN },
        ..WatermarkStyle::default()
    };
    assert!(bad_size.validate().is_err());
    let bad_blur = WatermarkStyle {
        shadow_blur: -1.0,
        ..WatermarkStyle::default()
    };
    assert!(bad_blur.validate().is_err());
}

#[test]
fn style_deserializes_partial_config() {
    let s: WatermarkStyle =
        serde_json::from_str(r#"{"sizing":{"mode":"fixed","px":24.0},"inset":0.05}"#).unwrap();
    assert_eq!(s.sizing, WatermarkSizing::Fixed { px: 24.0 });
    assert_eq!(s.inset, 0.05);
    assert_eq!(s.fill_rgba, WatermarkStyle::default().fill_rgba);
}

#[test]
fn layer_region_pads_and_clips() {
    let canvas = PixelSize::new(400, 300);
    let region = layer_region(canvas, (330.0, 250.0), (30.0, 20.0), 1.5, 4.0).unwrap();
    assert_eq!(region.x, 326);
    assert_eq!(region.y, 246);
    assert_eq!(region.size, PixelSize::new(40, 30));

    let clipped = layer_region(canvas, (-50.0, 280.0), (500.0, 40.0), 2.0, 3.0).unwrap();
    assert_eq!((clipped.x, clipped.y), (0, 277));
    assert_eq!(clipped.size, PixelSize::new(400, 23));

    assert!(layer_region(canvas, (500.0, 10.0), (30.0, 20.0), 1.0, 2.0).is_none());
}

fn system_font() -> Option<ResolvedFont> {
    let book = crate::assets::fonts::FontBook::with_system_fonts();
    if book.is_empty() {
        eprintln!("skipping: no system fonts available");
        return None;
    }
    book.resolve("sans-serif").ok()
}

fn black_canvas(ledger: &Arc<SurfaceLedger>, size: PixelSize) -> Surface {
    let mut s = Surface::allocate(ledger, size).unwrap();
    for px in s.data_mut().chunks_exact_mut(4) {
        px[3] = 255;
    }
    s
}

/// Half-open bounds `(x0, y0, x1, y1)` of pixels lit by the white fill.
fn ink_bounds(s: &Surface) -> Option<(u32, u32, u32, u32)> {
    let size = s.size();
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (i, px) in s.data().chunks_exact(4).enumerate() {
        if px[0] <= 100 {
            continue;
        }
        let (x, y) = (i as u32 % size.width, i as u32 / size.width);
        bounds = Some(match bounds {
            None => (x, y, x + 1, y + 1),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
        });
    }
    bounds
}

fn render_text(text: &str, font: &ResolvedFont, size: PixelSize) -> Surface {
    let ledger = Arc::new(SurfaceLedger::default());
    let mut canvas = black_canvas(&ledger, size);
    draw_watermark(
        &mut canvas,
        &WatermarkSpec::new(text, "sans-serif"),
        &WatermarkStyle::default(),
        font,
        &ledger,
    )
    .unwrap();
    canvas
}

#[test]
fn rendered_ink_ends_at_the_anchor() {
    let Some(font) = system_font() else {
        return;
    };
    let canvas = render_text("Pro", &font, PixelSize::new(400, 300));
    let (x0, y0, x1, y1) = ink_bounds(&canvas).expect("watermark draws ink");
    assert!((354..=362).contains(&x1), "right edge {x1}");
    assert!((260..=271).contains(&y1), "bottom edge {y1}");
    assert!(x0 > 300 && y0 > 230, "ink starts at ({x0}, {y0})");
}

#[test]
fn rendered_ink_width_follows_the_text() {
    let Some(font) = system_font() else {
        return;
    };
    let size = PixelSize::new(400, 300);
    let (a0, _, a1, _) = ink_bounds(&render_text("W", &font, size)).unwrap();
    let (b0, _, b1, _) = ink_bounds(&render_text("WWWWWW", &font, size)).unwrap();
    let (one, six) = (a1 - a0, b1 - b0);
    assert!(six > 4 * one, "W spans {one}px, WWWWWW spans {six}px");
    assert!((354..=362).contains(&b1), "right edge {b1}");
}

#[test]
fn layers_cover_only_the_text_neighbourhood() {
    let Some(font) = system_font() else {
        return;
    };
    let ledger = Arc::new(SurfaceLedger::default());
    let size = PixelSize::new(3000, 2000);
    let mut canvas = black_canvas(&ledger, size);
    let canvas_bytes = size.rgba8_len().unwrap() as u64;
    draw_watermark(
        &mut canvas,
        &WatermarkSpec::new("Pro", "sans-serif"),
        &WatermarkStyle::default(),
        &font,
        &ledger,
    )
    .unwrap();
    let stats = ledger.stats();
    assert_eq!(stats.live_surfaces, 1);
    assert_eq!(stats.allocated_surfaces, 3);
    assert!(stats.allocated_bytes - canvas_bytes < canvas_bytes / 20);
    assert!(ink_bounds(&canvas).is_some());
}
