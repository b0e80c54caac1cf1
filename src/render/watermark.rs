use std::sync::Arc;

use crate::assets::fonts::ResolvedFont;
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine};
use crate::effects::blur::blur_mask;
use crate::effects::composite::{Region, mask_over_region, over_region};
use crate::foundation::core::{Affine, PixelSize};
use crate::foundation::error::{CompositorError, CompositorResult};
use crate::render::surface::{Surface, SurfaceLedger};

fn default_font_family() -> String {
    "sans-serif".to_string()
}

/// Text overlay request: what to write and in which font family.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WatermarkSpec {
    /// Overlay text. Blank text means no overlay.
    pub text: String,
    /// Requested font family; unknown families fall back to sans-serif.
    #[serde(default = "default_font_family", alias = "font", alias = "fontFamily")]
    pub font_family: String,
}

impl WatermarkSpec {
    /// A watermark writing `text` in `font_family`.
    pub fn new(text: impl Into<String>, font_family: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_family: font_family.into(),
        }
    }

    /// `false` for empty or whitespace-only text.
    pub fn is_visible(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// How the watermark font size is chosen.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WatermarkSizing {
    /// A fraction of the shorter canvas side, never below `min_px`.
    Proportional {
        /// Fraction of `min(width, height)`.
        fraction: f32,
        /// Lower bound in pixels.
        min_px: f32,
    },
    /// A fixed pixel size regardless of the canvas.
    Fixed {
        /// Font size in pixels.
        px: f32,
    },
}

/// Visual parameters of the watermark overlay.
///
/// Offsets and blur are expressed relative to the font size so the overlay keeps its look across
/// crop sizes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WatermarkStyle {
    /// Font size policy.
    pub sizing: WatermarkSizing,
    /// Inset of the text box's bottom-right corner from the right and bottom edges, as a fraction
    /// of the canvas extent.
    pub inset: f32,
    /// Straight RGBA fill color.
    pub fill_rgba: [u8; 4],
    /// Straight RGBA shadow color.
    pub shadow_rgba: [u8; 4],
    /// Shadow offset (down and right) as a fraction of the font size.
    pub shadow_offset: f32,
    /// Shadow blur radius as a fraction of the font size.
    pub shadow_blur: f32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            sizing: WatermarkSizing::Proportional {
                fraction: 0.06,
                min_px: 8.0,
            },
            inset: 0.1,
            fill_rgba: [255, 255, 255, 179],
            shadow_rgba: [0, 0, 0, 153],
            shadow_offset: 0.08,
            shadow_blur: 0.15,
        }
    }
}

impl WatermarkStyle {
    /// Reject non-finite or out-of-range parameters.
    pub fn validate(&self) -> CompositorResult<()> {
        let (a, b) = match self.sizing {
            WatermarkSizing::Proportional { fraction, min_px } => (fraction, min_px),
            WatermarkSizing::Fixed { px } => (px, px),
        };
        if !(a.is_finite() && b.is_finite() && a > 0.0 && b > 0.0) {
            return Err(CompositorError::validation(
                "watermark sizing values must be finite and > 0",
            ));
        }
        if !self.inset.is_finite() || !(0.0..0.5).contains(&self.inset) {
            return Err(CompositorError::validation(
                "watermark inset must be in [0, 0.5)",
            ));
        }
        for v in [self.shadow_offset, self.shadow_blur] {
            if !v.is_finite() || v < 0.0 {
                return Err(CompositorError::validation(
                    "watermark shadow parameters must be finite and >= 0",
                ));
            }
        }
        Ok(())
    }

    /// Font size in pixels for a canvas of `canvas`.
    pub fn font_size_px(&self, canvas: PixelSize) -> f32 {
        match self.sizing {
            WatermarkSizing::Proportional { fraction, min_px } => {
                let short = canvas.width.min(canvas.height) as f32;
                (short * fraction).max(min_px)
            }
            WatermarkSizing::Fixed { px } => px,
        }
    }

    /// Point the text box's bottom-right corner is pinned to.
    pub fn anchor(&self, canvas: PixelSize) -> (f64, f64) {
        let keep = 1.0 - f64::from(self.inset);
        (
            f64::from(canvas.width) * keep,
            f64::from(canvas.height) * keep,
        )
    }

    /// Top-left corner of a `text_w x text_h` box anchored at [`WatermarkStyle::anchor`].
    pub fn text_origin(&self, canvas: PixelSize, text_w: f64, text_h: f64) -> (f64, f64) {
        let (ax, ay) = self.anchor(canvas);
        (ax - text_w, ay - text_h)
    }
}

/// Canvas area a watermark can touch: the text box grown by the shadow shift on the bottom-right
/// and by `pad` on every side, clipped to the canvas. `None` when nothing is visible.
pub(crate) fn layer_region(
    canvas: PixelSize,
    origin: (f64, f64),
    text: (f64, f64),
    shift: f64,
    pad: f64,
) -> Option<Region> {
    let x0 = (origin.0 - pad).floor().max(0.0);
    let y0 = (origin.1 - pad).floor().max(0.0);
    let x1 = (origin.0 + text.0 + shift + pad)
        .ceil()
        .min(f64::from(canvas.width));
    let y1 = (origin.1 + text.1 + shift + pad)
        .ceil()
        .min(f64::from(canvas.height));
    if !(x1 > x0 && y1 > y0) {
        return None;
    }
    Some(Region {
        x: x0 as u32,
        y: y0 as u32,
        size: PixelSize::new((x1 - x0) as u32, (y1 - y0) as u32),
    })
}

/// Composite the watermark (shadow first, then fill) over the surface's pixels.
///
/// Only the text's neighbourhood is rasterized and blurred; the rest of the canvas is untouched.
pub(crate) fn draw_watermark(
    dst: &mut Surface,
    spec: &WatermarkSpec,
    style: &WatermarkStyle,
    font: &ResolvedFont,
    ledger: &Arc<SurfaceLedger>,
) -> CompositorResult<()> {
    let canvas = dst.size();
    let font_px = style.font_size_px(canvas);
    let [r, g, b, a] = style.fill_rgba;
    let brush = TextBrushRgba8 { r, g, b, a };

    let mut engine = TextLayoutEngine::new();
    let layout = engine.layout_line(spec.text.trim(), font, font_px, brush)?;
    let text = (f64::from(layout.width()), f64::from(layout.height()));
    let (ox, oy) = style.text_origin(canvas, text.0, text.1);

    let shift = f64::from(style.shadow_offset * font_px);
    let radius = (style.shadow_blur * font_px).ceil() as u32;
    let pad = f64::from(radius) + (f64::from(font_px) * 0.25).ceil() + 1.0;
    let Some(region) = layer_region(canvas, (ox, oy), text, shift, pad) else {
        tracing::debug!(origin_x = ox, origin_y = oy, "watermark falls outside the canvas");
        return Ok(());
    };
    tracing::debug!(
        font = %font.family,
        font_px,
        origin_x = ox,
        origin_y = oy,
        layer_w = region.size.width,
        layer_h = region.size.height,
        "draw watermark"
    );

    let font_data = vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
        font.index,
    );
    let (lx, ly) = (ox - f64::from(region.x), oy - f64::from(region.y));

    let coverage = rasterize_glyphs(
        &layout,
        &font_data,
        Affine::translate((lx + shift, ly + shift)),
        Some([255, 255, 255, 255]),
        region.size,
        ledger,
    )?;
    let mask: Vec<u8> = coverage.data().chunks_exact(4).map(|px| px[3]).collect();
    drop(coverage);
    let shadow = blur_mask(&mask, region.size, radius)?;
    mask_over_region(dst.data_mut(), canvas, &shadow, region, style.shadow_rgba)?;

    let fill = rasterize_glyphs(
        &layout,
        &font_data,
        Affine::translate((lx, ly)),
        None,
        region.size,
        ledger,
    )?;
    over_region(dst.data_mut(), canvas, fill.data(), region)
}

/// Rasterize a layout into a fresh transparent layer of `size`. `paint` overrides the per-run
/// brush.
fn rasterize_glyphs(
    layout: &parley::Layout<TextBrushRgba8>,
    font: &vello_cpu::peniko::FontData,
    transform: Affine,
    paint: Option<[u8; 4]>,
    size: PixelSize,
    ledger: &Arc<SurfaceLedger>,
) -> CompositorResult<Surface> {
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| CompositorError::encode("watermark layer width exceeds u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| CompositorError::encode("watermark layer height exceeds u16"))?;

    let mut layer = Surface::allocate(ledger, size)?;
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(affine_to_cpu(transform));

    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let [r, g, b, a] = paint.unwrap_or_else(|| {
                let brush = run.style().brush;
                [brush.r, brush.g, brush.b, brush.a]
            });
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }

    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    layer
        .data_mut()
        .copy_from_slice(pixmap.data_as_u8_slice());
    Ok(layer)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/watermark.rs"]
mod tests;
