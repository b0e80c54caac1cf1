use std::borrow::Cow;

use parley::fontique::{Blob, FamilyId, FontInfo};
use parley::style::{FontStack, StyleProperty};

use crate::assets::fonts::ResolvedFont;
use crate::foundation::error::{CompositorError, CompositorResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Shapes watermark text with exactly the face a [`ResolvedFont`] points at.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Lay out `text` as one unwrapped line at `size_px`.
    ///
    /// Font files can be collections; the family and face used for shaping are the ones at
    /// `font.index`, matching what the rasterizer draws.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        font: &ResolvedFont,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> CompositorResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CompositorError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let registered = self
            .font_ctx
            .collection
            .register_fonts(Blob::from(font.bytes.as_ref().clone()), None);
        let (family_id, face) = self.select_face(&registered, font).ok_or_else(|| {
            CompositorError::font_unavailable(format!(
                "font data for '{}' holds no usable face",
                font.family
            ))
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CompositorError::font_unavailable("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(StyleProperty::FontStack(FontStack::Source(Cow::Owned(
            family_name,
        ))));
        if let Some(face) = face {
            builder.push_default(StyleProperty::FontWeight(face.weight()));
            builder.push_default(StyleProperty::FontStyle(face.style()));
        }
        builder.push_default(StyleProperty::FontSize(size_px));
        builder.push_default(StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Family holding the face at `font.index`, else the family named like the resolved font,
    /// else the first registered family.
    fn select_face(
        &mut self,
        registered: &[(FamilyId, Vec<FontInfo>)],
        font: &ResolvedFont,
    ) -> Option<(FamilyId, Option<FontInfo>)> {
        let by_index = registered.iter().find_map(|(id, faces)| {
            faces
                .iter()
                .find(|f| f.index() == font.index)
                .map(|f| (*id, Some(f.clone())))
        });
        by_index
            .or_else(|| {
                registered
                    .iter()
                    .find(|(id, _)| {
                        self.font_ctx
                            .collection
                            .family_name(*id)
                            .is_some_and(|n| n.eq_ignore_ascii_case(&font.family))
                    })
                    .map(|(id, _)| (*id, None))
            })
            .or_else(|| registered.first().map(|(id, _)| (*id, None)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
