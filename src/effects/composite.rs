use crate::foundation::core::PixelSize;
use crate::foundation::error::{CompositorError, CompositorResult};

pub(crate) type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over on premultiplied pixels, with an extra opacity multiplier.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Sub-rectangle of a canvas, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Region {
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) size: PixelSize,
}

impl Region {
    fn check(&self, canvas: PixelSize, src_len: usize, bpp: usize) -> CompositorResult<()> {
        let inside = u64::from(self.x) + u64::from(self.size.width) <= u64::from(canvas.width)
            && u64::from(self.y) + u64::from(self.size.height) <= u64::from(canvas.height);
        if !inside || self.size.area().checked_mul(bpp) != Some(src_len) {
            return Err(CompositorError::Other(anyhow::anyhow!(
                "layer {self:?} does not fit canvas {}x{}",
                canvas.width,
                canvas.height
            )));
        }
        Ok(())
    }

    fn rows(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size.height as usize).map(|row| (row, self.y as usize + row))
    }
}

/// Composite a premultiplied RGBA8 layer of `region.size` over `dst` at the region's offset.
pub(crate) fn over_region(
    dst: &mut [u8],
    canvas: PixelSize,
    layer: &[u8],
    region: Region,
) -> CompositorResult<()> {
    region.check(canvas, layer.len(), 4)?;
    let row_bytes = region.size.width as usize * 4;
    let stride = canvas.width as usize * 4;
    for (row, y) in region.rows() {
        let d0 = y * stride + region.x as usize * 4;
        let dst_row = &mut dst[d0..d0 + row_bytes];
        let src_row = &layer[row * row_bytes..(row + 1) * row_bytes];
        for (d, s) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], 1.0);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

/// Paint straight `color` through an 8-bit coverage mask of `region.size` over `dst`.
pub(crate) fn mask_over_region(
    dst: &mut [u8],
    canvas: PixelSize,
    mask: &[u8],
    region: Region,
    color: [u8; 4],
) -> CompositorResult<()> {
    region.check(canvas, mask.len(), 1)?;
    let width = region.size.width as usize;
    let stride = canvas.width as usize * 4;
    let [r, g, b, a] = color;
    for (row, y) in region.rows() {
        let d0 = y * stride + region.x as usize * 4;
        let dst_row = &mut dst[d0..d0 + width * 4];
        let mask_row = &mask[row * width..(row + 1) * width];
        for (d, &m) in dst_row.chunks_exact_mut(4).zip(mask_row) {
            let sa = mul_div255(u16::from(m), u16::from(a));
            if sa == 0 {
                continue;
            }
            let src = [
                mul_div255(u16::from(r), u16::from(sa)),
                mul_div255(u16::from(g), u16::from(sa)),
                mul_div255(u16::from(b), u16::from(sa)),
                sa,
            ];
            let out = over([d[0], d[1], d[2], d[3]], src, 1.0);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

/// Composite premultiplied RGBA8 over an opaque background, dropping alpha.
///
/// Returns tightly packed RGB8.
pub(crate) fn flatten_to_rgb8(premul: &[u8], background: [u8; 3]) -> Vec<u8> {
    let mut out = Vec::with_capacity(premul.len() / 4 * 3);
    for px in premul.chunks_exact(4) {
        let inv = 255u16 - u16::from(px[3]);
        for i in 0..3 {
            let bg = mul_div255(u16::from(background[i]), inv);
            out.push(px[i].saturating_add(bg));
        }
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
