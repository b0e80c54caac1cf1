use crate::assets::decode::DecodedImage;
use crate::foundation::core::CropRect;
use crate::foundation::error::{CompositorError, CompositorResult};
use crate::render::surface::Surface;

/// Copy the crop region of `src` into `dst` at origin `(0, 0)`.
///
/// Grid-aligned crops whose size equals the surface are copied row by row. Anything else is
/// bilinearly resampled at output pixel centers, clamping taps to the source edges.
pub(crate) fn draw_crop(src: &DecodedImage, crop: &CropRect, dst: &mut Surface) -> CompositorResult<()> {
    let out = dst.size();
    let src_size = src.size();
    let src_px = src.rgba8_premul();
    if src_size.rgba8_len() != Some(src_px.len()) {
        return Err(CompositorError::Other(anyhow::anyhow!(
            "source pixel buffer holds {} bytes, expected {}x{} rgba8",
            src_px.len(),
            src_size.width,
            src_size.height
        )));
    }

    let exact = crop.is_pixel_aligned()
        && crop.width == f64::from(out.width)
        && crop.height == f64::from(out.height);
    if exact {
        copy_rows(src_px, src_size.width, crop, dst);
    } else {
        resample_bilinear(src_px, src_size.width, src_size.height, crop, dst);
    }
    Ok(())
}

fn copy_rows(src: &[u8], src_w: u32, crop: &CropRect, dst: &mut Surface) {
    let out = dst.size();
    let row_bytes = out.width as usize * 4;
    let (x0, y0) = (crop.x as usize, crop.y as usize);
    let stride = src_w as usize * 4;
    let dst_px = dst.data_mut();
    for row in 0..out.height as usize {
        let s = (y0 + row) * stride + x0 * 4;
        let d = row * row_bytes;
        dst_px[d..d + row_bytes].copy_from_slice(&src[s..s + row_bytes]);
    }
}

fn resample_bilinear(src: &[u8], src_w: u32, src_h: u32, crop: &CropRect, dst: &mut Surface) {
    let out = dst.size();
    let sx = crop.width / f64::from(out.width);
    let sy = crop.height / f64::from(out.height);
    let max_x = f64::from(src_w - 1);
    let max_y = f64::from(src_h - 1);
    let stride = src_w as usize * 4;
    let dst_px = dst.data_mut();

    for oy in 0..out.height as usize {
        let fy = (crop.y + (oy as f64 + 0.5) * sy - 0.5).clamp(0.0, max_y);
        let y0 = fy.floor() as usize;
        let y1 = (y0 + 1).min(src_h as usize - 1);
        let ty = fy - y0 as f64;
        for ox in 0..out.width as usize {
            let fx = (crop.x + (ox as f64 + 0.5) * sx - 0.5).clamp(0.0, max_x);
            let x0 = fx.floor() as usize;
            let x1 = (x0 + 1).min(src_w as usize - 1);
            let tx = fx - x0 as f64;

            let p00 = y0 * stride + x0 * 4;
            let p10 = y0 * stride + x1 * 4;
            let p01 = y1 * stride + x0 * 4;
            let p11 = y1 * stride + x1 * 4;
            let d = (oy * out.width as usize + ox) * 4;
            for c in 0..4 {
                let top = f64::from(src[p00 + c]) * (1.0 - tx) + f64::from(src[p10 + c]) * tx;
                let bottom = f64::from(src[p01 + c]) * (1.0 - tx) + f64::from(src[p11 + c]) * tx;
                dst_px[d + c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/crop.rs"]
mod tests;
