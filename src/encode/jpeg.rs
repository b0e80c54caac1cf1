use std::io::Cursor;

use crate::effects::composite::flatten_to_rgb8;
use crate::foundation::core::{PixelSize, Quality};
use crate::foundation::error::{CompositorError, CompositorResult};

/// Background used where the surface is not fully opaque; JPEG has no alpha channel.
pub(crate) const FLATTEN_BACKGROUND: [u8; 3] = [0, 0, 0];

/// Encode a premultiplied RGBA8 raster as baseline JPEG.
pub(crate) fn encode_jpeg(
    rgba8_premul: &[u8],
    size: PixelSize,
    quality: Quality,
) -> CompositorResult<Vec<u8>> {
    if size.is_empty() {
        return Err(CompositorError::encode("cannot encode a zero-sized surface"));
    }
    if size.rgba8_len() != Some(rgba8_premul.len()) {
        return Err(CompositorError::encode("surface byte length mismatch"));
    }

    let rgb = flatten_to_rgb8(rgba8_premul, FLATTEN_BACKGROUND);
    let mut buf = Vec::new();
    let mut enc =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality.jpeg_scale());
    enc.encode(&rgb, size.width, size.height, image::ExtendedColorType::Rgb8)
        .map_err(|e| CompositorError::encode(format!("jpeg encoder failed: {e}")))?;

    if buf.is_empty() {
        return Err(CompositorError::encode("jpeg encoder produced no output"));
    }
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/jpeg.rs"]
mod tests;
