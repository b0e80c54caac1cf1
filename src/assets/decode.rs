use std::path::Path;
use std::sync::{Arc, OnceLock};

use anyhow::Context;

use crate::foundation::core::PixelSize;
use crate::foundation::error::{CompositorError, CompositorResult};

/// Decoded raster in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub(crate) size: PixelSize,
    /// Row-major premultiplied RGBA8.
    pub(crate) rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Pixel dimensions.
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Borrow the premultiplied RGBA8 bytes.
    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }
}

/// Source image handle with an explicit pending -> decoded lifecycle.
///
/// Sources are created pending (only the encoded bytes are held) and become usable by the
/// compositor once [`SourceImage::decode`] has succeeded. The decoded pixels are never mutated.
#[derive(Debug)]
pub struct SourceImage {
    label: String,
    encoded: Arc<[u8]>,
    decoded: OnceLock<Arc<DecodedImage>>,
}

impl SourceImage {
    /// Pending source over encoded image bytes (PNG, JPEG, ...).
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            label: "<memory>".to_string(),
            encoded: Arc::from(bytes.into()),
            decoded: OnceLock::new(),
        }
    }

    /// Pending source read from a file on disk.
    pub fn open(path: impl AsRef<Path>) -> CompositorResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read source image '{}'", path.display()))?;
        let mut src = Self::from_bytes(bytes);
        src.label = path.display().to_string();
        Ok(src)
    }

    /// Already-decoded source from straight (non-premultiplied) RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> CompositorResult<Self> {
        let size = PixelSize::new(width, height);
        if size.is_empty() {
            return Err(CompositorError::validation("source image must be non-empty"));
        }
        if size.rgba8_len() != Some(rgba.len()) {
            return Err(CompositorError::validation(format!(
                "rgba buffer length {} does not match {width}x{height}",
                rgba.len()
            )));
        }
        let mut rgba8_premul = rgba;
        premultiply_rgba8_in_place(&mut rgba8_premul);
        let decoded = OnceLock::new();
        let _ = decoded.set(Arc::new(DecodedImage {
            size,
            rgba8_premul: Arc::new(rgba8_premul),
        }));
        Ok(Self {
            label: "<rgba8>".to_string(),
            encoded: Arc::from(Vec::new()),
            decoded,
        })
    }

    /// Convenience: build from encoded bytes and decode immediately.
    pub fn decoded_from_bytes(bytes: impl Into<Vec<u8>>) -> CompositorResult<Self> {
        let src = Self::from_bytes(bytes);
        src.decode()?;
        Ok(src)
    }

    /// Decode the held bytes. Idempotent; a failure leaves the source pending.
    pub fn decode(&self) -> CompositorResult<PixelSize> {
        if let Some(d) = self.decoded.get() {
            return Ok(d.size);
        }
        let decoded = decode_image(&self.encoded)
            .with_context(|| format!("decode source '{}'", self.label))
            .map_err(CompositorError::from)?;
        let size = decoded.size;
        let _ = self.decoded.set(Arc::new(decoded));
        Ok(size)
    }

    /// `true` once pixels are available.
    pub fn is_decoded(&self) -> bool {
        self.decoded.get().is_some()
    }

    /// Decoded pixel dimensions, if available.
    pub fn size(&self) -> Option<PixelSize> {
        self.decoded.get().map(|d| d.size)
    }

    /// Human-readable origin (path or kind).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Decoded pixels, or [`CompositorError::SourceUnavailable`] while still pending.
    pub fn pixels(&self) -> CompositorResult<&DecodedImage> {
        self.decoded.get().map(Arc::as_ref).ok_or_else(|| {
            CompositorError::source_unavailable(format!(
                "source '{}' has not been decoded",
                self.label
            ))
        })
    }
}

/// Decode encoded image bytes into premultiplied RGBA8.
pub(crate) fn decode_image(bytes: &[u8]) -> anyhow::Result<DecodedImage> {
    if bytes.is_empty() {
        anyhow::bail!("image bytes are empty");
    }
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        size: PixelSize::new(width, height),
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
