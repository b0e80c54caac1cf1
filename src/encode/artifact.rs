use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

use crate::foundation::core::{PixelSize, Quality};
use crate::foundation::error::CompositorResult;

/// Final export artifact: owned JPEG bytes plus metadata.
///
/// Never retained by the compositor; the caller owns it after return.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    size: PixelSize,
    quality_percent: u8,
    created_at_ms: u64,
}

impl EncodedImage {
    pub(crate) fn new(bytes: Vec<u8>, size: PixelSize, quality: Quality) -> Self {
        let created_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            bytes,
            size,
            quality_percent: quality.jpeg_scale(),
            created_at_ms,
        }
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take ownership of the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Pixel dimensions of the encoded raster.
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// JPEG quality on the `1..=100` scale used for encoding.
    pub fn quality_percent(&self) -> u8 {
        self.quality_percent
    }

    /// Milliseconds since the Unix epoch at which the artifact was encoded.
    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    /// MIME type of [`EncodedImage::bytes`].
    pub fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }

    /// xxh3 digest of the encoded bytes.
    pub fn fingerprint(&self) -> u64 {
        xxhash_rust::xxh3::xxh3_64(&self.bytes)
    }

    /// Download-friendly name, e.g. `photo-1718000000000-1a2b3c4d.jpg`.
    pub fn suggested_file_name(&self) -> String {
        format!(
            "photo-{}-{:08x}.jpg",
            self.created_at_ms,
            self.fingerprint() as u32
        )
    }

    /// Write the bytes to `path`, creating parent directories. If `path` is an existing
    /// directory, [`EncodedImage::suggested_file_name`] is used inside it.
    pub fn write_to(&self, path: impl AsRef<Path>) -> CompositorResult<PathBuf> {
        let path = path.as_ref();
        let target = if path.is_dir() {
            path.join(self.suggested_file_name())
        } else {
            path.to_path_buf()
        };
        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(&target, &self.bytes)
            .with_context(|| format!("write jpeg '{}'", target.display()))?;
        Ok(target)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/artifact.rs"]
mod tests;
