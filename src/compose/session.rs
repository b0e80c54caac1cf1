use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::effects::filter::FilterSpec;
use crate::foundation::core::{CropRect, Quality};
use crate::foundation::error::{CompositorError, CompositorResult};
use crate::render::watermark::WatermarkSpec;

/// One export request: crop, optional filter, optional watermark and quality.
///
/// Immutable once built. The compositor reads it and never keeps it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "SessionDef", into = "SessionDef")]
pub struct EditSession {
    crop: CropRect,
    filter: Option<FilterSpec>,
    watermark: Option<WatermarkSpec>,
    quality: Quality,
}

/// JSON-facing shape of an [`EditSession`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionDef {
    crop: CropRect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<FilterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    watermark: Option<WatermarkSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quality: Option<Quality>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    smart_compression: bool,
}

impl TryFrom<SessionDef> for EditSession {
    type Error = CompositorError;

    fn try_from(def: SessionDef) -> Result<Self, Self::Error> {
        let quality = match (def.quality, def.smart_compression) {
            (Some(_), true) => {
                return Err(CompositorError::validation(
                    "session sets both 'quality' and 'smart_compression'",
                ));
            }
            (Some(q), false) => q,
            (None, true) => Quality::SMART,
            (None, false) => Quality::MAX,
        };
        Ok(Self::new(def.crop, def.filter, def.watermark, quality))
    }
}

impl From<EditSession> for SessionDef {
    fn from(s: EditSession) -> Self {
        Self {
            crop: s.crop,
            filter: s.filter,
            watermark: s.watermark,
            quality: Some(s.quality),
            smart_compression: false,
        }
    }
}

impl EditSession {
    /// Build a session. Identity filters and blank watermarks are normalized to `None`.
    pub fn new(
        crop: CropRect,
        filter: Option<FilterSpec>,
        watermark: Option<WatermarkSpec>,
        quality: Quality,
    ) -> Self {
        Self {
            crop,
            filter: filter.filter(|f| !f.is_identity()),
            watermark: watermark.filter(WatermarkSpec::is_visible),
            quality,
        }
    }

    /// Crop only, full quality.
    pub fn crop_only(crop: CropRect) -> Self {
        Self::new(crop, None, None, Quality::MAX)
    }

    /// Parse a session from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> CompositorResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| CompositorError::validation(format!("parse edit session JSON: {e}")))
    }

    /// Parse a session from a JSON string.
    pub fn from_json_str(s: &str) -> CompositorResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| CompositorError::validation(format!("parse edit session JSON: {e}")))
    }

    /// Parse a session from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CompositorResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CompositorError::validation(format!("open edit session '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Same session with a different crop.
    pub fn with_crop(mut self, crop: CropRect) -> Self {
        self.crop = crop;
        self
    }

    /// Same session with a different filter.
    pub fn with_filter(mut self, filter: Option<FilterSpec>) -> Self {
        self.filter = filter.filter(|f| !f.is_identity());
        self
    }

    /// Same session with a different watermark.
    pub fn with_watermark(mut self, watermark: Option<WatermarkSpec>) -> Self {
        self.watermark = watermark.filter(WatermarkSpec::is_visible);
        self
    }

    /// Same session with a different quality.
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Crop rectangle in source pixels.
    pub fn crop(&self) -> &CropRect {
        &self.crop
    }

    /// Filter applied to the cropped pixels, if any.
    pub fn filter(&self) -> Option<&FilterSpec> {
        self.filter.as_ref()
    }

    /// Watermark overlay, if any.
    pub fn watermark(&self) -> Option<&WatermarkSpec> {
        self.watermark.as_ref()
    }

    /// Encoding quality.
    pub fn quality(&self) -> Quality {
        self.quality
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/session.rs"]
mod tests;
