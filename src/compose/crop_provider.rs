use std::fmt;
use std::str::FromStr;

use crate::foundation::core::{CropRect, PixelSize};
use crate::foundation::error::{CompositorError, CompositorResult};

/// Anything that can hand the compositor a crop rectangle in source pixels.
///
/// Interactive crop widgets sit behind this trait; only the resulting rectangle matters here.
pub trait CropProvider {
    /// Produce the crop rectangle for a source of `source` pixels.
    fn crop_rect(&self, source: PixelSize) -> CompositorResult<CropRect>;
}

/// A free-form rectangle chosen by the user, passed through unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreeformCrop {
    /// Rectangle in source pixel coordinates.
    pub rect: CropRect,
}

impl FreeformCrop {
    /// Wrap a rectangle.
    pub fn new(rect: CropRect) -> Self {
        Self { rect }
    }
}

impl CropProvider for FreeformCrop {
    fn crop_rect(&self, _source: PixelSize) -> CompositorResult<CropRect> {
        Ok(self.rect)
    }
}

/// Named aspect ratios offered by the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AspectPreset {
    /// Keep the source aspect ratio.
    Original,
    /// 1:1.
    Square,
    /// 4:5.
    Portrait,
    /// 16:9.
    Landscape,
    /// 9:16.
    Story,
}

impl AspectPreset {
    /// Every preset in menu order.
    pub const ALL: [AspectPreset; 5] = [
        AspectPreset::Original,
        AspectPreset::Square,
        AspectPreset::Portrait,
        AspectPreset::Landscape,
        AspectPreset::Story,
    ];

    /// Width / height, or `None` for [`AspectPreset::Original`].
    pub fn ratio(self) -> Option<f64> {
        match self {
            AspectPreset::Original => None,
            AspectPreset::Square => Some(1.0),
            AspectPreset::Portrait => Some(4.0 / 5.0),
            AspectPreset::Landscape => Some(16.0 / 9.0),
            AspectPreset::Story => Some(9.0 / 16.0),
        }
    }

    /// Lowercase identifier.
    pub fn name(self) -> &'static str {
        match self {
            AspectPreset::Original => "original",
            AspectPreset::Square => "square",
            AspectPreset::Portrait => "portrait",
            AspectPreset::Landscape => "landscape",
            AspectPreset::Story => "story",
        }
    }
}

impl fmt::Display for AspectPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AspectPreset {
    type Err = CompositorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let preset = match s.trim().to_ascii_lowercase().as_str() {
            "original" => AspectPreset::Original,
            "square" | "1:1" => AspectPreset::Square,
            "portrait" | "4:5" => AspectPreset::Portrait,
            "landscape" | "16:9" => AspectPreset::Landscape,
            "story" | "9:16" => AspectPreset::Story,
            other => {
                return Err(CompositorError::validation(format!(
                    "unknown aspect preset '{other}'"
                )));
            }
        };
        Ok(preset)
    }
}

/// Fixed-aspect crop sized to fit the source, then zoomed and panned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AspectCrop {
    /// Width / height; `None` keeps the source ratio.
    pub aspect: Option<f64>,
    /// Zoom factor in `1.0..=3.0`; the rectangle shrinks by this factor.
    pub zoom: f64,
    /// Horizontal and vertical pan in `[-1, 1]` as a fraction of the free space.
    pub pan: (f64, f64),
}

impl AspectCrop {
    /// Smallest accepted zoom.
    pub const MIN_ZOOM: f64 = 1.0;
    /// Largest accepted zoom.
    pub const MAX_ZOOM: f64 = 3.0;

    /// Centered, unzoomed crop of the given ratio.
    pub fn new(aspect: Option<f64>) -> Self {
        Self {
            aspect,
            zoom: Self::MIN_ZOOM,
            pan: (0.0, 0.0),
        }
    }

    /// Centered, unzoomed crop for a preset.
    pub fn preset(preset: AspectPreset) -> Self {
        Self::new(preset.ratio())
    }

    /// Same crop with a different zoom.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Same crop with a different pan.
    pub fn with_pan(mut self, x: f64, y: f64) -> Self {
        self.pan = (x, y);
        self
    }

    fn validate(&self) -> CompositorResult<()> {
        if let Some(r) = self.aspect
            && !(r.is_finite() && r > 0.0)
        {
            return Err(CompositorError::validation(format!(
                "aspect ratio must be finite and > 0, got {r}"
            )));
        }
        if !(Self::MIN_ZOOM..=Self::MAX_ZOOM).contains(&self.zoom) {
            return Err(CompositorError::validation(format!(
                "zoom must be in [{}, {}], got {}",
                Self::MIN_ZOOM,
                Self::MAX_ZOOM,
                self.zoom
            )));
        }
        let (px, py) = self.pan;
        if !(-1.0..=1.0).contains(&px) || !(-1.0..=1.0).contains(&py) {
            return Err(CompositorError::validation(format!(
                "pan must be in [-1, 1], got ({px}, {py})"
            )));
        }
        Ok(())
    }
}

impl CropProvider for AspectCrop {
    fn crop_rect(&self, source: PixelSize) -> CompositorResult<CropRect> {
        self.validate()?;
        if source.is_empty() {
            return Err(CompositorError::validation("cannot fit a crop into an empty source"));
        }
        let sw = f64::from(source.width);
        let sh = f64::from(source.height);
        let (mut w, mut h) = match self.aspect {
            None => (sw, sh),
            Some(ratio) if sw / sh > ratio => (sh * ratio, sh),
            Some(ratio) => (sw, sw / ratio),
        };
        w /= self.zoom;
        h /= self.zoom;

        let slack_x = (sw - w).max(0.0);
        let slack_y = (sh - h).max(0.0);
        let x = (slack_x * 0.5 * (1.0 + self.pan.0)).clamp(0.0, slack_x);
        let y = (slack_y * 0.5 * (1.0 + self.pan.1)).clamp(0.0, slack_y);
        Ok(CropRect::new(x, y, w, h))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/crop_provider.rs"]
mod tests;
