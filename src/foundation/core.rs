use crate::foundation::error::{CompositorError, CompositorResult};

pub(crate) use kurbo::Affine;

/// Slack allowed when comparing crop edges against the source bounds.
///
/// Crop widgets derive rectangles from floating-point gesture math; an edge that lands a few ulps
/// past the border is still "on" the border.
const BOUNDS_EPSILON: f64 = 1e-6;

/// Integer raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Construct a size from width and height.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered.
    pub fn area(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Byte length of an RGBA8 buffer of this size, or `None` on overflow.
    pub fn rgba8_len(self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(4))
    }
}

/// Crop rectangle in source-image pixel coordinates (not display coordinates).
///
/// Values may be fractional; the output raster is `round_half_up(width) x round_half_up(height)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, must be > 0.
    pub width: f64,
    /// Height, must be > 0.
    pub height: f64,
}

impl CropRect {
    /// Construct a rectangle without validating it.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering an entire source of `size`.
    pub fn full(size: PixelSize) -> Self {
        Self::new(0.0, 0.0, f64::from(size.width), f64::from(size.height))
    }

    /// Check the rectangle against the true decoded source dimensions.
    ///
    /// Rejects non-finite values, non-positive extents, and any part lying outside the source.
    /// Nothing is clamped.
    pub fn validate_within(&self, source: PixelSize) -> CompositorResult<()> {
        let Self {
            x,
            y,
            width,
            height,
        } = *self;
        if ![x, y, width, height].iter().all(|v| v.is_finite()) {
            return Err(CompositorError::invalid_crop(format!(
                "crop values must be finite, got {self:?}"
            )));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(CompositorError::invalid_crop(format!(
                "crop width and height must be > 0, got {width}x{height}"
            )));
        }
        if x < 0.0 || y < 0.0 {
            return Err(CompositorError::invalid_crop(format!(
                "crop origin must be >= 0, got ({x}, {y})"
            )));
        }
        let sw = f64::from(source.width);
        let sh = f64::from(source.height);
        if x + width > sw + BOUNDS_EPSILON || y + height > sh + BOUNDS_EPSILON {
            return Err(CompositorError::invalid_crop(format!(
                "crop ({x}, {y}, {width}x{height}) exceeds source bounds {}x{}",
                source.width, source.height
            )));
        }
        Ok(())
    }

    /// Output raster size: each extent rounded half-up to an integer.
    pub fn output_size(&self) -> PixelSize {
        PixelSize::new(round_half_up(self.width), round_half_up(self.height))
    }

    /// `true` when origin and extent sit exactly on the pixel grid.
    pub fn is_pixel_aligned(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.fract() == 0.0)
    }
}

/// Round a non-negative extent half-up to the nearest integer pixel count.
pub fn round_half_up(v: f64) -> u32 {
    if !v.is_finite() || v <= 0.0 {
        return 0;
    }
    let r = (v + 0.5).floor();
    if r >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        r as u32
    }
}

/// Lossy-encoding fidelity in `(0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Quality(f32);

impl Quality {
    /// Maximum fidelity.
    pub const MAX: Quality = Quality(1.0);
    /// The "smart compression" setting.
    pub const SMART: Quality = Quality(0.8);

    /// Validate and wrap a quality factor.
    pub fn new(value: f32) -> CompositorResult<Self> {
        if !value.is_finite() || value <= 0.0 || value > 1.0 {
            return Err(CompositorError::validation(format!(
                "quality must be in (0, 1], got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// The raw factor.
    pub fn get(self) -> f32 {
        self.0
    }

    /// The factor on the JPEG `1..=100` scale.
    pub fn jpeg_scale(self) -> u8 {
        ((self.0 * 100.0).round() as i32).clamp(1, 100) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<f32> for Quality {
    type Error = CompositorError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for f32 {
    fn from(q: Quality) -> Self {
        q.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
