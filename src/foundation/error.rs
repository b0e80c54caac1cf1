/// Convenience result type used across Galleria.
pub type CompositorResult<T> = Result<T, CompositorError>;

/// Typed failures surfaced by the export pipeline.
///
/// None of these are retried internally; callers present the failure and let the user restart
/// the edit from scratch.
#[derive(thiserror::Error, Debug)]
pub enum CompositorError {
    /// The crop rectangle is empty, non-finite, or not fully inside the source bounds.
    #[error("invalid crop: {0}")]
    InvalidCrop(String),

    /// The raster backend or the JPEG encoder failed, or produced no output.
    #[error("encode error: {0}")]
    Encode(String),

    /// The source image has not been decoded yet.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// Invalid caller-provided parameters (quality, filter syntax, session data).
    #[error("validation error: {0}")]
    Validation(String),

    /// No font face could be resolved for a watermark.
    #[error("font unavailable: {0}")]
    FontUnavailable(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CompositorError {
    /// Build a [`CompositorError::InvalidCrop`] value.
    pub fn invalid_crop(msg: impl Into<String>) -> Self {
        Self::InvalidCrop(msg.into())
    }

    /// Build a [`CompositorError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`CompositorError::SourceUnavailable`] value.
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    /// Build a [`CompositorError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CompositorError::FontUnavailable`] value.
    pub fn font_unavailable(msg: impl Into<String>) -> Self {
        Self::FontUnavailable(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
