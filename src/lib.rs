//! Galleria is the export pipeline of a photo gallery editor.
//!
//! Given a decoded source image and an [`EditSession`] (crop rectangle, optional filter, optional
//! text watermark, quality), a [`Compositor`] produces the final JPEG as an [`EncodedImage`]:
//!
//! - Decode a [`SourceImage`]
//! - Pick a crop, by hand ([`FreeformCrop`]) or from an aspect preset ([`AspectCrop`])
//! - Call [`Compositor::compose`] (or [`Compositor::compose_batch`] for many exports)
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod compose;
mod effects;
mod encode;
mod foundation;
mod render;

pub use crate::assets::decode::{DecodedImage, SourceImage};
pub use crate::assets::fonts::{FontBook, ResolvedFont};
pub use crate::compose::compositor::{Compositor, CompositorOpts, RenderedImage};
pub use crate::compose::crop_provider::{AspectCrop, AspectPreset, CropProvider, FreeformCrop};
pub use crate::compose::session::EditSession;
pub use crate::effects::filter::{FilterOp, FilterSpec};
pub use crate::encode::artifact::EncodedImage;
pub use crate::foundation::core::{CropRect, PixelSize, Quality, round_half_up};
pub use crate::foundation::error::{CompositorError, CompositorResult};
pub use crate::render::surface::SurfaceStats;
pub use crate::render::watermark::{WatermarkSizing, WatermarkSpec, WatermarkStyle};
