use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::decode::{SourceImage, premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
use crate::assets::fonts::FontBook;
use crate::compose::session::EditSession;
use crate::encode::artifact::EncodedImage;
use crate::encode::jpeg::encode_jpeg;
use crate::foundation::core::{PixelSize, Quality};
use crate::foundation::error::{CompositorError, CompositorResult};
use crate::render::crop::draw_crop;
use crate::render::surface::{Surface, SurfaceLedger, SurfaceStats};
use crate::render::watermark::{WatermarkStyle, draw_watermark};

/// Options controlling a [`Compositor`].
#[derive(Clone, Debug, PartialEq)]
pub struct CompositorOpts {
    /// Watermark look and placement.
    pub style: WatermarkStyle,
    /// Worker threads for [`Compositor::compose_batch`]. `None` uses the rayon global pool.
    pub threads: Option<usize>,
    /// Load the platform's installed fonts into the font book.
    pub system_fonts: bool,
    /// Extra directories scanned for font files.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            style: WatermarkStyle::default(),
            threads: None,
            system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

impl CompositorOpts {
    /// Defaults overridden by `GALLERIA_THREADS`, `GALLERIA_FONT_DIR` (a path list) and
    /// `GALLERIA_SYSTEM_FONTS` (`0` or `false` disables system fonts).
    pub fn from_env() -> CompositorResult<Self> {
        Self::from_lookup(|key| std::env::var_os(key).map(|v| v.to_string_lossy().into_owned()))
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CompositorResult<Self> {
        let mut opts = Self::default();
        if let Some(v) = lookup("GALLERIA_THREADS") {
            let n = v.trim().parse::<usize>().map_err(|e| {
                CompositorError::validation(format!("GALLERIA_THREADS '{v}' is not a count: {e}"))
            })?;
            opts.threads = Some(n);
        }
        if let Some(v) = lookup("GALLERIA_FONT_DIR") {
            opts.font_dirs = std::env::split_paths(&v)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(v) = lookup("GALLERIA_SYSTEM_FONTS") {
            opts.system_fonts = !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false");
        }
        Ok(opts)
    }
}

/// Rendered raster before encoding, tightly packed row-major RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl RenderedImage {
    /// Pixel dimensions.
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }
}

/// The export pipeline: crop, filter, watermark, encode.
///
/// Holds only read-only state (options and fonts) plus atomic surface counters, so a single
/// compositor can serve concurrent compose calls.
pub struct Compositor {
    opts: CompositorOpts,
    fonts: FontBook,
    ledger: Arc<SurfaceLedger>,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("opts", &self.opts)
            .field("fonts", &self.fonts)
            .field("surfaces", &self.ledger.stats())
            .finish()
    }
}

impl Compositor {
    /// Build a compositor, loading fonts as `opts` asks.
    pub fn new(opts: CompositorOpts) -> CompositorResult<Self> {
        let mut fonts = if opts.system_fonts {
            FontBook::with_system_fonts()
        } else {
            FontBook::empty()
        };
        for dir in &opts.font_dirs {
            fonts.load_fonts_dir(dir);
        }
        Self::with_font_book(opts, fonts)
    }

    /// Build a compositor around an already populated font book. Font options in `opts` are
    /// ignored.
    pub fn with_font_book(opts: CompositorOpts, fonts: FontBook) -> CompositorResult<Self> {
        opts.style.validate()?;
        let pool = opts.threads.map(build_thread_pool).transpose()?;
        tracing::debug!(faces = fonts.face_count(), threads = ?opts.threads, "compositor ready");
        Ok(Self {
            opts,
            fonts,
            ledger: Arc::new(SurfaceLedger::default()),
            pool,
        })
    }

    /// Options this compositor was built with.
    pub fn opts(&self) -> &CompositorOpts {
        &self.opts
    }

    /// Fonts available to watermarks.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Surface allocation counters. `live_surfaces` is zero whenever no compose call is running.
    pub fn surface_stats(&self) -> SurfaceStats {
        self.ledger.stats()
    }

    /// Produce the final encoded image for `session` applied to `source`.
    #[tracing::instrument(skip(self, source, session), fields(source = source.label()))]
    pub fn compose(
        &self,
        source: &SourceImage,
        session: &EditSession,
    ) -> CompositorResult<EncodedImage> {
        let surface = self.render_surface(source, session)?;
        let size = surface.size();
        let bytes = encode_jpeg(surface.data(), size, session.quality())?;
        drop(surface);
        tracing::debug!(bytes = bytes.len(), "encoded jpeg");
        Ok(EncodedImage::new(bytes, size, session.quality()))
    }

    /// Run every step except encoding and return straight-alpha pixels.
    #[tracing::instrument(skip(self, source, session), fields(source = source.label()))]
    pub fn render(
        &self,
        source: &SourceImage,
        session: &EditSession,
    ) -> CompositorResult<RenderedImage> {
        let surface = self.render_surface(source, session)?;
        let size = surface.size();
        let mut data = surface.data().to_vec();
        unpremultiply_rgba8_in_place(&mut data);
        Ok(RenderedImage {
            width: size.width,
            height: size.height,
            data,
            premultiplied: false,
        })
    }

    /// Encode a raster produced by [`Compositor::render`].
    pub fn encode(
        &self,
        image: &RenderedImage,
        quality: Quality,
    ) -> CompositorResult<EncodedImage> {
        let size = image.size();
        let bytes = if image.premultiplied {
            encode_jpeg(&image.data, size, quality)?
        } else {
            let mut premul = image.data.clone();
            premultiply_rgba8_in_place(&mut premul);
            encode_jpeg(&premul, size, quality)?
        };
        Ok(EncodedImage::new(bytes, size, quality))
    }

    /// Compose independent jobs in parallel. Results keep the input order.
    pub fn compose_batch(
        &self,
        jobs: &[(&SourceImage, EditSession)],
    ) -> Vec<CompositorResult<EncodedImage>> {
        let run = || {
            jobs.par_iter()
                .map(|(source, session)| self.compose(source, session))
                .collect::<Vec<_>>()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    fn render_surface(
        &self,
        source: &SourceImage,
        session: &EditSession,
    ) -> CompositorResult<Surface> {
        let decoded = source.pixels()?;
        let crop = session.crop();
        crop.validate_within(decoded.size())?;

        let mut surface = Surface::allocate(&self.ledger, crop.output_size())?;
        draw_crop(decoded, crop, &mut surface)?;

        if let Some(filter) = session.filter() {
            tracing::debug!(%filter, "apply filter");
            filter.apply_premul_in_place(surface.data_mut());
        }
        if let Some(watermark) = session.watermark() {
            let font = self.fonts.resolve(&watermark.font_family)?;
            draw_watermark(
                &mut surface,
                watermark,
                &self.opts.style,
                &font,
                &self.ledger,
            )?;
        }
        Ok(surface)
    }
}

fn build_thread_pool(threads: usize) -> CompositorResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(CompositorError::validation(
            "compositor 'threads' must be >= 1 when set",
        ));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| CompositorError::encode(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
