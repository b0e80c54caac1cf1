use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::foundation::core::PixelSize;
use crate::foundation::error::{CompositorError, CompositorResult};

/// Largest surface edge; baseline JPEG cannot address more than 65535 lines.
pub(crate) const MAX_SURFACE_DIM: u32 = 65_535;

/// Snapshot of surface allocation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    /// Surfaces currently alive (allocated and not yet released).
    pub live_surfaces: usize,
    /// Surfaces allocated since the compositor was created.
    pub allocated_surfaces: u64,
    /// Bytes allocated since the compositor was created.
    pub allocated_bytes: u64,
    /// Surfaces released since the compositor was created.
    pub released_surfaces: u64,
}

/// Shared counters. Lock-free; each compose call owns its surfaces exclusively.
#[derive(Debug, Default)]
pub(crate) struct SurfaceLedger {
    live: AtomicUsize,
    allocated: AtomicU64,
    allocated_bytes: AtomicU64,
    released: AtomicU64,
}

impl SurfaceLedger {
    pub(crate) fn stats(&self) -> SurfaceStats {
        SurfaceStats {
            live_surfaces: self.live.load(Ordering::Acquire),
            allocated_surfaces: self.allocated.load(Ordering::Acquire),
            allocated_bytes: self.allocated_bytes.load(Ordering::Acquire),
            released_surfaces: self.released.load(Ordering::Acquire),
        }
    }
}

/// Transient premultiplied RGBA8 drawing surface.
///
/// Released (and accounted for) when dropped, on every exit path of the caller.
pub(crate) struct Surface {
    size: PixelSize,
    data: Vec<u8>,
    ledger: Arc<SurfaceLedger>,
}

impl Surface {
    /// Allocate a transparent surface of `size`.
    pub(crate) fn allocate(ledger: &Arc<SurfaceLedger>, size: PixelSize) -> CompositorResult<Self> {
        if size.is_empty() {
            return Err(CompositorError::encode(format!(
                "zero-sized surface {}x{}",
                size.width, size.height
            )));
        }
        if size.width > MAX_SURFACE_DIM || size.height > MAX_SURFACE_DIM {
            return Err(CompositorError::encode(format!(
                "surface {}x{} exceeds {MAX_SURFACE_DIM}x{MAX_SURFACE_DIM}",
                size.width, size.height
            )));
        }
        let len = size
            .rgba8_len()
            .ok_or_else(|| CompositorError::encode("surface size overflow"))?;

        ledger.live.fetch_add(1, Ordering::AcqRel);
        ledger.allocated.fetch_add(1, Ordering::AcqRel);
        ledger
            .allocated_bytes
            .fetch_add(len as u64, Ordering::AcqRel);
        tracing::debug!(width = size.width, height = size.height, "allocate surface");

        Ok(Self {
            size,
            data: vec![0u8; len],
            ledger: Arc::clone(ledger),
        })
    }

    pub(crate) fn size(&self) -> PixelSize {
        self.size
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        self.ledger.live.fetch_sub(1, Ordering::AcqRel);
        self.ledger.released.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
