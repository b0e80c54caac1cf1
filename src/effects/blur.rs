use crate::foundation::core::PixelSize;
use crate::foundation::error::{CompositorError, CompositorResult};

/// Gaussian-blur an 8-bit coverage mask. Samples beyond the mask edges count as empty, so a
/// shadow fades out at the layer border instead of smearing.
///
/// `sigma` is derived from `radius` (`radius / 2`, at least 0.5).
pub(crate) fn blur_mask(mask: &[u8], size: PixelSize, radius: u32) -> CompositorResult<Vec<u8>> {
    if size.area() != mask.len() {
        return Err(CompositorError::Other(anyhow::anyhow!(
            "mask of {} bytes does not match {}x{}",
            mask.len(),
            size.width,
            size.height
        )));
    }
    if radius == 0 || size.is_empty() {
        return Ok(mask.to_vec());
    }

    let kernel = gaussian_kernel(radius);
    let (w, h) = (size.width as usize, size.height as usize);
    let src: Vec<f32> = mask.iter().map(|&m| f32::from(m)).collect();
    let mut rows = vec![0.0f32; src.len()];
    for (src_row, dst_row) in src.chunks_exact(w).zip(rows.chunks_exact_mut(w)) {
        convolve(src_row, dst_row, w, 1, &kernel);
    }
    let mut cols = vec![0.0f32; src.len()];
    for x in 0..w {
        convolve(&rows[x..], &mut cols[x..], h, w, &kernel);
    }
    Ok(cols
        .into_iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect())
}

fn gaussian_kernel(radius: u32) -> Vec<f32> {
    let sigma = (radius as f32 / 2.0).max(0.5);
    let denom = 2.0 * sigma * sigma;
    let r = radius as i32;
    let weights: Vec<f32> = (-r..=r)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Convolve `n` samples spaced `stride` apart in `src` into the same positions of `dst`.
fn convolve(src: &[f32], dst: &mut [f32], n: usize, stride: usize, kernel: &[f32]) {
    let r = kernel.len() / 2;
    for i in 0..n {
        let lo = i.saturating_sub(r);
        let hi = (i + r).min(n - 1);
        let acc: f32 = (lo..=hi)
            .map(|j| kernel[j + r - i] * src[j * stride])
            .sum();
        dst[i * stride] = acc;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
