//! Remaps a pixel buffer onto a palette with Floyd–Steinberg or ordered (Bayer) dithering.
//!
//! Both ditherers return a copy of the input buffer in which every eligible pixel has been replaced
//! by a palette color. Ineligible pixels, including their alpha, are copied through unchanged.
//! Nearest color lookups are cached per quantized RGB value.

use crate::{
    color::{pack, to_point},
    nearest::NearestTable,
    BayerSize, Error, FloydSteinbergOptions, OrderedOptions, PixelBuffer, Result, BYTES_PER_PIXEL,
};
use palette::Srgb;
#[cfg(feature = "threads")]
use rayon::prelude::*;
use std::collections::HashMap;

/// Finds the nearest palette color for quantized RGB values, remembering earlier answers.
struct NearestCache<'p> {
    /// The palette colors.
    palette: &'p [Srgb<u8>],
    /// The palette as points for the vectorized search.
    table: &'p NearestTable<3>,
    /// Palette indices keyed by packed RGB.
    cache: HashMap<u32, u16>,
}

impl<'p> NearestCache<'p> {
    fn new(palette: &'p [Srgb<u8>], table: &'p NearestTable<3>) -> Self {
        Self { palette, table, cache: HashMap::new() }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn nearest(&mut self, color: Srgb<u8>) -> Srgb<u8> {
        let Self { palette, table, cache } = self;
        let index = *cache
            .entry(pack(color))
            .or_insert_with(|| table.nearest(&to_point(color)) as u16);
        palette[usize::from(index)]
    }
}

/// Builds the search table for `palette`, rejecting an empty one.
fn nearest_table(palette: &[Srgb<u8>]) -> Result<NearestTable<3>> {
    if palette.is_empty() {
        Err(Error::EmptyPalette)
    } else {
        Ok(NearestTable::new(&palette.iter().map(|&c| to_point(c)).collect::<Vec<_>>()))
    }
}

/// Clamps each component into `0.0..=255.0` and truncates it to a `u8`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(point: [f32; 3]) -> Srgb<u8> {
    let [r, g, b] = point.map(|c| c.clamp(0.0, 255.0) as u8);
    Srgb::new(r, g, b)
}

#[inline]
fn write_pixel(px: &mut [u8], color: Srgb<u8>) {
    px[0] = color.blue;
    px[1] = color.green;
    px[2] = color.red;
}

/// Multiplies `other` by a scalar, `alpha`, and adds the result to `arr`.
#[inline]
fn arr_mul_add_assign(arr: &mut [f32; 3], alpha: f32, other: [f32; 3]) {
    for i in 0..3 {
        arr[i] += alpha * other[i];
    }
}

/// Accumulates the diffused error for the current and the next row of pixels.
///
/// Each row has one padding entry on either side so that pixels on the edges
/// can diffuse error without bounds checks.
struct ErrorBuf {
    /// The propagated error for the current row of pixels.
    this_err: Vec<[f32; 3]>,
    /// The propagated error for the next row of pixels.
    next_err: Vec<[f32; 3]>,
}

impl ErrorBuf {
    fn new(width: usize) -> Self {
        Self {
            this_err: vec![[0.0; 3]; width + 2],
            next_err: vec![[0.0; 3]; width + 2],
        }
    }

    /// Propagate error going from left to right.
    #[inline]
    fn propagate_ltr(&mut self, x: usize, err: [f32; 3]) {
        arr_mul_add_assign(&mut self.this_err[x + 2], 7.0 / 16.0, err);
        arr_mul_add_assign(&mut self.next_err[x], 3.0 / 16.0, err);
        arr_mul_add_assign(&mut self.next_err[x + 1], 5.0 / 16.0, err);
        arr_mul_add_assign(&mut self.next_err[x + 2], 1.0 / 16.0, err);
    }

    /// Propagate error going from right to left.
    #[inline]
    fn propagate_rtl(&mut self, x: usize, err: [f32; 3]) {
        arr_mul_add_assign(&mut self.this_err[x], 7.0 / 16.0, err);
        arr_mul_add_assign(&mut self.next_err[x + 2], 3.0 / 16.0, err);
        arr_mul_add_assign(&mut self.next_err[x + 1], 5.0 / 16.0, err);
        arr_mul_add_assign(&mut self.next_err[x], 1.0 / 16.0, err);
    }

    /// Adds the accumulated error to the pixel at `x`.
    #[inline]
    fn apply(&self, x: usize, point: &mut [f32; 3]) {
        let err = self.this_err[x + 1];
        for c in 0..3 {
            point[c] += err[c];
        }
    }

    /// Swaps the error rows and clears the new next row.
    #[inline]
    fn next_row(&mut self) {
        std::mem::swap(&mut self.this_err, &mut self.next_err);
        self.next_err.fill([0.0; 3]);
    }
}

/// Dithers `pixels` onto `palette` with Floyd–Steinberg error diffusion.
///
/// The quantization error of each eligible pixel is scaled by the strength and then spread over
/// its unvisited neighbors: 7/16 ahead, and 3/16, 5/16, 1/16 on the next row, mirrored on rows
/// that are scanned right to left. Pixels outside the image and ineligible pixels absorb no error.
///
/// # Errors
/// Returns [`Error::DimensionMismatch`] if the buffer is not `width * height` pixels
/// and [`Error::EmptyPalette`] if `palette` is empty.
pub fn floyd_steinberg(
    pixels: PixelBuffer,
    width: u32,
    height: u32,
    palette: &[Srgb<u8>],
    options: FloydSteinbergOptions,
) -> Result<Vec<u8>> {
    let pixels = PixelBuffer::with_dimensions(pixels.as_bytes(), width, height)?;
    let table = nearest_table(palette)?;
    let mut cache = NearestCache::new(palette, &table);

    let width = width as usize;
    let strength = options.strength;
    let mut output = pixels.to_vec();
    let mut error = ErrorBuf::new(width);

    if width > 0 {
        for (y, row) in output.chunks_exact_mut(width * BYTES_PER_PIXEL).enumerate() {
            let ltr = !options.serpentine || y % 2 == 0;

            let mut dither = |x: usize, px: &mut [u8], error: &mut ErrorBuf| -> Option<[f32; 3]> {
                if px[3] <= crate::ALPHA_THRESHOLD {
                    return None;
                }
                let mut point = [px[2], px[1], px[0]].map(f32::from);
                error.apply(x, &mut point);
                let clamped = point.map(|c| c.clamp(0.0, 255.0));
                let nearest = cache.nearest(quantize(clamped));
                write_pixel(px, nearest);
                let target = [nearest.red, nearest.green, nearest.blue].map(f32::from);
                Some(std::array::from_fn(|c| (clamped[c] - target[c]) * strength))
            };

            let row = row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate();
            if ltr {
                for (x, px) in row {
                    if let Some(err) = dither(x, px, &mut error) {
                        error.propagate_ltr(x, err);
                    }
                }
            } else {
                for (x, px) in row.rev() {
                    if let Some(err) = dither(x, px, &mut error) {
                        error.propagate_rtl(x, err);
                    }
                }
            }

            error.next_row();
        }
    }

    tracing::debug!(width, height, cached = cache.cache.len(), "Floyd–Steinberg dithering finished");
    Ok(output)
}

/// Returns the `n` by `n` Bayer index matrix in row-major order, where `n` is a power of two.
///
/// Each matrix is built from the one half its size as `[[4M, 4M + 2], [4M + 3, 4M + 1]]`.
fn bayer_matrix(n: usize) -> Vec<u32> {
    let mut matrix = vec![0];
    let mut size = 1;
    while size < n {
        let next = size * 2;
        let mut grown = vec![0; next * next];
        for y in 0..size {
            for x in 0..size {
                let v = 4 * matrix[y * size + x];
                grown[y * next + x] = v;
                grown[y * next + x + size] = v + 2;
                grown[(y + size) * next + x] = v + 3;
                grown[(y + size) * next + x + size] = v + 1;
            }
        }
        matrix = grown;
        size = next;
    }
    matrix
}

/// The per-cell offsets to add to each component, centered on zero and scaled by `strength`.
#[allow(clippy::cast_precision_loss)]
fn bayer_offsets(size: BayerSize, strength: f32) -> Vec<f32> {
    let n = size.dimension();
    let cells = (n * n) as f32;
    bayer_matrix(n)
        .into_iter()
        .map(|v| {
            let threshold = (v as f32 + 0.5) / cells;
            (threshold - 0.5) * 255.0 * strength
        })
        .collect()
}

/// Dithers one row of pixels with the given row of threshold offsets.
fn ordered_row(row: &mut [u8], offsets: &[f32], cache: &mut NearestCache) {
    for (x, px) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
        if px[3] <= crate::ALPHA_THRESHOLD {
            continue;
        }
        let offset = offsets[x % offsets.len()];
        let color = quantize([px[2], px[1], px[0]].map(|c| f32::from(c) + offset));
        write_pixel(px, cache.nearest(color));
    }
}

/// Dithers `pixels` onto `palette` with an ordered Bayer threshold matrix.
///
/// Each eligible pixel is offset by an amount determined only by its position in the matrix,
/// so rows are processed independently.
///
/// # Errors
/// Returns [`Error::DimensionMismatch`] if the buffer is not `width * height` pixels
/// and [`Error::EmptyPalette`] if `palette` is empty.
pub fn ordered(
    pixels: PixelBuffer,
    width: u32,
    height: u32,
    palette: &[Srgb<u8>],
    options: OrderedOptions,
) -> Result<Vec<u8>> {
    let pixels = PixelBuffer::with_dimensions(pixels.as_bytes(), width, height)?;
    let table = nearest_table(palette)?;

    let n = options.size.dimension();
    let offsets = bayer_offsets(options.size, options.strength);
    let mut output = pixels.to_vec();
    let stride = width as usize * BYTES_PER_PIXEL;

    if stride > 0 {
        #[cfg(feature = "threads")]
        output.par_chunks_mut(stride).enumerate().for_each_init(
            || NearestCache::new(palette, &table),
            |cache, (y, row)| ordered_row(row, &offsets[(y % n) * n..][..n], cache),
        );

        #[cfg(not(feature = "threads"))]
        {
            let mut cache = NearestCache::new(palette, &table);
            for (y, row) in output.chunks_exact_mut(stride).enumerate() {
                ordered_row(row, &offsets[(y % n) * n..][..n], &mut cache);
            }
        }
    }

    tracing::debug!(width, height, matrix = n, "ordered dithering finished");
    Ok(output)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn gray(v: u8) -> Srgb<u8> {
        Srgb::new(v, v, v)
    }

    #[test]
    fn bayer_matches_known_matrices() {
        assert_eq!(bayer_matrix(2), vec![0, 2, 3, 1]);
        assert_eq!(bayer_matrix(4), vec![0, 8, 2, 10, 12, 4, 14, 6, 3, 11, 1, 9, 15, 7, 13, 5]);
        assert_eq!(bayer_matrix(8)[..8], [0, 32, 8, 40, 2, 34, 10, 42]);
        assert_eq!(bayer_matrix(8)[56..], [63, 31, 55, 23, 61, 29, 53, 21]);
    }

    #[test]
    fn offsets_are_centered() {
        let offsets = bayer_offsets(BayerSize::Two, 1.0);
        assert!((offsets[0] + 255.0 * 3.0 / 8.0).abs() < 1e-3);
        assert!(offsets.iter().sum::<f32>().abs() < 1e-3);
        assert!(bayer_offsets(BayerSize::Eight, 0.0).iter().all(|&o| o == 0.0));
    }

    #[test]
    fn error_diffusion_weights() {
        let mut error = ErrorBuf::new(3);
        error.propagate_ltr(1, [16.0; 3]);
        assert_eq!(error.this_err[3], [7.0; 3]);
        assert_eq!(error.next_err[1..4], [[3.0; 3], [5.0; 3], [1.0; 3]]);

        error.next_row();
        assert_eq!(error.this_err[2], [5.0; 3]);
        assert!(error.next_err.iter().all(|e| *e == [0.0; 3]));
    }

    #[test]
    fn mid_gray_becomes_checkerboard() {
        let bytes = bgra_from_colors(&[gray(128); 16]);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let palette = [gray(0), gray(255)];
        let output = floyd_steinberg(pixels, 4, 4, &palette, FloydSteinbergOptions::new()).unwrap();
        let whites = output.chunks_exact(4).map(|px| px[0] == 255).collect::<Vec<_>>();
        for (i, &white) in whites.iter().enumerate() {
            assert_eq!(white, (i % 4 + i / 4) % 2 == 0);
        }
    }

    #[test]
    fn zero_strength_is_nearest_remap() {
        let colors = [gray(10), gray(100), gray(200), gray(250)];
        let bytes = bgra_from_colors(&colors);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let palette = [gray(0), gray(255)];
        let expected = bgra_from_colors(&[gray(0), gray(0), gray(255), gray(255)]);

        let fs = floyd_steinberg(pixels, 2, 2, &palette, FloydSteinbergOptions::new().strength(0.0)).unwrap();
        assert_eq!(fs, expected);
        let ordered = ordered(pixels, 2, 2, &palette, OrderedOptions::new().strength(0.0)).unwrap();
        assert_eq!(ordered, expected);
    }

    #[test]
    fn transparent_pixels_untouched() {
        let mut bytes = random_opaque_image(8, 8, 7);
        for px in bytes.chunks_exact_mut(4).step_by(3) {
            px[3] = 40;
        }
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let palette = [Srgb::new(255, 0, 0), Srgb::new(0, 0, 255), gray(0)];

        for output in [
            floyd_steinberg(pixels, 8, 8, &palette, FloydSteinbergOptions::new().serpentine(false)).unwrap(),
            ordered(pixels, 8, 8, &palette, OrderedOptions::new().size(BayerSize::Eight)).unwrap(),
        ] {
            for (out, px) in output.chunks_exact(4).zip(bytes.chunks_exact(4)) {
                if px[3] <= 128 {
                    assert_eq!(out, px);
                } else {
                    assert!(palette.contains(&Srgb::new(out[2], out[1], out[0])));
                    assert_eq!(out[3], px[3]);
                }
            }
        }
    }

    #[test]
    fn validates_inputs() {
        let bytes = bgra_from_colors(&[gray(0); 4]);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        assert_eq!(
            floyd_steinberg(pixels, 2, 2, &[], FloydSteinbergOptions::new()),
            Err(Error::EmptyPalette)
        );
        assert_eq!(
            ordered(pixels, 3, 2, &[gray(0)], OrderedOptions::new()),
            Err(Error::DimensionMismatch { len: 16, width: 3, height: 2 })
        );
    }
}
