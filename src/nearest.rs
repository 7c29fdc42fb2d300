//! Brute force nearest centroid search over SIMD lanes.

use std::array;
use wide::{f32x8, u32x8, CmpLe};

/// A set of centroids laid out in chunks of 8 for vectorized distance computations.
///
/// Unused lanes in the last chunk are filled with infinity so that they are never the nearest.
#[derive(Debug, Clone)]
pub(crate) struct NearestTable<const N: usize> {
    /// The centroid components, one `f32x8` per dimension per chunk.
    chunks: Vec<[f32x8; N]>,
    /// The number of centroids.
    len: usize,
}

impl<const N: usize> NearestTable<N> {
    pub(crate) fn new(centroids: &[[f64; N]]) -> Self {
        let mut table = Self { chunks: Vec::new(), len: 0 };
        table.update(centroids);
        table
    }

    /// Replaces the centroids, reusing the existing allocation.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn update(&mut self, centroids: &[[f64; N]]) {
        self.chunks.clear();
        self.len = centroids.len();

        let chunks = centroids.chunks_exact(8);
        let remainder = chunks.remainder();
        self.chunks.extend(
            chunks.map(|chunk| array::from_fn(|i| f32x8::new(array::from_fn(|j| chunk[j][i] as f32)))),
        );

        if !remainder.is_empty() {
            let mut arr = [[f32::INFINITY; 8]; N];
            for (j, point) in remainder.iter().enumerate() {
                for (lanes, &c) in arr.iter_mut().zip(point) {
                    lanes[j] = c as f32;
                }
            }
            self.chunks.push(arr.map(f32x8::new));
        }
    }

    /// Returns the index of the centroid nearest to `point`.
    ///
    /// The table must not be empty.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn nearest(&self, point: &[f64; N]) -> usize {
        debug_assert!(self.len > 0);

        let query = point.map(|c| f32x8::splat(c as f32));
        let mut cur_chunk = u32x8::ZERO;
        let mut min_chunk = cur_chunk;
        let mut min_distance = f32x8::splat(f32::INFINITY);

        for chunk in &self.chunks {
            let mut distance = f32x8::ZERO;
            for c in 0..N {
                let diff = query[c] - chunk[c];
                distance += diff * diff;
            }

            let mask = u32x8::new(distance.cmp_le(min_distance).to_array().map(f32::to_bits));
            min_chunk = mask.blend(cur_chunk, min_chunk);
            min_distance = min_distance.fast_min(distance);
            cur_chunk += u32x8::ONE;
        }

        let mut min_lane = 0;
        let mut min_dist = f32::INFINITY;
        for (i, &v) in min_distance.as_array_ref().iter().enumerate() {
            if v < min_dist {
                min_dist = v;
                min_lane = i;
            }
        }

        let index = min_chunk.as_array_ref()[min_lane] as usize * 8 + min_lane;
        index.min(self.len - 1)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}
