//! Draws a bounded, duplicate free set of opaque pixels from a [`PixelBuffer`].
//!
//! Pixels are drawn in a seeded pseudorandom order without replacement.
//! The random phase draws at most [`DRAW_FACTOR`] times as many pixels as requested samples,
//! so images that are almost entirely transparent fall back to a linear scan instead.

use crate::{color::Point, Error, PixelBuffer, Result, BYTES_PER_PIXEL};
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;
use std::{collections::HashMap, ops::Deref};

/// How many random draws are made per requested sample before giving up on the random phase.
pub const DRAW_FACTOR: usize = 16;

/// An ordered list of unique byte offsets of opaque pixels.
///
/// A [`SampleSet`] is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSet {
    /// The byte offset of the first byte (blue) of each sampled pixel.
    offsets: Vec<usize>,
}

impl SampleSet {
    /// The byte offsets of the sampled pixels, in the order they were drawn.
    #[must_use]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Collects the color of each sampled pixel.
    #[must_use]
    pub fn colors(&self, pixels: PixelBuffer) -> Vec<Srgb<u8>> {
        self.offsets.iter().map(|&offset| pixels.color_at(offset)).collect()
    }

    /// Collects the color of each sampled pixel as an RGB point.
    #[must_use]
    pub(crate) fn points(&self, pixels: PixelBuffer) -> Vec<Point> {
        self.offsets
            .iter()
            .map(|&offset| crate::color::to_point(pixels.color_at(offset)))
            .collect()
    }
}

impl Deref for SampleSet {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.offsets
    }
}

/// Draws up to `max_samples` opaque pixels from `pixels`.
///
/// Returns [`Error::NoEligiblePixels`] if the image has no opaque pixel at all.
/// The result only depends on `pixels`, `max_samples`, and `seed`.
pub fn sample(pixels: PixelBuffer, max_samples: u32, seed: u64) -> Result<SampleSet> {
    let max_samples = (max_samples as usize).max(1);
    let num_pixels = pixels.num_pixels();
    let budget = max_samples.saturating_mul(DRAW_FACTOR).min(num_pixels);

    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    // sparse Fisher-Yates: positions swapped so far, everything else maps to itself
    let mut swapped = HashMap::<usize, usize>::new();
    let mut offsets = Vec::with_capacity(max_samples.min(num_pixels));

    for i in 0..budget {
        if offsets.len() == max_samples {
            break;
        }

        let j = rng.gen_range(i..num_pixels);
        let drawn = swapped.get(&j).copied().unwrap_or(j);
        let replaced = swapped.get(&i).copied().unwrap_or(i);
        swapped.insert(j, replaced);

        let offset = drawn * BYTES_PER_PIXEL;
        if pixels.is_eligible(offset) {
            offsets.push(offset);
        }
    }

    if offsets.is_empty() {
        offsets.extend(pixels.eligible_offsets().take(max_samples));
        if offsets.is_empty() {
            return Err(Error::NoEligiblePixels);
        }
        tracing::debug!(samples = offsets.len(), "random sampling found no opaque pixels, used a linear scan");
    }

    Ok(SampleSet { offsets })
}

/// Returns whether a cap of `max_samples` includes every pixel of `pixels`,
/// in which case methods that support it skip sampling entirely.
pub(crate) fn covers_all(pixels: PixelBuffer, max_samples: u32) -> bool {
    max_samples as usize >= pixels.num_pixels()
}
