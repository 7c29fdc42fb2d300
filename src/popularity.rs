//! The popularity method: the `k` most frequent exact colors.
//!
//! By default every opaque pixel is counted, not just a sample.
//! Colors with equal counts are ordered by their packed RGB value so the output is deterministic.

use crate::{
    color::{pack, unpack},
    parallel::{partition_reduce, partition_reduce_range},
    sample::{covers_all, sample, SampleSet},
    Error, PixelBuffer, PopularityOptions, Result, BYTES_PER_PIXEL,
};
use palette::Srgb;
use std::{cmp::Reverse, collections::HashMap};

fn merge_counts(a: HashMap<u32, u32>, b: HashMap<u32, u32>) -> HashMap<u32, u32> {
    let (small, mut large) = if a.len() < b.len() { (a, b) } else { (b, a) };
    for (rgb, n) in small {
        *large.entry(rgb).or_default() += n;
    }
    large
}

/// Counts each opaque color in `pixels`, keyed by its packed RGB value.
pub(crate) fn histogram(pixels: PixelBuffer) -> HashMap<u32, u32> {
    partition_reduce_range(
        pixels.num_pixels(),
        HashMap::new,
        |mut counts: HashMap<u32, u32>, i| {
            let offset = i * BYTES_PER_PIXEL;
            if pixels.is_eligible(offset) {
                *counts.entry(pack(pixels.color_at(offset))).or_default() += 1;
            }
            counts
        },
        merge_counts,
    )
}

/// Counts each color of the sampled pixels.
fn sample_histogram(pixels: PixelBuffer, samples: &SampleSet) -> HashMap<u32, u32> {
    partition_reduce(
        samples.offsets(),
        HashMap::new,
        |mut counts: HashMap<u32, u32>, &offset| {
            *counts.entry(pack(pixels.color_at(offset))).or_default() += 1;
            counts
        },
        merge_counts,
    )
}

/// Returns the `k` most frequent entries of `counts` in decreasing order of frequency.
pub(crate) fn most_frequent(counts: &HashMap<u32, u32>, k: usize) -> Vec<(u32, u32)> {
    let mut entries = counts.iter().map(|(&rgb, &n)| (rgb, n)).collect::<Vec<_>>();
    let key = |&(rgb, n): &(u32, u32)| (Reverse(n), rgb);
    if entries.len() > k && k > 0 {
        entries.select_nth_unstable_by_key(k - 1, key);
        entries.truncate(k);
    }
    entries.sort_unstable_by_key(key);
    entries.truncate(k);
    entries
}

/// Computes the `k` most frequent colors among the opaque pixels, most frequent first.
///
/// Only a sample of the pixels is counted if `options` caps the number of samples below the image size.
/// Fewer than `k` colors are returned if the image has fewer distinct opaque colors.
pub fn palette(pixels: PixelBuffer, k: usize, options: PopularityOptions) -> Result<Vec<Srgb<u8>>> {
    let counts = if covers_all(pixels, options.max_samples) {
        histogram(pixels)
    } else {
        sample_histogram(pixels, &sample(pixels, options.max_samples, options.seed)?)
    };
    if counts.is_empty() {
        return Err(Error::NoEligiblePixels);
    }

    tracing::debug!(distinct = counts.len(), k, "counted opaque colors");

    Ok(most_frequent(&counts, k).into_iter().map(|(rgb, _)| unpack(rgb)).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn picks_most_frequent() {
        let red = Srgb::new(255, 0, 0);
        let green = Srgb::new(0, 255, 0);
        let blue = Srgb::new(0, 0, 255);
        let bytes = bgra_from_colors(&[red, green, green, blue, green, blue]);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        assert_eq!(palette(pixels, 2, PopularityOptions::new()).unwrap(), vec![green, blue]);
        assert_eq!(palette(pixels, 10, PopularityOptions::new()).unwrap(), vec![green, blue, red]);
    }

    #[test]
    fn ties_break_by_packed_value() {
        let counts = HashMap::from([(5, 2), (3, 2), (9, 1), (1, 2)]);
        assert_eq!(most_frequent(&counts, 2), vec![(1, 2), (3, 2)]);
        assert_eq!(most_frequent(&counts, 0), vec![]);
    }

    #[test]
    fn ignores_transparent_pixels() {
        let mut bytes = bgra_from_colors(&[Srgb::new(1, 1, 1); 3]);
        bytes.extend([9, 9, 9, 0].repeat(10));
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let counts = histogram(pixels);
        assert_eq!(counts, HashMap::from([(0x010101, 3)]));
    }

    #[test]
    fn all_transparent_is_an_error() {
        let bytes = [0, 0, 0, 0].repeat(16);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        assert_eq!(palette(pixels, 4, PopularityOptions::new()), Err(Error::NoEligiblePixels));
        assert_eq!(palette(pixels, 4, PopularityOptions::new().max_samples(3)), Err(Error::NoEligiblePixels));
    }

    #[test]
    fn sample_cap_counts_only_sampled_pixels() {
        let bytes = random_opaque_image(64, 64, 4);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let options = PopularityOptions::new().max_samples(100).seed(9);
        let samples = sample(pixels, 100, 9).unwrap();
        let counts = sample_histogram(pixels, &samples);
        assert_eq!(counts.values().sum::<u32>(), 100);

        let result = palette(pixels, 5, options).unwrap();
        let expected = most_frequent(&counts, 5).into_iter().map(|(rgb, _)| unpack(rgb)).collect::<Vec<_>>();
        assert_eq!(result, expected);
    }

    #[test]
    fn cap_covering_the_image_counts_every_pixel() {
        let red = Srgb::new(255, 0, 0);
        let blue = Srgb::new(0, 0, 255);
        let mut colors = vec![red; 5];
        colors.extend([blue; 4]);
        let bytes = bgra_from_colors(&colors);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let options = PopularityOptions::new().max_samples(9);
        assert_eq!(palette(pixels, 2, options).unwrap(), vec![red, blue]);
    }
}
