//! Incremental k-means over the opaque pixels, seeded with the popularity palette.
//!
//! Each worker keeps a running mean per cluster which is merged by weight once all pixels are assigned.
//! Centroids then move a fixed fraction of the way towards their cluster mean.

use crate::{
    color::{from_point, to_point, Point},
    kmeans::KmeansOutput,
    nearest::NearestTable,
    parallel::partition_reduce,
    popularity,
    sample::{covers_all, sample},
    Error, NativeKmeansOptions, PixelBuffer, PopularityOptions, Result,
};
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;
use std::array;

/// A running mean and the number of points folded into it.
type RunningMean = (Point, u32);

/// Folds `p` into `mean`.
fn push(mean: &mut RunningMean, p: Point) {
    let (m, count) = mean;
    *count += 1;
    let n = f64::from(*count);
    for c in 0..3 {
        m[c] += (p[c] - m[c]) / n;
    }
}

/// Merges two running means, weighting each by its count.
fn combine((a, n): RunningMean, (b, m): RunningMean) -> RunningMean {
    if n == 0 {
        return (b, m);
    }
    if m == 0 {
        return (a, n);
    }
    let total = n + m;
    let (wa, wb) = (f64::from(n) / f64::from(total), f64::from(m) / f64::from(total));
    (array::from_fn(|c| a[c] * wa + b[c] * wb), total)
}

/// Refines the popularity palette by incremental k-means over the opaque pixels.
///
/// Every opaque pixel is used unless `options` caps the number of samples below the image size.
/// The output is ordered by cluster population, largest first.
/// A cluster that receives no pixels is moved to a random clustered pixel.
pub fn palette(pixels: PixelBuffer, k: usize, options: NativeKmeansOptions) -> Result<KmeansOutput> {
    let popularity = PopularityOptions::new().max_samples(options.max_samples).seed(options.seed);
    let seeds = popularity::palette(pixels, k, popularity)?;
    let eligible = if covers_all(pixels, options.max_samples) {
        pixels.eligible_offsets().collect::<Vec<_>>()
    } else {
        sample(pixels, options.max_samples, options.seed)?.offsets().to_vec()
    };
    if eligible.is_empty() {
        return Err(Error::NoEligiblePixels);
    }

    let rate = options.rate;
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(options.seed);
    let mut positions = seeds.into_iter().map(to_point).collect::<Vec<_>>();
    let mut table = NearestTable::new(&positions);
    let mut counts = vec![0; positions.len()];
    let mut last_change = 0.0;

    for iteration in 0..options.iterations {
        let means = partition_reduce(
            &eligible,
            || vec![([0.0; 3], 0); positions.len()],
            |mut means: Vec<RunningMean>, &offset| {
                let p = to_point(pixels.color_at(offset));
                push(&mut means[table.nearest(&p)], p);
                means
            },
            |a, b| a.into_iter().zip(b).map(|(a, b)| combine(a, b)).collect(),
        );

        let mut max_change = 0.0_f64;
        for (i, (position, &(mean, count))) in positions.iter_mut().zip(&means).enumerate() {
            counts[i] = count;
            let next = if count > 0 {
                array::from_fn(|c| position[c] * (1.0 - rate) + mean[c] * rate)
            } else {
                let offset = eligible[rng.gen_range(0..eligible.len())];
                to_point(pixels.color_at(offset))
            };

            for c in 0..3 {
                max_change = max_change.max((next[c] - position[c]).abs());
            }
            *position = next;
        }

        tracing::trace!(iteration, max_change, "native k-means iteration");
        last_change = max_change;
        table.update(&positions);
    }

    let mut clusters = positions.into_iter().zip(counts).collect::<Vec<_>>();
    clusters.sort_by(|(_, a), (_, b)| b.cmp(a));

    Ok(KmeansOutput {
        palette: clusters.into_iter().map(|(p, _)| from_point(p)).collect(),
        last_change,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn running_means_merge_by_weight() {
        let mut a = ([0.0; 3], 0);
        push(&mut a, [10.0, 0.0, 0.0]);
        push(&mut a, [20.0, 0.0, 0.0]);
        let mut b = ([0.0; 3], 0);
        push(&mut b, [40.0, 3.0, 0.0]);
        let (mean, n) = combine(a, b);
        assert_eq!(n, 3);
        assert!((mean[0] - 70.0 / 3.0).abs() < 1e-9 && (mean[1] - 1.0).abs() < 1e-9);
        assert_eq!(combine(([0.0; 3], 0), b), b);
    }

    #[test]
    fn orders_by_population() {
        let big = Srgb::new(200, 10, 10);
        let small = Srgb::new(10, 10, 200);
        let mut colors = vec![small; 10];
        colors.extend([big; 30]);
        let bytes = bgra_from_colors(&colors);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let output = palette(pixels, 2, NativeKmeansOptions::new()).unwrap();
        assert_eq!(output.palette, vec![big, small]);
        assert!(output.last_change < 1e-9);
    }

    #[test]
    fn moves_towards_mean() {
        let colors = [Srgb::new(100, 100, 100), Srgb::new(100, 100, 100), Srgb::new(130, 100, 100)];
        let bytes = bgra_from_colors(&colors);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let output = palette(pixels, 1, NativeKmeansOptions::new().iterations(50)).unwrap();
        assert_eq!(output.palette, vec![Srgb::new(110, 100, 100)]);
    }

    #[test]
    fn sample_cap_limits_clustered_pixels() {
        // the sample holds only 8 of the 400 pixels, so the mean moves to the sampled colors
        let bytes = random_opaque_image(20, 20, 6);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let options = NativeKmeansOptions::new().max_samples(8).seed(2).rate(1.0).iterations(1);
        let output = palette(pixels, 1, options).unwrap();

        let samples = sample(pixels, 8, 2).unwrap().points(pixels);
        let mean = samples.iter().fold([0.0; 3], |mut sum, p| {
            for c in 0..3 {
                sum[c] += p[c] / 8.0;
            }
            sum
        });
        assert_eq!(output.palette.len(), 1);
        assert_close(output.palette[0], from_point(mean), 1);
    }
}
