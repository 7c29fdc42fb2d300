//! k-means clustering: k-means++ seeding and Lloyd's algorithm.
//!
//! The building blocks here are generic over the number of dimensions
//! so they also serve the Lab, spectral, and Gaussian mixture strategies.
//!
//! Each Lloyd iteration assigns every point to its nearest centroid in parallel,
//! accumulating per-partition sums that are merged before the centroids move.
//! A centroid that loses all of its points is moved to the point farthest from every other centroid.

use crate::{
    color::{from_point, squared_distance},
    nearest::NearestTable,
    parallel::{argmax_by_key, for_each_mut, map, partition_reduce},
    sample::sample,
    KmeansOptions, PixelBuffer, Progress, Result,
};
use ordered_float::OrderedFloat;
use palette::Srgb;
use rand::{distributions::Distribution, Rng, SeedableRng};
use rand_distr::WeightedIndex;
use rand_xoshiro::Xoroshiro128PlusPlus;

/// The result of an iterative palette method.
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansOutput {
    /// The computed palette, before finalization.
    pub palette: Vec<Srgb<u8>>,
    /// The largest change of any centroid component during the last iteration.
    pub last_change: f64,
}

/// What to do with a centroid that was assigned no points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EmptyCluster {
    /// Leave the centroid where it is.
    Keep,
    /// Move the centroid to the point farthest from all other centroids.
    Farthest,
}

/// Picks `k` initial centroids from `points` using k-means++.
///
/// The first centroid is a uniformly random point. Each following centroid is a point drawn
/// with probability proportional to its squared distance to the nearest centroid so far.
/// If every point coincides with a centroid, the first point is used.
///
/// `points` must not be empty.
pub(crate) fn plus_plus<const N: usize>(
    points: &[[f64; N]],
    k: usize,
    rng: &mut Xoroshiro128PlusPlus,
    progress: Progress,
) -> Vec<[f64; N]> {
    debug_assert!(!points.is_empty());
    if k == 0 {
        return Vec::new();
    }

    let first = points[rng.gen_range(0..points.len())];
    let mut centroids = Vec::with_capacity(k);
    centroids.push(first);

    let mut min_distance = map(points, |p| squared_distance(p, &first));

    for i in 1..k {
        let chosen = WeightedIndex::new(&min_distance).map_or(0, |dist| dist.sample(rng));
        let center = points[chosen];
        centroids.push(center);

        for_each_mut(&mut min_distance, |j, d| {
            let dist = squared_distance(&points[j], &center);
            if dist < *d {
                *d = dist;
            }
        });

        progress.report(i + 1, k);
    }

    centroids
}

/// Runs Lloyd's algorithm on `centroids` until the largest component change drops below `threshold`
/// or `max_iterations` have run, returning the largest change of the last iteration.
///
/// Progress is reported after every iteration as a fraction of `max_iterations`.
pub(crate) fn lloyd<const N: usize>(
    points: &[[f64; N]],
    centroids: &mut [[f64; N]],
    max_iterations: u32,
    threshold: f64,
    empty: EmptyCluster,
    progress: Progress,
) -> f64 {
    let k = centroids.len();
    if k == 0 || points.is_empty() {
        return 0.0;
    }

    let mut table = NearestTable::new(centroids);
    let mut last_change = 0.0;

    for iteration in 0..max_iterations {
        let sums = partition_reduce(
            points,
            || vec![([0.0; N], 0u32); k],
            |mut sums, p| {
                let (sum, count) = &mut sums[table.nearest(p)];
                for c in 0..N {
                    sum[c] += p[c];
                }
                *count += 1;
                sums
            },
            |mut a, b| {
                for ((sum, count), (other, n)) in a.iter_mut().zip(b) {
                    for c in 0..N {
                        sum[c] += other[c];
                    }
                    *count += n;
                }
                a
            },
        );

        let mut max_change = 0.0_f64;
        let mut reseeded = 0;
        for (i, &(sum, count)) in sums.iter().enumerate() {
            if count > 0 {
                let n = f64::from(count);
                for c in 0..N {
                    let mean = sum[c] / n;
                    max_change = max_change.max((mean - centroids[i][c]).abs());
                    centroids[i][c] = mean;
                }
            } else if empty == EmptyCluster::Farthest {
                if let Some(j) = farthest_from_others(points, centroids, i) {
                    centroids[i] = points[j];
                    reseeded += 1;
                }
            }
        }

        if reseeded > 0 {
            tracing::debug!(iteration, reseeded, "moved empty clusters to the farthest points");
        }
        tracing::trace!(iteration, max_change, "k-means iteration");

        last_change = max_change;
        progress.report(iteration as usize + 1, max_iterations as usize);

        if max_change < threshold {
            break;
        }

        table.update(centroids);
    }

    last_change
}

/// Finds the point whose nearest centroid, ignoring centroid `skip`, is the farthest away.
fn farthest_from_others<const N: usize>(points: &[[f64; N]], centroids: &[[f64; N]], skip: usize) -> Option<usize> {
    argmax_by_key(points.len(), |j| {
        let p = &points[j];
        let nearest = centroids
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != skip)
            .map(|(_, c)| squared_distance(p, c))
            .fold(f64::INFINITY, f64::min);
        OrderedFloat(nearest)
    })
    .map(|(j, _)| j)
}

/// Computes a palette with k-means++ seeding followed by Lloyd's algorithm over a sample.
///
/// Progress is reported after every Lloyd iteration.
pub fn palette(pixels: PixelBuffer, k: usize, options: KmeansOptions, progress: Progress) -> Result<KmeansOutput> {
    let samples = sample(pixels, options.max_samples, options.seed)?;
    let points = samples.points(pixels);

    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(options.seed);
    let mut centroids = plus_plus(&points, k, &mut rng, Progress::NONE);

    let last_change = lloyd(
        &points,
        &mut centroids,
        options.max_iterations,
        options.threshold,
        EmptyCluster::Farthest,
        progress,
    );

    tracing::debug!(k, samples = points.len(), last_change, "k-means finished");

    Ok(KmeansOutput {
        palette: centroids.into_iter().map(from_point).collect(),
        last_change,
    })
}

/// Computes a palette with k-means++ seeding alone.
///
/// Progress is reported after each centroid is picked.
pub fn plus_plus_palette(
    pixels: PixelBuffer,
    k: usize,
    options: KmeansOptions,
    progress: Progress,
) -> Result<Vec<Srgb<u8>>> {
    let samples = sample(pixels, options.max_samples, options.seed)?;
    let points = samples.points(pixels);
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(options.seed);
    let centroids = plus_plus(&points, k, &mut rng, progress);
    Ok(centroids.into_iter().map(from_point).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;
    use std::sync::mpsc;

    #[test]
    fn plus_plus_picks_distinct_points() {
        let points = [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [255.0, 0.0, 0.0], [0.0, 255.0, 0.0]];
        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(3);
        let mut centroids = plus_plus(&points, 3, &mut rng, Progress::NONE);
        centroids.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(centroids, vec![[0.0, 0.0, 0.0], [0.0, 255.0, 0.0], [255.0, 0.0, 0.0]]);
    }

    #[test]
    fn plus_plus_handles_duplicates() {
        let points = [[7.0; 3]; 5];
        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
        assert_eq!(plus_plus(&points, 3, &mut rng, Progress::NONE), vec![[7.0; 3]; 3]);
    }

    #[test]
    fn lloyd_reaches_cluster_means() {
        let points = [[0.0, 0.0], [2.0, 0.0], [100.0, 100.0], [102.0, 100.0]];
        let mut centroids = [[0.0, 0.0], [2.0, 0.0]];
        let change = lloyd(&points, &mut centroids, 10, 0.5, EmptyCluster::Farthest, Progress::NONE);
        centroids.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(centroids, [[1.0, 0.0], [101.0, 100.0]]);
        assert!(change < 0.5);
    }

    #[test]
    fn empty_cluster_moves_to_farthest_point() {
        let points = [[0.0], [1.0], [50.0]];
        let mut centroids = [[0.0], [-100.0]];
        lloyd(&points, &mut centroids, 1, 0.0, EmptyCluster::Farthest, Progress::NONE);
        assert_eq!(centroids, [[17.0], [50.0]]);

        let mut centroids = [[0.0], [-100.0]];
        lloyd(&points, &mut centroids, 1, 0.0, EmptyCluster::Keep, Progress::NONE);
        assert_eq!(centroids, [[17.0], [-100.0]]);
    }

    #[test]
    fn recovers_two_clusters() {
        let bytes = two_cluster_image(Srgb::new(30, 30, 200), Srgb::new(220, 200, 20), 2000, 5);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let (tx, rx) = mpsc::channel();
        let output = palette(pixels, 2, KmeansOptions::new(), Progress::new(&tx)).unwrap();
        drop(tx);

        let mut result = output.palette;
        result.sort_by_key(|c| c.red);
        assert_close(result[0], Srgb::new(30, 30, 200), 3);
        assert_close(result[1], Srgb::new(220, 200, 20), 3);
        assert!(output.last_change < 1.0);

        let reports = rx.iter().collect::<Vec<_>>();
        assert!(!reports.is_empty() && reports.len() < 100);
        assert!(reports.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn seeding_reports_progress() {
        let bytes = random_opaque_image(16, 16, 1);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let (tx, rx) = mpsc::channel();
        let result = plus_plus_palette(pixels, 4, KmeansOptions::new(), Progress::new(&tx)).unwrap();
        drop(tx);
        assert_eq!(result.len(), 4);
        assert_eq!(rx.iter().collect::<Vec<_>>(), vec![0.5, 0.75, 1.0]);
    }
}
