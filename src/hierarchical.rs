//! Agglomerative hierarchical clustering.
//!
//! Every sample starts as its own cluster and the closest pair of clusters is merged
//! until `k` clusters remain. Pairwise distances live in a condensed matrix and candidate pairs
//! in a min-heap. Merging bumps the generation of the surviving cluster, so heap entries that were
//! pushed before the merge are recognized as stale and skipped when popped.

use crate::{
    color::{from_point, Point},
    parallel::map_range,
    sample::sample,
    DistanceMetric, HierarchicalOptions, Linkage, PixelBuffer, Result,
};
use ordered_float::OrderedFloat;
use palette::Srgb;
use std::{cmp::Reverse, collections::BinaryHeap};

impl DistanceMetric {
    fn distance(self, a: &Point, b: &Point) -> f64 {
        match self {
            DistanceMetric::Euclidean => crate::color::squared_distance(a, b).sqrt(),
            DistanceMetric::Manhattan => (0..3).map(|c| (a[c] - b[c]).abs()).sum(),
        }
    }
}

impl Linkage {
    /// The Lance-Williams update: the distance from the union of `a` and `b` to a third cluster,
    /// given the distances `da` and `db` from `a` and `b` to it.
    fn combine(self, da: f64, size_a: u32, db: f64, size_b: u32) -> f64 {
        match self {
            Linkage::Single => da.min(db),
            Linkage::Complete => da.max(db),
            Linkage::Average => {
                let (na, nb) = (f64::from(size_a), f64::from(size_b));
                (na * da + nb * db) / (na + nb)
            }
        }
    }
}

/// Pairwise distances between `n` items, storing only the upper triangle.
#[derive(Debug, Clone)]
struct CondensedMatrix {
    /// The number of items.
    n: usize,
    /// Row-major upper triangle, excluding the diagonal.
    data: Vec<f64>,
}

impl CondensedMatrix {
    fn new(points: &[Point], metric: DistanceMetric) -> Self {
        let n = points.len();
        let rows = map_range(n, |i| {
            points[i + 1..]
                .iter()
                .map(|q| metric.distance(&points[i], q))
                .collect::<Vec<_>>()
        });
        Self { n, data: rows.concat() }
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        i * self.n - i * (i + 1) / 2 + (j - i - 1)
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> f64 {
        self.data[self.index(i, j)]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, distance: f64) {
        let index = self.index(i, j);
        self.data[index] = distance;
    }
}

/// A candidate merge: distance, the two cluster ids, and their generations when the entry was pushed.
type Candidate = Reverse<(OrderedFloat<f64>, u32, u32, u32, u32)>;

/// A cluster of points, tracked by the sum of its members.
#[derive(Debug, Clone, Copy)]
struct Cluster {
    /// The per-channel sum of the members.
    sum: Point,
    /// The number of members.
    size: u32,
    /// Incremented on every merge into this cluster so older heap entries can be skipped.
    generation: u32,
    /// False once merged into another cluster.
    active: bool,
}

/// Merges the closest clusters of `points` until `k` remain, returning the remaining clusters.
#[allow(clippy::cast_possible_truncation)]
fn cluster(points: &[Point], k: usize, linkage: Linkage, metric: DistanceMetric) -> Vec<Cluster> {
    let n = points.len();
    let mut matrix = CondensedMatrix::new(points, metric);
    let mut clusters = points
        .iter()
        .map(|&sum| Cluster { sum, size: 1, generation: 0, active: true })
        .collect::<Vec<_>>();

    let mut heap = BinaryHeap::<Candidate>::from(
        (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .map(|(i, j)| Reverse((OrderedFloat(matrix.get(i, j)), i as u32, j as u32, 0, 0)))
            .collect::<Vec<_>>(),
    );

    let mut remaining = n;
    let mut stale = 0u64;
    while remaining > k.max(1) {
        let Some(Reverse((_, a, b, gen_a, gen_b))) = heap.pop() else {
            break;
        };
        let (a, b) = (a as usize, b as usize);
        let (ca, cb) = (clusters[a], clusters[b]);
        if !ca.active || !cb.active || ca.generation != gen_a || cb.generation != gen_b {
            stale += 1;
            continue;
        }

        for c in 0..n {
            if c == a || c == b || !clusters[c].active {
                continue;
            }
            let distance = linkage.combine(matrix.get(a, c), ca.size, matrix.get(b, c), cb.size);
            matrix.set(a, c, distance);
        }

        let merged = &mut clusters[a];
        for c in 0..3 {
            merged.sum[c] += cb.sum[c];
        }
        merged.size += cb.size;
        merged.generation += 1;
        clusters[b].active = false;
        remaining -= 1;

        let gen_a = clusters[a].generation;
        for (c, other) in clusters.iter().enumerate() {
            if c != a && other.active {
                let (i, j, gen_i, gen_j) = if a < c {
                    (a, c, gen_a, other.generation)
                } else {
                    (c, a, other.generation, gen_a)
                };
                heap.push(Reverse((OrderedFloat(matrix.get(i, j)), i as u32, j as u32, gen_i, gen_j)));
            }
        }
    }

    tracing::debug!(clusters = remaining, stale, "agglomerative clustering finished");
    clusters.retain(|c| c.active);
    clusters
}

/// Computes a palette from the mean colors of the clusters left after agglomerating a sample down to `k`.
pub fn palette(pixels: PixelBuffer, k: usize, options: HierarchicalOptions) -> Result<Vec<Srgb<u8>>> {
    let samples = sample(pixels, options.max_samples, options.seed)?;
    let points = samples.points(pixels);
    let clusters = cluster(&points, k, options.linkage, options.distance);
    Ok(clusters
        .into_iter()
        .map(|c| {
            let n = f64::from(c.size);
            from_point(c.sum.map(|s| s / n))
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn line(xs: &[f64]) -> Vec<Point> {
        xs.iter().map(|&x| [x, 0.0, 0.0]).collect()
    }

    fn sizes(clusters: &[Cluster]) -> Vec<u32> {
        let mut sizes = clusters.iter().map(|c| c.size).collect::<Vec<_>>();
        sizes.sort_unstable();
        sizes
    }

    #[test]
    fn condensed_index_is_symmetric() {
        let points = line(&[0.0, 1.0, 3.0, 6.0]);
        let matrix = CondensedMatrix::new(&points, DistanceMetric::Euclidean);
        assert_eq!(matrix.data, vec![1.0, 3.0, 6.0, 2.0, 5.0, 3.0]);
        assert_eq!(matrix.get(3, 1), 5.0);
        assert_eq!(matrix.get(1, 3), 5.0);
    }

    #[test]
    fn manhattan_sums_axes() {
        assert_eq!(DistanceMetric::Manhattan.distance(&[0.0, 0.0, 0.0], &[1.0, -2.0, 3.0]), 6.0);
        assert_eq!(DistanceMetric::Euclidean.distance(&[0.0, 0.0, 0.0], &[3.0, 4.0, 0.0]), 5.0);
    }

    #[test]
    fn single_linkage_chains() {
        // single linkage joins the evenly spaced chain before the isolated point
        let points = line(&[0.0, 10.0, 20.0, 30.0, 45.0]);
        let clusters = cluster(&points, 2, Linkage::Single, DistanceMetric::Euclidean);
        assert_eq!(sizes(&clusters), vec![1, 4]);
    }

    #[test]
    fn complete_linkage_balances() {
        let points = line(&[0.0, 10.0, 20.0, 30.0, 45.0]);
        let clusters = cluster(&points, 2, Linkage::Complete, DistanceMetric::Euclidean);
        assert_eq!(sizes(&clusters), vec![2, 3]);
    }

    #[test]
    fn average_linkage_weights_by_size() {
        assert_eq!(Linkage::Average.combine(2.0, 3, 6.0, 1), 3.0);
    }

    #[test]
    fn average_linkage_splits_where_single_chains() {
        // gaps of 9, 10, 11 and 14: the last point is closer on average to {19, 30} than {0, 9} is
        let points = line(&[0.0, 9.0, 19.0, 30.0, 44.0]);
        let single = cluster(&points, 2, Linkage::Single, DistanceMetric::Euclidean);
        assert_eq!(sizes(&single), vec![1, 4]);

        let average = cluster(&points, 2, Linkage::Average, DistanceMetric::Euclidean);
        assert_eq!(sizes(&average), vec![2, 3]);
        let mut sums = average.iter().map(|c| c.sum[0]).collect::<Vec<_>>();
        sums.sort_by(f64::total_cmp);
        assert_eq!(sums, vec![9.0, 93.0]);
    }

    #[test]
    fn palette_is_cluster_means() {
        let colors = [Srgb::new(0, 0, 0), Srgb::new(2, 2, 2), Srgb::new(200, 200, 200)];
        let bytes = bgra_from_colors(&colors);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let mut result = palette(pixels, 2, HierarchicalOptions::new()).unwrap();
        result.sort_by_key(|c| c.red);
        assert_eq!(result, vec![Srgb::new(1, 1, 1), Srgb::new(200, 200, 200)]);
    }
}
