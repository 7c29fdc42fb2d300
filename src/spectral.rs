//! Spectral clustering on a k-nearest neighbor similarity graph in Lab space.
//!
//! The `k - 1` smallest nontrivial eigenvectors of the normalized graph Laplacian
//! `I - D^-1/2 W D^-1/2`, capped at three, embed each sample in a low dimensional space,
//! and k-means on that embedding decides the clusters.
//! The eigenvectors are found by power iteration on `I + D^-1/2 W D^-1/2`, whose eigenvalues lie in `[0, 2]`,
//! so its largest eigenvectors are the smallest eigenvectors of the Laplacian
//! regardless of how uneven the vertex degrees are.

use crate::{
    color::{from_point, squared_distance, to_lab, to_point, Point},
    kmeans::{lloyd, plus_plus, EmptyCluster},
    nearest::NearestTable,
    parallel::map_range,
    sample::sample,
    PixelBuffer, Progress, Result, SpectralOptions,
};
use ordered_float::OrderedFloat;
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// A vector norm below which power iteration stops.
const MIN_NORM: f64 = 1e-8;
/// Power iteration stops once a step moves the unit vector by less than this.
const TOLERANCE: f64 = 1e-9;
/// The largest number of eigenvectors used for the embedding.
const MAX_DIMENSIONS: usize = 3;

/// A symmetric sparse similarity graph stored as adjacency lists.
#[derive(Debug, Clone)]
struct Graph {
    /// The neighbors of each point and the edge weights.
    adjacency: Vec<Vec<(u32, f64)>>,
    /// The weighted degree of each point.
    degrees: Vec<f64>,
}

impl Graph {
    /// Connects every point to its `neighbors` nearest points, weighting edges by a Gaussian of their length.
    /// An edge is kept if either endpoint picked the other.
    #[allow(clippy::cast_possible_truncation)]
    fn knn(points: &[Point], neighbors: usize, sigma: f64) -> Self {
        let n = points.len();
        let two_sigma_sq = 2.0 * sigma * sigma;

        let nearest = map_range(n, |i| {
            let mut dist = points
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(j, q)| (OrderedFloat(squared_distance(&points[i], q)), j as u32))
                .collect::<Vec<_>>();
            let take = neighbors.min(dist.len());
            if take > 0 && take < dist.len() {
                dist.select_nth_unstable(take - 1);
            }
            dist.truncate(take);
            dist
        });

        let mut edges = nearest
            .into_iter()
            .enumerate()
            .flat_map(|(i, near)| {
                let i = i as u32;
                near.into_iter().map(move |(d, j)| (i.min(j), i.max(j), d))
            })
            .collect::<Vec<_>>();
        edges.sort_unstable_by_key(|&(i, j, _)| (i, j));
        edges.dedup_by_key(|&mut (i, j, _)| (i, j));

        let mut adjacency = vec![Vec::new(); n];
        let mut degrees = vec![0.0; n];
        for (i, j, OrderedFloat(d)) in edges {
            let w = (-d / two_sigma_sq).exp();
            adjacency[i as usize].push((j, w));
            adjacency[j as usize].push((i, w));
            degrees[i as usize] += w;
            degrees[j as usize] += w;
        }

        Self { adjacency, degrees }
    }

    /// Returns `1 / sqrt(degree)` for each point, or `0` for points without any edge weight.
    fn inverse_sqrt_degrees(&self) -> Vec<f64> {
        self.degrees
            .iter()
            .map(|&d| if d > 0.0 { d.sqrt().recip() } else { 0.0 })
            .collect()
    }

    /// Computes `(I + D^-1/2 W D^-1/2) v`.
    fn normalized_product(&self, inv_sqrt: &[f64], v: &[f64]) -> Vec<f64> {
        map_range(v.len(), |i| {
            let neighbors = self.adjacency[i]
                .iter()
                .map(|&(j, w)| w * inv_sqrt[j as usize] * v[j as usize])
                .sum::<f64>();
            v[i] + inv_sqrt[i] * neighbors
        })
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Removes the components of `v` along each of the orthonormal `basis` vectors.
fn deflate(v: &mut [f64], basis: &[Vec<f64>]) {
    for u in basis {
        let d = dot(v, u);
        for (x, y) in v.iter_mut().zip(u) {
            *x -= d * y;
        }
    }
}

/// Returns `false` if `v` is too short to normalize.
fn normalize(v: &mut [f64]) -> bool {
    let norm = dot(v, v).sqrt();
    if norm < MIN_NORM {
        return false;
    }
    for x in v {
        *x /= norm;
    }
    true
}

/// Finds up to `count` of the smallest nontrivial eigenvectors of the normalized Laplacian.
///
/// The trivial eigenvector is proportional to the square root of the degrees and is deflated from every iterate.
/// Each vector runs until it stops moving or `iterations` steps have passed,
/// and is returned scaled by `D^-1/2` so that it is constant over each connected component.
fn eigenvectors(graph: &Graph, count: usize, iterations: u32, rng: &mut Xoroshiro128PlusPlus) -> Vec<Vec<f64>> {
    let n = graph.degrees.len();
    let inv_sqrt = graph.inverse_sqrt_degrees();

    let mut trivial = graph.degrees.iter().map(|d| d.sqrt()).collect::<Vec<_>>();
    if !normalize(&mut trivial) {
        tracing::debug!(points = n, "similarity graph has no edges, skipping the embedding");
        return Vec::new();
    }

    let mut basis = vec![trivial];
    for _ in 0..count {
        let mut v = (0..n).map(|_| rng.gen::<f64>() - 0.5).collect::<Vec<_>>();
        deflate(&mut v, &basis);
        if !normalize(&mut v) {
            break;
        }

        let mut steps = 0;
        while steps < iterations {
            steps += 1;
            let mut next = graph.normalized_product(&inv_sqrt, &v);
            deflate(&mut next, &basis);
            if !normalize(&mut next) {
                tracing::debug!(steps, "power iteration collapsed to zero, stopping early");
                break;
            }
            let moved = next.iter().zip(&v).map(|(a, b)| (a - b) * (a - b)).sum::<f64>().sqrt();
            v = next;
            if moved < TOLERANCE {
                break;
            }
        }
        tracing::trace!(dimension = basis.len(), steps, "eigenvector converged");

        basis.push(v);
    }

    basis
        .into_iter()
        .skip(1)
        .map(|v| v.iter().zip(&inv_sqrt).map(|(x, s)| x * s).collect())
        .collect()
}

/// Computes a palette from the mean sRGB colors of the clusters found by spectral clustering of a sample.
pub fn palette(pixels: PixelBuffer, k: usize, options: SpectralOptions) -> Result<Vec<Srgb<u8>>> {
    let samples = sample(pixels, options.max_samples, options.seed)?;
    let colors = samples.colors(pixels);
    let lab = colors.iter().map(|&c| to_lab(c)).collect::<Vec<_>>();

    let graph = Graph::knn(&lab, options.neighbors as usize, options.sigma);
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(options.seed);
    let dimensions = k.saturating_sub(1).min(MAX_DIMENSIONS);
    let vectors = eigenvectors(&graph, dimensions, options.power_iterations, &mut rng);
    tracing::debug!(samples = lab.len(), dimensions = vectors.len(), "computed spectral embedding");

    let embedding = (0..lab.len())
        .map(|i| {
            let mut p = [0.0; MAX_DIMENSIONS];
            for (x, v) in p.iter_mut().zip(&vectors) {
                *x = v[i];
            }
            p
        })
        .collect::<Vec<_>>();

    let mut centroids = plus_plus(&embedding, k, &mut rng, Progress::NONE);
    lloyd(&embedding, &mut centroids, options.kmeans_iterations, 0.0, EmptyCluster::Keep, Progress::NONE);

    let table = NearestTable::new(&centroids);
    let mut sums = vec![([0.0; 3], 0u32); centroids.len()];
    for (p, &color) in embedding.iter().zip(&colors) {
        let (sum, count) = &mut sums[table.nearest(p)];
        let rgb = to_point(color);
        for c in 0..3 {
            sum[c] += rgb[c];
        }
        *count += 1;
    }

    Ok(sums
        .into_iter()
        .filter(|&(_, count)| count > 0)
        .map(|(sum, count)| {
            let n = f64::from(count);
            from_point(sum.map(|s| s / n))
        })
        .collect())
}
