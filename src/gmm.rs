//! Gaussian mixture model with diagonal covariances, fit by expectation maximization.
//!
//! The means start at k-means++ seeds with a shared variance and uniform weights.
//! Each iteration computes the responsibilities of every component for every sample in log space
//! and accumulates the weighted moments in the same parallel pass, so the responsibilities are never stored.

use crate::{
    color::{from_point, Point},
    kmeans::plus_plus,
    parallel::partition_reduce,
    sample::sample,
    GmmOptions, PixelBuffer, Progress, Result,
};
use palette::Srgb;
use rand::SeedableRng;
use rand_xoshiro::Xoroshiro128PlusPlus;
use std::{array, f64::consts::TAU};

/// The initial variance of every component along each axis.
const INITIAL_VARIANCE: f64 = 400.0;
/// The smallest variance a component may have along any axis.
const MIN_VARIANCE: f64 = 16.0;
/// The smallest total responsibility a component may have.
const MIN_RESPONSIBILITY: f64 = 1e-8;

/// A Gaussian with a diagonal covariance matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Component {
    /// The mixing weight.
    weight: f64,
    /// The center.
    mean: Point,
    /// The variance along each channel.
    variance: Point,
}

impl Component {
    /// The log of the weighted density of this component at `p`.
    fn log_density(&self, p: &Point) -> f64 {
        let mut log_det = 0.0;
        let mut dist = 0.0;
        for c in 0..3 {
            let d = p[c] - self.mean[c];
            dist += d * d / self.variance[c];
            log_det += self.variance[c].ln();
        }
        self.weight.ln() - 0.5 * (3.0 * TAU.ln() + log_det + dist)
    }
}

/// Responsibility weighted sums for one component: total, first moment, and second moment.
type Moments = (f64, Point, Point);

/// The per-partition state of an expectation step.
#[derive(Debug, Clone)]
struct Expectation {
    /// The moments of each component.
    moments: Vec<Moments>,
    /// The summed log-likelihood of the points seen so far.
    log_likelihood: f64,
    /// Per-component log densities of the current point.
    scratch: Vec<f64>,
}

impl Expectation {
    fn new(k: usize) -> Self {
        Self {
            moments: vec![(0.0, [0.0; 3], [0.0; 3]); k],
            log_likelihood: 0.0,
            scratch: vec![0.0; k],
        }
    }

    fn add(mut self, components: &[Component], p: &Point) -> Self {
        for (log, component) in self.scratch.iter_mut().zip(components) {
            *log = component.log_density(p);
        }

        let max = self.scratch.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let total = self.scratch.iter().map(|&log| (log - max).exp()).sum::<f64>();
        let log_total = max + total.ln();
        self.log_likelihood += log_total;

        for ((weight, sum, sum_sq), &log) in self.moments.iter_mut().zip(&self.scratch) {
            let r = (log - log_total).exp();
            *weight += r;
            for c in 0..3 {
                sum[c] += r * p[c];
                sum_sq[c] += r * p[c] * p[c];
            }
        }

        self
    }

    fn merge(mut self, other: Self) -> Self {
        for ((w, s, sq), (ow, os, osq)) in self.moments.iter_mut().zip(other.moments) {
            *w += ow;
            for c in 0..3 {
                s[c] += os[c];
                sq[c] += osq[c];
            }
        }
        self.log_likelihood += other.log_likelihood;
        self
    }
}

/// Runs one expectation and maximization step, returning the log-likelihood of the components
/// as they were before the update.
#[allow(clippy::cast_precision_loss)]
fn step(points: &[Point], components: &mut [Component]) -> f64 {
    let k = components.len();
    let expectation = partition_reduce(
        points,
        || Expectation::new(k),
        |e, p| e.add(components, p),
        Expectation::merge,
    );

    let n = points.len() as f64;
    for (component, &(weight, sum, sum_sq)) in components.iter_mut().zip(&expectation.moments) {
        let weight = weight.max(MIN_RESPONSIBILITY);
        let mean = sum.map(|s| s / weight);
        component.weight = weight / n;
        component.mean = mean;
        component.variance = array::from_fn(|c| (sum_sq[c] / weight - mean[c] * mean[c]).max(MIN_VARIANCE));
    }

    expectation.log_likelihood
}

/// Computes a palette from the means of a Gaussian mixture fit to a sample.
pub fn palette(pixels: PixelBuffer, k: usize, options: GmmOptions) -> Result<Vec<Srgb<u8>>> {
    let samples = sample(pixels, options.max_samples, options.seed)?;
    let points = samples.points(pixels);

    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(options.seed);
    #[allow(clippy::cast_precision_loss)]
    let weight = 1.0 / k.max(1) as f64;
    let mut components = plus_plus(&points, k, &mut rng, Progress::NONE)
        .into_iter()
        .map(|mean| Component { weight, mean, variance: [INITIAL_VARIANCE; 3] })
        .collect::<Vec<_>>();

    let mut previous = f64::NEG_INFINITY;
    for iteration in 0..options.max_iterations {
        let log_likelihood = step(&points, &mut components);
        let delta = (log_likelihood - previous).abs();
        tracing::trace!(iteration, log_likelihood, delta, "expectation maximization step");
        if delta < options.tolerance {
            break;
        }
        previous = log_likelihood;
    }

    Ok(components.into_iter().map(|c| from_point(c.mean)).collect())
}
