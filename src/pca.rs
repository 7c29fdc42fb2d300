//! Palette selection along the principal axis of the sampled colors.
//!
//! The dominant eigenvector of the 3x3 color covariance matrix is found by power iteration.
//! Samples are ranked by their projection onto it and `k` evenly spaced ranks are picked.

use crate::{
    color::Point,
    parallel::{map, partition_reduce},
    sample::sample,
    PcaOptions, PixelBuffer, Result,
};
use ordered_float::OrderedFloat;
use palette::Srgb;
use std::collections::HashSet;

/// Power iteration stops once no component of the axis moves more than this.
const CONVERGENCE: f64 = 1e-6;

/// Power iteration stops if the matrix maps the axis to a vector shorter than this.
const MIN_NORM: f64 = 1e-8;

/// The upper triangle of a symmetric 3x3 matrix: `xx, xy, xz, yy, yz, zz`.
type Sym3 = [f64; 6];

fn mean(points: &[Point]) -> Point {
    #[allow(clippy::cast_precision_loss)]
    let n = points.len().max(1) as f64;
    partition_reduce(
        points,
        || [0.0; 3],
        |[r, g, b], p| [r + p[0], g + p[1], b + p[2]],
        |a, b| [a[0] + b[0], a[1] + b[1], a[2] + b[2]],
    )
    .map(|s| s / n)
}

fn covariance(points: &[Point], mean: Point) -> Sym3 {
    #[allow(clippy::cast_precision_loss)]
    let n = points.len().max(1) as f64;
    partition_reduce(
        points,
        || [0.0; 6],
        |mut acc: Sym3, p| {
            let [x, y, z] = [p[0] - mean[0], p[1] - mean[1], p[2] - mean[2]];
            for (a, v) in acc.iter_mut().zip([x * x, x * y, x * z, y * y, y * z, z * z]) {
                *a += v;
            }
            acc
        },
        |a, b| std::array::from_fn(|i| a[i] + b[i]),
    )
    .map(|s| s / n)
}

/// Finds the dominant eigenvector of `m` starting from `(1, 1, 1)`.
fn dominant_axis(m: Sym3, iterations: u32) -> Point {
    let [xx, xy, xz, yy, yz, zz] = m;
    let mut v = [1.0, 1.0, 1.0];

    for _ in 0..iterations {
        let w = [
            xx * v[0] + xy * v[1] + xz * v[2],
            xy * v[0] + yy * v[1] + yz * v[2],
            xz * v[0] + yz * v[1] + zz * v[2],
        ];

        let norm = w.iter().map(|c| c * c).sum::<f64>().sqrt();
        if norm < MIN_NORM {
            tracing::debug!("covariance is degenerate, keeping the current axis");
            break;
        }

        let w = w.map(|c| c / norm);
        let converged = w.iter().zip(&v).all(|(a, b)| (a - b).abs() < CONVERGENCE);
        v = w;
        if converged {
            break;
        }
    }

    v
}

/// Picks `k` samples at evenly spaced ranks along the principal axis.
///
/// A sample is never picked twice; if a rank is already taken, the next free rank is used.
pub fn palette(pixels: PixelBuffer, k: usize, options: PcaOptions) -> Result<Vec<Srgb<u8>>> {
    let samples = sample(pixels, options.max_samples, options.seed)?;
    let points = samples.points(pixels);
    let n = points.len();

    let mean = mean(&points);
    let axis = dominant_axis(covariance(&points, mean), options.power_iterations);

    let projections = map(&points, |p| {
        OrderedFloat((p[0] - mean[0]) * axis[0] + (p[1] - mean[1]) * axis[1] + (p[2] - mean[2]) * axis[2])
    });
    let mut order = (0..n).collect::<Vec<_>>();
    order.sort_by_key(|&i| (projections[i], i));

    let mut used = HashSet::with_capacity(k);
    let mut colors = Vec::with_capacity(k);
    for i in 0..k {
        let mut pos = if k == 1 {
            (n - 1) / 2
        } else {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
            {
                (i as f64 / (k - 1) as f64 * (n - 1) as f64) as usize
            }
        };

        while pos < n && !used.insert(order[pos]) {
            pos += 1;
        }

        colors.push(pixels.color_at(samples[order[pos.min(n - 1)]]));
    }

    Ok(colors)
}
