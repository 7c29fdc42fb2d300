//! Mean-shift mode seeking with a Gaussian kernel.
//!
//! Every sample is shifted towards the weighted mean of the original samples around it.
//! Shifted points that end up within half a bandwidth of each other are merged into one mode,
//! and the `k` modes with the most members become the palette.

use crate::{
    color::{from_point, squared_distance, Point},
    grid::Grid,
    parallel::map,
    sample::sample,
    MeanShiftOptions, PixelBuffer, Result,
};
use palette::Srgb;
use std::collections::HashMap;

/// Moves `center` to the Gaussian weighted mean of the points within `bandwidth` of it.
fn shift(grid: &Grid, points: &[Point], center: &Point, bandwidth: f64) -> Point {
    let bandwidth_sq = bandwidth * bandwidth;
    let mut sum = [0.0; 3];
    let mut total = 0.0;

    grid.for_each_nearby(center, |j| {
        let p = &points[j];
        let dist = squared_distance(center, p);
        if dist <= bandwidth_sq {
            let weight = (-dist / (2.0 * bandwidth_sq)).exp();
            for c in 0..3 {
                sum[c] += p[c] * weight;
            }
            total += weight;
        }
    });

    if total > 0.0 {
        sum.map(|s| s / total)
    } else {
        *center
    }
}

/// A mode found by mean-shift, holding the sum of its members' original colors.
#[derive(Debug, Clone)]
struct Mode {
    /// Where the first member converged.
    position: Point,
    /// The per-channel sum of the members' original colors.
    sum: Point,
    /// The number of members.
    members: u32,
}

/// Merges each shifted point into the first mode within `radius` of it, creating modes as needed.
#[allow(clippy::cast_possible_truncation)]
fn merge_modes(shifted: &[Point], points: &[Point], radius: f64) -> Vec<Mode> {
    let cell = radius.max(1.0);
    let key = |p: &Point| p.map(|c| (c / cell).floor() as i64);
    let radius_sq = radius * radius;

    let mut modes = Vec::<Mode>::new();
    let mut buckets = HashMap::<[i64; 3], Vec<usize>>::new();

    for (s, p) in shifted.iter().zip(points) {
        let [x, y, z] = key(s);
        let mut found = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    for &m in buckets.get(&[x + dx, y + dy, z + dz]).into_iter().flatten() {
                        if squared_distance(s, &modes[m].position) < radius_sq && found.map_or(true, |f| m < f) {
                            found = Some(m);
                        }
                    }
                }
            }
        }

        let m = found.unwrap_or_else(|| {
            modes.push(Mode { position: *s, sum: [0.0; 3], members: 0 });
            buckets.entry(key(s)).or_default().push(modes.len() - 1);
            modes.len() - 1
        });

        let mode = &mut modes[m];
        for c in 0..3 {
            mode.sum[c] += p[c];
        }
        mode.members += 1;
    }

    modes
}

/// Computes a palette from the `k` most populated mean-shift modes of a sample.
pub fn palette(pixels: PixelBuffer, k: usize, options: MeanShiftOptions) -> Result<Vec<Srgb<u8>>> {
    let samples = sample(pixels, options.max_samples, options.seed)?;
    let points = samples.points(pixels);
    let bandwidth = options.bandwidth.max(f64::EPSILON);
    let grid = Grid::new(&points, bandwidth / 2.0);

    let mut shifted = points.clone();
    for _ in 0..options.max_iterations {
        shifted = map(&shifted, |center| shift(&grid, &points, center, bandwidth));
    }

    let mut modes = merge_modes(&shifted, &points, bandwidth / 2.0);
    tracing::debug!(modes = modes.len(), samples = points.len(), "mean-shift converged");

    modes.sort_by(|a, b| b.members.cmp(&a.members));
    Ok(modes
        .into_iter()
        .take(k)
        .map(|mode| {
            let n = f64::from(mode.members);
            from_point(mode.sum.map(|s| s / n))
        })
        .collect())
}
