//! Weighted max-min seeding followed by a few rounds of k-means.
//!
//! The first centroid is the most frequent sampled color.
//! Each following centroid is the sample farthest from all centroids so far,
//! preferring the more frequent color among near-equal candidates.

use crate::{
    color::{from_point, pack, squared_distance, Point},
    kmeans::{lloyd, EmptyCluster},
    parallel::{for_each_mut, partition_reduce},
    popularity::most_frequent,
    sample::sample,
    MaxMinOptions, PixelBuffer, Progress, Result,
};
use palette::Srgb;
use std::collections::HashMap;

/// Candidates within this distance of the maximum are considered tied.
const TIE_EPSILON: f64 = 1e-3;

/// Picks up to `k` centroids by weighted max-min seeding.
fn seed(points: &[Point], colors: &[Srgb<u8>], k: usize) -> Vec<Point> {
    let mut frequency = HashMap::<u32, u32>::new();
    for &color in colors {
        *frequency.entry(pack(color)).or_default() += 1;
    }
    let weight = |i: usize| frequency.get(&pack(colors[i])).copied().unwrap_or(0);

    let Some(&(first_rgb, _)) = most_frequent(&frequency, 1).first() else {
        return Vec::new();
    };
    let first = colors.iter().position(|&c| pack(c) == first_rgb).unwrap_or(0);

    let mut centroids = vec![points[first]];
    let mut min_distance = points.iter().map(|p| squared_distance(p, &points[first])).collect::<Vec<_>>();

    while centroids.len() < k {
        let max = partition_reduce(&min_distance, || 0.0, |m: f64, &d| m.max(d), f64::max);
        if max <= 0.0 {
            tracing::debug!(centroids = centroids.len(), "every sample is already a centroid");
            break;
        }

        let mut best = None;
        for (i, &d) in min_distance.iter().enumerate() {
            if (d - max).abs() < TIE_EPSILON && best.map_or(true, |b| weight(i) > weight(b)) {
                best = Some(i);
            }
        }
        let Some(best) = best else {
            break;
        };

        let center = points[best];
        centroids.push(center);
        for_each_mut(&mut min_distance, |i, d| {
            *d = d.min(squared_distance(&points[i], &center));
        });
    }

    centroids
}

/// Computes a palette by max-min seeding and then refining the seeds with Lloyd iterations.
///
/// Seeding stops early once every sample coincides with a centroid.
pub fn palette(pixels: PixelBuffer, k: usize, options: MaxMinOptions) -> Result<Vec<Srgb<u8>>> {
    let samples = sample(pixels, options.max_samples, options.seed)?;
    let colors = samples.colors(pixels);
    let points = samples.points(pixels);

    let mut centroids = seed(&points, &colors, k);
    lloyd(
        &points,
        &mut centroids,
        options.kmeans_iterations,
        0.0,
        EmptyCluster::Keep,
        Progress::NONE,
    );

    Ok(centroids.into_iter().map(from_point).collect())
}
