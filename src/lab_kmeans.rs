//! Lloyd's algorithm in CIELAB space, seeded with the popularity palette.

use crate::{
    color::{lab_to_srgb, to_lab},
    kmeans::{lloyd, EmptyCluster, KmeansOutput},
    popularity,
    sample::sample,
    KmeansOptions, PixelBuffer, PopularityOptions, Progress, Result,
};

/// Refines the `k` most frequent colors with k-means over a sample, measuring distance in Lab space.
///
/// A centroid that loses all of its points moves to the point farthest from the others.
pub fn palette(pixels: PixelBuffer, k: usize, options: KmeansOptions) -> Result<KmeansOutput> {
    let seeds = popularity::palette(pixels, k, PopularityOptions::new())?;
    let samples = sample(pixels, options.max_samples, options.seed)?;
    let points = samples.colors(pixels).into_iter().map(to_lab).collect::<Vec<_>>();

    let mut centroids = seeds.into_iter().map(to_lab).collect::<Vec<_>>();
    let last_change = lloyd(
        &points,
        &mut centroids,
        options.max_iterations,
        options.threshold,
        EmptyCluster::Farthest,
        Progress::NONE,
    );

    tracing::debug!(k, samples = points.len(), last_change, "Lab k-means finished");

    Ok(KmeansOutput {
        palette: centroids.into_iter().map(lab_to_srgb).collect(),
        last_change,
    })
}
