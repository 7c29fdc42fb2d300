//! DBSCAN density clustering.
//!
//! Points with at least `min_points` neighbors within `epsilon` are core points.
//! Clusters grow outwards from core points; points reachable only through a core point become border
//! points and points reachable from none are noise. The `k` largest clusters become the palette.

use crate::{
    color::{from_point, Point},
    grid::{estimate_epsilon, Grid},
    sample::sample,
    DensityOptions, PixelBuffer, Result,
};
use palette::Srgb;
use std::collections::VecDeque;

/// The state of a point during clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    /// Not yet reached.
    Unvisited,
    /// Too sparse to belong to a cluster, so far.
    Noise,
    /// A member of the cluster with the given id.
    Cluster(u32),
}

/// The neighborhood radius to use: the configured one, or an estimate from the data.
pub(crate) fn epsilon(points: &[Point], options: &DensityOptions) -> f64 {
    options.epsilon.unwrap_or_else(|| {
        let epsilon = estimate_epsilon(points, options.min_points as usize);
        tracing::debug!(epsilon, "estimated neighborhood radius");
        epsilon
    })
}

/// Labels each point with its cluster, returning the labels and the number of clusters.
fn label(points: &[Point], epsilon: f64, min_points: usize) -> (Vec<Label>, u32) {
    let grid = Grid::new(points, epsilon);
    let mut labels = vec![Label::Unvisited; points.len()];
    let mut clusters = 0;
    let mut queue = VecDeque::new();

    for i in 0..points.len() {
        if labels[i] != Label::Unvisited {
            continue;
        }

        let neighbors = grid.within(i, epsilon);
        if neighbors.len() < min_points {
            labels[i] = Label::Noise;
            continue;
        }

        let id = Label::Cluster(clusters);
        clusters += 1;
        labels[i] = id;
        queue.extend(neighbors);

        while let Some(j) = queue.pop_front() {
            match labels[j] {
                Label::Noise => labels[j] = id,
                Label::Unvisited => {
                    labels[j] = id;
                    let neighbors = grid.within(j, epsilon);
                    if neighbors.len() >= min_points {
                        queue.extend(neighbors);
                    }
                }
                Label::Cluster(_) => {}
            }
        }
    }

    (labels, clusters)
}

/// Computes a palette from the mean colors of the `k` largest DBSCAN clusters of a sample.
///
/// If no cluster is found, all samples are treated as a single cluster.
pub fn palette(pixels: PixelBuffer, k: usize, options: DensityOptions) -> Result<Vec<Srgb<u8>>> {
    let samples = sample(pixels, options.max_samples, options.seed)?;
    let points = samples.points(pixels);
    let epsilon = epsilon(&points, &options);

    let (labels, clusters) = label(&points, epsilon, options.min_points as usize);

    let mut sums = vec![([0.0; 3], 0u32); (clusters as usize).max(1)];
    for (p, label) in points.iter().zip(&labels) {
        let id = match label {
            Label::Cluster(id) => *id as usize,
            _ if clusters == 0 => 0,
            _ => continue,
        };
        let (sum, count) = &mut sums[id];
        for c in 0..3 {
            sum[c] += p[c];
        }
        *count += 1;
    }

    if clusters == 0 {
        tracing::debug!(epsilon, "no dense region found, using one cluster for all samples");
    } else {
        tracing::debug!(epsilon, clusters, "found density clusters");
    }

    sums.sort_by(|(_, a), (_, b)| b.cmp(a));
    Ok(sums
        .into_iter()
        .filter(|&(_, count)| count > 0)
        .take(k)
        .map(|(sum, count)| {
            let n = f64::from(count);
            from_point(sum.map(|s| s / n))
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn labels_core_border_and_noise() {
        let mut points = (0..5).map(|i| [f64::from(i), 0.0, 0.0]).collect::<Vec<_>>();
        points.push([7.0, 0.0, 0.0]);
        points.push([100.0, 100.0, 100.0]);
        let (labels, clusters) = label(&points, 3.0, 3);
        assert_eq!(clusters, 1);
        assert!(labels[..5].iter().all(|&l| l == Label::Cluster(0)));
        // 7 is within 3 of the core point 4
        assert_eq!(labels[5], Label::Cluster(0));
        assert_eq!(labels[6], Label::Noise);
    }

    #[test]
    fn separates_dense_groups() {
        let a = Srgb::new(10, 120, 10);
        let b = Srgb::new(240, 20, 120);
        let bytes = two_cluster_image(a, b, 300, 3);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let mut result = palette(pixels, 4, DensityOptions::new().epsilon(10.0)).unwrap();
        result.sort_by_key(|c| c.red);
        assert_eq!(result.len(), 2);
        assert_close(result[0], a, 3);
        assert_close(result[1], b, 3);
    }

    #[test]
    fn falls_back_to_one_cluster() {
        let colors = [Srgb::new(0, 0, 0), Srgb::new(100, 100, 100), Srgb::new(200, 200, 200)];
        let bytes = bgra_from_colors(&colors);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let result = palette(pixels, 3, DensityOptions::new().epsilon(5.0)).unwrap();
        assert_eq!(result, vec![Srgb::new(100, 100, 100)]);
    }
}
