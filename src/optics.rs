//! OPTICS ordering with palette colors taken around the peaks of the reachability plot.
//!
//! Points are visited in order of increasing reachability distance from the points visited so far.
//! A local maximum in the resulting reachability sequence marks the boundary between two dense regions,
//! so the points at the `k` highest peaks serve as cluster representatives.
//! Every sample is then assigned to its nearest representative.

use crate::{
    color::{from_point, squared_distance, Point},
    dbscan::epsilon,
    grid::Grid,
    nearest::NearestTable,
    parallel::partition_reduce,
    sample::sample,
    DensityOptions, PixelBuffer, Result,
};
use bitvec::vec::BitVec;
use ordered_float::OrderedFloat;
use palette::Srgb;
use std::{cmp::Reverse, collections::BinaryHeap};

/// Computes the visiting order of the points and the reachability distance of each point.
///
/// Points that start a new region have infinite reachability.
fn ordering(points: &[Point], epsilon: f64, min_points: usize) -> (Vec<usize>, Vec<f64>) {
    let n = points.len();
    let grid = Grid::new(points, epsilon);
    let mut reachability = vec![f64::INFINITY; n];
    let mut processed: BitVec = BitVec::repeat(false, n);
    let mut order = Vec::with_capacity(n);
    let mut seeds = BinaryHeap::new();

    let min_points = min_points.max(1);
    let expand = |i: usize, reachability: &mut [f64], processed: &BitVec, seeds: &mut BinaryHeap<_>| {
        let neighbors = grid.within(i, epsilon);
        if neighbors.len() < min_points {
            return;
        }

        let mut distances = neighbors
            .iter()
            .map(|&j| OrderedFloat(squared_distance(&points[i], &points[j])))
            .collect::<Vec<_>>();
        let (_, &mut OrderedFloat(core), _) = distances.select_nth_unstable(min_points - 1);
        let core = core.sqrt();

        for &j in &neighbors {
            if processed[j] {
                continue;
            }
            let reach = core.max(squared_distance(&points[i], &points[j]).sqrt());
            if reach < reachability[j] {
                reachability[j] = reach;
                seeds.push(Reverse((OrderedFloat(reach), j)));
            }
        }
    };

    for start in 0..n {
        if processed[start] {
            continue;
        }

        processed.set(start, true);
        order.push(start);
        expand(start, &mut reachability, &processed, &mut seeds);

        while let Some(Reverse((OrderedFloat(reach), j))) = seeds.pop() {
            if processed[j] || reach > reachability[j] {
                continue;
            }
            processed.set(j, true);
            order.push(j);
            expand(j, &mut reachability, &processed, &mut seeds);
        }
    }

    (order, reachability)
}

/// Returns up to `k` points at local maxima of the reachability sequence, highest first.
///
/// If there is no local maximum, the first visited point is returned.
fn peaks(order: &[usize], reachability: &[f64], k: usize) -> Vec<usize> {
    let mut peaks = order
        .windows(3)
        .filter(|w| {
            let r = reachability[w[1]];
            r > reachability[w[0]] && r > reachability[w[2]]
        })
        .map(|w| w[1])
        .collect::<Vec<_>>();

    peaks.sort_by_key(|&i| Reverse(OrderedFloat(reachability[i])));
    peaks.truncate(k);

    if peaks.is_empty() {
        peaks.extend(order.first());
    }
    peaks
}

/// Computes a palette by assigning every sample to the nearest reachability peak
/// and taking the mean color of each group.
pub fn palette(pixels: PixelBuffer, k: usize, options: DensityOptions) -> Result<Vec<Srgb<u8>>> {
    let samples = sample(pixels, options.max_samples, options.seed)?;
    let points = samples.points(pixels);
    let epsilon = epsilon(&points, &options);

    let (order, reachability) = ordering(&points, epsilon, options.min_points as usize);
    let peaks = peaks(&order, &reachability, k);
    tracing::debug!(epsilon, peaks = peaks.len(), "computed reachability ordering");

    let centers = peaks.iter().map(|&i| points[i]).collect::<Vec<_>>();
    let table = NearestTable::new(&centers);
    let sums = partition_reduce(
        &points,
        || vec![([0.0; 3], 0u32); centers.len()],
        |mut sums, p| {
            let (sum, count) = &mut sums[table.nearest(p)];
            for c in 0..3 {
                sum[c] += p[c];
            }
            *count += 1;
            sums
        },
        |mut a, b| {
            for ((sum, count), (other, n)) in a.iter_mut().zip(b) {
                for c in 0..3 {
                    sum[c] += other[c];
                }
                *count += n;
            }
            a
        },
    );

    Ok(sums
        .into_iter()
        .filter(|&(_, count)| count > 0)
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
    fn visits_dense_points_first() {
        let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [50.0, 0.0, 0.0], [51.0, 0.0, 0.0]];
        let (order, reachability) = ordering(&points, 5.0, 1);
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert!(reachability[0].is_infinite() && reachability[3].is_infinite());
        assert!((reachability[1] - 1.0).abs() < 1e-9);
        assert!((reachability[4] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn peaks_are_local_maxima() {
        let order = [0, 1, 2, 3, 4, 5];
        let reachability = [f64::INFINITY, 1.0, 5.0, 1.0, 3.0, 2.0];
        assert_eq!(peaks(&order, &reachability, 5), vec![2, 4]);
        assert_eq!(peaks(&order, &reachability, 1), vec![2]);
        assert_eq!(peaks(&order[..2], &reachability, 3), vec![0]);
    }

    #[test]
    fn every_sample_is_assigned() {
        let bytes = random_opaque_image(20, 20, 4);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let result = palette(pixels, 6, DensityOptions::new()).unwrap();
        assert!(!result.is_empty() && result.len() <= 6);
    }
}
