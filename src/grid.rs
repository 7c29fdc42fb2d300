//! A uniform 3D grid for fixed radius neighbor queries, shared by the density based strategies.

use crate::{
    color::{squared_distance, Point},
    parallel::map_range,
};
use ordered_float::OrderedFloat;
use std::collections::HashMap;

/// Buckets point indices by the cube of side `cell` that contains them.
#[derive(Debug, Clone)]
pub(crate) struct Grid<'a> {
    /// The bucketed points.
    points: &'a [Point],
    /// The side length of each cube.
    cell: f64,
    /// The indices of the points in each occupied cube.
    cells: HashMap<[i64; 3], Vec<u32>>,
}

impl<'a> Grid<'a> {
    /// Buckets `points` into cubes of side `cell`, which is raised to at least `1.0`.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn new(points: &'a [Point], cell: f64) -> Self {
        let mut grid = Self { points, cell: cell.max(1.0), cells: HashMap::new() };
        for (i, p) in points.iter().enumerate() {
            let key = grid.key(p);
            grid.cells.entry(key).or_default().push(i as u32);
        }
        grid
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn key(&self, p: &Point) -> [i64; 3] {
        p.map(|c| (c / self.cell).floor() as i64)
    }

    /// Calls `f` with every point index in the 3x3x3 block of cells around `p`.
    pub(crate) fn for_each_nearby(&self, p: &Point, mut f: impl FnMut(usize)) {
        let [x, y, z] = self.key(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(bucket) = self.cells.get(&[x + dx, y + dy, z + dz]) {
                        for &j in bucket {
                            f(j as usize);
                        }
                    }
                }
            }
        }
    }

    /// Returns every other point within `radius` of point `i`.
    ///
    /// The result is exact as long as `radius` is no larger than the cell size.
    pub(crate) fn within(&self, i: usize, radius: f64) -> Vec<usize> {
        let p = &self.points[i];
        let radius_sq = radius * radius;
        let mut neighbors = Vec::new();
        self.for_each_nearby(p, |j| {
            if j != i && squared_distance(p, &self.points[j]) <= radius_sq {
                neighbors.push(j);
            }
        });
        neighbors
    }
}

/// Estimates a neighborhood radius as the median distance from each point to its `k`-th nearest neighbor.
///
/// Returns `0.0` if there are fewer than two points.
pub(crate) fn estimate_epsilon(points: &[Point], k: usize) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }

    let kth = k.clamp(1, n - 1) - 1;
    let mut distances = map_range(n, |i| {
        let mut d = points
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, q)| OrderedFloat(squared_distance(&points[i], q)))
            .collect::<Vec<_>>();
        let (_, &mut nth, _) = d.select_nth_unstable(kth);
        nth
    });

    let mid = n / 2;
    let (_, &mut median, _) = distances.select_nth_unstable(mid);
    median.0.sqrt()
}
