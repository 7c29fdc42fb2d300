//! Variance based median cut.
//!
//! Starting from a single box holding every sample, the box with the largest spread along any
//! one channel is repeatedly cut in half at the median of that channel.
//! Spread is measured as the sum of squared deviations from the box mean,
//! so large boxes are favored over small boxes of similar variance.

use crate::{
    color::{from_point, Point},
    parallel::{argmax_by_key, partition_reduce},
    sample::sample,
    PixelBuffer, Result, VarianceSplitOptions,
};
use ordered_float::OrderedFloat;
use palette::Srgb;

/// A set of samples together with its widest channel.
#[derive(Debug, Clone)]
struct ColorBox {
    /// The samples in this box.
    points: Vec<Point>,
    /// The sum of squared deviations along `axis`.
    spread: f64,
    /// The channel with the largest spread.
    axis: usize,
}

impl ColorBox {
    #[allow(clippy::cast_precision_loss)]
    fn new(points: Vec<Point>) -> Self {
        fn add(a: Point, b: Point) -> Point {
            [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
        }

        let n = points.len().max(1) as f64;
        let mean = partition_reduce(&points, || [0.0; 3], |sum, p| add(sum, *p), add).map(|s| s / n);
        let spread = partition_reduce(
            &points,
            || [0.0; 3],
            |sum, p| {
                let d: Point = std::array::from_fn(|c| p[c] - mean[c]);
                add(sum, [d[0] * d[0], d[1] * d[1], d[2] * d[2]])
            },
            add,
        );

        let mut axis = 0;
        for c in 1..3 {
            if spread[c] > spread[axis] {
                axis = c;
            }
        }

        Self { points, spread: spread[axis], axis }
    }

    /// Splits the box at the median of its widest channel.
    fn split(mut self) -> (Self, Self) {
        let axis = self.axis;
        self.points.sort_unstable_by(|a, b| a[axis].total_cmp(&b[axis]));
        let upper = self.points.split_off(self.points.len() / 2);
        (Self::new(self.points), Self::new(upper))
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(&self) -> Point {
        let n = self.points.len() as f64;
        let mut mean = [0.0; 3];
        for p in &self.points {
            for c in 0..3 {
                mean[c] += p[c];
            }
        }
        mean.map(|v| v / n)
    }
}

/// Computes a palette of at most `k` box means by repeated median cuts of a sample.
///
/// Splitting stops early once every box is a single color.
pub fn palette(pixels: PixelBuffer, k: usize, options: VarianceSplitOptions) -> Result<Vec<Srgb<u8>>> {
    let samples = sample(pixels, options.max_samples, options.seed)?;
    let mut boxes = vec![ColorBox::new(samples.points(pixels))];

    while boxes.len() < k {
        let Some((i, OrderedFloat(spread))) = argmax_by_key(boxes.len(), |i| OrderedFloat(boxes[i].spread)) else {
            break;
        };

        if spread <= 0.0 || boxes[i].points.len() < 2 {
            tracing::debug!(boxes = boxes.len(), "every box has zero variance, stopping early");
            break;
        }

        let (lower, upper) = boxes.swap_remove(i).split();
        boxes.push(lower);
        boxes.push(upper);
    }

    Ok(boxes.iter().map(|b| from_point(b.mean())).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn splits_along_widest_channel() {
        let points = vec![[0.0, 10.0, 0.0], [255.0, 11.0, 0.0], [250.0, 12.0, 1.0], [5.0, 10.0, 0.0]];
        let b = ColorBox::new(points);
        assert_eq!(b.axis, 0);
        let (lower, upper) = b.split();
        assert!(lower.points.iter().all(|p| p[0] <= 5.0));
        assert!(upper.points.iter().all(|p| p[0] >= 250.0));
    }

    #[test]
    fn recovers_separated_groups() {
        let a = Srgb::new(20, 20, 200);
        let b = Srgb::new(220, 40, 10);
        let bytes = bgra_from_colors(&[a, b].repeat(50));
        let pixels = PixelBuffer::new(&bytes).unwrap();
        let mut result = palette(pixels, 2, VarianceSplitOptions::new()).unwrap();
        result.sort_by_key(|c| c.red);
        assert_eq!(result, vec![a, b]);
    }

    #[test]
    fn stops_on_single_color() {
        let bytes = bgra_from_colors(&[Srgb::new(9, 9, 9); 40]);
        let pixels = PixelBuffer::new(&bytes).unwrap();
        assert_eq!(palette(pixels, 8, VarianceSplitOptions::new()).unwrap(), vec![Srgb::new(9, 9, 9)]);
    }
}
