//! Contains the builder structs for the parameters of each palette method.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options for the popularity method.
///
/// By default every opaque pixel is counted, so the color frequencies are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PopularityOptions {
    /// The maximum number of pixels to count.
    pub(crate) max_samples: u32,
    /// The seed value for the sampler.
    pub(crate) seed: u64,
}

impl Default for PopularityOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PopularityOptions {
    /// Creates a new [`PopularityOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_samples: u32::MAX, seed: 0 }
    }

    /// Sets the maximum number of pixels to count.
    ///
    /// Images with more pixels than this are sampled instead. The default is `u32::MAX`.
    #[must_use]
    pub const fn max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the seed value for the sampler. The default is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A builder struct to specify the parameters for the octree quantizer.
///
/// # Examples
/// ```
/// # use huecluster::OctreeOptions;
/// let options = OctreeOptions::new().max_level(6).max_samples(50_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OctreeOptions {
    /// The depth of the tree, between `1` and `8`.
    pub(crate) max_level: u8,
    /// The maximum number of pixels to sample.
    pub(crate) max_samples: u32,
    /// The seed value for the sampler.
    pub(crate) seed: u64,
}

impl Default for OctreeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl OctreeOptions {
    /// Creates a new [`OctreeOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_level: 8, max_samples: 20_000, seed: 0 }
    }

    /// Sets the number of bit planes used to build the tree.
    ///
    /// Values outside of `1..=8` are clamped into that range. The default is `8`.
    #[must_use]
    pub const fn max_level(mut self, max_level: u8) -> Self {
        self.max_level = if max_level == 0 {
            1
        } else if max_level > 8 {
            8
        } else {
            max_level
        };
        self
    }

    /// Sets the maximum number of pixels to sample. The default is `20_000`.
    #[must_use]
    pub const fn max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the seed value for the sampler. The default is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A builder struct to specify the parameters for the variance split method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VarianceSplitOptions {
    /// The maximum number of pixels to sample.
    pub(crate) max_samples: u32,
    /// The seed value for the sampler.
    pub(crate) seed: u64,
}

impl Default for VarianceSplitOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl VarianceSplitOptions {
    /// Creates a new [`VarianceSplitOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_samples: 20_000, seed: 0 }
    }

    /// Sets the maximum number of pixels to sample. The default is `20_000`.
    #[must_use]
    pub const fn max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the seed value for the sampler. The default is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A builder struct to specify the parameters for the principal component method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PcaOptions {
    /// The maximum number of power iterations.
    pub(crate) power_iterations: u32,
    /// The maximum number of pixels to sample.
    pub(crate) max_samples: u32,
    /// The seed value for the sampler.
    pub(crate) seed: u64,
}

impl Default for PcaOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PcaOptions {
    /// Creates a new [`PcaOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self { power_iterations: 20, max_samples: 20_000, seed: 0 }
    }

    /// Sets the maximum number of power iterations used to find the principal axis.
    ///
    /// Iteration stops early once the axis moves less than `1e-6` in every component.
    /// The default is `20`.
    #[must_use]
    pub const fn power_iterations(mut self, power_iterations: u32) -> Self {
        self.power_iterations = power_iterations;
        self
    }

    /// Sets the maximum number of pixels to sample. The default is `20_000`.
    #[must_use]
    pub const fn max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the seed value for the sampler. The default is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A builder struct to specify the parameters for weighted max-min seeding followed by k-means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaxMinOptions {
    /// The number of Lloyd iterations run after seeding.
    pub(crate) kmeans_iterations: u32,
    /// The maximum number of pixels to sample.
    pub(crate) max_samples: u32,
    /// The seed value for the sampler.
    pub(crate) seed: u64,
}

impl Default for MaxMinOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MaxMinOptions {
    /// Creates a new [`MaxMinOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self { kmeans_iterations: 3, max_samples: 20_000, seed: 0 }
    }

    /// Sets the number of k-means iterations run after seeding. The default is `3`.
    #[must_use]
    pub const fn kmeans_iterations(mut self, kmeans_iterations: u32) -> Self {
        self.kmeans_iterations = kmeans_iterations;
        self
    }

    /// Sets the maximum number of pixels to sample. The default is `20_000`.
    #[must_use]
    pub const fn max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the seed value for the sampler. The default is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A builder struct to specify the parameters for native (incremental) k-means.
///
/// By default native k-means looks at every opaque pixel in each iteration instead of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NativeKmeansOptions {
    /// The number of iterations.
    pub(crate) iterations: u32,
    /// How far each centroid moves towards its cluster mean per iteration.
    pub(crate) rate: f64,
    /// The maximum number of pixels to cluster.
    pub(crate) max_samples: u32,
    /// The seed value for the sampler and for reseeding empty clusters.
    pub(crate) seed: u64,
}

impl Default for NativeKmeansOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeKmeansOptions {
    /// Creates a new [`NativeKmeansOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self { iterations: 10, rate: 0.3, max_samples: u32::MAX, seed: 0 }
    }

    /// Sets the number of iterations. The default is `10`.
    #[must_use]
    pub const fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the learning rate.
    ///
    /// A rate of `1.0` moves each centroid all the way to its cluster mean,
    /// while a rate of `0.0` never moves it. The default is `0.3`.
    #[must_use]
    pub const fn rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Sets the maximum number of pixels to cluster.
    ///
    /// Images with more pixels than this are sampled instead, including for the popularity seeds.
    /// The default is `u32::MAX`.
    #[must_use]
    pub const fn max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the seed value for the sampler and for picking replacement pixels for empty clusters.
    /// The default is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A builder struct to specify the parameters for mean-shift.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeanShiftOptions {
    /// The kernel radius in RGB units.
    pub(crate) bandwidth: f64,
    /// The number of shift iterations.
    pub(crate) max_iterations: u32,
    /// The maximum number of pixels to sample.
    pub(crate) max_samples: u32,
    /// The seed value for the sampler.
    pub(crate) seed: u64,
}

impl Default for MeanShiftOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MeanShiftOptions {
    /// Creates a new [`MeanShiftOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bandwidth: 32.0,
            max_iterations: 7,
            max_samples: 10_000,
            seed: 0,
        }
    }

    /// Sets the kernel bandwidth. The default is `32.0`.
    #[must_use]
    pub const fn bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    /// Sets the number of shift iterations. The default is `7`.
    #[must_use]
    pub const fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the maximum number of pixels to sample. The default is `10_000`.
    #[must_use]
    pub const fn max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the seed value for the sampler. The default is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A builder struct to specify the parameters for the density based methods, DBSCAN and OPTICS.
///
/// # Examples
/// ```
/// # use huecluster::DensityOptions;
/// let options = DensityOptions::new().epsilon(12.0).min_points(6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DensityOptions {
    /// The neighborhood radius, or `None` to estimate it from the data.
    pub(crate) epsilon: Option<f64>,
    /// The number of neighbors needed for a point to be a core point.
    pub(crate) min_points: u32,
    /// The maximum number of pixels to sample.
    pub(crate) max_samples: u32,
    /// The seed value for the sampler.
    pub(crate) seed: u64,
}

impl Default for DensityOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DensityOptions {
    /// Creates a new [`DensityOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            epsilon: None,
            min_points: 4,
            max_samples: 2000,
            seed: 0,
        }
    }

    /// Sets a fixed neighborhood radius.
    ///
    /// By default, the radius is the median distance from each sample to its `min_points`-th nearest neighbor.
    #[must_use]
    pub const fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    /// Sets the number of neighbors a point needs to be a core point. The default is `4`.
    #[must_use]
    pub const fn min_points(mut self, min_points: u32) -> Self {
        self.min_points = min_points;
        self
    }

    /// Sets the maximum number of pixels to sample.
    ///
    /// Epsilon estimation is quadratic in the number of samples. The default is `2000`.
    #[must_use]
    pub const fn max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the seed value for the sampler. The default is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A builder struct to specify the parameters for the diagonal Gaussian mixture model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GmmOptions {
    /// The maximum number of EM iterations.
    pub(crate) max_iterations: u32,
    /// The log-likelihood change below which EM stops.
    pub(crate) tolerance: f64,
    /// The maximum number of pixels to sample.
    pub(crate) max_samples: u32,
    /// The seed value for the sampler and the k-means++ initialization.
    pub(crate) seed: u64,
}

impl Default for GmmOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl GmmOptions {
    /// Creates a new [`GmmOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_iterations: 30,
            tolerance: 1.0,
            max_samples: 2000,
            seed: 0,
        }
    }

    /// Sets the maximum number of expectation-maximization iterations. The default is `30`.
    #[must_use]
    pub const fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the convergence tolerance on the change in log-likelihood. The default is `1.0`.
    #[must_use]
    pub const fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum number of pixels to sample. The default is `2000`.
    #[must_use]
    pub const fn max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the seed value. The default is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// How the distance between two clusters is derived from the distances between their members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Linkage {
    /// The distance between the closest pair of members.
    #[default]
    Single,
    /// The distance between the farthest pair of members.
    Complete,
    /// The mean distance over all pairs of members.
    Average,
}

/// The point distance used by hierarchical clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DistanceMetric {
    /// Straight line distance.
    #[default]
    Euclidean,
    /// Sum of absolute component differences.
    Manhattan,
}

/// A builder struct to specify the parameters for agglomerative hierarchical clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HierarchicalOptions {
    /// How cluster distances are updated after a merge.
    pub(crate) linkage: Linkage,
    /// The distance between two points.
    pub(crate) distance: DistanceMetric,
    /// The maximum number of pixels to sample.
    pub(crate) max_samples: u32,
    /// The seed value for the sampler.
    pub(crate) seed: u64,
}

impl Default for HierarchicalOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchicalOptions {
    /// Creates a new [`HierarchicalOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            linkage: Linkage::Single,
            distance: DistanceMetric::Euclidean,
            max_samples: 2000,
            seed: 0,
        }
    }

    /// Sets the linkage criterion. The default is [`Linkage::Single`].
    #[must_use]
    pub const fn linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Sets the point distance. The default is [`DistanceMetric::Euclidean`].
    #[must_use]
    pub const fn distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }

    /// Sets the maximum number of pixels to sample.
    ///
    /// Memory use is quadratic in the number of samples. The default is `2000`.
    #[must_use]
    pub const fn max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the seed value for the sampler. The default is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A builder struct to specify the parameters for spectral clustering.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpectralOptions {
    /// The width of the Gaussian edge weights, in Lab units.
    pub(crate) sigma: f64,
    /// The number of nearest neighbors connected to each point.
    pub(crate) neighbors: u32,
    /// The maximum number of power iterations per eigenvector.
    pub(crate) power_iterations: u32,
    /// The number of Lloyd iterations on the embedding.
    pub(crate) kmeans_iterations: u32,
    /// The maximum number of pixels to sample.
    pub(crate) max_samples: u32,
    /// The seed value for the sampler and the embedding k-means.
    pub(crate) seed: u64,
}

impl Default for SpectralOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralOptions {
    /// Creates a new [`SpectralOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sigma: 32.0,
            neighbors: 10,
            power_iterations: 300,
            kmeans_iterations: 10,
            max_samples: 2000,
            seed: 0,
        }
    }

    /// Sets the width of the Gaussian similarity kernel. The default is `32.0`.
    #[must_use]
    pub const fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Sets the degree of the nearest neighbor graph. The default is `10`.
    #[must_use]
    pub const fn neighbors(mut self, neighbors: u32) -> Self {
        self.neighbors = neighbors;
        self
    }

    /// Sets the maximum number of power iterations used for each eigenvector. The default is `300`.
    ///
    /// Iteration stops early once the eigenvector stops changing.
    #[must_use]
    pub const fn power_iterations(mut self, power_iterations: u32) -> Self {
        self.power_iterations = power_iterations;
        self
    }

    /// Sets the number of k-means iterations run on the spectral embedding. The default is `10`.
    #[must_use]
    pub const fn kmeans_iterations(mut self, kmeans_iterations: u32) -> Self {
        self.kmeans_iterations = kmeans_iterations;
        self
    }

    /// Sets the maximum number of pixels to sample. The default is `2000`.
    #[must_use]
    pub const fn max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the seed value. The default is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A builder struct to specify the parameters for Lloyd's k-means,
/// used by both the RGB and the Lab variants.
///
/// # Examples
/// ```
/// # use huecluster::KmeansOptions;
/// let options = KmeansOptions::new()
///     .threshold(0.5)
///     .seed(42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KmeansOptions {
    /// Iteration stops once no centroid moves more than this in any component.
    pub(crate) threshold: f64,
    /// The maximum number of iterations.
    pub(crate) max_iterations: u32,
    /// The maximum number of pixels to sample.
    pub(crate) max_samples: u32,
    /// The seed value for the sampler and k-means++ seeding.
    pub(crate) seed: u64,
}

impl Default for KmeansOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl KmeansOptions {
    /// Creates a new [`KmeansOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            threshold: 1.0,
            max_iterations: 100,
            max_samples: 20_000,
            seed: 0,
        }
    }

    /// Sets the convergence threshold.
    ///
    /// Iteration stops once the largest change of any centroid component drops below this value.
    /// The default is `1.0`.
    #[must_use]
    pub const fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the maximum number of iterations. The default is `100`.
    #[must_use]
    pub const fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the maximum number of pixels to sample. The default is `20_000`.
    #[must_use]
    pub const fn max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the seed value for the random number generator. The default is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A builder struct to specify the parameters for the data independent fixed palettes.
///
/// # Examples
/// ```
/// # use huecluster::FixedOptions;
/// let options = FixedOptions::new().bit_depth(3).grayscale(true);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FixedOptions {
    /// The number of bits per palette entry.
    pub(crate) bit_depth: u8,
    /// Whether to generate gray levels instead of colors.
    pub(crate) grayscale: bool,
}

impl Default for FixedOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedOptions {
    /// Creates a new [`FixedOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self { bit_depth: 4, grayscale: false }
    }

    /// Sets the bit depth, which must be between `1` and `8`. The default is `4`.
    ///
    /// The generated palette has `2^bit_depth` colors
    /// and is then padded or truncated to the requested palette size.
    #[must_use]
    pub const fn bit_depth(mut self, bit_depth: u8) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    /// Sets whether to generate evenly spaced gray levels. The default is `false`.
    #[must_use]
    pub const fn grayscale(mut self, grayscale: bool) -> Self {
        self.grayscale = grayscale;
        self
    }
}

/// The dimensions of a Bayer threshold matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BayerSize {
    /// A 2x2 matrix.
    Two,
    /// A 4x4 matrix.
    #[default]
    Four,
    /// An 8x8 matrix.
    Eight,
}

impl BayerSize {
    /// The width and height of the matrix.
    #[must_use]
    pub const fn dimension(self) -> usize {
        match self {
            BayerSize::Two => 2,
            BayerSize::Four => 4,
            BayerSize::Eight => 8,
        }
    }
}

/// A builder struct to specify the parameters for Floyd–Steinberg dithering.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FloydSteinbergOptions {
    /// The fraction of the quantization error that is diffused to neighbors.
    pub(crate) strength: f32,
    /// Whether every other row is traversed right to left.
    pub(crate) serpentine: bool,
}

impl Default for FloydSteinbergOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl FloydSteinbergOptions {
    /// Creates a new [`FloydSteinbergOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self { strength: 1.0, serpentine: true }
    }

    /// Sets the error diffusion strength.
    ///
    /// A strength of `1.0` diffuses all of the error to the neighboring pixels
    /// and `0.0` turns dithering into a plain nearest color remap. The default is `1.0`.
    #[must_use]
    pub const fn strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    /// Sets whether to alternate the scan direction on every row. The default is `true`.
    #[must_use]
    pub const fn serpentine(mut self, serpentine: bool) -> Self {
        self.serpentine = serpentine;
        self
    }
}

/// A builder struct to specify the parameters for ordered (Bayer) dithering.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderedOptions {
    /// The threshold matrix size.
    pub(crate) size: BayerSize,
    /// Scales the threshold offset, where `1.0` spans the full `0..=255` range.
    pub(crate) strength: f32,
}

impl Default for OrderedOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedOptions {
    /// Creates a new [`OrderedOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self { size: BayerSize::Four, strength: 1.0 }
    }

    /// Sets the Bayer matrix size. The default is [`BayerSize::Four`].
    #[must_use]
    pub const fn size(mut self, size: BayerSize) -> Self {
        self.size = size;
        self
    }

    /// Sets the dithering strength. The default is `1.0`.
    #[must_use]
    pub const fn strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }
}
