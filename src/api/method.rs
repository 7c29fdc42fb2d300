//! The tagged set of palette generation methods.

use crate::{
    DensityOptions, Error, FixedOptions, FloydSteinbergOptions, GmmOptions, HierarchicalOptions, KmeansOptions,
    MaxMinOptions, MeanShiftOptions, NativeKmeansOptions, OctreeOptions, OrderedOptions, PcaOptions, PopularityOptions,
    SpectralOptions, VarianceSplitOptions,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The set of supported palette generation methods, each carrying only its own parameters.
///
/// The two dithering variants first compute a palette with their `base` method
/// and then remap the image onto it, which requires the image dimensions.
///
/// # Examples
/// ```
/// # use huecluster::{Method, KmeansOptions};
/// let method = Method::from(KmeansOptions::new().seed(7));
/// let dithered = Method::floyd_steinberg(method);
/// let parsed: Method = "mean-shift".parse().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Method {
    /// The most frequent exact colors. See [`popularity`](crate::popularity).
    Popularity(PopularityOptions),
    /// Octree color reduction. See [`octree`](crate::octree).
    Octree(OctreeOptions),
    /// Recursive splits of the box with the largest spread. See [`variance_split`](crate::variance_split).
    VarianceSplit(VarianceSplitOptions),
    /// Even ranks along the principal axis. See [`pca`](crate::pca).
    Pca(PcaOptions),
    /// Frequency weighted farthest point seeding refined by k-means. See [`maxmin`](crate::maxmin).
    MaxMin(MaxMinOptions),
    /// Incremental k-means seeded with the popularity palette. See [`native_kmeans`](crate::native_kmeans).
    NativeKmeans(NativeKmeansOptions),
    /// Mean-shift mode seeking. See [`mean_shift`](crate::mean_shift).
    MeanShift(MeanShiftOptions),
    /// DBSCAN density clustering. See [`dbscan`](crate::dbscan).
    Dbscan(DensityOptions),
    /// A diagonal Gaussian mixture fit by expectation maximization. See [`gmm`](crate::gmm).
    Gmm(GmmOptions),
    /// Agglomerative clustering. See [`hierarchical`](crate::hierarchical).
    Hierarchical(HierarchicalOptions),
    /// Spectral clustering in Lab space. See [`spectral`](crate::spectral).
    Spectral(SpectralOptions),
    /// OPTICS reachability peaks. See [`optics`](crate::optics).
    Optics(DensityOptions),
    /// k-means in Lab space seeded with the popularity palette. See [`lab_kmeans`](crate::lab_kmeans).
    LabKmeans(KmeansOptions),
    /// k-means++ seeding followed by Lloyd's algorithm. See [`kmeans`](crate::kmeans).
    Kmeans(KmeansOptions),
    /// k-means++ seeding alone. See [`kmeans`](crate::kmeans).
    KmeansPlusPlus(KmeansOptions),
    /// A data independent palette. See [`fixed`](crate::fixed).
    Fixed(FixedOptions),
    /// Floyd–Steinberg dithering onto the palette of `base`.
    FloydSteinberg {
        /// The method that computes the palette to dither with.
        base: Box<Method>,
        /// The dithering parameters.
        options: FloydSteinbergOptions,
    },
    /// Ordered (Bayer) dithering onto the palette of `base`.
    Ordered {
        /// The method that computes the palette to dither with.
        base: Box<Method>,
        /// The dithering parameters.
        options: OrderedOptions,
    },
}

impl Default for Method {
    fn default() -> Self {
        Self::Popularity(PopularityOptions::new())
    }
}

impl Method {
    /// Creates a new [`Method::Popularity`].
    #[must_use]
    pub const fn popularity() -> Self {
        Self::Popularity(PopularityOptions::new())
    }

    /// Creates a new [`Method::Kmeans`] with the default [`KmeansOptions`].
    #[must_use]
    pub const fn kmeans() -> Self {
        Self::Kmeans(KmeansOptions::new())
    }

    /// Creates a new [`Method::Fixed`] with the default [`FixedOptions`].
    #[must_use]
    pub const fn fixed() -> Self {
        Self::Fixed(FixedOptions::new())
    }

    /// Creates a new [`Method::FloydSteinberg`] over `base` with the default [`FloydSteinbergOptions`].
    #[must_use]
    pub fn floyd_steinberg(base: Method) -> Self {
        Self::FloydSteinberg { base: Box::new(base), options: FloydSteinbergOptions::new() }
    }

    /// Creates a new [`Method::Ordered`] over `base` with the default [`OrderedOptions`].
    #[must_use]
    pub fn ordered(base: Method) -> Self {
        Self::Ordered { base: Box::new(base), options: OrderedOptions::new() }
    }

    /// The canonical name of this method, as accepted by [`Method::from_str`].
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Method::Popularity(_) => "popularity",
            Method::Octree(_) => "octree",
            Method::VarianceSplit(_) => "variance-split",
            Method::Pca(_) => "pca",
            Method::MaxMin(_) => "max-min",
            Method::NativeKmeans(_) => "native-kmeans",
            Method::MeanShift(_) => "mean-shift",
            Method::Dbscan(_) => "dbscan",
            Method::Gmm(_) => "gmm",
            Method::Hierarchical(_) => "hierarchical",
            Method::Spectral(_) => "spectral",
            Method::Optics(_) => "optics",
            Method::LabKmeans(_) => "lab-kmeans",
            Method::Kmeans(_) => "kmeans",
            Method::KmeansPlusPlus(_) => "kmeans++",
            Method::Fixed(_) => "fixed",
            Method::FloydSteinberg { .. } => "floyd-steinberg",
            Method::Ordered { .. } => "ordered",
        }
    }

    /// Whether this method dithers the image and so needs its dimensions.
    #[must_use]
    pub const fn is_dither(&self) -> bool {
        matches!(self, Method::FloydSteinberg { .. } | Method::Ordered { .. })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a method name into that method with default options.
///
/// Matching ignores case, `-`, `_`, and spaces, so `"MeanShift"`, `"mean-shift"`, and `"mean_shift"`
/// are all accepted. The dithering methods use [`Method::Popularity`] as their base.
impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        let method = match name.as_str() {
            "popularity" => Self::popularity(),
            "octree" => OctreeOptions::new().into(),
            "variancesplit" => VarianceSplitOptions::new().into(),
            "pca" => PcaOptions::new().into(),
            "maxmin" | "weightedmaxmin" => MaxMinOptions::new().into(),
            "nativekmeans" => NativeKmeansOptions::new().into(),
            "meanshift" => MeanShiftOptions::new().into(),
            "dbscan" => Self::Dbscan(DensityOptions::new()),
            "gmm" => GmmOptions::new().into(),
            "hierarchical" => HierarchicalOptions::new().into(),
            "spectral" => SpectralOptions::new().into(),
            "optics" => Self::Optics(DensityOptions::new()),
            "labkmeans" => Self::LabKmeans(KmeansOptions::new()),
            "kmeans" => Self::kmeans(),
            "kmeans++" | "kmeansplusplus" => Self::KmeansPlusPlus(KmeansOptions::new()),
            "fixed" | "fixedbitdepth" => Self::fixed(),
            "floydsteinberg" => Self::floyd_steinberg(Self::popularity()),
            "ordered" | "bayer" => Self::ordered(Self::popularity()),
            _ => return Err(Error::UnknownMethod(s.to_owned())),
        };

        Ok(method)
    }
}

macro_rules! impl_from_options {
    ($($options:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$options> for Method {
                fn from(options: $options) -> Self {
                    Self::$variant(options)
                }
            }
        )*
    };
}

impl_from_options!(
    PopularityOptions => Popularity,
    OctreeOptions => Octree,
    VarianceSplitOptions => VarianceSplit,
    PcaOptions => Pca,
    MaxMinOptions => MaxMin,
    NativeKmeansOptions => NativeKmeans,
    MeanShiftOptions => MeanShift,
    GmmOptions => Gmm,
    HierarchicalOptions => Hierarchical,
    SpectralOptions => Spectral,
    KmeansOptions => Kmeans,
    FixedOptions => Fixed,
);
