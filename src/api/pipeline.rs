//! The high level palette pipeline builder and its dispatch over every method.

use crate::{
    dbscan, dither, finalize::finalize, fixed, gmm, hierarchical, kmeans, lab_kmeans, maxmin, mean_shift,
    native_kmeans, octree, optics, pca, popularity, spectral, variance_split, Error, Method, PaletteSize, PixelBuffer,
    Progress, Result,
};
use palette::Srgb;
use std::sync::mpsc::Sender;

/// The result of running a [`PalettePipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteOutput {
    /// The final palette, sorted by hue, saturation, and lightness, with exactly the requested number of colors.
    pub palette: Vec<Srgb<u8>>,
    /// The largest centroid change during the last iteration of an iterative method, or `0.0`.
    pub last_change: f64,
    /// The dithered copy of the input buffer, if a dithering method was used.
    pub dithered: Option<Vec<u8>>,
}

/// A builder struct to generate a palette (and optionally a dithered image) from a pixel buffer.
///
/// # Examples
/// ```
/// # use huecluster::{PalettePipeline, PixelBuffer, Method, PaletteSize};
/// # fn main() -> Result<(), huecluster::Error> {
/// let bgra = [0, 0, 0, 255, 255, 255, 255, 255].repeat(8);
/// let output = PalettePipeline::new(PixelBuffer::new(&bgra)?)
///     .palette_size(PaletteSize::from(2))
///     .method(Method::ordered(Method::popularity()))
///     .dimensions(4, 4)
///     .run()?;
/// assert_eq!(output.palette.len(), 2);
/// assert!(output.dithered.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PalettePipeline<'a> {
    /// The input pixels.
    pub(crate) pixels: PixelBuffer<'a>,
    /// The number of colors in the final palette.
    pub(crate) k: PaletteSize,
    /// The palette generation method.
    pub(crate) method: Method,
    /// The image width and height, needed for dithering.
    pub(crate) dimensions: Option<(u32, u32)>,
    /// Where to send progress reports.
    pub(crate) progress: Option<Sender<f64>>,
}

impl<'a> PalettePipeline<'a> {
    /// Creates a new [`PalettePipeline`] with default options.
    #[must_use]
    pub fn new(pixels: PixelBuffer<'a>) -> Self {
        Self {
            pixels,
            k: PaletteSize::default(),
            method: Method::default(),
            dimensions: None,
            progress: None,
        }
    }

    /// Sets the palette size. The default is `16`.
    #[must_use]
    pub fn palette_size(mut self, size: PaletteSize) -> Self {
        self.k = size;
        self
    }

    /// Sets the palette generation method. The default is [`Method::Popularity`].
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the image width and height in pixels. These are required for the dithering methods.
    #[must_use]
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    /// Sets a channel to receive progress fractions from the k-means methods.
    ///
    /// The sender is dropped once [`run`](PalettePipeline::run) returns,
    /// so the receiver can simply be drained until it disconnects.
    #[must_use]
    pub fn progress(mut self, sender: Sender<f64>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Checks the configuration before any pixels are processed.
    fn validate(&self, method: &Method) -> Result<()> {
        match method {
            Method::Fixed(options) if !(1..=8).contains(&options.bit_depth) => {
                Err(Error::InvalidBitDepth(options.bit_depth))
            }
            Method::FloydSteinberg { base, .. } | Method::Ordered { base, .. } => {
                let (width, height) =
                    self.dimensions.ok_or(Error::MissingDimensions { method: method.name() })?;
                PixelBuffer::with_dimensions(self.pixels.as_bytes(), width, height)?;
                self.validate(base)
            }
            _ => Ok(()),
        }
    }

    /// Computes the finalized palette for `method`.
    fn generate(&self, method: &Method, progress: Progress) -> Result<PaletteOutput> {
        let Self { pixels, k, .. } = *self;
        let k = k.as_usize();

        let (raw, last_change) = match method {
            Method::Popularity(options) => (popularity::palette(pixels, k, *options)?, 0.0),
            Method::Octree(options) => (octree::palette(pixels, k, *options)?, 0.0),
            Method::VarianceSplit(options) => (variance_split::palette(pixels, k, *options)?, 0.0),
            Method::Pca(options) => (pca::palette(pixels, k, *options)?, 0.0),
            Method::MaxMin(options) => (maxmin::palette(pixels, k, *options)?, 0.0),
            Method::NativeKmeans(options) => {
                let output = native_kmeans::palette(pixels, k, *options)?;
                (output.palette, output.last_change)
            }
            Method::MeanShift(options) => (mean_shift::palette(pixels, k, *options)?, 0.0),
            Method::Dbscan(options) => (dbscan::palette(pixels, k, *options)?, 0.0),
            Method::Gmm(options) => (gmm::palette(pixels, k, *options)?, 0.0),
            Method::Hierarchical(options) => (hierarchical::palette(pixels, k, *options)?, 0.0),
            Method::Spectral(options) => (spectral::palette(pixels, k, *options)?, 0.0),
            Method::Optics(options) => (optics::palette(pixels, k, *options)?, 0.0),
            Method::LabKmeans(options) => {
                let output = lab_kmeans::palette(pixels, k, *options)?;
                (output.palette, output.last_change)
            }
            Method::Kmeans(options) => {
                let output = kmeans::palette(pixels, k, *options, progress)?;
                (output.palette, output.last_change)
            }
            Method::KmeansPlusPlus(options) => (kmeans::plus_plus_palette(pixels, k, *options, progress)?, 0.0),
            Method::Fixed(options) => (fixed::palette(*options)?, 0.0),
            Method::FloydSteinberg { base, options } => {
                let (width, height) = self.dimensions.ok_or(Error::MissingDimensions { method: method.name() })?;
                let base = self.generate(base, progress)?;
                let dithered = dither::floyd_steinberg(pixels, width, height, &base.palette, *options)?;
                return Ok(PaletteOutput { dithered: Some(dithered), ..base });
            }
            Method::Ordered { base, options } => {
                let (width, height) = self.dimensions.ok_or(Error::MissingDimensions { method: method.name() })?;
                let base = self.generate(base, progress)?;
                let dithered = dither::ordered(pixels, width, height, &base.palette, *options)?;
                return Ok(PaletteOutput { dithered: Some(dithered), ..base });
            }
        };

        tracing::debug!(method = method.name(), raw = raw.len(), k, last_change, "generated raw palette");

        Ok(PaletteOutput { palette: finalize(raw, k), last_change, dithered: None })
    }

    /// Runs the pipeline, returning the final palette and, for the dithering methods, the dithered pixels.
    ///
    /// # Errors
    /// The configuration is checked first, so no work is done if:
    /// - the palette size is `0` ([`Error::ZeroColorCount`]),
    /// - a dithering method is used without [`dimensions`](PalettePipeline::dimensions)
    ///   ([`Error::MissingDimensions`]) or with dimensions that do not match the buffer
    ///   ([`Error::DimensionMismatch`]),
    /// - or a fixed palette has an unsupported bit depth ([`Error::InvalidBitDepth`]).
    ///
    /// Every method except [`Method::Fixed`] returns [`Error::NoEligiblePixels`]
    /// if the buffer has no opaque pixels.
    pub fn run(self) -> Result<PaletteOutput> {
        if self.k.into_inner() == 0 {
            return Err(Error::ZeroColorCount);
        }
        self.validate(&self.method)?;

        tracing::debug!(
            method = self.method.name(),
            colors = self.k.into_inner(),
            pixels = self.pixels.num_pixels(),
            "generating palette"
        );

        let progress = Progress::from(self.progress.as_ref());
        self.generate(&self.method, progress)
    }
}

impl<'a> From<PixelBuffer<'a>> for PalettePipeline<'a> {
    fn from(pixels: PixelBuffer<'a>) -> Self {
        Self::new(pixels)
    }
}
