//! Contains various types needed across the crate.

use crate::{Error, Result, MAX_COLORS};
use palette::Srgb;
use std::{
    error,
    fmt::{Debug, Display},
    ops::Deref,
};
#[cfg(feature = "image")]
use image::RgbaImage;

/// The number of bytes used by each pixel (blue, green, red, alpha).
pub const BYTES_PER_PIXEL: usize = 4;

/// A pixel takes part in palette generation only if its alpha is strictly above this value.
pub const ALPHA_THRESHOLD: u8 = 128;

/// An error type for when an input value is above the maximum supported value.
///
/// The inner value is the maximum supported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AboveMaxLen<T>(pub T);

impl<T: Display> Display for AboveMaxLen<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "above the maximum length of {}", self.0)
    }
}

impl<T: Debug + Display> error::Error for AboveMaxLen<T> {}

/// A read-only view over a row-major pixel buffer with 4 bytes per pixel
/// stored in blue, green, red, alpha order.
///
/// The only invariant is that the length of the inner slice is a multiple of 4.
/// Use [`PixelBuffer::with_dimensions`] to also check the buffer against an image size.
///
/// # Examples
/// ```
/// # use huecluster::PixelBuffer;
/// # fn main() -> Result<(), huecluster::Error> {
/// let bgra = [0, 0, 255, 255, 255, 0, 0, 255];
/// let pixels = PixelBuffer::new(&bgra)?;
/// assert_eq!(pixels.num_pixels(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PixelBuffer<'a>(&'a [u8]);

impl<'a> PixelBuffer<'a> {
    /// Wraps a BGRA byte slice, failing if its length is not a multiple of 4.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() % BYTES_PER_PIXEL == 0 {
            Ok(Self(bytes))
        } else {
            Err(Error::InvalidBufferLength(bytes.len()))
        }
    }

    /// Wraps a BGRA byte slice, failing if its length is not `width * height * 4`.
    pub fn with_dimensions(bytes: &'a [u8], width: u32, height: u32) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL));

        if expected == Some(bytes.len()) {
            Ok(Self(bytes))
        } else {
            Err(Error::DimensionMismatch { len: bytes.len(), width, height })
        }
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// Returns the number of pixels in the buffer.
    #[must_use]
    pub const fn num_pixels(&self) -> usize {
        self.0.len() / BYTES_PER_PIXEL
    }

    /// Whether the pixel starting at the byte `offset` is opaque enough to be sampled.
    #[inline]
    #[must_use]
    pub fn is_eligible(&self, offset: usize) -> bool {
        self.0[offset + 3] > ALPHA_THRESHOLD
    }

    /// Returns the color of the pixel starting at the byte `offset`.
    #[inline]
    #[must_use]
    pub fn color_at(&self, offset: usize) -> Srgb<u8> {
        let px = &self.0[offset..offset + 3];
        Srgb::new(px[2], px[1], px[0])
    }

    /// Returns an iterator over the byte offsets of every eligible pixel, in buffer order.
    pub fn eligible_offsets(&self) -> impl Iterator<Item = usize> + 'a {
        let bytes = self.0;
        (0..bytes.len())
            .step_by(BYTES_PER_PIXEL)
            .filter(move |&offset| bytes[offset + 3] > ALPHA_THRESHOLD)
    }
}

impl<'a> Deref for PixelBuffer<'a> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl<'a> TryFrom<&'a [u8]> for PixelBuffer<'a> {
    type Error = Error;

    fn try_from(bytes: &'a [u8]) -> Result<Self> {
        Self::new(bytes)
    }
}

/// Converts an `RgbaImage` into the blue, green, red, alpha byte order used by [`PixelBuffer`].
#[cfg(feature = "image")]
#[must_use]
pub fn bgra_from_rgba_image(image: &RgbaImage) -> Vec<u8> {
    image
        .as_raw()
        .chunks_exact(BYTES_PER_PIXEL)
        .flat_map(|px| [px[2], px[1], px[0], px[3]])
        .collect()
}

/// This type is used to specify the number of colors in a finalized palette.
///
/// This is a simple new type wrapper around `u16` with the invariant that it must be
/// less than or equal to [`MAX_COLORS`]. A size of `0` can be represented,
/// but is rejected when a palette is generated.
///
/// # Examples
/// ```
/// # use huecluster::{PaletteSize, AboveMaxLen};
/// # fn main() -> Result<(), AboveMaxLen<u16>> {
/// let size = PaletteSize::from(16);
/// let size = PaletteSize::try_from(128u16)?;
/// let size = PaletteSize::from_clamped(1024);
/// assert_eq!(size, PaletteSize::MAX);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct PaletteSize(u16);

impl PaletteSize {
    /// The maximum supported palette size (given by [`MAX_COLORS`]).
    pub const MAX: Self = Self(MAX_COLORS);

    /// Gets the inner `u16` value.
    #[must_use]
    pub const fn into_inner(self) -> u16 {
        self.0
    }

    /// Gets the palette size as a `usize` for lengths and indexing.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Creates a [`PaletteSize`] by clamping the given `u16` to be less than or equal to [`MAX_COLORS`].
    #[must_use]
    pub const fn from_clamped(value: u16) -> Self {
        if value <= MAX_COLORS {
            Self(value)
        } else {
            Self(MAX_COLORS)
        }
    }
}

impl Default for PaletteSize {
    fn default() -> Self {
        Self(16)
    }
}

impl From<PaletteSize> for u16 {
    fn from(val: PaletteSize) -> Self {
        val.into_inner()
    }
}

impl From<u8> for PaletteSize {
    fn from(value: u8) -> Self {
        Self(value.into())
    }
}

impl TryFrom<u16> for PaletteSize {
    type Error = AboveMaxLen<u16>;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value <= MAX_COLORS {
            Ok(PaletteSize(value))
        } else {
            Err(AboveMaxLen(MAX_COLORS))
        }
    }
}

impl Display for PaletteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}
