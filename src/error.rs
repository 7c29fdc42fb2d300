//! The error type returned by palette generation and dithering.

use thiserror::Error;

/// A `Result` alias defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The ways a palette or dithering request can fail.
///
/// Every failure is reported before any work is done on the pixels,
/// so a request either returns a complete palette or one of these errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The pixel buffer contains no pixel with an alpha value above the opacity threshold.
    #[error("the image has no opaque pixels to sample")]
    NoEligiblePixels,

    /// A dithering method was requested without the image width and height.
    #[error("{method} requires the image width and height to be set")]
    MissingDimensions {
        /// The name of the dithering method.
        method: &'static str,
    },

    /// A method name did not match any known method.
    #[error("unknown palette method `{0}`")]
    UnknownMethod(String),

    /// The buffer length does not agree with the given width and height.
    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        /// The length of the buffer in bytes.
        len: usize,
        /// The given width in pixels.
        width: u32,
        /// The given height in pixels.
        height: u32,
    },

    /// The buffer length is not a whole number of 4 byte pixels.
    #[error("pixel buffer length {0} is not a multiple of 4")]
    InvalidBufferLength(usize),

    /// A palette of zero colors was requested.
    #[error("the palette size must be at least 1")]
    ZeroColorCount,

    /// The fixed palette bit depth is outside of `1..=8`.
    #[error("bit depth must be between 1 and 8, got {0}")]
    InvalidBitDepth(u8),

    /// Dithering was requested against an empty palette.
    #[error("cannot dither against an empty palette")]
    EmptyPalette,
}
