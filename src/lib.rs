//! A library for generating color palettes from BGRA pixel buffers.
//!
//! `huecluster` offers a family of palette generation methods, from simple frequency counts
//! to density based, probabilistic, hierarchical, and graph based clustering, along with
//! data independent fixed palettes and two dithering methods that remap an image onto a palette.
//! Every method returns exactly the requested number of colors, sorted by hue, saturation, and lightness.
//!
//! # Features
//! To reduce dependencies and compile times, `huecluster` has several `cargo` features
//! that can be turned off or on:
//! - `threads`: runs the data parallel phases of each method on the [`rayon`] thread pool.
//! - `image`: enables conversion from the [`image`] crate's `RgbaImage` via [`bgra_from_rgba_image`].
//! - `serde`: derives `Serialize` and `Deserialize` for [`Method`] and the option builders.
//!
//! # High-Level API
//! To get started, see [`PalettePipeline`] and [`Method`]. Here is an example:
//! ```
//! # use huecluster::{PalettePipeline, PixelBuffer, Method, KmeansOptions, PaletteSize};
//! # fn main() -> Result<(), huecluster::Error> {
//! // a 2x2 BGRA image: blue, green, red, and a transparent pixel
//! let bgra = [255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 0, 0, 0, 0];
//!
//! let output = PalettePipeline::new(PixelBuffer::new(&bgra)?)
//!     .palette_size(PaletteSize::from(4))
//!     .method(Method::from(KmeansOptions::new().seed(42)))
//!     .run()?;
//!
//! assert_eq!(output.palette.len(), 4);
//! # Ok(())
//! # }
//! ```
//!
//! Each method is also available as a plain function in its own module, such as [`kmeans::palette`].
//! These return the raw palette, which [`finalize::finalize`] pads, truncates, and sorts.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod api;
mod color;
mod error;
mod grid;
mod nearest;
mod parallel;
mod progress;
mod types;

pub mod dbscan;
pub mod dither;
pub mod finalize;
pub mod fixed;
pub mod gmm;
pub mod hierarchical;
pub mod kmeans;
pub mod lab_kmeans;
pub mod maxmin;
pub mod mean_shift;
pub mod native_kmeans;
pub mod octree;
pub mod optics;
pub mod pca;
pub mod popularity;
pub mod sample;
pub mod spectral;
pub mod variance_split;

pub use api::*;
pub use color::hsl_key;
pub use error::{Error, Result};
pub use progress::Progress;
pub use types::*;

/// The maximum supported number of palette colors is `256`.
pub const MAX_COLORS: u16 = u8::MAX as u16 + 1;
