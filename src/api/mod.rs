//! Contains the types for the high level pipeline builder API.

mod method;
mod options;
mod pipeline;

pub use method::Method;
pub use options::*;
pub use pipeline::{PaletteOutput, PalettePipeline};
