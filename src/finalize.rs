//! Turns the raw output of a strategy into a palette of exactly the requested size.

use crate::color::hsl_key;
use palette::Srgb;

/// Sorts `raw` by hue, then saturation, then lightness, and then pads or truncates it to `k` colors.
///
/// Missing entries are filled with the first sorted color, or black if `raw` is empty.
/// This is the only place that guarantees the length of a returned palette.
///
/// # Examples
/// ```
/// # use huecluster::finalize::finalize;
/// # use palette::Srgb;
/// let white = Srgb::new(255, 255, 255);
/// let black = Srgb::new(0, 0, 0);
/// assert_eq!(finalize(vec![white, black], 3), vec![black, white, black]);
/// ```
#[must_use]
pub fn finalize(mut raw: Vec<Srgb<u8>>, k: usize) -> Vec<Srgb<u8>> {
    raw.sort_by_cached_key(|&color| hsl_key(color));
    let fill = raw.first().copied().unwrap_or(Srgb::new(0, 0, 0));
    raw.resize(k, fill);
    raw
}
