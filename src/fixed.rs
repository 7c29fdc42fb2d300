//! Data independent palettes determined by a bit depth.

use crate::{Error, FixedOptions, Result};
use palette::Srgb;

/// The 16 color palette used for a bit depth of 4.
const SIXTEEN: [[u8; 3]; 16] = [
    [0, 0, 0],
    [128, 0, 0],
    [0, 128, 0],
    [128, 128, 0],
    [0, 0, 128],
    [128, 0, 128],
    [0, 128, 128],
    [192, 192, 192],
    [128, 128, 128],
    [255, 0, 0],
    [0, 255, 0],
    [255, 255, 0],
    [0, 0, 255],
    [255, 0, 255],
    [0, 255, 255],
    [255, 255, 255],
];

/// Returns `levels` evenly spaced values from `0` to `255`, or just `0` for a single level.
#[allow(clippy::cast_possible_truncation)]
fn levels(levels: u32) -> impl Iterator<Item = u8> + Clone {
    (0..levels).map(move |i| if levels == 1 { 0 } else { (i * 255 / (levels - 1)) as u8 })
}

/// Splits `bit_depth` bits over red, green, and blue as evenly as possible.
/// Leftover bits go to blue first, then green.
fn allocate_bits(bit_depth: u8) -> [u8; 3] {
    let mut bits = [0; 3];
    for i in 0..usize::from(bit_depth) {
        bits[i % 3] += 1;
    }
    bits.reverse();
    bits
}

/// Returns the fixed palette of `2^bit_depth` colors.
///
/// Grayscale palettes are evenly spaced gray levels.
/// Otherwise, depths 1 and 2 are gray ramps, depth 4 is a classic 16 color palette, and other depths
/// enumerate every combination of evenly spaced red, green, and blue levels.
///
/// Returns [`Error::InvalidBitDepth`] if `bit_depth` is not in `1..=8`.
pub fn palette(options: FixedOptions) -> Result<Vec<Srgb<u8>>> {
    let depth = options.bit_depth;
    if !(1..=8).contains(&depth) {
        return Err(Error::InvalidBitDepth(depth));
    }

    let count = 1u32 << depth;
    let palette = if options.grayscale || depth <= 2 {
        levels(count).map(|v| Srgb::new(v, v, v)).collect()
    } else if depth == 4 {
        SIXTEEN.iter().map(|&[r, g, b]| Srgb::new(r, g, b)).collect()
    } else {
        let [r, g, b] = allocate_bits(depth).map(|bits| levels(1 << bits));
        r.flat_map(|r| {
            let b = b.clone();
            g.clone().flat_map(move |g| b.clone().map(move |b| Srgb::new(r, g, b)))
        })
        .collect()
    };

    Ok(palette)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bits_favor_green_and_blue() {
        assert_eq!(allocate_bits(3), [1, 1, 1]);
        assert_eq!(allocate_bits(5), [1, 2, 2]);
        assert_eq!(allocate_bits(7), [2, 2, 3]);
        assert_eq!(allocate_bits(8), [2, 3, 3]);
    }

    #[test]
    fn sizes_match_bit_depth() {
        for depth in 1..=8 {
            let palette = palette(FixedOptions::new().bit_depth(depth)).unwrap();
            assert_eq!(palette.len(), 1 << depth);
        }
    }

    #[test]
    fn literal_palettes() {
        assert_eq!(
            palette(FixedOptions::new().bit_depth(1)).unwrap(),
            vec![Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)],
        );
        assert_eq!(
            palette(FixedOptions::new().bit_depth(2)).unwrap(),
            [0, 85, 170, 255].map(|v| Srgb::new(v, v, v)),
        );
        assert_eq!(palette(FixedOptions::new()).unwrap()[7], Srgb::new(192, 192, 192));
    }

    #[test]
    fn grayscale_levels() {
        let palette = palette(FixedOptions::new().bit_depth(3).grayscale(true)).unwrap();
        assert_eq!(palette[1], Srgb::new(36, 36, 36));
        assert!(palette.iter().all(|c| c.red == c.green && c.green == c.blue));
    }

    #[test]
    fn cross_product_order() {
        let palette = palette(FixedOptions::new().bit_depth(3)).unwrap();
        assert_eq!(palette[0], Srgb::new(0, 0, 0));
        assert_eq!(palette[1], Srgb::new(0, 0, 255));
        assert_eq!(palette[2], Srgb::new(0, 255, 0));
        assert_eq!(palette[4], Srgb::new(255, 0, 0));
    }

    #[test]
    fn rejects_bad_depths() {
        assert!(matches!(palette(FixedOptions::new().bit_depth(0)), Err(Error::InvalidBitDepth(0))));
        assert!(matches!(palette(FixedOptions::new().bit_depth(9)), Err(Error::InvalidBitDepth(9))));
    }
}
