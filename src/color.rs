//! Color conversions and distance helpers shared by the strategies.

use ordered_float::OrderedFloat;
use palette::{FromColor, Hsl, IntoColor, Lab, LinSrgb, Srgb};

/// A color as three `f64` components in whatever space a strategy works in.
pub(crate) type Point = [f64; 3];

/// Packs a color into a 24-bit integer with red in the highest byte.
#[inline]
pub(crate) fn pack(color: Srgb<u8>) -> u32 {
    (u32::from(color.red) << 16) | (u32::from(color.green) << 8) | u32::from(color.blue)
}

/// Inverse of [`pack`].
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn unpack(rgb: u32) -> Srgb<u8> {
    Srgb::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

#[inline]
pub(crate) fn to_point(color: Srgb<u8>) -> Point {
    [color.red, color.green, color.blue].map(f64::from)
}

/// Rounds and clamps each component back into a `u8` color.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn from_point(point: Point) -> Srgb<u8> {
    let [r, g, b] = point.map(|c| num_traits::clamp(c.round(), 0.0, 255.0) as u8);
    Srgb::new(r, g, b)
}

#[inline]
pub(crate) fn squared_distance<const N: usize>(a: &[f64; N], b: &[f64; N]) -> f64 {
    let mut dist = 0.0;
    for c in 0..N {
        let d = a[c] - b[c];
        dist += d * d;
    }
    dist
}

/// Converts an sRGB color to CIELAB (D65).
pub(crate) fn to_lab(color: Srgb<u8>) -> Point {
    let linear: LinSrgb = color.into_linear();
    let lab: Lab = linear.into_color();
    [lab.l, lab.a, lab.b].map(f64::from)
}

/// Converts a CIELAB (D65) point back to sRGB, clamping out of gamut colors.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn lab_to_srgb([l, a, b]: Point) -> Srgb<u8> {
    let lab = Lab::new(l as f32, a as f32, b as f32);
    let linear: LinSrgb = lab.into_color();
    linear.into_encoding()
}

/// The perceptual sort key of a color: hue in degrees, then saturation, then lightness.
///
/// Achromatic colors have zero hue and saturation, so they are ordered by lightness alone.
pub fn hsl_key(color: Srgb<u8>) -> [OrderedFloat<f32>; 3] {
    let hsl: Hsl = Hsl::from_color(color.into_format::<f32>());
    [
        hsl.hue.into_positive_degrees(),
        hsl.saturation,
        hsl.lightness,
    ]
    .map(OrderedFloat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_round_trips() {
        let color = Srgb::new(12, 34, 56);
        assert_eq!(pack(color), 0x0C2238);
        assert_eq!(unpack(pack(color)), color);
    }

    #[test]
    fn point_conversion_clamps() {
        assert_eq!(from_point([-3.0, 127.6, 300.0]), Srgb::new(0, 128, 255));
    }

    #[test]
    fn lab_preserves_primaries() {
        for color in [
            Srgb::new(0, 0, 0),
            Srgb::new(255, 255, 255),
            Srgb::new(255, 0, 0),
            Srgb::new(0, 128, 255),
        ] {
            let back = lab_to_srgb(to_lab(color));
            for (x, y) in [(back.red, color.red), (back.green, color.green), (back.blue, color.blue)] {
                assert!(x.abs_diff(y) <= 1, "{color:?} became {back:?}");
            }
        }
    }

    #[test]
    fn gray_sorts_by_lightness() {
        let black = hsl_key(Srgb::new(0, 0, 0));
        let gray = hsl_key(Srgb::new(128, 128, 128));
        let white = hsl_key(Srgb::new(255, 255, 255));
        assert!(black < gray && gray < white);
        assert_eq!(black[0], OrderedFloat(0.0));
        assert_eq!(white[1], OrderedFloat(0.0));
    }
}
