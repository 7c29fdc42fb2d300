//! End to end checks of the pipeline over every palette method.

use huecluster::{
    hsl_key, DensityOptions, Error, FixedOptions, FloydSteinbergOptions, GmmOptions, HierarchicalOptions,
    KmeansOptions, MaxMinOptions, MeanShiftOptions, Method, NativeKmeansOptions, OctreeOptions, OrderedOptions,
    PaletteOutput, PalettePipeline, PaletteSize, PcaOptions, PixelBuffer, SpectralOptions, VarianceSplitOptions,
};
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;
use std::collections::BTreeSet;

fn bgra(colors: &[Srgb<u8>]) -> Vec<u8> {
    colors.iter().flat_map(|c| [c.blue, c.green, c.red, 255]).collect()
}

fn random_image(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    (0..len).flat_map(|_| [rng.gen(), rng.gen(), rng.gen(), 255]).collect()
}

fn color_of(px: &[u8]) -> Srgb<u8> {
    Srgb::new(px[2], px[1], px[0])
}

fn distinct(colors: impl IntoIterator<Item = Srgb<u8>>) -> BTreeSet<(u8, u8, u8)> {
    colors.into_iter().map(|c| c.into_components()).collect()
}

/// Alternates `n` pixels between `a` and `b`, each channel offset uniformly by up to `spread`.
fn two_clusters(a: Srgb<u8>, b: Srgb<u8>, n: usize, spread: u8, seed: u64) -> Vec<Srgb<u8>> {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    let spread = i16::from(spread);
    let mut jitter = |c: u8| {
        let offset = rng.gen_range(-spread..=spread);
        u8::try_from((i16::from(c) + offset).clamp(0, 255)).unwrap()
    };
    (0..n)
        .map(|i| if i % 2 == 0 { a } else { b })
        .map(|c| Srgb::new(jitter(c.red), jitter(c.green), jitter(c.blue)))
        .collect()
}

#[track_caller]
fn assert_has_color_near(palette: &[Srgb<u8>], center: Srgb<u8>, tolerance: u8) {
    let close = |c: &Srgb<u8>| {
        c.red.abs_diff(center.red) <= tolerance
            && c.green.abs_diff(center.green) <= tolerance
            && c.blue.abs_diff(center.blue) <= tolerance
    };
    assert!(palette.iter().any(close), "{center:?} not found in {palette:?}");
}

/// Every non-dithering method with default options.
fn all_methods() -> Vec<Method> {
    vec![
        Method::popularity(),
        OctreeOptions::new().into(),
        VarianceSplitOptions::new().into(),
        PcaOptions::new().into(),
        MaxMinOptions::new().into(),
        NativeKmeansOptions::new().into(),
        MeanShiftOptions::new().into(),
        Method::Dbscan(DensityOptions::new()),
        GmmOptions::new().into(),
        HierarchicalOptions::new().into(),
        SpectralOptions::new().into(),
        Method::Optics(DensityOptions::new()),
        Method::LabKmeans(KmeansOptions::new()),
        Method::kmeans(),
        Method::KmeansPlusPlus(KmeansOptions::new()),
        Method::fixed(),
    ]
}

fn run(bytes: &[u8], k: u8, method: Method) -> Result<PaletteOutput, Error> {
    PalettePipeline::new(PixelBuffer::new(bytes)?)
        .palette_size(PaletteSize::from(k))
        .method(method)
        .run()
}

#[test]
fn every_method_returns_exactly_k_sorted_colors() {
    let bytes = random_image(256, 17);
    for method in all_methods() {
        for k in [1, 2, 7, 16, 64] {
            let output = run(&bytes, k, method.clone()).unwrap();
            assert_eq!(output.palette.len(), usize::from(k), "{method} with {k} colors");
            assert!(
                output.palette.windows(2).all(|w| hsl_key(w[0]) <= hsl_key(w[1])),
                "{method} palette is not sorted",
            );
        }
    }
}

#[test]
fn full_palette_size_is_supported() {
    let bytes = random_image(64, 5);
    for method in [Method::popularity(), OctreeOptions::new().into(), Method::kmeans(), Method::fixed()] {
        let output = PalettePipeline::new(PixelBuffer::new(&bytes).unwrap())
            .palette_size(PaletteSize::MAX)
            .method(method)
            .run()
            .unwrap();
        assert_eq!(output.palette.len(), 256);
    }
}

#[test]
fn all_transparent_image_is_rejected() {
    let bytes = [10, 20, 30, 128].repeat(64);
    for method in all_methods() {
        let result = run(&bytes, 4, method.clone());
        if matches!(method, Method::Fixed(_)) {
            assert_eq!(result.unwrap().palette.len(), 4);
        } else {
            assert_eq!(result, Err(Error::NoEligiblePixels), "{method}");
        }
    }
}

#[test]
fn black_and_white_popularity() {
    let black = Srgb::new(0, 0, 0);
    let white = Srgb::new(255, 255, 255);
    let colors = (0..16).map(|i| if i % 2 == 0 { black } else { white }).collect::<Vec<_>>();
    let bytes = bgra(&colors);

    let output = PalettePipeline::new(PixelBuffer::with_dimensions(&bytes, 4, 4).unwrap())
        .palette_size(PaletteSize::from(2))
        .run()
        .unwrap();

    assert_eq!(output.palette, vec![black, white]);
    assert!(output.last_change.abs() < f64::EPSILON);
}

#[test]
fn popularity_keeps_minority_color() {
    let red = Srgb::new(200, 10, 10);
    let blue = Srgb::new(10, 10, 200);
    let mut colors = vec![red; 90];
    colors.extend([blue; 10]);
    let output = run(&bgra(&colors), 2, Method::popularity()).unwrap();
    assert_eq!(distinct(output.palette), distinct([red, blue]));
}

#[test]
fn octree_reproduces_few_colors() {
    let colors = [
        Srgb::new(255, 0, 0),
        Srgb::new(0, 128, 0),
        Srgb::new(17, 34, 51),
        Srgb::new(250, 250, 250),
        Srgb::new(255, 0, 0),
    ];
    let output = run(&bgra(&colors.repeat(20)), 8, OctreeOptions::new().into()).unwrap();
    assert_eq!(distinct(output.palette), distinct(colors));
}

#[test]
fn kmeans_recovers_separated_clusters() {
    let a = Srgb::new(40, 60, 220);
    let b = Srgb::new(230, 200, 30);
    let colors = two_clusters(a, b, 1000, 2, 3);

    let output = run(&bgra(&colors), 2, Method::kmeans()).unwrap();
    assert!(output.last_change < 0.5);
    for center in [a, b] {
        assert_has_color_near(&output.palette, center, 2);
    }
}

#[test]
fn spectral_recovers_separated_clusters() {
    let a = Srgb::new(200, 30, 30);
    let b = Srgb::new(30, 30, 200);
    let colors = two_clusters(a, b, 2000, 10, 8);

    let output = run(&bgra(&colors), 2, SpectralOptions::new().into()).unwrap();
    assert_eq!(output.palette.len(), 2);
    for center in [a, b] {
        assert_has_color_near(&output.palette, center, 3);
    }
}

#[test]
fn dithered_pixels_come_from_palette() {
    let (width, height) = (12, 9);
    let mut bytes = random_image(width * height, 21);
    for px in bytes.chunks_exact_mut(4).step_by(5) {
        px[3] = 0;
    }

    let dithers = |base: Method| {
        [
            Method::floyd_steinberg(base.clone()),
            Method::FloydSteinberg {
                base: Box::new(base.clone()),
                options: FloydSteinbergOptions::new().serpentine(false).strength(0.5),
            },
            Method::ordered(base.clone()),
            Method::Ordered { base: Box::new(base), options: OrderedOptions::new().strength(2.0) },
        ]
    };

    for method in [Method::popularity(), Method::kmeans(), FixedOptions::new().bit_depth(3).into()]
        .into_iter()
        .flat_map(dithers)
    {
        #[allow(clippy::cast_possible_truncation)]
        let output = PalettePipeline::new(PixelBuffer::new(&bytes).unwrap())
            .palette_size(PaletteSize::from(8))
            .method(method.clone())
            .dimensions(width as u32, height as u32)
            .run()
            .unwrap();

        let dithered = output.dithered.unwrap();
        assert_eq!(dithered.len(), bytes.len());
        for (out, input) in dithered.chunks_exact(4).zip(bytes.chunks_exact(4)) {
            if input[3] > 128 {
                assert!(output.palette.contains(&color_of(out)), "{method}");
                assert_eq!(out[3], input[3]);
            } else {
                assert_eq!(out, input);
            }
        }
    }
}

#[test]
fn configuration_errors() {
    let bytes = random_image(6, 1);
    assert_eq!(run(&bytes, 0, Method::kmeans()), Err(Error::ZeroColorCount));
    assert_eq!(
        run(&bytes, 4, Method::floyd_steinberg(Method::kmeans())),
        Err(Error::MissingDimensions { method: "floyd-steinberg" }),
    );
    assert_eq!(run(&bytes, 4, FixedOptions::new().bit_depth(0).into()), Err(Error::InvalidBitDepth(0)));
    assert_eq!(PixelBuffer::new(&bytes[..7]), Err(Error::InvalidBufferLength(7)));
    assert_eq!("median-cut".parse::<Method>(), Err(Error::UnknownMethod("median-cut".into())));
}
