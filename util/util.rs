#![allow(dead_code)]

use std::sync::OnceLock;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// A named BGRA test image with its width and height.
pub struct BenchImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub bgra: Vec<u8>,
}

/// A smooth two axis gradient with a little noise, similar to a photo of a sky or a wall.
pub fn gradient(width: u32, height: u32, seed: u64) -> Vec<u8> {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .flat_map(|(x, y)| {
            let r = (x * 255 / width) as u8;
            let g = (y * 255 / height) as u8;
            let b = ((x + y) * 127 / (width + height)) as u8;
            let noise = rng.gen_range(0..8);
            [b.saturating_add(noise), g.saturating_add(noise), r.saturating_add(noise), 255]
        })
        .collect()
}

/// A handful of flat color regions with noise, similar to a logo or an illustration.
pub fn blobs(width: u32, height: u32, seed: u64) -> Vec<u8> {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    let centers = (0..12).map(|_| rng.gen::<[u8; 3]>()).collect::<Vec<_>>();
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .flat_map(|(x, y)| {
            let [r, g, b] = centers[((x / 32 + y / 32) % 12) as usize];
            let mut noise = || rng.gen_range(0..6);
            [b.saturating_add(noise()), g.saturating_add(noise()), r.saturating_add(noise()), 255]
        })
        .collect()
}

/// Uniformly random colors, where every pixel is likely unique.
pub fn noise(width: u32, height: u32, seed: u64) -> Vec<u8> {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    (0..width * height).flat_map(|_| [rng.gen(), rng.gen(), rng.gen(), 255]).collect()
}

pub fn load_benchmark_images() -> Vec<BenchImage> {
    let (width, height) = (640, 480);
    [("gradient", gradient as fn(u32, u32, u64) -> Vec<u8>), ("blobs", blobs), ("noise", noise)]
        .into_iter()
        .map(|(name, f)| BenchImage { name: name.to_owned(), width, height, bgra: f(width, height, 42) })
        .collect()
}

static BENCHMARK_IMAGES: OnceLock<Vec<BenchImage>> = OnceLock::new();

pub fn benchmark_images() -> &'static [BenchImage] {
    BENCHMARK_IMAGES.get_or_init(load_benchmark_images)
}
