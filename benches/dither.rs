#[path = "../util/util.rs"]
mod util;

use util::{benchmark_images, BenchImage};

use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};
use huecluster::{
    dither, BayerSize, FloydSteinbergOptions, KmeansOptions, Method, OrderedOptions, PalettePipeline,
    PaletteSize, PixelBuffer,
};
use palette::Srgb;

fn bench(
    c: &mut Criterion,
    group: &str,
    mut f: impl FnMut(&mut Bencher<WallTime>, &(&BenchImage, Vec<Srgb<u8>>)),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(30)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_secs(2));

    for k in [PaletteSize::MAX, 64.into(), 16.into()] {
        for image in benchmark_images() {
            let palette = PalettePipeline::new(PixelBuffer::new(&image.bgra).unwrap())
                .palette_size(k)
                .method(Method::from(KmeansOptions::new().max_iterations(10)))
                .run()
                .unwrap()
                .palette;

            group.bench_with_input(BenchmarkId::new(k.to_string(), &image.name), &(image, palette), &mut f);
        }
    }
}

fn floyd_steinberg(c: &mut Criterion) {
    bench(c, "floyd_steinberg", |b, (image, palette)| {
        let pixels = PixelBuffer::new(&image.bgra).unwrap();
        b.iter(|| {
            dither::floyd_steinberg(pixels, image.width, image.height, palette, FloydSteinbergOptions::new())
        });
    });
}

fn ordered(c: &mut Criterion) {
    for size in [BayerSize::Two, BayerSize::Eight] {
        bench(c, &format!("ordered_{}", size.dimension()), |b, (image, palette)| {
            let pixels = PixelBuffer::new(&image.bgra).unwrap();
            let options = OrderedOptions::new().size(size);
            b.iter(|| dither::ordered(pixels, image.width, image.height, palette, options));
        });
    }
}

criterion_group!(benches, floyd_steinberg, ordered);
criterion_main!(benches);
