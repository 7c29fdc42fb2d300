#[path = "../util/util.rs"]
mod util;

use util::benchmark_images;

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode};
use huecluster::{
    DensityOptions, GmmOptions, HierarchicalOptions, KmeansOptions, MaxMinOptions, MeanShiftOptions, Method,
    NativeKmeansOptions, OctreeOptions, PalettePipeline, PaletteSize, PcaOptions, PixelBuffer, SpectralOptions,
    VarianceSplitOptions,
};

fn bench(c: &mut Criterion, method: &Method, sizes: &[PaletteSize]) {
    let mut group = c.benchmark_group(method.name());
    group
        .sample_size(30)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_millis(500));

    for &k in sizes {
        for image in benchmark_images() {
            let pixels = PixelBuffer::new(&image.bgra).unwrap();
            group.bench_with_input(BenchmarkId::new(k.to_string(), &image.name), &k, |b, &k| {
                b.iter(|| {
                    PalettePipeline::new(pixels)
                        .palette_size(k)
                        .method(method.clone())
                        .run()
                })
            });
        }
    }
}

fn fast_methods(c: &mut Criterion) {
    let sizes = [PaletteSize::MAX, 64.into(), 16.into()];
    for method in [
        Method::popularity(),
        OctreeOptions::new().into(),
        VarianceSplitOptions::new().into(),
        PcaOptions::new().into(),
        MaxMinOptions::new().into(),
        Method::kmeans(),
        Method::KmeansPlusPlus(KmeansOptions::new()),
        Method::LabKmeans(KmeansOptions::new()),
        NativeKmeansOptions::new().into(),
    ] {
        bench(c, &method, &sizes);
    }
}

fn clustering_methods(c: &mut Criterion) {
    let sizes = [32.into(), 8.into()];
    for method in [
        MeanShiftOptions::new().into(),
        Method::Dbscan(DensityOptions::new()),
        Method::Optics(DensityOptions::new()),
        GmmOptions::new().into(),
        HierarchicalOptions::new().into(),
        SpectralOptions::new().into(),
    ] {
        bench(c, &method, &sizes);
    }
}

criterion_group!(benches, fast_methods, clustering_methods);
criterion_main!(benches);
