use criterion::{Criterion, criterion_group, criterion_main};
use dominant_colors::{Color, InitialSelection, KMeans, sample_pixels};
use image::{DynamicImage, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn gradient_image() -> DynamicImage {
    let mut rng = StdRng::seed_from_u64(0);
    DynamicImage::ImageRgb8(RgbImage::from_fn(640, 480, |x, y| {
        Rgb([
            (x * 255 / 640) as u8,
            (y * 255 / 480) as u8,
            rng.random_range(0..=255),
        ])
    }))
}

pub fn run_benchmarks(c: &mut Criterion) {
    let img = gradient_image();
    let pixels: Vec<Color> = sample_pixels(&img, 0);

    let mut group = c.benchmark_group("kmeans");
    group.sample_size(20);

    for count in [4, 8] {
        for exact in [false, true] {
            let uniform = KMeans::new(count).with_exact_match(exact);
            group.bench_function(format!("{count}-colors,exact={exact},uniform"), |b| {
                b.iter(|| uniform.run(&pixels))
            });

            let random = uniform.with_selection(InitialSelection::Random { seed: Some(1) });
            group.bench_function(format!("{count}-colors,exact={exact},random"), |b| {
                b.iter(|| random.run(&pixels))
            });
        }
    }

    group.finish();

    let mut group = c.benchmark_group("sampling");
    for interval in [0, 10, 40] {
        group.bench_function(format!("interval={interval}"), |b| {
            b.iter(|| sample_pixels(&img, interval))
        });
    }
    group.finish();
}

criterion_group!(benches, run_benchmarks);
criterion_main!(benches);
