use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use image::{Rgb, RgbImage};
use meso_detect::detect;
use meso_model::config::{standard_legend, Config, DistanceUnit, RadarZone};

fn fill(image: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, index: usize) {
    let color = Rgb(standard_legend()[index].color);
    for x in x0..=x1 {
        for y in y0..=y1 {
            image.put_pixel(x, y, color);
        }
    }
}

/// A synthetic frame with a couplet plus scattered weak echo, sized like a
/// real product.
fn synthetic_frame() -> RgbImage {
    let mut image = RgbImage::new(760, 600);
    fill(&mut image, 288, 266, 303, 294, 5);
    fill(&mut image, 304, 266, 320, 294, 8);
    fill(&mut image, 294, 275, 303, 284, 1);
    fill(&mut image, 296, 277, 301, 282, 0);
    fill(&mut image, 304, 275, 313, 284, 12);
    fill(&mut image, 306, 277, 311, 282, 13);
    // Background precipitation bands.
    fill(&mut image, 100, 100, 220, 140, 5);
    fill(&mut image, 400, 380, 520, 430, 8);
    image
}

fn benchmark_detect(c: &mut Criterion) {
    let mut config = Config::new(
        (760, 600),
        (300, 300),
        RadarZone { min: 30, max: 570 },
        standard_legend(),
    );
    config.center_distance_unit = DistanceUnit::Kilometers;
    let frame = synthetic_frame();

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);
    group.bench_function("detect_760x600", |b| {
        b.iter(|| detect(black_box(&frame), black_box(&config), None).expect("runs"));
    });
    group.finish();
}

criterion_group!(benches, benchmark_detect);
criterion_main!(benches);
