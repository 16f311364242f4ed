use criterion::{criterion_group, criterion_main, Criterion};
use gxbank_core::asset::TextureFormat;
use gxbank_core::Interpolation;
use gxbank_lanes::texture_lane::{pixel, MipChainLane};
use image::{Rgba, RgbaImage};
use std::hint::black_box;

fn bench_mip_chains(c: &mut Criterion) {
    let source = RgbaImage::from_fn(256, 256, |x, y| {
        Rgba([x as u8, y as u8, (x ^ y) as u8, if (x / 16 + y / 16) % 2 == 0 { 255 } else { 96 }])
    });

    let mut group = c.benchmark_group("Mip Chains");

    for format in [TextureFormat::Cmpr, TextureFormat::Rgb5a3, TextureFormat::Rgba8] {
        group.bench_function(format!("Full chain 256x256 {format:?}"), |b| {
            let lane = MipChainLane::default();
            b.iter(|| black_box(lane.generate(&source, format).unwrap()));
        });
    }

    group.bench_function("Nearest filter CMPR", |b| {
        let lane = MipChainLane {
            filter: Interpolation::Nearest,
            level_cap: None,
        };
        b.iter(|| black_box(lane.generate(&source, TextureFormat::Cmpr).unwrap()));
    });

    group.bench_function("Decode level 0 CMPR", |b| {
        let data = pixel::encode_level(TextureFormat::Cmpr, &source).unwrap();
        b.iter(|| black_box(pixel::decode_level(TextureFormat::Cmpr, 256, 256, &data).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_mip_chains);
criterion_main!(benches);
