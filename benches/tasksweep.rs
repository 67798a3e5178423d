use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use tasksweep::{CancelToken, Frame, FrameMatcher, IconScanner, OwnedImage, Template};

fn noise(seed: u64, width: usize, height: usize) -> OwnedImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..width * height).map(|_| rng.random_range(0..=255u8)).collect();
    OwnedImage::new(data, width, height).unwrap()
}

fn bench_scan(c: &mut Criterion) {
    let patch = noise(7, 24, 24);
    let tpl = Template::new("marker", patch.clone(), 10).unwrap();
    let mut canvas = OwnedImage::filled(480, 270, 32).unwrap();
    for row in 0..4 {
        canvas.blit(patch.view(), 40, 20 + row * 60);
    }
    let frame = Frame::new(canvas);
    let scanner = IconScanner::default();
    let cancel = CancelToken::new();

    c.bench_function("find_one_480x270_tpl24", |b| {
        b.iter(|| black_box(FrameMatcher::default().find(frame.view(), &tpl)))
    });

    c.bench_function("find_all_4_rows_480x270_tpl24", |b| {
        b.iter(|| black_box(scanner.find_all(black_box(&frame), &tpl, &cancel)))
    });
}

fn smooth(size: usize) -> OwnedImage {
    let data = (0..size * size)
        .map(|i| {
            let (x, y) = ((i % size) as f32, (i / size) as f32);
            (128.0 + 90.0 * (x / 9.0).sin() * (y / 11.0).cos()) as u8
        })
        .collect();
    OwnedImage::new(data, size, size).unwrap()
}

fn bench_full_hd(c: &mut Criterion) {
    let patch = smooth(48);
    let tpl = Template::new("badge", patch.clone(), 10).unwrap();
    let mut canvas = noise(11, 1920, 1080);
    canvas.blit(patch.view(), 1311, 707);
    let frame = Frame::new(canvas);

    c.bench_function("find_one_1920x1080_tpl48_pyramid", |b| {
        b.iter(|| black_box(FrameMatcher::default().find(frame.view(), &tpl)))
    });
}

criterion_group!(benches, bench_scan, bench_full_hd);
criterion_main!(benches);
