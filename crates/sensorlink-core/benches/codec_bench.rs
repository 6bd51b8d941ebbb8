//! Criterion benchmarks for the sensorlink frame codec.
//!
//! Run with:
//! ```bash
//! cargo bench --package sensorlink-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sensorlink_core::{decode_frame, encode_frame, SensorState};

fn fixtures() -> Vec<(&'static str, SensorState)> {
    vec![
        ("default", SensorState::default()),
        ("typical", SensorState::new(32.5, 1.0, 21.0, true, 75)),
        ("negative_fuel", SensorState::new(32.5, 1.0, -5.0, false, -1)),
    ]
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_frame");
    for (name, state) in fixtures() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &state, |b, state| {
            b.iter(|| encode_frame(black_box(state)));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_frame");
    for (name, state) in fixtures() {
        let bytes = encode_frame(&state);
        group.bench_with_input(BenchmarkId::from_parameter(name), &bytes, |b, bytes| {
            b.iter(|| decode_frame(black_box(bytes)).expect("decode"));
        });
    }
    group.finish();
}

fn bench_decode_stream(c: &mut Criterion) {
    // 1 000 back-to-back frames, decoded with a moving cursor.
    let stream: Vec<u8> = (0..1_000)
        .map(|i| SensorState::new(30.0 + i as f32 * 0.01, 1.0, 21.0, i % 2 == 0, i % 101))
        .flat_map(|s| encode_frame(&s))
        .collect();

    c.bench_function("decode_stream_1000", |b| {
        b.iter(|| {
            let mut cursor = 0;
            while cursor < stream.len() {
                let (_, n) = decode_frame(black_box(&stream[cursor..])).expect("decode");
                cursor += n;
            }
        });
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_decode_stream);
criterion_main!(benches);
