//! Wire chunk codec benchmarks.
//!
//! The codec runs once per served file, so its throughput bounds the whole
//! server's.
//!
//! Run with:
//! ```bash
//! cargo bench --bench codec
//! ```

#![allow(clippy::expect_used)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use relic_store::record::wrap_uncompressed;
use relic_update::{decode_file, encode_file};
use std::hint::black_box;

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_file");

    for &payload_len in &[64usize, 1024, 16 * 1024, 256 * 1024] {
        let payload: Vec<u8> = (0..payload_len).map(|i| (i % 256) as u8).collect();
        let record = wrap_uncompressed(&payload);

        group.throughput(Throughput::Bytes(record.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(payload_len),
            &record,
            |b, record| {
                b.iter(|| encode_file(black_box(2), black_box(17), black_box(record)));
            },
        );
    }

    group.finish();
}

fn bench_round_trip(c: &mut Criterion) {
    let payload: Vec<u8> = (0..16 * 1024).map(|i| (i % 256) as u8).collect();
    let record = wrap_uncompressed(&payload);
    let packet = encode_file(2, 17, &record).expect("encode benchmark fixture");

    c.bench_function("decode_file/16k", |b| {
        b.iter(|| decode_file(black_box(&packet)));
    });
}

criterion_group!(benches, bench_encode, bench_round_trip);
criterion_main!(benches);
