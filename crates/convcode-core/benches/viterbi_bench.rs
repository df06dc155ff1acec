//! Encoder and Viterbi decoder throughput
//!
//! Run with: cargo bench -p convcode-core --bench viterbi_bench
//! Add `--features parallel` to measure the per-state rayon split.

use convcode_core::{CodeConfig, ConvolutionalEncoder, ViterbiDecoder};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BLOCK_LENGTH: usize = 1024;

fn codes() -> Vec<(&'static str, CodeConfig)> {
    vec![
        ("k3", CodeConfig::simple_k3()),
        ("k5", CodeConfig::gsm_k5_rate_half()),
        ("k7", CodeConfig::nasa_k7_rate_half()),
    ]
}

fn random_bits(len: usize) -> Vec<bool> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..len).map(|_| rng.gen()).collect()
}

// ============================================================================
// Encoder
// ============================================================================

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let data = random_bits(BLOCK_LENGTH);
    group.throughput(Throughput::Elements(BLOCK_LENGTH as u64));

    for (name, config) in codes() {
        let encoder = ConvolutionalEncoder::new(config).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| encoder.encode(black_box(data)))
        });
    }

    group.finish();
}

// ============================================================================
// Decoder
// ============================================================================

fn bench_decode_hard(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_hard");
    let data = random_bits(BLOCK_LENGTH);
    group.throughput(Throughput::Elements(BLOCK_LENGTH as u64));

    for (name, config) in codes() {
        let encoder = ConvolutionalEncoder::new(config).unwrap();
        let decoder = ViterbiDecoder::new(&encoder);
        let mut received = encoder.encode(&data);
        for i in (0..received.len()).step_by(37) {
            received[i] = !received[i];
        }

        group.bench_with_input(BenchmarkId::from_parameter(name), &received, |b, received| {
            b.iter(|| decoder.decode(black_box(received)))
        });
    }

    group.finish();
}

fn bench_decode_soft(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_soft");
    let data = random_bits(BLOCK_LENGTH);
    group.throughput(Throughput::Elements(BLOCK_LENGTH as u64));

    for (name, config) in codes() {
        let encoder = ConvolutionalEncoder::new(config).unwrap();
        let decoder = ViterbiDecoder::new(&encoder);
        let mut rng = StdRng::seed_from_u64(7);
        let symbols: Vec<f64> = encoder
            .encode(&data)
            .into_iter()
            .map(|bit| if bit { 1.0 } else { -1.0 } + rng.gen_range(-0.8..0.8))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(name), &symbols, |b, symbols| {
            b.iter(|| decoder.decode_soft(black_box(symbols)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode_hard, bench_decode_soft);
criterion_main!(benches);
