//! Key decoder benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tilde::input::KeyDecoder;

fn bench_decode_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder");

    // Plain typing
    let typing = "The quick brown fox jumps over the lazy dog. ".repeat(200);
    group.throughput(Throughput::Bytes(typing.len() as u64));

    group.bench_function("printable", |b| {
        let decoder = KeyDecoder::default();
        b.iter(|| black_box(decoder.decode_all(black_box(typing.as_bytes()))))
    });

    group.finish();
}

fn bench_decode_navigation(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder");

    // Arrow, page and home/end sequences
    let navigation = "\x1b[A\x1b[B\x1b[C\x1b[D\x1b[5~\x1b[6~\x1b[H\x1b[F\x1bOH\x1b[3~".repeat(200);
    group.throughput(Throughput::Bytes(navigation.len() as u64));

    group.bench_function("escape_sequences", |b| {
        let decoder = KeyDecoder::default();
        b.iter(|| black_box(decoder.decode_all(black_box(navigation.as_bytes()))))
    });

    group.finish();
}

fn bench_read_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder");

    let mixed: Vec<u8> = b"edit\x1b[Bmore\x1b[6~\x7f".repeat(100);
    group.throughput(Throughput::Bytes(mixed.len() as u64));

    group.bench_function("read_key", |b| {
        let decoder = KeyDecoder::default();
        b.iter(|| {
            let mut source: std::collections::VecDeque<u8> = mixed.iter().copied().collect();
            let mut count = 0usize;
            while let Ok(Some(key)) = decoder.read_key(&mut source) {
                black_box(key);
                count += 1;
            }
            count
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_decode_typing,
    bench_decode_navigation,
    bench_read_key
);

criterion_main!(benches);
