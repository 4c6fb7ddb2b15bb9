//! Iteration benchmarks: full forward/backward traversal, prefix scan, and range scan.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ordart::{new_bytes_tree, new_unsigned_u64_tree};

fn xorshift_stream(seed: u64, n: usize) -> Vec<u64> {
    let mut state = seed | 1;
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        })
        .collect()
}

fn bench_all_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("all_forward");

    for &size in &[1_000usize, 10_000, 100_000] {
        let mut tree = new_unsigned_u64_tree::<u64>();
        for k in xorshift_stream(0xC0FFEE, size) {
            tree.insert(k, k);
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &tree, |b, tree| {
            b.iter(|| {
                for entry in tree.all() {
                    black_box(entry);
                }
            });
        });
    }

    group.finish();
}

fn bench_backward(c: &mut Criterion) {
    let mut group = c.benchmark_group("backward");

    for &size in &[1_000usize, 10_000, 100_000] {
        let mut tree = new_unsigned_u64_tree::<u64>();
        for k in xorshift_stream(0xC0FFEE, size) {
            tree.insert(k, k);
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &tree, |b, tree| {
            b.iter(|| {
                for entry in tree.backward() {
                    black_box(entry);
                }
            });
        });
    }

    group.finish();
}

/// Prefix scan over a key space where every key shares a path-compressed common prefix, so the
/// scan must walk past the compressed segment before fanning out into matches.
fn bench_prefix_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("prefix_scan");

    for &size in &[1_000usize, 10_000, 100_000] {
        let mut tree = new_bytes_tree::<usize>();
        for i in 0..size as u64 {
            let mut key = b"customers/acme-corp/orders/".to_vec();
            key.extend_from_slice(&i.to_be_bytes());
            tree.insert(Bytes::from(key), i as usize);
        }
        let prefix = Bytes::from_static(b"customers/acme-corp/orders/");

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(tree, prefix),
            |b, (tree, prefix)| {
                b.iter(|| {
                    for entry in tree.prefix(prefix) {
                        black_box(entry);
                    }
                });
            },
        );
    }

    group.finish();
}

/// Range scan over the middle third of a dense u64 key space.
fn bench_range_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_scan");

    for &size in &[1_000u64, 10_000, 100_000] {
        let mut tree = new_unsigned_u64_tree::<u64>();
        for k in 0..size {
            tree.insert(k, k);
        }
        let start = size / 3;
        let end = 2 * size / 3;

        group.throughput(Throughput::Elements(end - start));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(tree, start, end),
            |b, (tree, start, end)| {
                b.iter(|| {
                    for entry in tree.range(start, end) {
                        black_box(entry);
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_all_forward,
    bench_backward,
    bench_prefix_scan,
    bench_range_scan
);
criterion_main!(benches);
