use criterion::{Criterion, black_box, criterion_group, criterion_main};
use decoy_sentinel::{SentinelKey, derive_sentinel};

pub fn derive_benchmarks(c: &mut Criterion) {
    let label = "2024-01-01 10";

    c.bench_function("derive_sentinel, one-shot key", |b| {
        let mut seq = 0u64;
        b.iter(|| {
            seq += 1;
            derive_sentinel(black_box(b"testkey1"), black_box(seq), black_box(label))
        })
    });

    c.bench_function("derive_sentinel, prepared key", |b| {
        let key = SentinelKey::new(b"testkey1").unwrap();
        let mut seq = 0u64;
        b.iter(|| {
            seq += 1;
            key.derive(black_box(seq), black_box(label))
        })
    });

    c.bench_function("split 8-byte search pattern and label", |b| {
        let s = derive_sentinel(b"testkey1", 0, label).unwrap();
        b.iter(|| (black_box(&s).search_pattern(8), black_box(&s).label(8)))
    });
}

criterion_group!(benches, derive_benchmarks);
criterion_main!(benches);
