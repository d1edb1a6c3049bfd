use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use decoy_sentinel::{KeyFile, SentinelGenerator, SentinelTable};
use rayon::iter::ParallelIterator;

fn keys(n: usize) -> KeyFile {
    (0..n)
        .map(|i| format!("{i} key-{i}\n"))
        .collect::<String>()
        .parse()
        .unwrap()
}

pub fn generate_benchmarks(c: &mut Criterion) {
    let generator = SentinelGenerator::default();
    let window = generator.window(Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap()));
    let keys = keys(10);

    let mut group = c.benchmark_group("generate");
    for per_key in [100u64, 1_000] {
        group.throughput(Throughput::Elements(per_key * 10));
        group.bench_with_input(
            BenchmarkId::new("sequential", per_key),
            &per_key,
            |b, &per_key| {
                b.iter(|| {
                    generator
                        .sentinels(&keys, per_key, window)
                        .unwrap()
                        .map(|r| u64::from(r.sentinel.as_bytes()[0]))
                        .sum::<u64>()
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("parallel", per_key),
            &per_key,
            |b, &per_key| {
                b.iter(|| {
                    generator
                        .sentinels(&keys, per_key, window)
                        .unwrap()
                        .par_records()
                        .map(|r| u64::from(r.sentinel.as_bytes()[0]))
                        .sum::<u64>()
                })
            },
        );
    }
    group.finish();

    c.bench_function("table find in 1500-byte payload, 30k patterns", |b| {
        let table =
            SentinelTable::for_windows(&generator, &keys, 1_000, &window.skew_tolerant()).unwrap();
        let payload = vec![0x5au8; 1500];
        b.iter(|| table.find(black_box(&payload)))
    });
}

criterion_group!(benches, generate_benchmarks);
criterion_main!(benches);
