use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gauge_core::NoiseFilter;

fn burst(n: usize) -> Vec<u16> {
    // deterministic spread with a few spikes
    (0..n)
        .map(|i| {
            let base = 500 + (i * 37 % 23) as u16;
            if i % 17 == 0 { 1023 } else { base }
        })
        .collect()
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("noise_filter_reduce");
    for n in [10usize, 20, 100, 1000] {
        let data = burst(n);
        let mut f = NoiseFilter::new(n, 1100, 1023).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, d| {
            b.iter(|| f.reduce(black_box(d)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reduce);
criterion_main!(benches);
