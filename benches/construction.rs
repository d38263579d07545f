use criterion::{black_box, criterion_group, criterion_main, Criterion};
use panfm::construction::{self, Batch};
use panfm::config::BuildConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_strings(n: usize, len: usize, seed: u64) -> Vec<Vec<u8>> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..len).map(|_| bases[rng.gen_range(0..4)]).collect())
        .collect()
}

fn bench_build_initial(c: &mut Criterion) {
    let cfg = BuildConfig { add_reverse_complement: false, n_threads: 1, ..BuildConfig::default() };
    let strings = random_strings(200, 200, 42);
    c.bench_function("build_initial_200x200", |b| {
        b.iter(|| {
            let batch = Batch::new(strings.clone(), &cfg);
            black_box(construction::build_initial(&batch, &cfg))
        })
    });
}

fn bench_extend(c: &mut Criterion) {
    let cfg = BuildConfig { add_reverse_complement: false, n_threads: 1, ..BuildConfig::default() };
    let initial = random_strings(200, 200, 1);
    let batch = Batch::new(initial, &cfg);
    let extra = random_strings(50, 200, 2);

    c.bench_function("extend_50x200_into_200x200", |b| {
        b.iter_batched(
            || construction::build_initial(&batch, &cfg),
            |mut fm| {
                let extra_batch = Batch::new(extra.clone(), &cfg);
                construction::extend(&mut fm, &extra_batch, &cfg);
                black_box(&fm);
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_build_initial, bench_extend);
criterion_main!(benches);
