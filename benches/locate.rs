use criterion::{black_box, criterion_group, criterion_main, Criterion};
use panfm::alphabet;
use panfm::config::SsaConfig;
use panfm::fmindex::FmIndex;
use panfm::rank::delta::DeltaBwt;
use panfm::rank::Rank;
use panfm::ssa::Ssa;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn build_index(n_strings: usize, len: usize) -> FmIndex {
    let bases = [alphabet::A, alphabet::C, alphabet::G, alphabet::T];
    let mut rng = StdRng::seed_from_u64(7);
    let mut concat = Vec::new();
    for _ in 0..n_strings {
        for _ in 0..len {
            concat.push(bases[rng.gen_range(0..4)]);
        }
        concat.push(alphabet::SENTINEL);
    }
    let n = concat.len();
    let mut sa: Vec<usize> = (0..n).collect();
    sa.sort_by(|&i, &j| rotate(&concat, i).cmp(&rotate(&concat, j)));
    let bwt: Vec<u8> = sa.iter().map(|&i| concat[(i + n - 1) % n]).collect();
    FmIndex::new(Rank::Delta(DeltaBwt::from_plain(&bwt)))
}

fn rotate(s: &[u8], i: usize) -> Vec<u8> {
    let n = s.len();
    (0..n).map(|k| s[(i + k) % n]).collect()
}

fn bench_locate(c: &mut Criterion) {
    let fm = build_index(100, 500);
    let ssa = Ssa::build(&fm, SsaConfig::default().ss);

    c.bench_function("ssa_locate_every_position", |b| {
        b.iter(|| {
            for k in 0..fm.len() {
                black_box(ssa.locate(&fm, k));
            }
        })
    });
}

criterion_group!(benches, bench_locate);
criterion_main!(benches);
