use criterion::{black_box, criterion_group, criterion_main, Criterion};
use panfm::alphabet;
use panfm::fmindex::FmIndex;
use panfm::rank::delta::DeltaBwt;
use panfm::rank::Rank;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn build_index(n_strings: usize, len: usize) -> FmIndex {
    let bases = [alphabet::A, alphabet::C, alphabet::G, alphabet::T];
    let mut rng = StdRng::seed_from_u64(13);
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

fn bench_count(c: &mut Criterion) {
    let fm = build_index(100, 500);
    let query = alphabet::encode(b"ACGTACGTACGT");

    c.bench_function("count_12mer", |b| {
        b.iter(|| {
            let mut interval = fm.full_interval();
            for &sym in query.iter().rev() {
                interval = fm.extend(&interval, sym, false);
            }
            black_box(interval.size)
        })
    });
}

criterion_group!(benches, bench_count);
criterion_main!(benches);
