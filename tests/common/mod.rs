//! Shared naive-construction helpers for integration tests: these rebuild a
//! small BWT by sorting rotations directly, independent of the
//! `construction` module under test, so the fixtures don't depend on the
//! code paths the tests are meant to exercise.

use panfm::alphabet;
use panfm::fmindex::FmIndex;
use panfm::rank::delta::DeltaBwt;
use panfm::rank::Rank;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn rotate(s: &[u8], i: usize) -> Vec<u8> {
    let n = s.len();
    (0..n).map(|k| s[(i + k) % n]).collect()
}

/// Build an FM-index (delta/FMD-backed) over already-encoded strings, each
/// terminated with its own sentinel.
pub fn build_fm_encoded(strings: &[Vec<u8>]) -> FmIndex {
    let mut concat = Vec::new();
    for s in strings {
        concat.extend_from_slice(s);
        concat.push(alphabet::SENTINEL);
    }
    let n = concat.len();
    let mut sa: Vec<usize> = (0..n).collect();
    sa.sort_by(|&i, &j| rotate(&concat, i).cmp(&rotate(&concat, j)));
    let bwt: Vec<u8> = sa.iter().map(|&i| concat[(i + n - 1) % n]).collect();
    FmIndex::new(Rank::Delta(DeltaBwt::from_plain(&bwt)))
}

/// Build an FM-index over ASCII strings.
pub fn build_fm(strings: &[&[u8]]) -> FmIndex {
    let encoded: Vec<Vec<u8>> = strings.iter().map(|s| alphabet::encode(s)).collect();
    build_fm_encoded(&encoded)
}

/// Deterministic generator of synthetic encoded-base reads, seeded for
/// reproducible fixtures, used where a scenario calls for a bulk of
/// synthetic reads.
pub struct TestRng(StdRng);

impl TestRng {
    pub fn new(seed: u64) -> Self {
        TestRng(StdRng::seed_from_u64(seed))
    }

    pub fn next_base(&mut self) -> u8 {
        let bases = [alphabet::A, alphabet::C, alphabet::G, alphabet::T];
        bases[self.0.gen_range(0..4)]
    }

    pub fn next_read(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| self.next_base()).collect()
    }
}
