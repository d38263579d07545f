//! Rank dictionary: the sealed `Rank` sum type over the two BWT backends
//! (delta-coded immutable `FMD`, rope-tree mutable `FMR`), per the
//! re-architecture note replacing FMD/FMR polymorphism with a sealed enum
//! rather than `dyn` dispatch.

pub mod delta;
pub mod rope;

use crate::alphabet::ALPHABET_SIZE;

/// Result of `rank1`: the symbol at rank `k` (or the sentinel `0` if `k` is
/// out of range) plus per-symbol occurrence counts in `[0, k)`.
///
/// This is a hot-path value type, not a `Result`: an empty/zero state is a
/// well-defined, valid answer (see the re-architecture note on tagged
/// returns / sentinel values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rank1Result {
    pub symbol: u8,
    pub occ: [usize; ALPHABET_SIZE],
}

impl Rank1Result {
    pub fn empty() -> Self {
        Rank1Result::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rank2Result {
    pub occ_k: [usize; ALPHABET_SIZE],
    pub occ_l: [usize; ALPHABET_SIZE],
}

/// Shared contract for both rank-dictionary backends (§4.1).
pub trait RankDict {
    /// Total length of the represented BWT (including sentinels).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Prefix sums over the alphabet: `acc[c+1] - acc[c]` is the count of
    /// symbol `c`; `acc[ALPHABET_SIZE]` is the total length.
    fn acc(&self) -> &[usize; ALPHABET_SIZE + 1];

    /// `rank1(k)`: symbol at rank `k` plus occurrence counts in `[0, k)`.
    fn rank1(&self, k: usize) -> Rank1Result;

    /// `rank2(k, l)`: occurrence counts at both `k` and `l` in one pass.
    /// Implementations must not decode the same underlying block twice.
    fn rank2(&self, k: usize, l: usize) -> Rank2Result;

    /// Iterate the BWT symbols in order (used by format converters).
    fn iter_symbols(&self) -> Box<dyn Iterator<Item = u8> + '_>;
}

/// The sealed rank-dictionary sum type. Matched once per call site and then
/// inlined; never boxed as `dyn RankDict`.
pub enum Rank {
    Delta(delta::DeltaBwt),
    Rope(rope::RopeBwt),
}

impl Rank {
    pub fn len(&self) -> usize {
        match self {
            Rank::Delta(d) => d.len(),
            Rank::Rope(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn acc(&self) -> &[usize; ALPHABET_SIZE + 1] {
        match self {
            Rank::Delta(d) => d.acc(),
            Rank::Rope(r) => r.acc(),
        }
    }

    pub fn rank1(&self, k: usize) -> Rank1Result {
        match self {
            Rank::Delta(d) => d.rank1(k),
            Rank::Rope(r) => r.rank1(k),
        }
    }

    pub fn rank2(&self, k: usize, l: usize) -> Rank2Result {
        match self {
            Rank::Delta(d) => d.rank2(k, l),
            Rank::Rope(r) => r.rank2(k, l),
        }
    }

    pub fn iter_symbols(&self) -> Box<dyn Iterator<Item = u8> + '_> {
        match self {
            Rank::Delta(d) => d.iter_symbols(),
            Rank::Rope(r) => r.iter_symbols(),
        }
    }

    pub fn as_rope_mut(&mut self) -> Option<&mut rope::RopeBwt> {
        match self {
            Rank::Rope(r) => Some(r),
            Rank::Delta(_) => None,
        }
    }
}

/// Derive `acc[0..=ALPHABET_SIZE]` from per-symbol totals.
pub fn acc_from_counts(counts: &[usize; ALPHABET_SIZE]) -> [usize; ALPHABET_SIZE + 1] {
    let mut acc = [0usize; ALPHABET_SIZE + 1];
    for c in 0..ALPHABET_SIZE {
        acc[c + 1] = acc[c] + counts[c];
    }
    acc
}
