//! FM-index façade: wraps a [`Rank`] backend and exposes `rank1`/`rank2`,
//! bi-directional interval extension, accumulated counts, and retrieval.

use crate::alphabet::{self, ALPHABET_SIZE};
use crate::error::{Error, Result};
use crate::rank::{Rank, Rank1Result, Rank2Result, RankDict};

/// A bi-interval: the forward SA interval `[x0, x0+size)` of some string `W`
/// paired with the SA interval of its reverse complement, kept in sync so
/// either direction can be extended (§3, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiInterval {
    pub x0: usize,
    pub x1: usize,
    pub size: usize,
}

impl BiInterval {
    pub fn empty() -> Self {
        BiInterval { x0: 0, x1: 0, size: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

pub struct FmIndex {
    rank: Rank,
}

impl FmIndex {
    pub fn new(rank: Rank) -> Self {
        FmIndex { rank }
    }

    pub fn rank(&self) -> &Rank {
        &self.rank
    }

    pub fn rank_mut(&mut self) -> &mut Rank {
        &mut self.rank
    }

    pub fn len(&self) -> usize {
        self.rank.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rank.is_empty()
    }

    pub fn acc(&self) -> &[usize; ALPHABET_SIZE + 1] {
        self.rank.acc()
    }

    pub fn rank1(&self, k: usize) -> Rank1Result {
        self.rank.rank1(k)
    }

    pub fn rank2(&self, k: usize, l: usize) -> Rank2Result {
        self.rank.rank2(k, l)
    }

    /// The whole-index bi-interval (the empty-string match).
    pub fn full_interval(&self) -> BiInterval {
        BiInterval { x0: 0, x1: 0, size: self.len() }
    }

    /// `true` when `acc[A] == acc[T]` and `acc[C] == acc[G]`, i.e. the index
    /// is strand-symmetric (both strands present in equal measure). This is
    /// the check performed at query entry for strand-sensitive queries
    /// (§7 "Asymmetric index").
    pub fn is_strand_symmetric(&self) -> bool {
        let acc = self.acc();
        let count = |c: u8| acc[c as usize + 1] - acc[c as usize];
        count(alphabet::A) == count(alphabet::T) && count(alphabet::C) == count(alphabet::G)
    }

    pub fn require_strand_symmetric(&self) -> Result<()> {
        if self.is_strand_symmetric() {
            Ok(())
        } else {
            Err(Error::AsymmetricIndex)
        }
    }

    /// Extend a bi-interval by symbol `c`, in the forward or backward
    /// direction (§4.2). `is_back` selects which endpoint is the anchor
    /// updated last by the shift; the occurrence computation itself is
    /// symmetric.
    pub fn extend(&self, interval: &BiInterval, c: u8, is_back: bool) -> BiInterval {
        if interval.size == 0 {
            return BiInterval::empty();
        }
        let r2 = self.rank2(interval.x0, interval.x0 + interval.size);
        let acc = self.acc();

        let mut new_size = [0usize; ALPHABET_SIZE];
        let mut new_x0 = [0usize; ALPHABET_SIZE];
        for a in 0..ALPHABET_SIZE {
            new_size[a] = r2.occ_l[a] - r2.occ_k[a];
            new_x0[a] = acc[a] + r2.occ_k[a];
        }

        let c = c as usize;
        let target_size = new_size[c];
        if target_size == 0 {
            return BiInterval::empty();
        }
        let target_x0 = new_x0[c];

        // The paired (reverse-complement) endpoint shifts by the cumulative
        // size of symbols that sort strictly after the complement of `c` in
        // the reverse-complement ordering. In the canonical ropebwt3
        // extension, the complement-side endpoint advances past every
        // occurrence of symbols with *larger* complement, matching symbol
        // order $,A,C,G,T,N with complement pairing A<->T, C<->G.
        let complement = alphabet::complement(c as u8) as usize;
        let mut shift = 0usize;
        for a in 0..ALPHABET_SIZE {
            let comp_a = alphabet::complement(a as u8) as usize;
            if comp_a > complement {
                shift += new_size[a];
            }
        }

        let new_x1 = if is_back {
            interval.x1 + shift
        } else {
            interval.x1 + (interval.size - target_size - shift)
        };

        BiInterval { x0: target_x0, x1: new_x1, size: target_size }
    }

    /// Reconstruct the original string at sentinel rank `k` by repeated LF
    /// mapping until a sentinel is re-encountered (§4.2 / retrieval).
    pub fn retrieve(&self, sentinel_rank: usize) -> Vec<u8> {
        let acc = *self.acc();
        let mut out = Vec::new();
        let mut k = sentinel_rank;
        loop {
            let r = self.rank1(k);
            let c = r.symbol;
            k = acc[c as usize] + r.occ[c as usize];
            if c == alphabet::SENTINEL {
                break;
            }
            out.push(c);
        }
        out.reverse();
        out
    }
}
