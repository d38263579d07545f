//! Variant A: delta-coded immutable BWT ("FMD").
//!
//! Stored as a sequence of `(symbol, run_length)` runs. Random access uses a
//! sparse superblock index: every `SUPERBLOCK_RUNS` runs we snapshot the
//! cumulative per-symbol occurrence counts, so `rank` jumps to the nearest
//! preceding superblock and only has to linearly decode the runs within it.

use crate::alphabet::ALPHABET_SIZE;
use crate::rank::{acc_from_counts, Rank1Result, Rank2Result, RankDict};

const SUPERBLOCK_RUNS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    symbol: u8,
    len: u32,
}

/// Immutable, mmap-friendly (logically: a flat `Vec` of fixed-size `Run`
/// records) delta-coded BWT.
pub struct DeltaBwt {
    runs: Vec<Run>,
    /// `superblocks[i]` = cumulative occurrence counts just before run
    /// `i * SUPERBLOCK_RUNS`.
    superblocks: Vec<[usize; ALPHABET_SIZE]>,
    acc: [usize; ALPHABET_SIZE + 1],
    len: usize,
}

impl DeltaBwt {
    /// Build from a plain BWT byte sequence (values in `0..ALPHABET_SIZE`).
    pub fn from_plain(bwt: &[u8]) -> Self {
        let mut runs = Vec::new();
        let mut i = 0;
        while i < bwt.len() {
            let c = bwt[i];
            let mut j = i + 1;
            while j < bwt.len() && bwt[j] == c {
                j += 1;
            }
            let mut remaining = j - i;
            while remaining > 0 {
                let take = remaining.min(u32::MAX as usize);
                runs.push(Run { symbol: c, len: take as u32 });
                remaining -= take;
            }
            i = j;
        }
        Self::from_runs(runs, bwt.len())
    }

    fn from_runs(runs: Vec<Run>, len: usize) -> Self {
        let mut superblocks = Vec::with_capacity(runs.len() / SUPERBLOCK_RUNS + 1);
        let mut cum = [0usize; ALPHABET_SIZE];
        let mut counts = [0usize; ALPHABET_SIZE];
        for (i, run) in runs.iter().enumerate() {
            if i % SUPERBLOCK_RUNS == 0 {
                superblocks.push(cum);
            }
            cum[run.symbol as usize] += run.len as usize;
            counts[run.symbol as usize] += run.len as usize;
        }
        let acc = acc_from_counts(&counts);
        DeltaBwt { runs, superblocks, acc, len }
    }

    fn rank_from(&self, k: usize) -> ([usize; ALPHABET_SIZE], u8) {
        let sb_idx = ((k.min(self.len.saturating_sub(1))) / (SUPERBLOCK_RUNS.max(1)))
            .min(self.superblocks.len().saturating_sub(1));
        // Find the run index the superblock corresponds to and the position
        // it starts at by scanning forward from run sb_idx*SUPERBLOCK_RUNS.
        // (Superblocks index by *run count*, not by position, so we must
        // also track the base position of that run.)
        let start_run = sb_idx * SUPERBLOCK_RUNS;
        let mut occ = if sb_idx < self.superblocks.len() {
            self.superblocks[sb_idx]
        } else {
            [0; ALPHABET_SIZE]
        };
        let mut pos = self.position_of_run(start_run);
        let mut symbol_at_k = 0u8;
        for run in self.runs.iter().skip(start_run) {
            let run_end = pos + run.len as usize;
            if k < run_end {
                occ[run.symbol as usize] += k - pos;
                symbol_at_k = run.symbol;
                pos = k;
                break;
            }
            occ[run.symbol as usize] += run.len as usize;
            pos = run_end;
        }
        (occ, symbol_at_k)
    }

    /// Resolve occurrence counts at both `k` and `l` in a single forward
    /// scan from whichever superblock precedes the smaller offset, never
    /// revisiting a run already decoded for the other offset.
    fn rank_from_two(&self, k: usize, l: usize) -> ([usize; ALPHABET_SIZE], [usize; ALPHABET_SIZE]) {
        let (lo, hi) = if k <= l { (k, l) } else { (l, k) };
        let sb_idx = ((lo.min(self.len.saturating_sub(1))) / (SUPERBLOCK_RUNS.max(1)))
            .min(self.superblocks.len().saturating_sub(1));
        let start_run = sb_idx * SUPERBLOCK_RUNS;
        let mut occ = if sb_idx < self.superblocks.len() {
            self.superblocks[sb_idx]
        } else {
            [0; ALPHABET_SIZE]
        };
        let mut pos = self.position_of_run(start_run);
        let mut occ_lo: Option<[usize; ALPHABET_SIZE]> = None;
        let mut occ_hi: Option<[usize; ALPHABET_SIZE]> = None;

        for run in self.runs.iter().skip(start_run) {
            let run_end = pos + run.len as usize;
            if occ_lo.is_none() && lo < run_end {
                let mut snap = occ;
                snap[run.symbol as usize] += lo - pos;
                occ_lo = Some(snap);
            }
            if occ_hi.is_none() && hi < run_end {
                let mut snap = occ;
                snap[run.symbol as usize] += hi - pos;
                occ_hi = Some(snap);
                break;
            }
            occ[run.symbol as usize] += run.len as usize;
            pos = run_end;
        }
        let occ_lo = occ_lo.unwrap_or(occ);
        let occ_hi = occ_hi.unwrap_or(occ);
        if k <= l {
            (occ_lo, occ_hi)
        } else {
            (occ_hi, occ_lo)
        }
    }

    fn position_of_run(&self, run_idx: usize) -> usize {
        self.runs[..run_idx].iter().map(|r| r.len as usize).sum()
    }
}

impl RankDict for DeltaBwt {
    fn len(&self) -> usize {
        self.len
    }

    fn acc(&self) -> &[usize; ALPHABET_SIZE + 1] {
        &self.acc
    }

    fn rank1(&self, k: usize) -> Rank1Result {
        if k >= self.len {
            let (occ, _) = self.rank_from(self.len);
            return Rank1Result { symbol: 0, occ };
        }
        let (occ, symbol) = self.rank_from(k);
        Rank1Result { symbol, occ }
    }

    fn rank2(&self, k: usize, l: usize) -> Rank2Result {
        let (occ_k, occ_l) = self.rank_from_two(k.min(self.len), l.min(self.len));
        Rank2Result { occ_k, occ_l }
    }

    fn iter_symbols(&self) -> Box<dyn Iterator<Item = u8> + '_> {
        Box::new(
            self.runs
                .iter()
                .flat_map(|r| std::iter::repeat(r.symbol).take(r.len as usize)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acc_matches_counts() {
        let bwt = [1u8, 1, 1, 2, 2, 3, 0, 4, 4, 4, 4, 5];
        let fmd = DeltaBwt::from_plain(&bwt);
        assert_eq!(fmd.len(), bwt.len());
        assert_eq!(fmd.acc()[ALPHABET_SIZE], bwt.len());
        for c in 0..ALPHABET_SIZE {
            let expect = bwt.iter().filter(|&&x| x as usize == c).count();
            assert_eq!(fmd.acc()[c + 1] - fmd.acc()[c], expect);
        }
    }

    #[test]
    fn rank1_matches_naive() {
        let bwt = [1u8, 2, 1, 3, 1, 2, 4, 5, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2];
        let fmd = DeltaBwt::from_plain(&bwt);
        for k in 0..=bwt.len() {
            let r = fmd.rank1(k);
            let mut expect = [0usize; ALPHABET_SIZE];
            for &c in &bwt[..k] {
                expect[c as usize] += 1;
            }
            assert_eq!(r.occ, expect, "k={}", k);
            if k < bwt.len() {
                assert_eq!(r.symbol, bwt[k]);
            }
        }
    }

    #[test]
    fn rank2_matches_rank1_pair() {
        let bwt = [1u8, 1, 2, 3, 3, 3, 4, 5, 5, 0, 2, 2];
        let fmd = DeltaBwt::from_plain(&bwt);
        let r2 = fmd.rank2(3, 8);
        assert_eq!(r2.occ_k, fmd.rank1(3).occ);
        assert_eq!(r2.occ_l, fmd.rank1(8).occ);
    }

    #[test]
    fn iter_symbols_roundtrips() {
        let bwt = vec![1u8, 1, 1, 2, 3, 4, 5, 0, 2, 2, 2, 2, 2, 2, 2, 2];
        let fmd = DeltaBwt::from_plain(&bwt);
        let back: Vec<u8> = fmd.iter_symbols().collect();
        assert_eq!(back, bwt);
    }
}
