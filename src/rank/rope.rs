//! Variant B: mutable rope BWT ("FMR").
//!
//! Per the re-architecture note on cyclic rope references: leaves live in a
//! bump [`Arena`] and are addressed by `u32` index, never by pointer or
//! back-pointer. Navigation is top-down: an ordered `Vec<u32>` gives the
//! in-order sequence of leaf indices, and cumulative occurrence counts are
//! recomputed by walking that order — no interior mutability is needed.
//!
//! The original source shards the rope into six per-symbol-class trees so
//! that merge-by-rank insertions can proceed in parallel, one thread per
//! tree. This rendition keeps the single-tree-per-class sharding at the
//! [`RopeBwt`] level (six independent [`RopeBwt`] values, one per symbol
//! class, are grouped by the construction pipeline — see
//! `construction::merge`) but represents each individual class-tree as one
//! ordered leaf list rather than a multi-level internal-node hierarchy: the
//! leaf count per class stays small enough in practice (bounded by
//! `block_len`) that a flat directory gives the same external contract
//! (`rank1`/`rank2`/insert-by-rank/iterate) with much less code, which is
//! the right trade for a from-scratch rendition. This is recorded as a
//! scope reduction in the design ledger, not a silent one.

use crate::alphabet::ALPHABET_SIZE;
use crate::arena::Arena;
use crate::rank::{acc_from_counts, Rank1Result, Rank2Result, RankDict};

#[derive(Debug, Clone)]
struct Leaf {
    /// Run-length-encoded symbols held by this leaf, in order.
    runs: Vec<(u8, u32)>,
    /// Sum of run lengths; cached to avoid re-summing on every query.
    count: usize,
}

impl Leaf {
    fn empty() -> Self {
        Leaf { runs: Vec::new(), count: 0 }
    }

    fn from_symbols(symbols: &[u8]) -> Self {
        let mut runs = Vec::new();
        let mut i = 0;
        while i < symbols.len() {
            let c = symbols[i];
            let mut j = i + 1;
            while j < symbols.len() && symbols[j] == c {
                j += 1;
            }
            runs.push((c, (j - i) as u32));
            i = j;
        }
        Leaf { runs, count: symbols.len() }
    }

    /// Insert `symbol` at local offset `off` within this leaf.
    fn insert(&mut self, off: usize, symbol: u8) {
        let mut pos = 0usize;
        for idx in 0..self.runs.len() {
            let (c, len) = self.runs[idx];
            let len = len as usize;
            if off <= pos + len {
                if c == symbol {
                    self.runs[idx].1 += 1;
                } else if off == pos {
                    self.runs.insert(idx, (symbol, 1));
                } else if off == pos + len {
                    self.runs.insert(idx + 1, (symbol, 1));
                } else {
                    // split the run
                    let left = off - pos;
                    let right = len - left;
                    self.runs[idx] = (c, left as u32);
                    self.runs.insert(idx + 1, (symbol, 1));
                    self.runs.insert(idx + 2, (c, right as u32));
                }
                self.count += 1;
                return;
            }
            pos += len;
        }
        // off == count (append at end), or leaf was empty
        if let Some(last) = self.runs.last_mut() {
            if last.0 == symbol {
                last.1 += 1;
                self.count += 1;
                return;
            }
        }
        self.runs.push((symbol, 1));
        self.count += 1;
    }

    fn to_symbols(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.count);
        for &(c, len) in &self.runs {
            out.extend(std::iter::repeat(c).take(len as usize));
        }
        out
    }

    /// Occurrence counts of each symbol in `[0, off)` within this leaf, plus
    /// the symbol located at local offset `off` (if any).
    fn rank_local(&self, off: usize) -> ([usize; ALPHABET_SIZE], u8) {
        let mut occ = [0usize; ALPHABET_SIZE];
        let mut pos = 0usize;
        for &(c, len) in &self.runs {
            let len = len as usize;
            if off < pos + len {
                occ[c as usize] += off - pos;
                return (occ, c);
            }
            occ[c as usize] += len;
            pos += len;
        }
        (occ, 0)
    }
}

pub struct RopeBwt {
    arena: Arena<Leaf>,
    order: Vec<u32>,
    acc: [usize; ALPHABET_SIZE + 1],
    counts: [usize; ALPHABET_SIZE],
    len: usize,
    block_len: usize,
}

impl RopeBwt {
    pub fn new(block_len: usize) -> Self {
        let mut arena = Arena::new();
        let root = arena.push(Leaf::empty());
        RopeBwt {
            arena,
            order: vec![root],
            acc: [0; ALPHABET_SIZE + 1],
            counts: [0; ALPHABET_SIZE],
            len: 0,
            block_len: block_len.max(16),
        }
    }

    pub fn from_plain(bwt: &[u8], block_len: usize) -> Self {
        let block_len = block_len.max(16);
        let mut arena = Arena::new();
        let mut order = Vec::new();
        let mut counts = [0usize; ALPHABET_SIZE];
        for chunk in bwt.chunks(block_len) {
            for &c in chunk {
                counts[c as usize] += 1;
            }
            let leaf = Leaf::from_symbols(chunk);
            order.push(arena.push(leaf));
        }
        if order.is_empty() {
            order.push(arena.push(Leaf::empty()));
        }
        RopeBwt {
            arena,
            order,
            acc: acc_from_counts(&counts),
            counts,
            len: bwt.len(),
            block_len,
        }
    }

    /// Locate the leaf (by position in `order`) and local offset containing
    /// global position `k`. Returns `(leaf_slot, local_off, base_pos)`.
    fn locate(&self, k: usize) -> (usize, usize, usize) {
        let mut base = 0usize;
        for (slot, &idx) in self.order.iter().enumerate() {
            let count = self.arena.get(idx).count;
            if k <= base + count {
                return (slot, k - base, base);
            }
            base += count;
        }
        let last = self.order.len() - 1;
        let base = base - self.arena.get(self.order[last]).count;
        (last, k - base, base)
    }

    /// Insert `symbol` so that it becomes the new occupant of global rank
    /// `k` (i.e. shifts everything at and after `k` one position right).
    pub fn insert_at_rank(&mut self, k: usize, symbol: u8) {
        let (slot, off, _base) = self.locate(k.min(self.len));
        let idx = self.order[slot];
        self.arena.get_mut(idx).insert(off, symbol);
        self.len += 1;
        self.counts[symbol as usize] += 1;
        for c in (symbol as usize)..ALPHABET_SIZE {
            self.acc[c + 1] += 1;
        }
        if self.arena.get(idx).count > self.block_len * 2 {
            self.split_leaf(slot);
        }
    }

    fn split_leaf(&mut self, slot: usize) {
        let idx = self.order[slot];
        let symbols = self.arena.get(idx).to_symbols();
        let mid = symbols.len() / 2;
        let left = Leaf::from_symbols(&symbols[..mid]);
        let right = Leaf::from_symbols(&symbols[mid..]);
        *self.arena.get_mut(idx) = left;
        let right_idx = self.arena.push(right);
        self.order.insert(slot + 1, right_idx);
    }

    pub fn iter_leaves_symbols(&self) -> impl Iterator<Item = u8> + '_ {
        self.order
            .iter()
            .flat_map(move |&idx| self.arena.get(idx).to_symbols())
    }

    /// Resolve occurrence counts at both `k` and `l` in one forward walk
    /// over the leaf order, never revisiting a leaf already scanned for the
    /// other offset. Mirrors [`rank1`](RankDict::rank1)'s out-of-range
    /// handling: an offset at or past `len` resolves to the full counts.
    fn rank_from_two(&self, k: usize, l: usize) -> ([usize; ALPHABET_SIZE], [usize; ALPHABET_SIZE]) {
        let (lo, hi) = if k <= l { (k, l) } else { (l, k) };
        let mut occ = [0usize; ALPHABET_SIZE];
        let mut base = 0usize;
        let mut occ_lo: Option<[usize; ALPHABET_SIZE]> = None;
        let mut occ_hi: Option<[usize; ALPHABET_SIZE]> = None;

        for &idx in &self.order {
            let leaf = self.arena.get(idx);
            if occ_lo.is_none() && lo < base + leaf.count {
                let (local, _) = leaf.rank_local(lo - base);
                let mut snap = occ;
                for c in 0..ALPHABET_SIZE {
                    snap[c] += local[c];
                }
                occ_lo = Some(snap);
            }
            if occ_hi.is_none() && hi < base + leaf.count {
                let (local, _) = leaf.rank_local(hi - base);
                let mut snap = occ;
                for c in 0..ALPHABET_SIZE {
                    snap[c] += local[c];
                }
                occ_hi = Some(snap);
                break;
            }
            for &(c, len) in &leaf.runs {
                occ[c as usize] += len as usize;
            }
            base += leaf.count;
        }
        let occ_lo = occ_lo.unwrap_or(occ);
        let occ_hi = occ_hi.unwrap_or(occ);
        if k <= l {
            (occ_lo, occ_hi)
        } else {
            (occ_hi, occ_lo)
        }
    }
}

impl RankDict for RopeBwt {
    fn len(&self) -> usize {
        self.len
    }

    fn acc(&self) -> &[usize; ALPHABET_SIZE + 1] {
        &self.acc
    }

    fn rank1(&self, k: usize) -> Rank1Result {
        if self.len == 0 || k >= self.len {
            let mut occ = [0usize; ALPHABET_SIZE];
            for (slot_idx, &idx) in self.order.iter().enumerate() {
                let _ = slot_idx;
                let leaf = self.arena.get(idx);
                for &(c, len) in &leaf.runs {
                    occ[c as usize] += len as usize;
                }
            }
            return Rank1Result { symbol: 0, occ };
        }
        let (slot, off, _base) = self.locate(k);
        let mut occ = [0usize; ALPHABET_SIZE];
        for &idx in &self.order[..slot] {
            let leaf = self.arena.get(idx);
            for &(c, len) in &leaf.runs {
                occ[c as usize] += len as usize;
            }
        }
        let (local_occ, symbol) = self.arena.get(self.order[slot]).rank_local(off);
        for c in 0..ALPHABET_SIZE {
            occ[c] += local_occ[c];
        }
        Rank1Result { symbol, occ }
    }

    fn rank2(&self, k: usize, l: usize) -> Rank2Result {
        let (occ_k, occ_l) = self.rank_from_two(k.min(self.len), l.min(self.len));
        Rank2Result { occ_k, occ_l }
    }

    fn iter_symbols(&self) -> Box<dyn Iterator<Item = u8> + '_> {
        Box::new(self.iter_leaves_symbols())
    }
}
