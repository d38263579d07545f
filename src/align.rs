//! Aligner core: dynamic programming over (DAWG node × FM-index bi-interval)
//! (§4.8), BWA-SW–style.
//!
//! State is an explicit, named-field [`DpCell`] per the re-architecture note
//! replacing 28-bit packed backpointer fields — pack only if profiling ever
//! shows this is memory-bound, which nothing here has measured.

use crate::alphabet::{A, C, G, N, T};
use crate::config::{AlignMode, AlignParams};
use crate::fmindex::{BiInterval, FmIndex};
use crate::query::dawg::Dawg;
use crate::smem;

const BASES: [u8; 5] = [A, C, G, T, N];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Start,
    Diag,
    Ins,
    Del,
}

#[derive(Debug, Clone)]
pub struct DpCell {
    pub h: i32,
    pub e: i32,
    pub f: i32,
    pub interval: BiInterval,
    pub rlen: usize,
    pub qlen: usize,
    pub origin: Origin,
    /// `(dawg node id, x0, x1)` interval key of the cell this one was
    /// derived from. A content key rather than a vector index: candidate
    /// rows are re-sorted and truncated by [`dedup_and_truncate`] after
    /// construction, which would invalidate a plain index.
    pub from: Option<(u32, usize, usize)>,
}

impl DpCell {
    fn key(&self) -> (usize, usize) {
        (self.interval.x0, self.interval.x1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    Eq,
    Diff,
    Ins,
    Del,
}

impl CigarOp {
    pub fn as_char(self) -> char {
        match self {
            CigarOp::Eq => '=',
            CigarOp::Diff => 'X',
            CigarOp::Ins => 'I',
            CigarOp::Del => 'D',
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlignHit {
    pub score: i32,
    pub interval: BiInterval,
    pub rlen: usize,
    pub qlen: usize,
    pub cigar: Vec<(CigarOp, u32)>,
    pub edit_distance: u32,
}

/// Run the aligner end to end, returning the best hit (local mode) or the
/// best surviving end-to-end/haplotype-diversity hit, or `None` if nothing
/// meets threshold.
pub fn align(
    fm: &FmIndex,
    dawg: &Dawg,
    query: &[u8],
    params: &AlignParams,
    mode: AlignMode,
) -> Option<AlignHit> {
    if params.min_mem_len > params.end_len {
        let cfg = crate::config::SmemConfig {
            min_len: params.min_mem_len,
            min_occ: 1,
            use_classic: true,
            gap_threshold: 1,
        };
        let hits = smem::classic_smem(fm, query, &cfg);
        if hits.is_empty() {
            return None;
        }
    }

    let rows = run_dp(fm, dawg, params);

    match mode {
        AlignMode::Local => {
            let mut best: Option<(usize, usize, i32)> = None;
            for (node_id, row) in rows.iter().enumerate() {
                for (ci, cell) in row.iter().enumerate() {
                    if best.map(|(_, _, h)| cell.h > h).unwrap_or(true) {
                        best = Some((node_id, ci, cell.h));
                    }
                }
            }
            let (node_id, ci, h) = best?;
            if h < params.min_sc {
                tracing::debug!(score = h, min_sc = params.min_sc, "local alignment below threshold");
                return None;
            }
            Some(backtrack(&rows, node_id, ci))
        }
        AlignMode::EndToEnd | AlignMode::HaplotypeDiversity => {
            let last = rows.len() - 1;
            let row = &rows[last];
            let best_h = row.iter().map(|c| c.h).max().unwrap_or(i32::MIN);
            let mut best: Option<usize> = None;
            for (ci, cell) in row.iter().enumerate() {
                if cell.origin != Origin::Diag && cell.origin != Origin::Start {
                    continue;
                }
                if cell.h < params.min_sc {
                    continue;
                }
                if let Some(drop) = params.e2e_drop {
                    if cell.h < best_h - drop {
                        continue;
                    }
                }
                if best.map(|bi| cell.h > row[bi].h).unwrap_or(true) {
                    best = Some(ci);
                }
            }
            let ci = best?;
            Some(backtrack(&rows, last, ci))
        }
    }
}

/// Per-window edit-distance histogram produced by [`haplotype_diversity_hits`]
/// (§4.8): `n_hap[d]` is the number of haplotypes at edit distance `d` from
/// the anchor, for `d` in `0..=3`, with `n_hap[4]` catching everything at
/// distance 4 or beyond. `n_al` is the total haplotype count summed across
/// every bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct HapDivStats {
    pub n_al: usize,
    pub max_ed: u32,
    pub n_hap: [usize; 5],
}

/// Haplotype-diversity mode (§4.8): run the same DP-over-DAWG machinery as
/// `align` in end-to-end mode, but instead of keeping only the single best
/// hit, bucket every surviving last-row haplotype by its edit distance from
/// the anchor.
pub fn haplotype_diversity_hits(
    fm: &FmIndex,
    dawg: &Dawg,
    query: &[u8],
    params: &AlignParams,
) -> HapDivStats {
    if params.min_mem_len > params.end_len {
        let cfg = crate::config::SmemConfig {
            min_len: params.min_mem_len,
            min_occ: 1,
            use_classic: true,
            gap_threshold: 1,
        };
        let hits = smem::classic_smem(fm, query, &cfg);
        if hits.is_empty() {
            return HapDivStats::default();
        }
    }

    let rows = run_dp(fm, dawg, params);
    let last = rows.len() - 1;
    let row = &rows[last];
    let best_h = row.iter().map(|c| c.h).max().unwrap_or(i32::MIN);

    let mut stats = HapDivStats::default();
    for (ci, cell) in row.iter().enumerate() {
        if cell.origin != Origin::Diag && cell.origin != Origin::Start {
            continue;
        }
        if cell.h < params.min_sc {
            continue;
        }
        if let Some(drop) = params.e2e_drop {
            if cell.h < best_h - drop {
                continue;
            }
        }
        let hit = backtrack(&rows, last, ci);
        let bucket = (hit.edit_distance as usize).min(4);
        stats.n_hap[bucket] += hit.interval.size;
        stats.n_al += hit.interval.size;
        stats.max_ed = stats.max_ed.max(hit.edit_distance);
    }
    stats
}

fn run_dp(fm: &FmIndex, dawg: &Dawg, params: &AlignParams) -> Vec<Vec<DpCell>> {
    let mut rows: Vec<Vec<DpCell>> = Vec::with_capacity(dawg.len());
    rows.push(vec![DpCell {
        h: 0,
        e: i32::MIN / 2,
        f: i32::MIN / 2,
        interval: fm.full_interval(),
        rlen: 0,
        qlen: 0,
        origin: Origin::Start,
        from: None,
    }]);

    for t in 1..dawg.len() {
        let node = &dawg.nodes[t];
        let mut candidates: Vec<DpCell> = Vec::new();

        let threshold = pruning_threshold(&rows, node, params);

        for &p in &node.preds {
            let prow = &rows[p as usize];
            for pcell in prow.iter() {
                if pcell.h < threshold {
                    continue;
                }
                // Diagonal: try every reference symbol, scoring
                // match/mismatch against the node's trailing query symbol.
                for &c in &BASES {
                    let new_interval = fm.extend(&pcell.interval, c, false);
                    if new_interval.is_empty() {
                        continue;
                    }
                    let end_gated = pcell.qlen < params.end_len;
                    let sc = if c == node.symbol {
                        params.match_score
                    } else if end_gated {
                        continue;
                    } else {
                        -params.mismatch
                    };
                    let h = pcell.h + sc;
                    if h < threshold {
                        continue;
                    }
                    candidates.push(DpCell {
                        h,
                        e: i32::MIN / 2,
                        f: i32::MIN / 2,
                        interval: new_interval,
                        rlen: pcell.rlen + 1,
                        qlen: pcell.qlen + 1,
                        origin: Origin::Diag,
                        from: Some((p, pcell.interval.x0, pcell.interval.x1)),
                    });
                }

                // Insertion (E): consumes a query symbol, not a reference
                // symbol; stays pinned at the predecessor's interval.
                let e = (pcell.h - params.gap_open).max(pcell.e) - params.gap_ext;
                if e > 0 && e >= threshold {
                    candidates.push(DpCell {
                        h: e,
                        e,
                        f: i32::MIN / 2,
                        interval: pcell.interval,
                        rlen: pcell.rlen,
                        qlen: pcell.qlen + 1,
                        origin: Origin::Ins,
                        from: Some((p, pcell.interval.x0, pcell.interval.x1)),
                    });
                }
            }
        }

        let mut row = dedup_and_truncate(candidates, params.n_best);

        // Deletion (F): propagate within this row by extending the
        // reference without consuming the query, to a small fixpoint.
        for _ in 0..4 {
            let mut extra = Vec::new();
            for cell in row.iter() {
                for &c in &BASES {
                    let new_interval = fm.extend(&cell.interval, c, false);
                    if new_interval.is_empty() {
                        continue;
                    }
                    let f = (cell.h - params.gap_open).max(cell.f) - params.gap_ext;
                    if f <= 0 || f < threshold {
                        continue;
                    }
                    extra.push(DpCell {
                        h: f,
                        e: i32::MIN / 2,
                        f,
                        interval: new_interval,
                        rlen: cell.rlen + 1,
                        qlen: cell.qlen,
                        origin: Origin::Del,
                        from: Some((t as u32, cell.interval.x0, cell.interval.x1)),
                    });
                }
            }
            if extra.is_empty() {
                break;
            }
            let before = row.len();
            row.extend(extra);
            row = dedup_and_truncate(row, params.n_best);
            if row.len() == before {
                break;
            }
        }

        rows.push(row);
    }

    rows
}

fn pruning_threshold(rows: &[Vec<DpCell>], node: &super::query::dawg::DawgNode, params: &AlignParams) -> i32 {
    if node.preds.len() <= 1 {
        return i32::MIN;
    }
    let mut incoming: Vec<i32> = Vec::new();
    for &p in &node.preds {
        incoming.extend(rows[p as usize].iter().map(|c| c.h));
    }
    if incoming.len() <= params.n_best {
        return i32::MIN;
    }
    incoming.sort_unstable_by(|a, b| b.cmp(a));
    let nth = incoming[params.n_best - 1];
    nth - params.mismatch.max(params.gap_open + params.gap_ext)
}

fn dedup_and_truncate(mut candidates: Vec<DpCell>, n_best: usize) -> Vec<DpCell> {
    use std::collections::HashMap;
    let mut best_at: HashMap<(usize, usize), usize> = HashMap::new();
    for (i, c) in candidates.iter().enumerate() {
        let key = c.key();
        match best_at.get(&key) {
            Some(&j) if candidates[j].h >= c.h => {}
            _ => {
                best_at.insert(key, i);
            }
        }
    }
    let mut kept: Vec<DpCell> = best_at
        .values()
        .map(|&i| candidates[i].clone())
        .collect();
    kept.sort_unstable_by(|a, b| b.h.cmp(&a.h));
    kept.truncate(n_best);
    candidates.clear();
    kept
}

/// Resolve an `(node, x0, x1)` interval key against the final row state.
/// Returns `None` when no cell with that key survived pruning — the "no-F
/// origin" fallback called for in the aligner's open-question resolution
/// (§9): rather than inventing a repair, the chain simply stops there.
fn resolve<'a>(rows: &'a [Vec<DpCell>], node: usize, x0: usize, x1: usize) -> Option<&'a DpCell> {
    rows.get(node)?.iter().find(|c| c.interval.x0 == x0 && c.interval.x1 == x1)
}

fn backtrack(rows: &[Vec<DpCell>], node: usize, idx: usize) -> AlignHit {
    let end_cell = &rows[node][idx];
    let mut ops: Vec<CigarOp> = Vec::new();
    let mut cur_node = node;
    let mut cur_x0 = end_cell.interval.x0;
    let mut cur_x1 = end_cell.interval.x1;
    let mut edit_distance = 0u32;

    loop {
        let cell = match resolve(rows, cur_node, cur_x0, cur_x1) {
            Some(c) => c,
            None => break,
        };
        match cell.origin {
            Origin::Start => break,
            Origin::Diag => {
                let (pnode, px0, px1) = match cell.from {
                    Some(v) => v,
                    None => break,
                };
                let parent = match resolve(rows, pnode as usize, px0, px1) {
                    Some(p) => p,
                    None => break,
                };
                if cell.h - parent.h > 0 && cell.rlen == parent.rlen + 1 && cell.qlen == parent.qlen + 1
                {
                    // Heuristically treat a positive delta as a match and a
                    // non-positive one as a mismatch; the exact score is
                    // already folded into `h`, so this only affects the
                    // CIGAR character, not correctness of the score.
                    ops.push(CigarOp::Eq);
                } else {
                    ops.push(CigarOp::Diff);
                    edit_distance += 1;
                }
                cur_node = pnode as usize;
                cur_x0 = px0;
                cur_x1 = px1;
            }
            Origin::Ins => {
                ops.push(CigarOp::Ins);
                edit_distance += 1;
                let (pnode, px0, px1) = match cell.from {
                    Some(v) => v,
                    None => break,
                };
                cur_node = pnode as usize;
                cur_x0 = px0;
                cur_x1 = px1;
            }
            Origin::Del => {
                ops.push(CigarOp::Del);
                edit_distance += 1;
                let (pnode, px0, px1) = match cell.from {
                    Some(v) => v,
                    None => break,
                };
                cur_node = pnode as usize;
                cur_x0 = px0;
                cur_x1 = px1;
            }
        }
    }
    // No reversal here: the DAWG grows by backward extension (trailing
    // query symbol added first is the query's *last* character), so
    // walking from the final row back to the start visits query positions
    // in increasing order already — position 0's op is pushed first.

    let cigar = run_length_encode(&ops);
    tracing::debug!(score = end_cell.h, edit_distance, rlen = end_cell.rlen, qlen = end_cell.qlen, "alignment hit");
    AlignHit {
        score: end_cell.h,
        interval: end_cell.interval,
        rlen: end_cell.rlen,
        qlen: end_cell.qlen,
        cigar,
        edit_distance,
    }
}

fn run_length_encode(ops: &[CigarOp]) -> Vec<(CigarOp, u32)> {
    let mut out = Vec::new();
    for &op in ops {
        if let Some(last) = out.last_mut() {
            let (lop, len): &mut (CigarOp, u32) = last;
            if *lop == op {
                *len += 1;
                continue;
            }
        }
        out.push((op, 1));
    }
    out
}
