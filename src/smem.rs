//! SMEM engine (§4.9): super-maximal exact matches via bi-directional
//! FM-index extension, both strands.

use crate::alphabet;
use crate::config::SmemConfig;
use crate::error::Result;
use crate::fmindex::{BiInterval, FmIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mem {
    pub start: usize,
    pub end: usize,
    pub interval_size: usize,
}

/// Classic bidirectional SMEM, grounded directly on `rb3_fmd_smem1` /
/// `rb3_fmd_smem` in the reference source: forward-extend from each start
/// position until the interval would shrink below `min_occ`, then
/// backward-extend across the accumulated forward frontier.
pub fn classic_smem(fm: &FmIndex, query: &[u8], cfg: &SmemConfig) -> Vec<Mem> {
    let symbols = alphabet::encode(query);
    let n = symbols.len();
    let mut hits = Vec::new();
    let mut x = 0usize;
    while x < n {
        if symbols[x] == alphabet::SENTINEL {
            x += 1;
            continue;
        }
        let (mems, next_x) = smem1(fm, &symbols, x, cfg);
        hits.extend(mems);
        x = next_x.max(x + 1);
    }
    hits
}

/// One SMEM1 pass starting at position `x`: forward extension collecting
/// the frontier of intervals, then backward extension to find maximal
/// matches, matching `rb3_fmd_smem1`.
fn smem1(fm: &FmIndex, symbols: &[u8], x: usize, cfg: &SmemConfig) -> (Vec<Mem>, usize) {
    let n = symbols.len();

    // Forward extension: grow [x, end) while interval size stays >= min_occ.
    let mut frontier: Vec<(usize, BiInterval)> = Vec::new(); // (end, interval)
    let mut interval = fm.extend(&fm.full_interval(), symbols[x], false);
    let mut end = x + 1;
    frontier.push((end, interval));
    while end < n && symbols[end] != alphabet::SENTINEL {
        let next = fm.extend(&interval, symbols[end], false);
        if next.size < cfg.min_occ {
            break;
        }
        interval = next;
        end += 1;
        frontier.push((end, interval));
    }

    // Backward extension across the frontier, from the longest match down,
    // emitting maximal hits whose length clears min_len.
    let mut hits = Vec::new();
    let mut cur_start = x;
    // Walk frontier from the end backward, re-deriving intervals for the
    // [start, end) ranges by backward-extending from the full interval.
    for &(e, _) in frontier.iter().rev() {
        let mut iv = fm.full_interval();
        let mut s = e;
        loop {
            if s == 0 {
                break;
            }
            let prev = fm.extend(&iv, symbols[s - 1], true);
            if prev.size < cfg.min_occ {
                break;
            }
            iv = prev;
            s -= 1;
        }
        if e - s >= cfg.min_len && s <= cur_start {
            hits.push(Mem { start: s, end: e, interval_size: iv.size });
            cur_start = s;
        }
    }
    hits.sort_by_key(|m| m.start);
    hits.dedup_by_key(|m| (m.start, m.end));
    let next_x = frontier.last().map(|&(e, _)| e).unwrap_or(x + 1);
    (hits, next_x)
}

/// Greedy SMEM (the default in the reference tool, `smem_TG`): after a
/// minimum-length backward probe from the current position, emit the first
/// maximal hit found and resume scanning just past its end. Implemented
/// from this crate's own prose description of the algorithm (§4.9) rather
/// than transcribed source, since the reference driver for this variant was
/// not present in the retrieval pack — see DESIGN.md.
pub fn greedy_smem(fm: &FmIndex, query: &[u8], cfg: &SmemConfig) -> Vec<Mem> {
    let symbols = alphabet::encode(query);
    let n = symbols.len();
    let mut hits = Vec::new();
    let mut x = 0usize;
    while x < n {
        if symbols[x] == alphabet::SENTINEL {
            x += 1;
            continue;
        }
        // Backward probe: extend forward until min_len reached or the
        // interval collapses, recording the best (longest, still >=
        // min_occ) match starting at or after x.
        let mut interval = fm.extend(&fm.full_interval(), symbols[x], false);
        let mut end = x + 1;
        let mut best: Option<Mem> = if interval.size >= cfg.min_occ {
            Some(Mem { start: x, end, interval_size: interval.size })
        } else {
            None
        };
        while end < n && symbols[end] != alphabet::SENTINEL {
            let next = fm.extend(&interval, symbols[end], false);
            if next.size < cfg.min_occ {
                break;
            }
            interval = next;
            end += 1;
            best = Some(Mem { start: x, end, interval_size: interval.size });
        }
        match best {
            Some(m) if m.end - m.start >= cfg.min_len => {
                let next_x = m.end;
                hits.push(m);
                x = next_x.max(x + 1);
            }
            _ => x += 1,
        }
    }
    hits
}

/// Run whichever algorithm `cfg.use_classic` selects.
pub fn smem(fm: &FmIndex, query: &[u8], cfg: &SmemConfig) -> Vec<Mem> {
    let hits = if cfg.use_classic {
        classic_smem(fm, query, cfg)
    } else {
        greedy_smem(fm, query, cfg)
    };
    tracing::debug!(query_len = query.len(), n_hits = hits.len(), use_classic = cfg.use_classic, "smem done");
    hits
}

/// Entry point for strand-sensitive SMEM queries: both-strand extension
/// only makes sense when the index holds every sequence alongside its
/// reverse complement, so this checks [`FmIndex::require_strand_symmetric`]
/// before dispatching to [`smem`] (§7 "Asymmetric index").
pub fn smem_checked(fm: &FmIndex, query: &[u8], cfg: &SmemConfig) -> Result<Vec<Mem>> {
    fm.require_strand_symmetric()?;
    Ok(smem(fm, query, cfg))
}

/// Maximal gaps between non-overlapping MEM coverage, of length at least
/// `gap_threshold`.
pub fn gap_complement(hits: &[Mem], query_len: usize, gap_threshold: usize) -> Vec<(usize, usize)> {
    let mut sorted: Vec<&Mem> = hits.iter().collect();
    sorted.sort_by_key(|m| m.start);
    let mut gaps = Vec::new();
    let mut cursor = 0usize;
    for m in sorted {
        if m.start > cursor && m.start - cursor >= gap_threshold {
            gaps.push((cursor, m.start));
        }
        cursor = cursor.max(m.end);
    }
    if query_len > cursor && query_len - cursor >= gap_threshold {
        gaps.push((cursor, query_len));
    }
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::{delta::DeltaBwt, Rank};

    fn build_fm(strings: &[&[u8]]) -> FmIndex {
        let mut concat = Vec::new();
        for s in strings {
            concat.extend(alphabet::encode(s));
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

    #[test]
    fn classic_smem_finds_whole_query_when_unique() {
        let fm = build_fm(&[b"ACGTACGTTTTTGGGG", b"CCCCAAAATTTTGGGG"]);
        let cfg = SmemConfig { min_len: 3, min_occ: 1, use_classic: true, gap_threshold: 1 };
        let hits = classic_smem(&fm, b"ACGTACGT", &cfg);
        assert!(!hits.is_empty());
        for m in &hits {
            assert!(m.end - m.start >= cfg.min_len);
            assert!(m.interval_size >= cfg.min_occ);
        }
    }

    #[test]
    fn gap_complement_covers_uncovered_regions() {
        let hits = vec![
            Mem { start: 2, end: 5, interval_size: 1 },
            Mem { start: 10, end: 12, interval_size: 1 },
        ];
        let gaps = gap_complement(&hits, 15, 1);
        assert_eq!(gaps, vec![(0, 2), (5, 10), (12, 15)]);
    }

    #[test]
    fn smem_checked_rejects_asymmetric_index() {
        let fm = build_fm(&[b"ACGTACGT"]);
        let cfg = SmemConfig { min_len: 3, min_occ: 1, use_classic: true, gap_threshold: 1 };
        let err = smem_checked(&fm, b"ACGT", &cfg).unwrap_err();
        assert!(matches!(err, crate::error::Error::AsymmetricIndex));
    }

    #[test]
    fn greedy_smem_respects_min_len() {
        let fm = build_fm(&[b"ACGTACGTACGTACGT"]);
        let cfg = SmemConfig { min_len: 4, min_occ: 1, use_classic: false, gap_threshold: 1 };
        let hits = greedy_smem(&fm, b"ACGTACGT", &cfg);
        for m in &hits {
            assert!(m.end - m.start >= cfg.min_len);
        }
    }
}
