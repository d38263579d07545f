//! Haplotype-diversity statistics over sliding k-mers (§4.8).
//!
//! For a query of length `n`, the number of windows of width `w` tiling a
//! k-mer of length `k` is `ceil((n - k) / w) + 1` (scenario: `k=101, w=50`,
//! `n=200` gives 3 windows). Each window runs the aligner's DP-over-DAWG
//! machinery over its k-mer anchor in haplotype-diversity mode, bucketing
//! every surviving haplotype by its edit distance from the anchor.

use crate::align;
use crate::alphabet;
use crate::config::{AlignParams, HapDivConfig};
use crate::fmindex::FmIndex;
use crate::query::dawg::Dawg;
use crate::query::lightbwt::LightBwt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStat {
    pub start: usize,
    pub end: usize,
    /// Total haplotype count for the window (sum of `n_hap`).
    pub n_haplotypes: usize,
    pub max_ed: u32,
    /// Haplotype counts bucketed by edit distance from the anchor, `0..=4`
    /// (bucket 4 catches distance 4 and beyond).
    pub n_hap: [usize; 5],
}

/// Number of sliding windows a query of length `n` produces under `cfg`.
pub fn window_count(n: usize, cfg: &HapDivConfig) -> usize {
    if n < cfg.k {
        return 0;
    }
    (n - cfg.k + cfg.w - 1) / cfg.w + 1
}

/// Compute per-window haplotype-diversity statistics: for each window, align
/// the window's k-mer anchor against `fm` in haplotype-diversity mode and
/// bucket every surviving haplotype by its edit distance from the anchor.
pub fn haplotype_diversity(
    fm: &FmIndex,
    query: &[u8],
    cfg: &HapDivConfig,
    params: &AlignParams,
) -> Vec<WindowStat> {
    let symbols = alphabet::encode(query);
    let n = symbols.len();
    let nw = window_count(n, cfg);
    let mut out = Vec::with_capacity(nw);
    for i in 0..nw {
        let start = (i * cfg.w).min(n.saturating_sub(cfg.k));
        let end = start + cfg.k;
        if end > n {
            break;
        }
        let anchor = alphabet::decode(&symbols[start..end]);
        let light = LightBwt::build(&anchor);
        let dawg = Dawg::build_linear(&light, &anchor);
        let stats = align::haplotype_diversity_hits(fm, &dawg, &anchor, params);
        out.push(WindowStat {
            start,
            end,
            n_haplotypes: stats.n_al,
            max_ed: stats.max_ed,
            n_hap: stats.n_hap,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlignParams;
    use crate::rank::{delta::DeltaBwt, Rank};

    #[test]
    fn window_count_matches_scenario() {
        let cfg = HapDivConfig { k: 101, w: 50 };
        assert_eq!(window_count(200, &cfg), 3);
    }

    #[test]
    fn window_count_zero_when_shorter_than_k() {
        let cfg = HapDivConfig { k: 101, w: 50 };
        assert_eq!(window_count(50, &cfg), 0);
    }

    #[test]
    fn haplotype_diversity_reports_one_stat_per_window() {
        let mut concat = Vec::new();
        let text = alphabet::encode(&[b'A', b'C', b'G', b'T'].repeat(60)[..200]);
        concat.extend(text.clone());
        concat.push(alphabet::SENTINEL);
        let n = concat.len();
        let mut sa: Vec<usize> = (0..n).collect();
        sa.sort_by(|&i, &j| rotate(&concat, i).cmp(&rotate(&concat, j)));
        let bwt: Vec<u8> = sa.iter().map(|&i| concat[(i + n - 1) % n]).collect();
        let fm = FmIndex::new(Rank::Delta(DeltaBwt::from_plain(&bwt)));

        let cfg = HapDivConfig { k: 101, w: 50 };
        let params = AlignParams::default();
        let query: Vec<u8> = b"ACGT".repeat(50)[..200].to_vec();
        let stats = haplotype_diversity(&fm, &query, &cfg, &params);
        assert_eq!(stats.len(), 3);
        for w in &stats {
            assert_eq!(w.end - w.start, cfg.k);
            assert!(w.n_haplotypes >= 1);
            let total: usize = w.n_hap.iter().sum();
            assert_eq!(total, w.n_haplotypes);
        }
    }

    fn rotate(s: &[u8], i: usize) -> Vec<u8> {
        let n = s.len();
        (0..n).map(|k| s[(i + k) % n]).collect()
    }
}
