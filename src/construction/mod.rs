//! Incremental construction pipeline (§4.3, §5): turn batches of raw
//! sequences into an [`FmIndex`], either from scratch or by merging into an
//! existing one.

pub mod merge;
pub mod pipeline;
pub mod sa;

use crate::alphabet::{self, ALPHABET_SIZE};
use crate::config::{BuildConfig, InsertOrder};
use crate::fmindex::FmIndex;
use crate::rank::rope::RopeBwt;
use crate::rank::Rank;

/// A batch of raw (ASCII) input strings, optionally doubled with reverse
/// complements so the resulting index is strand-symmetric.
pub struct Batch {
    pub strings: Vec<Vec<u8>>,
}

impl Batch {
    pub fn new(strings: Vec<Vec<u8>>, cfg: &BuildConfig) -> Self {
        if !cfg.add_reverse_complement {
            return Batch { strings };
        }
        let mut doubled = Vec::with_capacity(strings.len() * 2);
        for s in strings {
            let rc = alphabet::decode(&alphabet::revcomp(&alphabet::encode(&s)));
            doubled.push(s);
            doubled.push(rc);
        }
        Batch { strings: doubled }
    }

    fn concat_with_sentinels(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for s in &self.strings {
            out.extend(alphabet::encode(s));
            out.push(alphabet::SENTINEL);
        }
        out
    }
}

/// Stage S: read a batch, run the suffix-array black box, and derive the
/// partial BWT as a plain byte sequence, `partial[i] = concat[(sa[i]-1) mod
/// n]` (§4.3).
pub fn partial_bwt(batch: &Batch, n_threads: usize) -> Vec<u8> {
    let concat = batch.concat_with_sentinels();
    let n = concat.len() as i64;
    let sa = sa::suffix_array(&concat, n_threads);
    sa.iter()
        .map(|&i| concat[((i - 1).rem_euclid(n)) as usize])
        .collect()
}

/// Build a fresh index from the first batch: Stage S produces the partial
/// BWT, which becomes the initial rope directly (§4.3, "if the main rope is
/// empty").
pub fn build_initial(batch: &Batch, cfg: &BuildConfig) -> FmIndex {
    tracing::debug!(n_strings = batch.strings.len(), n_threads = cfg.n_threads, "building initial index");
    let plain = partial_bwt(batch, cfg.n_threads);
    let rope = RopeBwt::from_plain(&plain, cfg.block_len);
    FmIndex::new(Rank::Rope(rope))
}

/// Stage M: merge a subsequent batch into an existing rope-backed index.
/// The reference pipeline computes global insertion ranks for the whole
/// partial BWT in parallel across six symbol-class trees; this crate's
/// single-rope rendition (see [`crate::rank::rope`]) applies the equivalent
/// per-string online insertion from [`merge::insert_string`] instead —
/// recorded as a scope reduction in DESIGN.md.
pub fn extend(fm: &mut FmIndex, batch: &Batch, _cfg: &BuildConfig) {
    tracing::debug!(n_strings = batch.strings.len(), "merging batch into existing index");
    let rope = fm
        .rank_mut()
        .as_rope_mut()
        .expect("extend requires a rope-backed (FMR) index; convert FMD to FMR first");
    let encoded: Vec<Vec<u8>> = batch
        .strings
        .iter()
        .map(|s| {
            let mut e = alphabet::encode(s);
            e.push(alphabet::SENTINEL);
            e
        })
        .collect();
    merge::merge_batch(rope, &encoded);
}

/// Drive the whole incremental pipeline over a sequence of batches. The
/// first batch seeds the index via Stage S (SA + partial BWT, run on its
/// own thread by [`pipeline::two_stage_pipeline`]); every later batch is
/// merged into the running rope via [`extend`] on the calling thread, since
/// this crate's per-string merge (see `extend`'s docs) mutates the single
/// shared rope in place and so cannot be split across the pipeline's two
/// independent stage threads the way the six-tree original design could.
pub fn build_from_batches(mut batches: Vec<Batch>, cfg: BuildConfig) -> crate::error::Result<FmIndex> {
    tracing::info!(n_batches = batches.len(), "starting incremental build");
    if batches.is_empty() {
        return Ok(FmIndex::new(Rank::Rope(RopeBwt::new(cfg.block_len))));
    }
    let first = batches.remove(0);
    let rest = batches;

    let n_threads = cfg.n_threads;
    let block_len = cfg.block_len;
    let mut initial = pipeline::two_stage_pipeline(
        vec![first],
        move |batch: Batch| Ok(partial_bwt(&batch, n_threads)),
        move |plain: Vec<u8>| Ok(RopeBwt::from_plain(&plain, block_len)),
    )?;
    let mut fm = FmIndex::new(Rank::Rope(initial.remove(0)));

    for batch in &rest {
        extend(&mut fm, batch, &cfg);
    }
    Ok(fm)
}

/// Build via the `-2` ropebwt2-style path, bypassing the SA black box.
pub fn build_via_rb2(strings: &[&[u8]], order: InsertOrder, cfg: &BuildConfig) -> FmIndex {
    tracing::debug!(n_strings = strings.len(), ?order, "building via online-insertion path");
    let rope = merge::build_via_online_insertion(strings, order, cfg.block_len);
    FmIndex::new(Rank::Rope(rope))
}
