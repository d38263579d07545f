//! Pairwise converters between the plain, FMD (delta), FMR (rope), and BRE
//! on-disk/in-memory representations (§4.4).

use crate::bre::{self};
use crate::error::Result;
use crate::rank::delta::DeltaBwt;
use crate::rank::rope::RopeBwt;
use crate::rank::{Rank, RankDict};
use std::io::{Read, Write};

/// Collect a rank dictionary's symbols back into a plain byte sequence.
pub fn to_plain(rank: &Rank) -> Vec<u8> {
    rank.iter_symbols().collect()
}

pub fn plain_to_delta(plain: &[u8]) -> DeltaBwt {
    DeltaBwt::from_plain(plain)
}

pub fn plain_to_rope(plain: &[u8], block_len: usize) -> RopeBwt {
    RopeBwt::from_plain(plain, block_len)
}

/// FMD (run-length delta) to FMR (rope): re-splits runs at `block_len`
/// boundaries, since the rope's leaves are fixed-capacity rather than
/// variable-length like the delta encoding's runs.
pub fn delta_to_rope(delta: &DeltaBwt, block_len: usize) -> RopeBwt {
    let plain: Vec<u8> = delta.iter_symbols().collect();
    RopeBwt::from_plain(&plain, block_len)
}

pub fn rope_to_delta(rope: &RopeBwt) -> DeltaBwt {
    let plain: Vec<u8> = rope.iter_symbols().collect();
    DeltaBwt::from_plain(&plain)
}

/// Write any rank dictionary out as BRE.
pub fn rank_to_bre<W: Write>(rank: &Rank, out: W, b_per_run: u8) -> Result<W> {
    let plain = to_plain(rank);
    bre::write_plain_as_bre(&plain, out, b_per_run)
}

/// Read a BRE stream back as a `DeltaBwt` (the natural immutable target of
/// a converted-from-disk BRE file).
pub fn bre_to_delta<R: Read>(input: R) -> Result<DeltaBwt> {
    let plain = bre::read_bre_as_plain(input)?;
    Ok(DeltaBwt::from_plain(&plain))
}

/// Read a BRE stream back as a `RopeBwt`, for callers that intend to keep
/// mutating the result (e.g. resuming incremental construction).
pub fn bre_to_rope<R: Read>(input: R, block_len: usize) -> Result<RopeBwt> {
    let plain = bre::read_bre_as_plain(input)?;
    Ok(RopeBwt::from_plain(&plain, block_len))
}
