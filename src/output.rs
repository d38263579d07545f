//! Query output line formats and the `.len.gz` sequence-length sidecar
//! (§6). Everything here is string/byte formatting and streaming I/O; no
//! FASTA parsing or argument handling lives here (both out of scope).

use crate::align::{AlignHit, CigarOp};
use crate::error::Result;
use crate::hapdiv::WindowStat;
use crate::smem::Mem;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{BufRead, BufReader, Read, Write};

/// `name\tstart\tend\tinterval_size`
pub fn smem_line(name: &str, m: &Mem) -> String {
    format!("{}\t{}\t{}\t{}", name, m.start, m.end, m.interval_size)
}

/// `name\tlongest_matching_suffix_start\tquery_length\tinterval_size_at_that_suffix`
pub fn suffix_search_line(name: &str, suffix_start: usize, query_len: usize, interval_size: usize) -> String {
    format!("{}\t{}\t{}\t{}", name, suffix_start, query_len, interval_size)
}

fn cigar_to_string(cigar: &[(CigarOp, u32)]) -> String {
    let mut s = String::new();
    for &(op, len) in cigar {
        s.push_str(&len.to_string());
        s.push(op.as_char());
    }
    s
}

/// PAF-like tab-separated alignment record (§6). `ref_name_or_id` and
/// `ref_len_or_star` may be `None` when the caller has no name table
/// (outside this crate's scope), in which case `*` is emitted.
#[allow(clippy::too_many_arguments)]
pub fn alignment_record(
    name: &str,
    qlen: usize,
    qstart: usize,
    qend: usize,
    strand: char,
    ref_name_or_id: Option<&str>,
    ref_len_or_star: Option<usize>,
    hit: &AlignHit,
) -> String {
    let ref_name = ref_name_or_id.unwrap_or("*").to_string();
    let ref_len = ref_len_or_star.map(|l| l.to_string()).unwrap_or_else(|| "*".to_string());
    let matches = hit
        .cigar
        .iter()
        .filter(|(op, _)| *op == CigarOp::Eq)
        .map(|(_, len)| *len as usize)
        .sum::<usize>();
    format!(
        "{name}\t{qlen}\t{qstart}\t{qend}\t{strand}\t{ref_name}\t{ref_len}\t{rstart}\t{rend}\t{matches}\t{block_len}\t0\tAS:i:{score}\tqh:i:{qh}\trh:i:{rh}\tcg:Z:{cigar}",
        name = name,
        qlen = qlen,
        qstart = qstart,
        qend = qend,
        strand = strand,
        ref_name = ref_name,
        ref_len = ref_len,
        rstart = hit.interval.x0,
        rend = hit.interval.x0 + hit.rlen,
        matches = matches,
        block_len = hit.rlen.max(hit.qlen),
        score = hit.score,
        qh = hit.qlen,
        rh = hit.interval.size,
        cigar = cigar_to_string(&hit.cigar),
    )
}

/// Unmapped-query record with starred fields, per §6's "unmapped queries
/// may optionally be emitted with starred fields".
pub fn unmapped_record(name: &str, qlen: usize) -> String {
    format!("{name}\t{qlen}\t*\t*\t*\t*\t*\t*\t*\t0\t0\t0\tAS:i:0\tqh:i:0\trh:i:0\tcg:Z:*")
}

/// `name\twin_start\twin_end\tn_al\tmax_ed\tn_hap[0]\t…\tn_hap[4]`
///
/// `n_al` is the total allele/haplotype count for the window; `n_hap`
/// buckets that count by edit distance from the reference anchor, `0..=4`
/// (bucket 4 catches distance 4 and beyond).
pub fn haplotype_diversity_line(name: &str, w: &WindowStat) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        name,
        w.start,
        w.end,
        w.n_haplotypes,
        w.max_ed,
        w.n_hap[0],
        w.n_hap[1],
        w.n_hap[2],
        w.n_hap[3],
        w.n_hap[4],
    )
}

/// Write `name<TAB>length` lines, gzip-compressed, one per input sequence
/// in input order (§6 `.len.gz`).
pub fn write_len_gz<W: Write>(out: W, entries: &[(String, usize)]) -> Result<()> {
    let mut enc = GzEncoder::new(out, Compression::default());
    for (name, len) in entries {
        writeln!(enc, "{}\t{}", name, len)?;
    }
    enc.finish()?;
    Ok(())
}

/// Read a `.len.gz` sidecar back into `(name, length)` pairs, in file order.
pub fn read_len_gz<R: Read>(input: R) -> Result<Vec<(String, usize)>> {
    let dec = GzDecoder::new(input);
    let reader = BufReader::new(dec);
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, '\t');
        let name = parts.next().unwrap_or_default().to_string();
        let len: usize = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
        out.push((name, len));
    }
    Ok(out)
}
