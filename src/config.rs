//! Explicit configuration values, passed into the pipeline and aligner.
//!
//! Nothing in this crate reads process-global state; every knob that the
//! reference tool kept as an implicit global (verbose level, thread count,
//! scoring parameters) is an explicit field here instead. Every config type
//! derives `serde::{Serialize, Deserialize}` so a caller can load it from a
//! TOML/JSON file rather than hard-coding it, matching how the reference
//! crate's own index and suffix-array types serialize.

use serde::{Deserialize, Serialize};

/// Parameters governing batch construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Maximum number of `$`-terminated strings per batch.
    pub batch_size: usize,
    /// Number of worker threads for parallel-for / pipeline stages.
    pub n_threads: usize,
    /// Whether to add the reverse complement of every input string, making
    /// the resulting index strand-symmetric.
    pub add_reverse_complement: bool,
    /// Rope rank-dictionary leaf block length in bytes.
    pub block_len: usize,
    /// Rope rank-dictionary maximum children per internal node.
    pub max_nodes: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            batch_size: 10_000_000,
            n_threads: rayon::current_num_threads(),
            add_reverse_complement: true,
            block_len: 512,
            max_nodes: 8,
        }
    }
}

/// Sampling rate exponent for the sampled suffix array: samples are taken
/// every `2^ss` positions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SsaConfig {
    pub ss: u32,
    pub max_sa: usize,
}

impl Default for SsaConfig {
    fn default() -> Self {
        SsaConfig { ss: 3, max_sa: 50_000 }
    }
}

/// SMEM search thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmemConfig {
    pub min_len: usize,
    pub min_occ: usize,
    pub use_classic: bool,
    pub gap_threshold: usize,
}

impl Default for SmemConfig {
    fn default() -> Self {
        SmemConfig {
            min_len: 17,
            min_occ: 1,
            use_classic: false,
            gap_threshold: 1,
        }
    }
}

/// Aligner scoring and search-space parameters, recovered from the most
/// recent `search.c` snapshot in the reference source (the one introducing
/// end-to-end and haplotype-diversity modes).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlignParams {
    pub match_score: i32,
    pub mismatch: i32,
    pub gap_open: i32,
    pub gap_ext: i32,
    pub n_best: usize,
    pub end_len: usize,
    pub min_sc: i32,
    pub e2e_drop: Option<i32>,
    pub min_mem_len: usize,
}

impl Default for AlignParams {
    fn default() -> Self {
        AlignParams {
            match_score: 1,
            mismatch: 3,
            gap_open: 5,
            gap_ext: 2,
            n_best: 25,
            end_len: 5,
            min_sc: 1,
            e2e_drop: Some(20),
            min_mem_len: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignMode {
    Local,
    EndToEnd,
    HaplotypeDiversity,
}

/// Haplotype-diversity sliding window parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HapDivConfig {
    pub k: usize,
    pub w: usize,
}

impl Default for HapDivConfig {
    fn default() -> Self {
        HapDivConfig { k: 101, w: 50 }
    }
}

/// The three online-insertion orders supported by the `-2` construction
/// path (bypassing the suffix-array black box).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertOrder {
    AsGiven,
    Rlo,
    Rclo,
}
