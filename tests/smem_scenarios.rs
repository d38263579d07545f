//! End-to-end scenario 2 (planted-anchor SMEM counting) and scenario 5
//! (strand-asymmetric index rejection).

mod common;

use common::{build_fm, build_fm_encoded, TestRng};
use panfm::alphabet;
use panfm::config::SmemConfig;
use panfm::error::Error;
use panfm::smem;

/// Scenario 2 scaled down from 1000 reads to 60 (17 carrying the anchor, 43
/// not) to keep the fixture small; the ratio and the "exactly 17 hits
/// summing to 17" property are preserved verbatim.
#[test]
fn smem_counts_every_read_carrying_the_planted_anchor() {
    let anchor = b"ACGTACGTACGTACGTACGTACGTACGTAC";
    assert_eq!(anchor.len(), 30);

    let mut rng = TestRng::new(12345);
    let mut reads: Vec<Vec<u8>> = Vec::new();

    // 17 reads carrying the anchor, flanked by A/C-only filler so the
    // flanks can never accidentally reproduce a G/T-containing anchor byte.
    for i in 0..17 {
        let mut read = Vec::new();
        let prefix_len = (i * 3) % 20;
        for _ in 0..prefix_len {
            read.push(if rng.next_base() % 2 == alphabet::A { alphabet::A } else { alphabet::C });
        }
        read.extend(alphabet::encode(anchor));
        for _ in 0..(20 - prefix_len) {
            read.push(if rng.next_base() % 2 == alphabet::A { alphabet::A } else { alphabet::C });
        }
        reads.push(read);
    }

    // 43 reads with no G/T at all, so the anchor (which requires G and T)
    // cannot occur in them.
    for _ in 0..43 {
        let mut read = Vec::new();
        for _ in 0..60 {
            read.push(if rng.next_base() % 2 == alphabet::A { alphabet::A } else { alphabet::C });
        }
        reads.push(read);
    }

    let fm = build_fm_encoded(&reads);
    let cfg = SmemConfig { min_len: 30, min_occ: 1, use_classic: true, gap_threshold: 1 };
    let hits = smem::classic_smem(&fm, anchor, &cfg);

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].start, 0);
    assert_eq!(hits[0].end, 30);
    assert_eq!(hits[0].interval_size, 17);
}

#[test]
fn smem_checked_rejects_a_forward_only_index() {
    // A forward-only index: no reverse complements added, so the symbol
    // counts are not strand-symmetric (eight A's, zero T's) and the
    // symmetry check must fail fast.
    let fm = build_fm(&[b"AAAAAAAA"]);
    let cfg = SmemConfig::default();
    let err = smem::smem_checked(&fm, b"ACGT", &cfg).unwrap_err();
    assert!(matches!(err, Error::AsymmetricIndex));
}
