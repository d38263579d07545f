//! Suffix-array black box (§4.3): a thin wrapper around `libsais`.
//!
//! This module is the one place permitted to know the suffix-array
//! algorithm's name; everything downstream only sees `Vec<i64>` SA rows.
//! The external contract this crate relies on: given a `$`-terminated
//! (here: sentinel-terminated) symbol string, return its suffix array.

use libsais::{SuffixArrayConstruction, ThreadCount};

/// Compute the suffix array of `text` (values in `0..ALPHABET_SIZE`,
/// already nt6-encoded, ending in the sentinel symbol). Uses every
/// available rayon thread, matching the construction pipeline's own
/// parallelism knob.
pub fn suffix_array(text: &[u8], n_threads: usize) -> Vec<i64> {
    let mut sa = vec![0i64; text.len()];
    let threads: u16 = n_threads.max(1).min(u16::MAX as usize) as u16;
    let mut construction = SuffixArrayConstruction::for_text(text).in_borrowed_buffer(&mut sa);
    construction = if threads > 1 {
        construction.multi_threaded(ThreadCount::fixed(threads))
    } else {
        construction.single_threaded()
    };
    construction.run().expect("libsais suffix array construction");
    sa
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet;

    #[test]
    fn suffix_array_of_single_sentinel_string_is_sorted() {
        let mut text = alphabet::encode(b"BANANA");
        text.push(alphabet::SENTINEL);
        let sa = suffix_array(&text, 1);
        assert_eq!(sa.len(), text.len());
        let rotations: Vec<Vec<u8>> = sa
            .iter()
            .map(|&i| {
                let i = i as usize;
                let n = text.len();
                (0..n).map(|k| text[(i + k) % n]).collect()
            })
            .collect();
        for w in rotations.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }
}
