//! Crate-level error type.
//!
//! Hot paths (`rank1`, `rank2`, SSA lookup) never return [`Error`]; they
//! return plain value structs with a documented empty/sentinel state. This
//! type is reserved for codec and pipeline boundaries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("truncated stream while reading {what}")]
    Truncated { what: &'static str },

    #[error("inconsistent footer: expected {expected:?}, got {actual:?}")]
    Inconsistent {
        expected: (u64, u64, u64),
        actual: (u64, u64, u64),
    },

    #[error("bad magic in {what}: expected {expected:?}, got {actual:?}")]
    BadMagic {
        what: &'static str,
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    #[error("index is not strand-symmetric but a both-strands query was requested")]
    AsymmetricIndex,

    #[error("allocation failure: {what}")]
    AllocFailed { what: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
