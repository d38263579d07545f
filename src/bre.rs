//! BRE (block-run-encoded) file codec (§4.5).
//!
//! Fixed 24-byte header, a stream of `(symbol, run_length)` records packed
//! little-endian in `b_per_sym + b_per_run` bytes, a zero/zero terminator
//! record, then three little-endian `u64` footer totals `(n_rec, n_sym,
//! n_run)` that readers must verify.

use crate::error::{Error, Result};
use std::io::{Read, Write};

pub const MAGIC: [u8; 4] = *b"BRE\x01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreHeader {
    pub b_per_sym: u8,
    pub b_per_run: u8,
    pub atype: u8,
    pub mtype: u8,
    pub alphabet_size: u64,
    pub l_aux: u64,
}

impl BreHeader {
    /// The default header used by the construction CLI's BRE writer: DNA-6
    /// alphabet, 2-byte run-length fields (matching `bre_hdr_init(BRE_AT_DNA6, 2)`
    /// in the reference source).
    pub fn dna6(b_per_run: u8) -> Self {
        BreHeader {
            b_per_sym: 1,
            b_per_run,
            atype: 0, // BRE_AT_DNA6
            mtype: 0,
            alphabet_size: 6,
            l_aux: 0,
        }
    }

    fn record_bytes(&self) -> usize {
        self.b_per_sym as usize + self.b_per_run as usize
    }

    fn max_run(&self) -> u64 {
        (1u64 << (8 * self.b_per_run as u32)) - 1
    }
}

pub struct BreWriter<W: Write> {
    out: W,
    header: BreHeader,
    n_rec: u64,
    n_sym: u64,
    n_run: u64,
}

impl<W: Write> BreWriter<W> {
    pub fn new(mut out: W, header: BreHeader) -> Result<Self> {
        out.write_all(&MAGIC)?;
        out.write_all(&[header.b_per_sym, header.b_per_run, header.atype, header.mtype])?;
        out.write_all(&header.alphabet_size.to_le_bytes())?;
        out.write_all(&header.l_aux.to_le_bytes())?;
        Ok(BreWriter { out, header, n_rec: 0, n_sym: 0, n_run: 0 })
    }

    /// Write one logical `(symbol, run_length)` pair, splitting it across
    /// multiple physical records if it exceeds the per-record run-length
    /// capacity.
    pub fn write_run(&mut self, symbol: u64, run_length: u64) -> Result<()> {
        if run_length == 0 {
            return Ok(());
        }
        self.n_sym += run_length;
        self.n_run += 1;
        let max_run = self.header.max_run();
        let mut remaining = run_length;
        while remaining > 0 {
            let take = remaining.min(max_run);
            self.write_record(symbol, take)?;
            remaining -= take;
        }
        Ok(())
    }

    fn write_record(&mut self, symbol: u64, len: u64) -> Result<()> {
        let sym_bytes = symbol.to_le_bytes();
        let len_bytes = len.to_le_bytes();
        self.out.write_all(&sym_bytes[..self.header.b_per_sym as usize])?;
        self.out.write_all(&len_bytes[..self.header.b_per_run as usize])?;
        self.n_rec += 1;
        Ok(())
    }

    /// Write the zero/zero terminator and the footer totals, consuming the
    /// writer.
    pub fn finish(mut self) -> Result<W> {
        self.write_record(0, 0)?;
        self.n_rec -= 1; // terminator isn't counted in n_rec
        self.out.write_all(&self.n_rec.to_le_bytes())?;
        self.out.write_all(&self.n_sym.to_le_bytes())?;
        self.out.write_all(&self.n_run.to_le_bytes())?;
        Ok(self.out)
    }
}

pub struct BreReader<R: Read> {
    input: R,
    header: BreHeader,
}

impl<R: Read> BreReader<R> {
    pub fn new(mut input: R) -> Result<Self> {
        let mut magic = [0u8; 4];
        read_exact_or_truncated(&mut input, &mut magic, "BRE magic")?;
        if magic != MAGIC {
            return Err(Error::BadMagic {
                what: "BRE file",
                expected: MAGIC.to_vec(),
                actual: magic.to_vec(),
            });
        }
        let mut flags = [0u8; 4];
        read_exact_or_truncated(&mut input, &mut flags, "BRE header flags")?;
        let mut asize_buf = [0u8; 8];
        read_exact_or_truncated(&mut input, &mut asize_buf, "BRE alphabet_size")?;
        let mut laux_buf = [0u8; 8];
        read_exact_or_truncated(&mut input, &mut laux_buf, "BRE l_aux")?;
        let header = BreHeader {
            b_per_sym: flags[0],
            b_per_run: flags[1],
            atype: flags[2],
            mtype: flags[3],
            alphabet_size: u64::from_le_bytes(asize_buf),
            l_aux: u64::from_le_bytes(laux_buf),
        };
        if header.l_aux > 0 {
            let mut aux = vec![0u8; header.l_aux as usize];
            read_exact_or_truncated(&mut input, &mut aux, "BRE aux bytes")?;
        }
        Ok(BreReader { input, header })
    }

    pub fn header(&self) -> &BreHeader {
        &self.header
    }

    /// Read the whole body, coalescing consecutive same-symbol records, and
    /// verify the footer totals. Returns `(symbol, run_length)` pairs.
    pub fn read_all(mut self) -> Result<Vec<(u64, u64)>> {
        let rec_bytes = self.header.record_bytes();
        let mut raw_runs: Vec<(u64, u64)> = Vec::new();
        let mut n_rec = 0u64;
        loop {
            let mut buf = vec![0u8; rec_bytes];
            read_exact_or_truncated(&mut self.input, &mut buf, "BRE record")?;
            let sym = le_bytes_to_u64(&buf[..self.header.b_per_sym as usize]);
            let len = le_bytes_to_u64(&buf[self.header.b_per_sym as usize..]);
            if sym == 0 && len == 0 {
                break;
            }
            n_rec += 1;
            raw_runs.push((sym, len));
        }

        let mut footer = [0u8; 24];
        read_exact_or_truncated(&mut self.input, &mut footer, "BRE footer")?;
        let exp_n_rec = u64::from_le_bytes(footer[0..8].try_into().unwrap());
        let exp_n_sym = u64::from_le_bytes(footer[8..16].try_into().unwrap());
        let exp_n_run = u64::from_le_bytes(footer[16..24].try_into().unwrap());

        let mut coalesced: Vec<(u64, u64)> = Vec::new();
        for (sym, len) in raw_runs {
            if let Some(last) = coalesced.last_mut() {
                if last.0 == sym {
                    last.1 += len;
                    continue;
                }
            }
            coalesced.push((sym, len));
        }

        let n_sym: u64 = coalesced.iter().map(|&(_, l)| l).sum();
        let n_run = coalesced.len() as u64;

        if (n_rec, n_sym, n_run) != (exp_n_rec, exp_n_sym, exp_n_run) {
            return Err(Error::Inconsistent {
                expected: (exp_n_rec, exp_n_sym, exp_n_run),
                actual: (n_rec, n_sym, n_run),
            });
        }

        Ok(coalesced)
    }
}

fn le_bytes_to_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

fn read_exact_or_truncated<R: Read>(r: &mut R, buf: &mut [u8], what: &'static str) -> Result<()> {
    r.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::Truncated { what }
        } else {
            Error::Io(e)
        }
    })
}

/// Write a plain BWT (symbol-per-byte) as BRE.
pub fn write_plain_as_bre<W: Write>(bwt: &[u8], out: W, b_per_run: u8) -> Result<W> {
    let header = BreHeader::dna6(b_per_run);
    let mut writer = BreWriter::new(out, header)?;
    let mut i = 0;
    while i < bwt.len() {
        let c = bwt[i];
        let mut j = i + 1;
        while j < bwt.len() && bwt[j] == c {
            j += 1;
        }
        writer.write_run(c as u64, (j - i) as u64)?;
        i = j;
    }
    writer.finish()
}

/// Decode a BRE body back into a plain BWT byte sequence.
pub fn read_bre_as_plain<R: Read>(input: R) -> Result<Vec<u8>> {
    let reader = BreReader::new(input)?;
    let runs = reader.read_all()?;
    let mut out = Vec::new();
    for (sym, len) in runs {
        out.extend(std::iter::repeat(sym as u8).take(len as usize));
    }
    Ok(out)
}
