//! Hex rendering helpers shared by the record and triplet dumps.

use std::io::{self, Write};

/// Format `val` as a `0x`-prefixed uppercase hex string, zero-padded to
/// `width` digits.
pub fn hex_pad(val: u64, width: usize) -> String {
    format!("0x{val:0width$X}")
}

/// 16-bytes-per-line hex dump. `label` is repeated at the start of every
/// line, after the prefix.
pub fn dump_data<W: Write>(out: &mut W, label: &str, prefix: &str, data: &[u8]) -> io::Result<()> {
    for chunk in data.chunks(16) {
        write!(out, "{prefix}    {label}")?;
        for b in chunk {
            write!(out, "{b:02x} ")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
