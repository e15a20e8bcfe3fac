//! Structured-field records: the wire codec and dump rendering.
//!
//! Every record is framed as a carriage-control marker byte, an 8-byte
//! introducer (big-endian u16 length, u24 identifier, u8 flags, u16
//! reserved) and `length - 8` payload bytes. Encoding is the exact
//! byte-level inverse of decoding.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use md5::{Digest, Md5};

use crate::defs::definitions;
use crate::dump::{dump_data, hex_pad};
use crate::error::AfpError;
use crate::options::ReadWriteOptions;
use crate::specific::{NopRecord, TleRecord};

/// Carriage-control marker preceding every structured field.
pub const CARRIAGE_CONTROL: u8 = 0x5A;
/// Introducer size; the record length field covers it.
pub const INTRODUCER_LEN: usize = 8;
/// Largest payload the 2-byte length field leaves room for.
pub const MAX_DATA_LEN: usize = 0xFFFF - INTRODUCER_LEN;
/// Structured-field identifiers are 24-bit.
pub const MAX_IDENTIFIER: u32 = 0xFF_FFFF;

/// A minimal structured-field record. Fields are validated at
/// construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericRecord {
    identifier: u32,
    flags: u8,
    reserved: u16,
    data: Vec<u8>,
    ends_in_crlf: bool,
}

impl GenericRecord {
    pub fn new(identifier: u32, flags: u8, reserved: u16, data: Vec<u8>) -> Result<Self, AfpError> {
        if identifier > MAX_IDENTIFIER {
            return Err(AfpError::FieldTooLarge {
                field: "identifier",
                value: identifier.into(),
                max: MAX_IDENTIFIER.into(),
            });
        }
        if data.len() > MAX_DATA_LEN {
            return Err(AfpError::FieldTooLarge {
                field: "data length",
                value: data.len() as u64,
                max: MAX_DATA_LEN as u64,
            });
        }
        Ok(GenericRecord {
            identifier,
            flags,
            reserved,
            data,
            ends_in_crlf: false,
        })
    }

    /// Decode one record from a byte source. `Ok(None)` on a clean end of
    /// input before the marker byte; a short read anywhere later is a
    /// framing error.
    pub fn read_from<R: Read>(input: &mut R) -> Result<Option<Self>, AfpError> {
        let mut marker = [0u8; 1];
        if input.read(&mut marker)? == 0 {
            return Ok(None);
        }
        if marker[0] != CARRIAGE_CONTROL {
            return Err(AfpError::Framing(format!(
                "expected carriage control character but got {}",
                hex_pad(marker[0].into(), 2)
            )));
        }

        let mut introducer = [0u8; INTRODUCER_LEN];
        input
            .read_exact(&mut introducer)
            .map_err(|e| short_read(e, "structured field introducer"))?;
        let mut cursor = &introducer[..];
        let length = cursor.read_u16::<BigEndian>()?;
        let identifier = cursor.read_u24::<BigEndian>()?;
        let flags = cursor.read_u8()?;
        let reserved = cursor.read_u16::<BigEndian>()?;

        if (length as usize) < INTRODUCER_LEN {
            return Err(AfpError::Framing(format!(
                "record length {} is shorter than the introducer",
                hex_pad(length.into(), 4)
            )));
        }

        let mut data = vec![0u8; length as usize - INTRODUCER_LEN];
        input
            .read_exact(&mut data)
            .map_err(|e| short_read(e, "record data"))?;

        Ok(Some(GenericRecord {
            identifier,
            flags,
            reserved,
            data,
            ends_in_crlf: false,
        }))
    }

    /// Encode the record: marker, introducer, payload, and the CR-LF pair
    /// when the record was delimited by one.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), AfpError> {
        out.write_u8(CARRIAGE_CONTROL)?;
        out.write_u16::<BigEndian>(self.length())?;
        out.write_u24::<BigEndian>(self.identifier)?;
        out.write_u8(self.flags)?;
        out.write_u16::<BigEndian>(self.reserved)?;
        out.write_all(&self.data)?;
        if self.ends_in_crlf {
            out.write_all(b"\r\n")?;
        }
        Ok(())
    }

    /// The value of the length field: payload plus introducer.
    pub fn length(&self) -> u16 {
        (self.data.len() + INTRODUCER_LEN) as u16
    }

    pub fn identifier(&self) -> u32 {
        self.identifier
    }

    /// The identifier as a 6-digit hex string.
    pub fn identifier_hex(&self) -> String {
        hex_pad(self.identifier.into(), 6)
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn reserved(&self) -> u16 {
        self.reserved
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the record's framing was followed by CR-LF in the source.
    pub fn ends_in_crlf(&self) -> bool {
        self.ends_in_crlf
    }

    pub(crate) fn set_ends_in_crlf(&mut self, ends_in_crlf: bool) {
        self.ends_in_crlf = ends_in_crlf;
    }

    /// Human-readable dump: header line plus payload.
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        options: &ReadWriteOptions,
        level: usize,
    ) -> Result<(), AfpError> {
        self.render_header(out, options, level)?;
        self.render_data(out, options, &options.level_prefix(level))
    }

    pub(crate) fn render_header<W: Write>(
        &self,
        out: &mut W,
        options: &ReadWriteOptions,
        level: usize,
    ) -> Result<(), AfpError> {
        let prefix = options.level_prefix(level);
        let defs = definitions()?;

        write!(out, "{prefix}")?;
        match defs.abbreviation(self.identifier) {
            Some(abbrev) => {
                let desc = defs.description(self.identifier).unwrap_or("");
                writeln!(out, "{abbrev}: {desc}")?;
                write!(out, "{prefix}  ")?;
            }
            None => {
                write!(out, "{}: ", self.identifier_hex())?;
            }
        }

        if self.must_digest(options) {
            write!(out, "length:????")?;
        } else {
            write!(out, "length:{}", hex_pad(self.length().into(), 4))?;
        }
        writeln!(
            out,
            " flags:{} reserved:{}",
            hex_pad(self.flags.into(), 2),
            hex_pad(self.reserved.into(), 4)
        )?;
        Ok(())
    }

    /// Payload dump: hex bytes, or an MD5 line when the configured digest
    /// threshold is exceeded.
    pub fn render_data<W: Write>(
        &self,
        out: &mut W,
        options: &ReadWriteOptions,
        prefix: &str,
    ) -> Result<(), AfpError> {
        if self.must_digest(options) {
            let digest = Md5::digest(&self.data);
            writeln!(out, "{prefix}    MD5: {}", hex::encode(digest))?;
            return Ok(());
        }
        dump_data(out, "", prefix, &self.data)?;
        Ok(())
    }

    fn must_digest(&self, options: &ReadWriteOptions) -> bool {
        options
            .digest_threshold()
            .is_some_and(|threshold| self.data.len() > threshold)
    }
}

fn short_read(err: io::Error, what: &str) -> AfpError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        AfpError::Framing(format!("input ended while reading the {what}"))
    } else {
        AfpError::Io(err)
    }
}

/// A structured field, promoted to a specific variant when a decoder is
/// registered for its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Generic(GenericRecord),
    Nop(NopRecord),
    Tle(TleRecord),
}

impl Record {
    /// The underlying generic record.
    pub fn generic(&self) -> &GenericRecord {
        match self {
            Record::Generic(r) => r,
            Record::Nop(r) => r.generic(),
            Record::Tle(r) => r.generic(),
        }
    }

    pub fn identifier(&self) -> u32 {
        self.generic().identifier()
    }

    pub fn flags(&self) -> u8 {
        self.generic().flags()
    }

    pub fn reserved(&self) -> u16 {
        self.generic().reserved()
    }

    pub fn data(&self) -> &[u8] {
        self.generic().data()
    }

    pub fn length(&self) -> u16 {
        self.generic().length()
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), AfpError> {
        self.generic().write_to(out)
    }

    /// Human-readable dump; specific variants render their own payload
    /// view under the common header.
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        options: &ReadWriteOptions,
        level: usize,
    ) -> Result<(), AfpError> {
        self.generic().render_header(out, options, level)?;
        let prefix = options.level_prefix(level);
        match self {
            Record::Generic(r) => r.render_data(out, options, &prefix),
            Record::Nop(r) => r.render_data(out, options, &prefix),
            Record::Tle(r) => r.render_data(out, options, &prefix),
        }
    }
}

impl From<GenericRecord> for Record {
    fn from(record: GenericRecord) -> Self {
        Record::Generic(record)
    }
}
