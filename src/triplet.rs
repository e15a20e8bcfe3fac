//! Triplets: the length-prefixed, type-tagged sub-records inside certain
//! structured-field payloads.
//!
//! A triplet is framed as a length byte (covering itself and the TID
//! byte, minimum 3), a TID byte and `length - 2` content bytes. Triplets
//! are self-delimiting, so a payload is scanned left to right with each
//! triplet's length giving the next offset.

use std::io::{self, Write};

use crate::error::AfpError;
use crate::options::ReadWriteOptions;
use crate::specific::{AttValTriplet, CgcsgidTriplet, FqnTriplet};

/// Smallest legal value of the length byte.
pub const MIN_TRIPLET_LEN: usize = 3;
/// Largest content size the one-byte length field leaves room for.
pub const MAX_CONTENT_LEN: usize = 0xFF - 2;

/// A minimal triplet: TID plus content bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericTriplet {
    tid: u8,
    content: Vec<u8>,
}

impl GenericTriplet {
    pub fn new(tid: u8, content: Vec<u8>) -> Result<Self, AfpError> {
        if content.is_empty() {
            return Err(AfpError::TripletFormat(
                "content must be at least one byte".to_string(),
            ));
        }
        if content.len() > MAX_CONTENT_LEN {
            return Err(AfpError::FieldTooLarge {
                field: "triplet content length",
                value: content.len() as u64,
                max: MAX_CONTENT_LEN as u64,
            });
        }
        Ok(GenericTriplet { tid, content })
    }

    /// Decode one triplet starting at `offset`.
    pub fn decode_at(data: &[u8], offset: usize) -> Result<Self, AfpError> {
        let remaining = data.len().saturating_sub(offset);
        if remaining < MIN_TRIPLET_LEN {
            return Err(AfpError::TripletFormat(format!(
                "too little data at offset {offset}: {remaining} bytes remaining"
            )));
        }
        let length = data[offset] as usize;
        if length < MIN_TRIPLET_LEN {
            return Err(AfpError::TripletFormat(format!(
                "illegal length byte {length} at offset {offset}"
            )));
        }
        if remaining < length {
            return Err(AfpError::TripletFormat(format!(
                "declared length {length} exceeds the {remaining} bytes remaining at offset {offset}"
            )));
        }
        let tid = data[offset + 1];
        let content = data[offset + 2..offset + length].to_vec();
        Ok(GenericTriplet { tid, content })
    }

    /// Scan consecutive triplets from `offset` until the payload ends or
    /// `max` triplets have been decoded.
    pub fn decode_many(
        data: &[u8],
        mut offset: usize,
        max: Option<usize>,
    ) -> Result<Vec<Self>, AfpError> {
        let mut out = Vec::new();
        while offset < data.len() && max.map_or(true, |m| out.len() < m) {
            let triplet = Self::decode_at(data, offset)?;
            offset += triplet.length() as usize;
            out.push(triplet);
        }
        Ok(out)
    }

    /// The value of the length byte: content plus the two framing bytes.
    pub fn length(&self) -> u8 {
        (self.content.len() + 2) as u8
    }

    pub fn tid(&self) -> u8 {
        self.tid
    }

    /// Content bytes, without the length and TID bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The full wire form: length byte, TID byte, content.
    pub fn encoded(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.content.len() + 2);
        out.push(self.length());
        out.push(self.tid);
        out.extend_from_slice(&self.content);
        out
    }

    /// Hex dump with a `TRP` marker on the first line only.
    pub fn render<W: Write>(&self, out: &mut W, prefix: &str) -> io::Result<()> {
        let data = self.encoded();
        for (i, chunk) in data.chunks(16).enumerate() {
            let marker = if i == 0 { "TRP " } else { "    " };
            write!(out, "{prefix}  {marker}")?;
            for b in chunk {
                write!(out, "{b:02x} ")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// A triplet, promoted to a specific variant when a decoder is registered
/// for its TID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Triplet {
    Generic(GenericTriplet),
    Cgcsgid(CgcsgidTriplet),
    Fqn(FqnTriplet),
    AttVal(AttValTriplet),
}

impl Triplet {
    /// The underlying generic triplet.
    pub fn generic(&self) -> &GenericTriplet {
        match self {
            Triplet::Generic(t) => t,
            Triplet::Cgcsgid(t) => t.generic(),
            Triplet::Fqn(t) => t.generic(),
            Triplet::AttVal(t) => t.generic(),
        }
    }

    pub fn tid(&self) -> u8 {
        self.generic().tid()
    }

    pub fn length(&self) -> u8 {
        self.generic().length()
    }

    pub fn content(&self) -> &[u8] {
        self.generic().content()
    }

    pub fn encoded(&self) -> Vec<u8> {
        self.generic().encoded()
    }

    pub fn render<W: Write>(
        &self,
        out: &mut W,
        options: &ReadWriteOptions,
        prefix: &str,
    ) -> Result<(), AfpError> {
        match self {
            Triplet::Generic(t) => t.render(out, prefix).map_err(AfpError::from),
            Triplet::Cgcsgid(t) => t.render(out, options, prefix),
            Triplet::Fqn(t) => t.render(out, options, prefix),
            Triplet::AttVal(t) => t.render(out, options, prefix),
        }
    }
}

impl From<GenericTriplet> for Triplet {
    fn from(triplet: GenericTriplet) -> Self {
        Triplet::Generic(triplet)
    }
}

/// Reassemble a payload from consecutive triplets. The write position
/// advances by each triplet's own encoded length.
pub fn encode_all(triplets: &[Triplet]) -> Vec<u8> {
    let mut out = Vec::new();
    for triplet in triplets {
        out.extend_from_slice(&triplet.encoded());
    }
    out
}

/// Count the triplets carrying the given TID.
pub fn count_tids(triplets: &[Triplet], tid: u8) -> usize {
    triplets.iter().filter(|t| t.tid() == tid).count()
}
