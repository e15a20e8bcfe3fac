//! Triplet 0x36: attribute value.

use std::io::Write;

use crate::codepage;
use crate::dump::hex_pad;
use crate::error::AfpError;
use crate::options::ReadWriteOptions;
use crate::triplet::{GenericTriplet, Triplet};

const TID: u8 = 0x36;

/// An attribute value triplet: two reserved bytes, then the value text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttValTriplet {
    inner: GenericTriplet,
    reserved: u16,
    value: String,
}

pub(super) fn from_generic(triplet: GenericTriplet) -> Result<Triplet, AfpError> {
    AttValTriplet::from_generic(triplet).map(Triplet::AttVal)
}

impl AttValTriplet {
    pub fn from_generic(triplet: GenericTriplet) -> Result<Self, AfpError> {
        if triplet.tid() != TID {
            return Err(AfpError::Promotion(format!(
                "expected TID {} but got TID {}",
                hex_pad(TID.into(), 2),
                hex_pad(triplet.tid().into(), 2)
            )));
        }
        let content = triplet.content();
        if content.len() < 2 {
            return Err(AfpError::TripletFormat(format!(
                "attribute value triplet needs at least 2 content bytes, got {}",
                content.len()
            )));
        }

        let reserved = u16::from_be_bytes([content[0], content[1]]);
        let value = codepage::decode(&content[2..]);
        Ok(AttValTriplet {
            inner: triplet,
            reserved,
            value,
        })
    }

    /// Build an attribute value triplet from text.
    pub fn new(value: &str) -> Result<Self, AfpError> {
        let mut content = vec![0u8, 0u8];
        content.extend_from_slice(&codepage::encode(value));
        Self::from_generic(GenericTriplet::new(TID, content)?)
    }

    pub fn generic(&self) -> &GenericTriplet {
        &self.inner
    }

    pub fn reserved(&self) -> u16 {
        self.reserved
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn render<W: Write>(
        &self,
        out: &mut W,
        _options: &ReadWriteOptions,
        prefix: &str,
    ) -> Result<(), AfpError> {
        writeln!(
            out,
            "{prefix}  TRP TID={} AttVal={}",
            hex_pad(TID.into(), 2),
            self.value
        )?;
        Ok(())
    }
}
