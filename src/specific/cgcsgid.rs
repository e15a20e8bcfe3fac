//! Triplet 0x01: coded graphic character set global identifier.

use std::io::Write;

use crate::dump::hex_pad;
use crate::error::AfpError;
use crate::options::ReadWriteOptions;
use crate::triplet::{GenericTriplet, Triplet};

const TID: u8 = 0x01;

/// The identifier pair carried by the triplet. A GCSGID of zero switches
/// the second number from a code page id to a coded character set id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgcsgidValue {
    Ccsid(u16),
    Cpgid { gcsgid: u16, cpgid: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgcsgidTriplet {
    inner: GenericTriplet,
    value: CgcsgidValue,
}

pub(super) fn from_generic(triplet: GenericTriplet) -> Result<Triplet, AfpError> {
    CgcsgidTriplet::from_generic(triplet).map(Triplet::Cgcsgid)
}

impl CgcsgidTriplet {
    pub fn from_generic(triplet: GenericTriplet) -> Result<Self, AfpError> {
        if triplet.tid() != TID {
            return Err(AfpError::Promotion(format!(
                "expected TID {} but got TID {}",
                hex_pad(TID.into(), 2),
                hex_pad(triplet.tid().into(), 2)
            )));
        }
        let content = triplet.content();
        if content.len() != 4 {
            return Err(AfpError::TripletFormat(format!(
                "CGCSGID triplet needs exactly 4 content bytes, got {}",
                content.len()
            )));
        }

        let gcsgid = u16::from_be_bytes([content[0], content[1]]);
        let second = u16::from_be_bytes([content[2], content[3]]);
        let value = if gcsgid == 0 {
            CgcsgidValue::Ccsid(second)
        } else {
            CgcsgidValue::Cpgid {
                gcsgid,
                cpgid: second,
            }
        };

        Ok(CgcsgidTriplet {
            inner: triplet,
            value,
        })
    }

    pub fn generic(&self) -> &GenericTriplet {
        &self.inner
    }

    pub fn value(&self) -> CgcsgidValue {
        self.value
    }

    pub(crate) fn render<W: Write>(
        &self,
        out: &mut W,
        _options: &ReadWriteOptions,
        prefix: &str,
    ) -> Result<(), AfpError> {
        write!(out, "{prefix}  TRP TID={}", hex_pad(TID.into(), 2))?;
        match self.value {
            CgcsgidValue::Ccsid(ccsid) => {
                writeln!(out, " CCSID={}", hex_pad(ccsid.into(), 4))?;
            }
            CgcsgidValue::Cpgid { gcsgid, cpgid } => {
                writeln!(
                    out,
                    " GCSGID={} CPGID={}",
                    hex_pad(gcsgid.into(), 4),
                    hex_pad(cpgid.into(), 4)
                )?;
            }
        }
        Ok(())
    }
}
