//! The TLE (Tag Logical Element) structured field.
//!
//! A TLE payload is a sequence of triplets naming an attribute (FQN
//! triplet 0x02) and carrying its value (triplet 0x36), optionally with a
//! character-set triplet (0x01) and extension triplets (0x80).

use std::io::Write;

use crate::defs::definitions;
use crate::dump::hex_pad;
use crate::error::AfpError;
use crate::options::ReadWriteOptions;
use crate::record::{GenericRecord, Record};
use crate::specific;
use crate::triplet::{self, Triplet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TleRecord {
    inner: GenericRecord,
    triplets: Vec<Triplet>,
}

pub(super) fn from_generic(record: GenericRecord) -> Result<Record, AfpError> {
    TleRecord::from_generic(record).map(Record::Tle)
}

impl TleRecord {
    pub fn from_generic(record: GenericRecord) -> Result<Self, AfpError> {
        let expected = tle_identifier()?;
        if record.identifier() != expected {
            return Err(AfpError::Promotion(format!(
                "expected TLE/{} but got record for {}",
                hex_pad(expected.into(), 6),
                record.identifier_hex()
            )));
        }
        let triplets = specific::decode_triplets(record.data(), 0, None)?;
        check(&triplets)?;
        Ok(TleRecord {
            inner: record,
            triplets,
        })
    }

    /// Build a TLE from triplets. The payload is the concatenation of
    /// each triplet's encoded bytes.
    pub fn new(flags: u8, reserved: u16, triplets: Vec<Triplet>) -> Result<Self, AfpError> {
        check(&triplets)?;
        let data = triplet::encode_all(&triplets);
        let inner = GenericRecord::new(tle_identifier()?, flags, reserved, data)?;
        Ok(TleRecord { inner, triplets })
    }

    pub fn generic(&self) -> &GenericRecord {
        &self.inner
    }

    pub fn triplets(&self) -> &[Triplet] {
        &self.triplets
    }

    /// The attribute name carried by the first FQN triplet.
    pub fn attribute_name(&self) -> Option<String> {
        self.triplets.iter().find_map(|t| match t {
            Triplet::Fqn(fqn) => Some(fqn.name().to_string()),
            _ => None,
        })
    }

    /// The attribute value carried by the first 0x36 triplet.
    pub fn attribute_value(&self) -> Option<&str> {
        self.triplets.iter().find_map(|t| match t {
            Triplet::AttVal(av) => Some(av.value()),
            _ => None,
        })
    }

    pub(crate) fn render_data<W: Write>(
        &self,
        out: &mut W,
        options: &ReadWriteOptions,
        prefix: &str,
    ) -> Result<(), AfpError> {
        for triplet in &self.triplets {
            triplet.render(out, options, prefix)?;
        }
        Ok(())
    }
}

fn tle_identifier() -> Result<u32, AfpError> {
    definitions()?
        .code("TLE")
        .ok_or_else(|| AfpError::Registry("no code for abbreviation TLE".to_string()))
}

/// TLE content rules: at least one FQN (0x02) and one attribute value
/// (0x36) triplet; only TIDs 0x01, 0x02, 0x36 and 0x80 may appear; the
/// first FQN must be an attribute GID in character-string form.
fn check(triplets: &[Triplet]) -> Result<(), AfpError> {
    if triplet::count_tids(triplets, 0x02) < 1 {
        return Err(AfpError::TripletFormat(
            "TLE data must contain at least one triplet of TID 0x02".to_string(),
        ));
    }
    if triplet::count_tids(triplets, 0x36) < 1 {
        return Err(AfpError::TripletFormat(
            "TLE data must contain at least one triplet of TID 0x36".to_string(),
        ));
    }

    let mut fqn_seen = 0usize;
    for triplet in triplets {
        match triplet.tid() {
            0x01 | 0x36 | 0x80 => {}
            0x02 => {
                fqn_seen += 1;
                if fqn_seen == 1 {
                    if let Triplet::Fqn(fqn) = triplet {
                        if fqn.fqn_type() != 0x0B {
                            return Err(AfpError::TripletFormat(format!(
                                "first FQN triplet in TLE data must be of type 0x0B, not {}",
                                hex_pad(fqn.fqn_type().into(), 2)
                            )));
                        }
                        if fqn.format() != 0x00 {
                            return Err(AfpError::TripletFormat(format!(
                                "first FQN triplet in TLE data must be of format 0x00, not {}",
                                hex_pad(fqn.format().into(), 2)
                            )));
                        }
                    }
                }
            }
            tid => {
                return Err(AfpError::TripletFormat(format!(
                    "illegal triplet {} for TLE record",
                    hex_pad(tid.into(), 2)
                )));
            }
        }
    }
    Ok(())
}
