//! Triplet 0x02: fully qualified name.
//!
//! Content layout: FQN type byte, format byte, then the name. The format
//! selects the name representation: character string (or raw bytes for
//! the two binary reference types), OID, or URL.

use std::fmt;
use std::io::Write;

use crate::codepage;
use crate::dump::hex_pad;
use crate::error::AfpError;
use crate::oid::Oid;
use crate::options::ReadWriteOptions;
use crate::triplet::{GenericTriplet, Triplet};

const TID: u8 = 0x02;
/// Names are truncated to this many encoded bytes.
const MAX_NAME_LEN: usize = 250;

pub const FORMAT_CHARACTER_STRING: u8 = 0x00;
pub const FORMAT_OID: u8 = 0x10;
pub const FORMAT_URL: u8 = 0x20;

/// Types whose character-string form carries binary data.
const BINARY_TYPES: [u8; 2] = [0x84, 0xBE];

/// The MO:DCA FQN type registry.
const FQN_TYPES: &[(u8, &str)] = &[
    (0x01, "Replace First GID Name"),
    (0x07, "Font Family Name"),
    (0x08, "Font Typeface Name"),
    (0x09, "MO:DCA Resource Hierarchy Reference"),
    (0x0A, "Begin Resource Group Reference"),
    (0x0B, "Attribute GID"),
    (0x0C, "Process Element GID"),
    (0x0D, "Begin Page Group Reference"),
    (0x11, "Media Type Reference"),
    (0x41, "Color Management Resource (CMR) Reference"),
    (0x6E, "Data-object Font Base Font Identifier"),
    (0x7E, "Data-object Font Linked Font Identifier"),
    (0x83, "Begin Document Reference"),
    (0x84, "Resource Object Reference"),
    (0x85, "Code Page Name Reference"),
    (0x86, "Font Character Set Name Reference"),
    (0x87, "Begin Page Reference"),
    (0x8D, "Begin Medium Map Reference"),
    (0x8E, "Coded Font Name Reference"),
    (0x98, "Begin Document Index Reference"),
    (0xB0, "Begin Overlay Reference"),
    (0xBE, "Data Object Internal Resource Reference"),
    (0xCA, "Index Element GID"),
    (0xCE, "Other Object Data Reference"),
    (0xDE, "Data Object External Resource Reference"),
];

fn fqn_type_name(fqn_type: u8) -> Option<&'static str> {
    FQN_TYPES
        .iter()
        .find(|(t, _)| *t == fqn_type)
        .map(|(_, name)| *name)
}

fn format_name(format: u8) -> Option<&'static str> {
    match format {
        FORMAT_CHARACTER_STRING => Some("Character string"),
        FORMAT_OID => Some("OID"),
        FORMAT_URL => Some("URL"),
        _ => None,
    }
}

/// The decoded name, per the triplet's format byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FqnName {
    Text(String),
    Bytes(Vec<u8>),
    Oid(Oid),
    Url(String),
}

impl fmt::Display for FqnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FqnName::Text(s) | FqnName::Url(s) => write!(f, "{s}"),
            FqnName::Oid(oid) => write!(f, "{oid}"),
            FqnName::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FqnTriplet {
    inner: GenericTriplet,
    fqn_type: u8,
    format: u8,
    name: FqnName,
}

pub(super) fn from_generic(triplet: GenericTriplet) -> Result<Triplet, AfpError> {
    FqnTriplet::from_generic(triplet).map(Triplet::Fqn)
}

impl FqnTriplet {
    pub fn from_generic(triplet: GenericTriplet) -> Result<Self, AfpError> {
        if triplet.tid() != TID {
            return Err(AfpError::Promotion(format!(
                "expected TID {} but got TID {}",
                hex_pad(TID.into(), 2),
                hex_pad(triplet.tid().into(), 2)
            )));
        }
        let content = triplet.content();
        if content.len() < 3 {
            return Err(AfpError::TripletFormat(format!(
                "FQN triplet needs at least 3 content bytes, got {}",
                content.len()
            )));
        }

        let fqn_type = content[0];
        if fqn_type_name(fqn_type).is_none() {
            return Err(AfpError::TripletFormat(format!(
                "unexpected FQN type {}",
                hex_pad(fqn_type.into(), 2)
            )));
        }
        let format = content[1];
        let name_bytes = &content[2..];
        let name = match format {
            FORMAT_CHARACTER_STRING => {
                if BINARY_TYPES.contains(&fqn_type) {
                    FqnName::Bytes(name_bytes.to_vec())
                } else {
                    FqnName::Text(codepage::decode(name_bytes))
                }
            }
            FORMAT_OID => FqnName::Oid(Oid::from_bytes(name_bytes)?),
            FORMAT_URL => FqnName::Url(codepage::decode(name_bytes)),
            other => {
                return Err(AfpError::TripletFormat(format!(
                    "unexpected FQN format {}",
                    hex_pad(other.into(), 2)
                )));
            }
        };

        Ok(FqnTriplet {
            inner: triplet,
            fqn_type,
            format,
            name,
        })
    }

    /// Build a character-string FQN.
    pub fn with_text(fqn_type: u8, name: &str) -> Result<Self, AfpError> {
        Self::build(fqn_type, FORMAT_CHARACTER_STRING, codepage::encode(name))
    }

    /// Build an OID FQN.
    pub fn with_oid(fqn_type: u8, oid: &Oid) -> Result<Self, AfpError> {
        Self::build(fqn_type, FORMAT_OID, oid.as_bytes().to_vec())
    }

    /// Build a URL FQN.
    pub fn with_url(fqn_type: u8, url: &str) -> Result<Self, AfpError> {
        Self::build(fqn_type, FORMAT_URL, codepage::encode(url))
    }

    fn build(fqn_type: u8, format: u8, mut name_bytes: Vec<u8>) -> Result<Self, AfpError> {
        if fqn_type_name(fqn_type).is_none() {
            return Err(AfpError::TripletFormat(format!(
                "illegal FQN type {}",
                hex_pad(fqn_type.into(), 2)
            )));
        }
        if name_bytes.is_empty() {
            return Err(AfpError::TripletFormat("empty FQN name".to_string()));
        }
        name_bytes.truncate(MAX_NAME_LEN);

        let mut content = Vec::with_capacity(name_bytes.len() + 2);
        content.push(fqn_type);
        content.push(format);
        content.extend_from_slice(&name_bytes);
        Self::from_generic(GenericTriplet::new(TID, content)?)
    }

    pub fn generic(&self) -> &GenericTriplet {
        &self.inner
    }

    pub fn fqn_type(&self) -> u8 {
        self.fqn_type
    }

    /// Display name of the FQN type.
    pub fn type_name(&self) -> &'static str {
        fqn_type_name(self.fqn_type).unwrap_or("Unknown")
    }

    pub fn format(&self) -> u8 {
        self.format
    }

    pub fn name(&self) -> &FqnName {
        &self.name
    }

    pub(crate) fn render<W: Write>(
        &self,
        out: &mut W,
        _options: &ReadWriteOptions,
        prefix: &str,
    ) -> Result<(), AfpError> {
        writeln!(
            out,
            "{prefix}  TRP TID={} FQNType={}({}) FQNFmt={}({}) FQName={}",
            hex_pad(TID.into(), 2),
            hex_pad(self.fqn_type.into(), 2),
            self.type_name(),
            hex_pad(self.format.into(), 2),
            format_name(self.format).unwrap_or("Unknown"),
            self.name
        )?;
        Ok(())
    }
}
