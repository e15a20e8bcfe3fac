//! Specific record and triplet types, and the registry that promotes
//! generic records and triplets to them.
//!
//! Promotion is table driven: the decoder tables below are resolved
//! against the field definitions once, on first use. A code without a
//! registered decoder keeps its generic form; validation failures inside
//! a registered decoder propagate to the caller.

mod attval;
mod cgcsgid;
mod fqn;
mod nop;
mod tle;

pub use attval::AttValTriplet;
pub use cgcsgid::{CgcsgidTriplet, CgcsgidValue};
pub use fqn::{FqnName, FqnTriplet};
pub use nop::NopRecord;
pub use tle::TleRecord;

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::defs::definitions;
use crate::dump::hex_pad;
use crate::error::AfpError;
use crate::record::{GenericRecord, Record};
use crate::triplet::{GenericTriplet, Triplet};

type RecordCtor = fn(GenericRecord) -> Result<Record, AfpError>;
type TripletCtor = fn(GenericTriplet) -> Result<Triplet, AfpError>;

/// Record decoders, keyed by abbreviation and resolved to identifiers at
/// load time.
const RECORD_DECODERS: &[(&str, RecordCtor)] = &[
    ("NOP", nop::from_generic),
    ("TLE", tle::from_generic),
];

/// Triplet decoders, keyed by TID.
const TRIPLET_DECODERS: &[(u8, TripletCtor)] = &[
    (0x01, cgcsgid::from_generic),
    (0x02, fqn::from_generic),
    (0x36, attval::from_generic),
];

struct SpecificClasses {
    records: HashMap<u32, RecordCtor>,
    triplets: HashMap<u8, TripletCtor>,
}

static CLASSES: OnceLock<Result<SpecificClasses, String>> = OnceLock::new();

fn classes() -> Result<&'static SpecificClasses, AfpError> {
    let loaded = CLASSES.get_or_init(|| SpecificClasses::load().map_err(|e| e.to_string()));
    match loaded {
        Ok(classes) => Ok(classes),
        Err(msg) => Err(AfpError::Registry(msg.clone())),
    }
}

impl SpecificClasses {
    fn load() -> Result<SpecificClasses, AfpError> {
        let defs = definitions()?;

        let mut records = HashMap::new();
        for &(abbrev, ctor) in RECORD_DECODERS {
            match defs.code(abbrev) {
                Some(code) => {
                    records.insert(code, ctor);
                }
                None => warn!("no structured field code for record decoder '{abbrev}'"),
            }
        }

        let mut triplets = HashMap::new();
        for &(tid, ctor) in TRIPLET_DECODERS {
            triplets.insert(tid, ctor);
        }

        Ok(SpecificClasses { records, triplets })
    }
}

/// Promote a generic record to its registered specific type, if any.
pub fn promote_record(record: GenericRecord) -> Result<Record, AfpError> {
    match classes()?.records.get(&record.identifier()) {
        Some(ctor) => ctor(record),
        None => {
            debug!(
                "no specific type for identifier {}, keeping generic record",
                record.identifier_hex()
            );
            Ok(Record::Generic(record))
        }
    }
}

/// Promote a generic triplet to its registered specific type, if any.
pub fn promote_triplet(triplet: GenericTriplet) -> Result<Triplet, AfpError> {
    match classes()?.triplets.get(&triplet.tid()) {
        Some(ctor) => ctor(triplet),
        None => {
            debug!(
                "no specific type for TID {}, keeping generic triplet",
                hex_pad(triplet.tid().into(), 2)
            );
            Ok(Triplet::Generic(triplet))
        }
    }
}

/// Decode consecutive triplets from `data` and promote each.
pub fn decode_triplets(
    data: &[u8],
    offset: usize,
    max: Option<usize>,
) -> Result<Vec<Triplet>, AfpError> {
    GenericTriplet::decode_many(data, offset, max)?
        .into_iter()
        .map(promote_triplet)
        .collect()
}
