//! The NOP (No Operation) structured field.

use std::io::Write;

use crate::codepage;
use crate::defs::definitions;
use crate::dump::hex_pad;
use crate::error::AfpError;
use crate::options::ReadWriteOptions;
use crate::record::{GenericRecord, Record};

/// A text rendering is accepted when at most this share of its characters
/// is unprintable.
const MAX_UNPRINTABLE_RATIO: f32 = 0.15;

/// A NOP record. The payload is free-form comment data, often readable
/// text in the default or a latin code page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NopRecord {
    inner: GenericRecord,
}

pub(super) fn from_generic(record: GenericRecord) -> Result<Record, AfpError> {
    NopRecord::from_generic(record).map(Record::Nop)
}

impl NopRecord {
    pub fn from_generic(record: GenericRecord) -> Result<Self, AfpError> {
        let defs = definitions()?;
        let expected = defs
            .code("NOP")
            .ok_or_else(|| AfpError::Registry("no code for abbreviation NOP".to_string()))?;
        if record.identifier() != expected {
            return Err(AfpError::Promotion(format!(
                "expected NOP/{} but got record for {}",
                hex_pad(expected.into(), 6),
                record.identifier_hex()
            )));
        }
        Ok(NopRecord { inner: record })
    }

    pub fn generic(&self) -> &GenericRecord {
        &self.inner
    }

    /// The comment text, when the payload decodes plausibly. CP500 is
    /// tried first, then Latin-1.
    pub fn text(&self) -> Option<String> {
        let data = self.inner.data();
        if data.is_empty() {
            return None;
        }
        for decoded in [codepage::decode(data), codepage::decode_latin1(data)] {
            let total = decoded.chars().count();
            let unprintable = decoded.chars().filter(|c| !is_printable(*c)).count();
            if (unprintable as f32) / (total as f32) <= MAX_UNPRINTABLE_RATIO {
                return Some(decoded);
            }
        }
        None
    }

    pub(crate) fn render_data<W: Write>(
        &self,
        out: &mut W,
        options: &ReadWriteOptions,
        prefix: &str,
    ) -> Result<(), AfpError> {
        match self.text() {
            Some(text) => {
                writeln!(out, "{prefix}    STR:{text}")?;
                Ok(())
            }
            None => self.inner.render_data(out, options, prefix),
        }
    }
}

fn is_printable(c: char) -> bool {
    (' '..='~').contains(&c)
}
