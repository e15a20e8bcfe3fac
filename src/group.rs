//! Record groups and the grouping state machine.
//!
//! Begin and end classification comes from the definitions registry. The
//! grouper makes one pass over a flat record source, maintaining a stack
//! of open groups and a parallel stack of expected end identifiers, and
//! yields standalone records and completed group trees.

use std::collections::HashSet;
use std::io::Write;

use tracing::{debug, trace};

use crate::defs::definitions;
use crate::dump::hex_pad;
use crate::error::AfpError;
use crate::options::ReadWriteOptions;
use crate::reader::RecordSource;
use crate::record::Record;

/// Either a standalone record or a completed group tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupedRecord {
    Record(Record),
    Group(RecordGroup),
}

impl GroupedRecord {
    /// The record's identifier, or the group's begin identifier.
    pub fn identifier(&self) -> u32 {
        match self {
            GroupedRecord::Record(record) => record.identifier(),
            GroupedRecord::Group(group) => group.identifier(),
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), AfpError> {
        match self {
            GroupedRecord::Record(record) => record.write_to(out),
            GroupedRecord::Group(group) => group.write_to(out),
        }
    }

    pub fn render<W: Write>(
        &self,
        out: &mut W,
        options: &ReadWriteOptions,
        level: usize,
    ) -> Result<(), AfpError> {
        match self {
            GroupedRecord::Record(record) => record.render(out, options, level),
            GroupedRecord::Group(group) => group.render(out, options, level),
        }
    }
}

/// A begin record, its ordered members (records or nested groups) and,
/// once closed, the matching end record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordGroup {
    begin: Record,
    members: Vec<GroupedRecord>,
    end: Option<Record>,
}

impl RecordGroup {
    /// Only a record carrying a begin-group identifier can open a group.
    pub fn new(begin: Record) -> Result<Self, AfpError> {
        let defs = definitions()?;
        if !defs.is_group_begin(begin.identifier()) {
            return Err(AfpError::Grouping(format!(
                "record {} is not a group-begin record",
                display_code(begin.identifier())
            )));
        }
        Ok(RecordGroup {
            begin,
            members: Vec::new(),
            end: None,
        })
    }

    pub fn add_member(&mut self, member: GroupedRecord) {
        self.members.push(member);
    }

    /// Close the group with its end record. A group closes exactly once,
    /// and only with the registry's matching end identifier.
    pub fn close(&mut self, end: Record) -> Result<(), AfpError> {
        if self.end.is_some() {
            return Err(AfpError::Grouping(format!(
                "cannot close an already closed record group: {}",
                display_code(self.identifier())
            )));
        }
        let defs = definitions()?;
        let expected = defs.group_end(self.begin.identifier()).ok_or_else(|| {
            AfpError::Grouping(format!(
                "no end identifier for begin record {}",
                display_code(self.begin.identifier())
            ))
        })?;
        if end.identifier() != expected {
            return Err(AfpError::Grouping(format!(
                "expected end record {} but got {}",
                display_code(expected),
                display_code(end.identifier())
            )));
        }
        self.end = Some(end);
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    pub fn begin(&self) -> &Record {
        &self.begin
    }

    pub fn end(&self) -> Option<&Record> {
        self.end.as_ref()
    }

    pub fn members(&self) -> &[GroupedRecord] {
        &self.members
    }

    /// The begin record's identifier.
    pub fn identifier(&self) -> u32 {
        self.begin.identifier()
    }

    /// Serialize begin record, members and end record. Open groups
    /// cannot be written.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), AfpError> {
        let end = self.end.as_ref().ok_or_else(|| {
            AfpError::Grouping(format!(
                "cannot write an open group: {}",
                display_code(self.identifier())
            ))
        })?;
        self.begin.write_to(out)?;
        for member in &self.members {
            member.write_to(out)?;
        }
        end.write_to(out)
    }

    /// Render begin record, members one level deeper, then the end
    /// record. Open groups cannot be rendered.
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        options: &ReadWriteOptions,
        level: usize,
    ) -> Result<(), AfpError> {
        let end = self.end.as_ref().ok_or_else(|| {
            AfpError::Grouping(format!(
                "cannot render an open group: {}",
                display_code(self.identifier())
            ))
        })?;
        self.begin.render(out, options, level)?;
        for member in &self.members {
            member.render(out, options, level + 1)?;
        }
        end.render(out, options, level)
    }
}

/// Groups a flat record stream into trees.
pub struct RecordGrouper<S> {
    source: S,
    no_group: HashSet<u32>,
}

impl<S: RecordSource> RecordGrouper<S> {
    pub fn new(source: S) -> Self {
        Self::with_no_group(source, HashSet::new())
    }

    /// `no_group` identifiers are treated as plain records even when the
    /// registry classifies them as begin or end codes.
    pub fn with_no_group(source: S, no_group: HashSet<u32>) -> Self {
        RecordGrouper { source, no_group }
    }

    /// The next standalone record or completed group tree; `None` at a
    /// clean end of the source.
    pub fn next_grouped(&mut self) -> Result<Option<GroupedRecord>, AfpError> {
        let defs = definitions()?;
        let mut open: Vec<RecordGroup> = Vec::new();
        let mut expect: Vec<u32> = Vec::new();

        loop {
            let record = match self.source.next_record()? {
                Some(record) => record,
                None => {
                    match expect.last() {
                        None => return Ok(None),
                        Some(&waiting) => {
                            return Err(AfpError::Grouping(format!(
                                "unterminated group: no {} before end of input",
                                display_code(waiting)
                            )));
                        }
                    }
                }
            };

            let identifier = record.identifier();
            let excluded = self.no_group.contains(&identifier);
            let is_begin = !excluded && defs.is_group_begin(identifier);
            let is_end = !excluded && defs.is_group_end(identifier);
            trace!(
                "grouper: stack {} record {}",
                open.len(),
                display_code(identifier)
            );

            if !is_begin && !is_end {
                match open.last_mut() {
                    None => return Ok(Some(GroupedRecord::Record(record))),
                    Some(group) => {
                        group.add_member(GroupedRecord::Record(record));
                        continue;
                    }
                }
            }

            if is_begin {
                debug!("group begin: {}", display_code(identifier));
                let expected_end = defs.group_end(identifier).ok_or_else(|| {
                    AfpError::Grouping(format!(
                        "no end identifier for begin record {}",
                        display_code(identifier)
                    ))
                })?;
                open.push(RecordGroup::new(record)?);
                expect.push(expected_end);
                continue;
            }

            debug!("group end: {}", display_code(identifier));
            let expected = match expect.pop() {
                Some(code) => code,
                None => {
                    return Err(AfpError::Grouping(format!(
                        "group end before begin: {}",
                        display_code(identifier)
                    )));
                }
            };
            if expected != identifier {
                return Err(AfpError::Grouping(format!(
                    "expected end record {} but got {}",
                    display_code(expected),
                    display_code(identifier)
                )));
            }

            let Some(mut group) = open.pop() else {
                return Err(AfpError::Grouping(format!(
                    "group end before begin: {}",
                    display_code(identifier)
                )));
            };
            group.close(record)?;
            match open.last_mut() {
                None => return Ok(Some(GroupedRecord::Group(group))),
                Some(parent) => parent.add_member(GroupedRecord::Group(group)),
            }
        }
    }
}

/// Abbreviation when the registry knows the code, hex otherwise. For
/// error and log messages only.
fn display_code(code: u32) -> String {
    match definitions().ok().and_then(|d| d.abbreviation(code)) {
        Some(abbrev) => abbrev.to_string(),
        None => hex_pad(code.into(), 6),
    }
}
