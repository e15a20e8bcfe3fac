//! Reading records from a byte stream.

use std::io::{self, Read};

use crate::error::AfpError;
use crate::options::ReadWriteOptions;
use crate::record::{GenericRecord, Record};
use crate::specific;

/// A source of structured-field records. `Ok(None)` signals a clean
/// end of sequence.
pub trait RecordSource {
    fn next_record(&mut self) -> Result<Option<Record>, AfpError>;
}

/// Reads records from a byte source, consuming the CR-LF record
/// delimiters some transports add and promoting records to their
/// specific types per the options.
pub struct AfpReader<R: Read> {
    input: PushbackReader<R>,
    options: ReadWriteOptions,
}

impl<R: Read> AfpReader<R> {
    pub fn new(input: R) -> Self {
        Self::with_options(input, ReadWriteOptions::default())
    }

    pub fn with_options(input: R, options: ReadWriteOptions) -> Self {
        AfpReader {
            input: PushbackReader::new(input),
            options,
        }
    }

    /// The next record, or `None` at end of input.
    pub fn read_record(&mut self) -> Result<Option<Record>, AfpError> {
        let mut record = match GenericRecord::read_from(&mut self.input)? {
            Some(record) => record,
            None => return Ok(None),
        };
        if self.consume_crlf()? {
            record.set_ends_in_crlf(true);
        }
        if !self.options.is_convert_specific(record.identifier()) {
            return Ok(Some(Record::Generic(record)));
        }
        specific::promote_record(record).map(Some)
    }

    fn consume_crlf(&mut self) -> Result<bool, AfpError> {
        let first = match self.input.read_byte()? {
            Some(byte) => byte,
            None => return Ok(false),
        };
        if first != b'\r' {
            self.input.unread(first);
            return Ok(false);
        }
        match self.input.read_byte()? {
            Some(b'\n') => Ok(true),
            Some(other) => {
                self.input.unread(other);
                self.input.unread(first);
                Ok(false)
            }
            None => {
                self.input.unread(first);
                Ok(false)
            }
        }
    }
}

impl<R: Read> RecordSource for AfpReader<R> {
    fn next_record(&mut self) -> Result<Option<Record>, AfpError> {
        self.read_record()
    }
}

/// Minimal pushback wrapper; two bytes of lookahead cover CR-LF
/// detection.
struct PushbackReader<R> {
    inner: R,
    pushback: Vec<u8>,
}

impl<R: Read> PushbackReader<R> {
    fn new(inner: R) -> Self {
        PushbackReader {
            inner,
            pushback: Vec::with_capacity(2),
        }
    }

    fn unread(&mut self, byte: u8) {
        self.pushback.push(byte);
    }

    fn read_byte(&mut self) -> Result<Option<u8>, AfpError> {
        if let Some(byte) = self.pushback.pop() {
            return Ok(Some(byte));
        }
        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

impl<R: Read> Read for PushbackReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if let Some(byte) = self.pushback.pop() {
            buf[0] = byte;
            return Ok(1);
        }
        self.inner.read(buf)
    }
}
