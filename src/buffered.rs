//! A record source with a bounded look-back buffer and unget.

use std::collections::VecDeque;

use crate::error::AfpError;
use crate::reader::RecordSource;
use crate::record::Record;

/// Wraps a record source with a get-history of the last `capacity`
/// records; [`unget`](BufferedSource::unget) pushes the most recent one
/// back to the front of the read order.
pub struct BufferedSource<S> {
    source: S,
    history: VecDeque<Record>,
    unget: VecDeque<Record>,
    capacity: usize,
}

impl<S: RecordSource> BufferedSource<S> {
    /// `capacity` bounds the history, and with it the number of times
    /// `unget` can be called in a row.
    pub fn new(source: S, capacity: usize) -> Self {
        BufferedSource {
            source,
            history: VecDeque::with_capacity(capacity),
            unget: VecDeque::new(),
            capacity,
        }
    }

    /// Move the most recent history entry to the front of the unget
    /// buffer.
    pub fn unget(&mut self) -> Result<(), AfpError> {
        let record = self.history.pop_front().ok_or(AfpError::UngetUnderflow)?;
        self.unget.push_front(record);
        Ok(())
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn unget_len(&self) -> usize {
        self.unget.len()
    }
}

impl<S: RecordSource> RecordSource for BufferedSource<S> {
    fn next_record(&mut self) -> Result<Option<Record>, AfpError> {
        let record = match self.unget.pop_front() {
            Some(record) => Some(record),
            None => self.source.next_record()?,
        };
        match record {
            Some(record) => {
                self.history.push_front(record.clone());
                self.history.truncate(self.capacity);
                Ok(Some(record))
            }
            None => {
                self.history.clear();
                self.unget.clear();
                Ok(None)
            }
        }
    }
}
