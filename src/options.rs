//! Read/write options, passed explicitly through decode and render calls.

use std::collections::HashSet;

/// Which record identifiers are promoted to their specific types on read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConvertSpecific {
    #[default]
    All,
    None,
    Only(HashSet<u32>),
}

/// Options for reading and rendering records. An immutable value; the
/// `Default` instance is used when a caller supplies none.
#[derive(Debug, Clone)]
pub struct ReadWriteOptions {
    level_spaces: usize,
    convert: ConvertSpecific,
    digest_threshold: Option<usize>,
}

impl Default for ReadWriteOptions {
    fn default() -> Self {
        ReadWriteOptions {
            level_spaces: 2,
            convert: ConvertSpecific::All,
            digest_threshold: None,
        }
    }
}

impl ReadWriteOptions {
    pub fn with_convert(mut self, convert: ConvertSpecific) -> Self {
        self.convert = convert;
        self
    }

    /// Render an MD5 digest instead of the payload dump for records whose
    /// payload exceeds `threshold` bytes.
    pub fn with_digest_threshold(mut self, threshold: usize) -> Self {
        self.digest_threshold = Some(threshold);
        self
    }

    /// Indent width per nesting level in rendered output.
    pub fn with_level_spaces(mut self, spaces: usize) -> Self {
        self.level_spaces = spaces;
        self
    }

    pub fn digest_threshold(&self) -> Option<usize> {
        self.digest_threshold
    }

    pub fn level_spaces(&self) -> usize {
        self.level_spaces
    }

    /// Whether records of `identifier` are promoted during reading.
    pub fn is_convert_specific(&self, identifier: u32) -> bool {
        match &self.convert {
            ConvertSpecific::All => true,
            ConvertSpecific::None => false,
            ConvertSpecific::Only(identifiers) => identifiers.contains(&identifier),
        }
    }

    pub fn level_prefix(&self, level: usize) -> String {
        " ".repeat(self.level_spaces * level)
    }
}
