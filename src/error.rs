//! Error type shared by the codecs, registries, grouper and record sources.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AfpError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    /// Bad carriage-control marker, or the stream ended inside a record.
    #[error("framing: {0}")]
    Framing(String),
    /// A field value does not fit its wire width.
    #[error("{field} value 0x{value:X} exceeds the maximum 0x{max:X}")]
    FieldTooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },
    #[error("structured field definitions: {0}")]
    Registry(String),
    #[error("grouping: {0}")]
    Grouping(String),
    #[error("triplet: {0}")]
    TripletFormat(String),
    #[error("OID syntax: {0}")]
    OidSyntax(String),
    /// A specific-type constructor was handed a record or triplet of the
    /// wrong code.
    #[error("promotion: {0}")]
    Promotion(String),
    #[error("cannot unget: the get-history buffer is empty")]
    UngetUnderflow,
}
