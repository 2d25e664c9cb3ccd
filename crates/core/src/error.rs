//! Error types for the PCL XL ingestion core.
//!
//! Job-data errors are values; internal defects (foreign attribute handles,
//! state stack overflow) panic instead of producing a `PxlError`.

use crate::interp::operator::Operator;
use crate::interp::sequence::ParserState;
use crate::model::datatype::DataType;
use crate::model::version::ProtocolVersion;
use thiserror::Error;

/// Primary error type for PCL XL parsing and validation.
#[derive(Error, Debug)]
pub enum PxlError {
    #[error("missing attribute: {attribute}")]
    MissingAttribute { attribute: &'static str },

    #[error("illegal data type {data_type} for attribute {attribute}")]
    IllegalAttributeDataType {
        attribute: &'static str,
        data_type: DataType,
    },

    #[error("excess attributes: {matched} of {present} recognized")]
    ExcessAttributes { matched: usize, present: usize },

    #[error("illegal operator tag {tag:#04x}{}", version_note(.required, .declared))]
    IllegalOperatorTag {
        tag: u8,
        declared: ProtocolVersion,
        required: Option<ProtocolVersion>,
    },

    #[error("illegal operator sequence: {operator} in state {state}")]
    IllegalOperatorSequence {
        operator: Operator,
        state: ParserState,
    },

    #[error("illegal attribute {attribute} for {declared}")]
    IllegalAttribute {
        attribute: &'static str,
        declared: ProtocolVersion,
    },

    #[error("illegal value for attribute {attribute}: {msg}")]
    IllegalAttributeValue { attribute: &'static str, msg: String },

    #[error("attribute {attribute} of type {data_type} cannot be read as {target}")]
    AttributeConversion {
        attribute: &'static str,
        data_type: DataType,
        target: &'static str,
    },

    #[error("unexpected end of input at position {pos}")]
    UnexpectedEof { pos: usize },

    #[error("illegal tag {tag:#04x} at position {pos}")]
    IllegalTag { tag: u8, pos: usize },

    #[error("illegal stream header: {0}")]
    IllegalStreamHeader(String),

    #[error("unsupported binding {0:?}")]
    UnsupportedBinding(char),

    #[error("stream ended with open scope: {state}")]
    UnclosedScope { state: ParserState },

    #[error("too many attributes at position {pos}")]
    TooManyAttributes { pos: usize },

    #[error("illegal array size {size} at position {pos}")]
    IllegalArraySize { size: u64, pos: usize },

    #[error("{operator} requires embedded data")]
    MissingData { operator: Operator },

    #[error("{operator} does not take embedded data")]
    UnexpectedData { operator: Operator },

    #[error("embedded data of {size} bytes exceeds limit of {limit}")]
    EmbeddedDataTooLarge { size: u64, limit: usize },

    #[error("embedded data length {actual} does not match declared {declared}")]
    DataLengthMismatch { declared: u64, actual: usize },

    #[error("stream undefined: {0}")]
    StreamUndefined(String),

    #[error("stream nesting exceeds {0} levels")]
    StreamNestingTooDeep(usize),

    #[error("font undefined: {0}")]
    FontUndefined(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn version_note(required: &Option<ProtocolVersion>, declared: &ProtocolVersion) -> String {
    match required {
        Some(required) => format!(" (requires {required}, stream is {declared})"),
        None => String::new(),
    }
}

/// Flat classification of [`PxlError`] variants.
///
/// The first five kinds are the validation failures of the attribute and
/// operator engine; the rest come from the scanner and operator handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingAttribute,
    IllegalAttributeDataType,
    ExcessAttributes,
    IllegalOperatorTag,
    IllegalOperatorSequence,
    IllegalAttribute,
    IllegalAttributeValue,
    Stream,
    Data,
    Resource,
    Io,
}

impl PxlError {
    /// Classify this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingAttribute { .. } => ErrorKind::MissingAttribute,
            Self::IllegalAttributeDataType { .. } | Self::AttributeConversion { .. } => {
                ErrorKind::IllegalAttributeDataType
            }
            Self::ExcessAttributes { .. } => ErrorKind::ExcessAttributes,
            Self::IllegalOperatorTag { .. } => ErrorKind::IllegalOperatorTag,
            Self::IllegalOperatorSequence { .. } => ErrorKind::IllegalOperatorSequence,
            Self::IllegalAttribute { .. } => ErrorKind::IllegalAttribute,
            Self::IllegalAttributeValue { .. } => ErrorKind::IllegalAttributeValue,
            Self::UnexpectedEof { .. }
            | Self::IllegalTag { .. }
            | Self::IllegalStreamHeader(_)
            | Self::UnsupportedBinding(_)
            | Self::UnclosedScope { .. }
            | Self::TooManyAttributes { .. }
            | Self::IllegalArraySize { .. } => ErrorKind::Stream,
            Self::MissingData { .. }
            | Self::UnexpectedData { .. }
            | Self::EmbeddedDataTooLarge { .. }
            | Self::DataLengthMismatch { .. } => ErrorKind::Data,
            Self::StreamUndefined(_) | Self::StreamNestingTooDeep(_) | Self::FontUndefined(_) => {
                ErrorKind::Resource
            }
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Convenience Result type alias for PxlError.
pub type Result<T> = std::result::Result<T, PxlError>;
