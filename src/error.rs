use thiserror::Error;

use crate::de::KeyPath;
use crate::tag::TypeIdentifier;

/// Error type for every fallible operation in this crate.
///
/// Structural variants carry the byte offset at which the problem was found,
/// relative to the start of the outermost buffer being parsed. Conversion
/// variants carry the key path inside the document.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    /// The 4 byte length prefix of a document disagrees with the bytes
    /// available, is smaller than an empty document, or the document is not
    /// terminated by `0x00`.
    #[error("invalid document length at offset {offset}: declared {declared}, available {available}")]
    InvalidDocumentLength {
        offset: usize,
        declared: i64,
        available: usize,
    },

    /// A fixed size payload is truncated.
    #[error("{type_identifier} at offset {offset} needs {expected} bytes, found {found}")]
    InvalidElementSize {
        offset: usize,
        type_identifier: TypeIdentifier,
        expected: usize,
        found: usize,
    },

    /// A variable length payload is malformed: missing terminator, invalid
    /// UTF-8, negative length, out of range boolean.
    #[error("malformed element contents at offset {offset}: {reason}")]
    InvalidElementContents { offset: usize, reason: &'static str },

    /// Two length fields of the same element contradict each other.
    #[error("contradictory lengths at offset {offset}: {reason}")]
    ParseError { offset: usize, reason: &'static str },

    /// The type identifier byte is not part of BSON.
    #[error("unknown type identifier 0x{tag:02x} at offset {offset}")]
    UnknownType { offset: usize, tag: u8 },

    /// The operation is not supported for this value, for instance decoding
    /// one of the deprecated element types.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// Keys are C strings and cannot hold a `0x00` byte.
    #[error("invalid key {0:?}: keys cannot contain a NUL byte")]
    InvalidKey(String),

    /// Regular expression patterns and options are C strings as well.
    #[error("{0:?} cannot be written as a C string: it contains a NUL byte")]
    InvalidCString(String),

    /// The key, or the value under it, is absent.
    #[error("no value found at `{path}`")]
    ValueNotFound { path: KeyPath },

    /// A value is present but no decoding strategy allows turning it into
    /// the requested type, or the conversion would lose range.
    #[error("cannot convert {from} at `{path}` into {to}")]
    TypeConversion {
        path: KeyPath,
        from: TypeIdentifier,
        to: &'static str,
    },

    #[error("invalid object id {0:?}: expected 24 hex characters")]
    InvalidObjectId(String),

    /// An unsigned integer above `i64::MAX` cannot be stored as Int64.
    #[error("unsigned value {0} does not fit in Int64")]
    UnsignedOverflow(u64),

    /// Raised by hand written `Deserialize` impls.
    #[error("{0}")]
    Custom(String),
}

/// Result type returned by this crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    pub fn unknown_variant(variant: &str) -> Self {
        Error::Custom(format!("unknown variant `{}`", variant))
    }

    pub fn missing_element(index: usize) -> Self {
        Error::Custom(format!("missing element {}", index))
    }

    pub fn invalid_map_key(key: &str) -> Self {
        Error::Custom(format!("invalid map key `{}`", key))
    }

    /// Byte offset of a structural error, if this is one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::InvalidDocumentLength { offset, .. }
            | Error::InvalidElementSize { offset, .. }
            | Error::InvalidElementContents { offset, .. }
            | Error::ParseError { offset, .. }
            | Error::UnknownType { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Moves the offset of a structural error by `base`, used when a nested
    /// buffer was parsed on its own.
    pub(crate) fn shifted(self, base: usize) -> Self {
        match self {
            Error::InvalidDocumentLength {
                offset,
                declared,
                available,
            } => Error::InvalidDocumentLength {
                offset: offset + base,
                declared,
                available,
            },
            Error::InvalidElementSize {
                offset,
                type_identifier,
                expected,
                found,
            } => Error::InvalidElementSize {
                offset: offset + base,
                type_identifier,
                expected,
                found,
            },
            Error::InvalidElementContents { offset, reason } => Error::InvalidElementContents {
                offset: offset + base,
                reason,
            },
            Error::ParseError { offset, reason } => Error::ParseError {
                offset: offset + base,
                reason,
            },
            Error::UnknownType { offset, tag } => Error::UnknownType {
                offset: offset + base,
                tag,
            },
            other => other,
        }
    }
}
