//! Unified error types for amf3-rs

use std::fmt;
use std::io;

use crate::amf::marker::TraitEncoding;

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for all crate operations
#[derive(Debug)]
pub enum Error {
    /// I/O error while flushing encoded bytes
    Io(io::Error),
    /// AMF encoding error
    Amf(AmfError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Amf(e) => write!(f, "AMF error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Amf(e) => Some(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<AmfError> for Error {
    fn from(err: AmfError) -> Self {
        Error::Amf(err)
    }
}

/// AMF3 encoding errors
///
/// Every variant is fatal to the serialization session that produced it.
/// Bytes already written to the sink are partial and must be discarded.
#[derive(Debug)]
pub enum AmfError {
    /// Value kind cannot be represented (or not under the requested marker)
    UnsupportedType(String),
    /// Explicit marker outside the writable AMF3 marker set
    UnknownMarker(u8),
    /// Object trait encoding the serializer cannot produce
    UnsupportedEncoding(TraitEncoding),
    /// Value given for a byte-array marker is neither bytes nor a string
    InvalidByteArray,
    /// Value given for an XML marker is not XML, or the tree failed to serialize
    InvalidXml(String),
    /// Failure while writing the fields of an object
    Encode {
        class_name: String,
        source: Box<AmfError>,
    },
    /// Value graph nested deeper than the configured limit
    NestingTooDeep,
}

impl fmt::Display for AmfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmfError::UnsupportedType(t) => write!(f, "Unsupported data type: {}", t),
            AmfError::UnknownMarker(m) => write!(f, "Unknown AMF3 marker: 0x{:02x}", m),
            AmfError::UnsupportedEncoding(e) => {
                write!(f, "Object encoding not implemented: {}", e)
            }
            AmfError::InvalidByteArray => {
                write!(f, "Invalid ByteArray: must be a byte array or a string")
            }
            AmfError::InvalidXml(reason) => write!(f, "Invalid XML: {}", reason),
            AmfError::Encode { class_name, source } => {
                if class_name.is_empty() {
                    write!(f, "Unable to write object: {}", source)
                } else {
                    write!(f, "Unable to write object {}: {}", class_name, source)
                }
            }
            AmfError::NestingTooDeep => write!(f, "AMF nesting too deep"),
        }
    }
}

impl std::error::Error for AmfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AmfError::Encode { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
