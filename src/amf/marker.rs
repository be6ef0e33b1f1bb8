//! AMF3 wire markers and trait encodings
//!
//! Type Markers written by the serializer:
//! ```text
//! 0x01 - Null
//! 0x02 - False
//! 0x03 - True
//! 0x04 - Integer (U29, 29-bit signed)
//! 0x05 - Double (IEEE 754, big-endian)
//! 0x06 - String (U29 length/reference + UTF-8)
//! 0x08 - Date (U29 reference or literal + double)
//! 0x09 - Array (dense count, associative pairs, dense values)
//! 0x0A - Object (traits + sealed values + dynamic pairs)
//! 0x0B - XML (U29 length/reference + text)
//! 0x0C - ByteArray (U29 length/reference + raw bytes)
//! ```
//!
//! Undefined (0x00), the legacy XMLDocument (0x07) and the vector and
//! dictionary markers (0x0D-0x11) are never produced.

use std::fmt;

use crate::error::AmfError;

pub const MARKER_NULL: u8 = 0x01;
pub const MARKER_FALSE: u8 = 0x02;
pub const MARKER_TRUE: u8 = 0x03;
pub const MARKER_INTEGER: u8 = 0x04;
pub const MARKER_DOUBLE: u8 = 0x05;
pub const MARKER_STRING: u8 = 0x06;
pub const MARKER_DATE: u8 = 0x08;
pub const MARKER_ARRAY: u8 = 0x09;
pub const MARKER_OBJECT: u8 = 0x0A;
pub const MARKER_XML: u8 = 0x0B;
pub const MARKER_BYTE_ARRAY: u8 = 0x0C;

/// Smallest value encodable with the Integer marker (-2^28)
pub const INTEGER_MIN: i64 = -268_435_456;
/// Largest value encodable with the Integer marker (2^28 - 1)
pub const INTEGER_MAX: i64 = 268_435_455;

/// Low bits of an inline-traits object header (inline object, inline traits)
pub(crate) const OBJECT_INLINE_TRAITS: u32 = 0x03;

/// Value kind selected by the dispatcher, one per wire marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Null,
    False,
    True,
    Integer,
    Double,
    String,
    Date,
    Array,
    Object,
    Xml,
    ByteArray,
}

impl Marker {
    /// Wire byte for this marker
    pub fn as_u8(self) -> u8 {
        match self {
            Marker::Null => MARKER_NULL,
            Marker::False => MARKER_FALSE,
            Marker::True => MARKER_TRUE,
            Marker::Integer => MARKER_INTEGER,
            Marker::Double => MARKER_DOUBLE,
            Marker::String => MARKER_STRING,
            Marker::Date => MARKER_DATE,
            Marker::Array => MARKER_ARRAY,
            Marker::Object => MARKER_OBJECT,
            Marker::Xml => MARKER_XML,
            Marker::ByteArray => MARKER_BYTE_ARRAY,
        }
    }
}

impl TryFrom<u8> for Marker {
    type Error = AmfError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            MARKER_NULL => Ok(Marker::Null),
            MARKER_FALSE => Ok(Marker::False),
            MARKER_TRUE => Ok(Marker::True),
            MARKER_INTEGER => Ok(Marker::Integer),
            MARKER_DOUBLE => Ok(Marker::Double),
            MARKER_STRING => Ok(Marker::String),
            MARKER_DATE => Ok(Marker::Date),
            MARKER_ARRAY => Ok(Marker::Array),
            MARKER_OBJECT => Ok(Marker::Object),
            MARKER_XML => Ok(Marker::Xml),
            MARKER_BYTE_ARRAY => Ok(Marker::ByteArray),
            other => Err(AmfError::UnknownMarker(other)),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Marker::Null => "null",
            Marker::False => "false",
            Marker::True => "true",
            Marker::Integer => "integer",
            Marker::Double => "double",
            Marker::String => "string",
            Marker::Date => "date",
            Marker::Array => "array",
            Marker::Object => "object",
            Marker::Xml => "xml",
            Marker::ByteArray => "bytearray",
        };
        f.write_str(name)
    }
}

/// How an object's members are laid out after its traits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraitEncoding {
    /// Sealed members only
    PropList,
    /// Custom serialization owned by the class (not supported)
    External,
    /// Sealed members followed by name/value pairs ending in ""
    Dynamic,
}

impl TraitEncoding {
    /// Two-bit encoding value placed at bit 2 of the traits header
    pub fn bits(self) -> u32 {
        match self {
            TraitEncoding::PropList => 0x00,
            TraitEncoding::External => 0x01,
            TraitEncoding::Dynamic => 0x02,
        }
    }
}

impl fmt::Display for TraitEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraitEncoding::PropList => "proplist",
            TraitEncoding::External => "external",
            TraitEncoding::Dynamic => "dynamic",
        };
        f.write_str(name)
    }
}
