//! AMF (Action Message Format) implementation
//!
//! AMF is Adobe's binary serialization format used by Flash remoting and
//! RTMP for command parameters and message bodies. This module implements
//! the AMF3 serializer: values go in, wire bytes come out.
//!
//! Decoding is not provided.

pub mod amf3;
pub mod marker;
pub mod u29;
pub mod value;
pub mod xml;

pub use amf3::{encode, encode_all, Amf3Encoder};
pub use marker::{Marker, TraitEncoding};
pub use value::{AmfArray, AmfDate, AmfObject, AmfValue, ArrayKey, ByteArray, Serializable};
pub use xml::{XmlDocument, XmlElement, XmlNode};
