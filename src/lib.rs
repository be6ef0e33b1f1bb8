//! amf3-rs: AMF3 serializer for Flash remoting and RTMP payloads
//!
//! This library turns in-memory values into AMF3 wire bytes:
//! - Integer/double selection with U29 variable-length integers
//! - String, object and traits reference tables per message
//! - Sealed and dynamic objects, with class names from a type registry
//! - Mixed dense/associative arrays, dates, byte arrays and XML
//!
//! # Example
//!
//! ```
//! use amf3_rs::{AmfObject, AmfValue, Amf3Encoder};
//!
//! let user = AmfValue::object(
//!     AmfObject::typed("com.example.User")
//!         .with("id", 42)
//!         .with("name", "ann"),
//! );
//!
//! let mut encoder = Amf3Encoder::new();
//! encoder.encode(&user)?;
//! encoder.encode(&user)?; // written as a back-reference
//! let body = encoder.finish();
//! assert_eq!(&body[body.len() - 2..], &[0x0A, 0x00]);
//! # Ok::<(), amf3_rs::AmfError>(())
//! ```

pub mod amf;
pub mod config;
pub mod error;
pub mod registry;
pub mod session;
pub mod stats;

use std::io::Write;

// Re-export main types for convenience
pub use amf::{Amf3Encoder, AmfArray, AmfDate, AmfObject, AmfValue, Serializable};
pub use config::EncoderConfig;
pub use error::{AmfError, Error, Result};
pub use registry::{ClassRegistry, Resource, TypeRegistry};
pub use session::SerializationSession;
pub use stats::EncodeStats;

/// Encode values as one AMF3 message and write them to `writer`
///
/// Nothing is written when encoding fails. Returns the number of bytes
/// written.
pub fn encode_to_writer<W: Write>(values: &[AmfValue], mut writer: W) -> Result<usize> {
    let body = amf::encode_all(values)?;
    writer.write_all(&body)?;
    Ok(body.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_to_writer() {
        let mut out: Vec<u8> = Vec::new();
        let written = encode_to_writer(&[AmfValue::from(5), AmfValue::from("x")], &mut out).unwrap();
        assert_eq!(written, 5);
        assert_eq!(out, vec![0x04, 0x05, 0x06, 0x03, b'x']);
    }

    #[test]
    fn test_encode_to_writer_failure_writes_nothing() {
        #[derive(Debug)]
        struct Pipe;
        impl Resource for Pipe {
            fn resource_type(&self) -> &str {
                "pipe"
            }
        }

        let mut out: Vec<u8> = Vec::new();
        let err = encode_to_writer(&[AmfValue::from(1), AmfValue::resource(Pipe)], &mut out).unwrap_err();
        assert!(matches!(err, Error::Amf(AmfError::UnsupportedType(_))));
        assert!(out.is_empty());
    }
}
