//! AMF3 encoder
//!
//! AMF3 is the ActionScript 3.0 serialization format, used by Flash
//! remoting bodies and by RTMP payloads behind the avmplus marker.
//! Reference: AMF3 Specification (amf3_spec_121207.pdf)
//!
//! Compared with AMF0, AMF3 shrinks repeated data with three reference
//! tables kept for the whole message: strings, composite values and
//! object traits. See [`SerializationSession`].
//!
//! ```text
//! encode(value)
//!   └─ marker byte
//!        ├─ scalars ........ U29 / double / nothing
//!        ├─ string ......... string table ─► reference | literal
//!        ├─ date/bytes/xml . object table ─► reference | literal
//!        ├─ array .......... object table (append) ─► named pairs, dense values
//!        └─ object ......... object table ─► traits table ─► sealed, dynamic
//! ```

use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};

use super::marker::{Marker, TraitEncoding, INTEGER_MAX, INTEGER_MIN, OBJECT_INLINE_TRAITS};
use super::u29;
use super::value::{AmfArray, AmfDate, AmfValue, ArrayKey, Serializable};
use crate::config::EncoderConfig;
use crate::error::AmfError;
use crate::registry::{Resource, TypeRegistry};
use crate::session::{SerializationSession, TraitDefinition};
use crate::stats::EncodeStats;

/// U29 written for the empty string and for literal dates
const LITERAL_EMPTY: i32 = 0x01;

/// AMF3 encoder
///
/// Owns the serialization session for the message being written. Call
/// [`finish`](Amf3Encoder::finish) (or [`reset`](Amf3Encoder::reset))
/// between messages; after an error the partial output and the session
/// must both be discarded.
pub struct Amf3Encoder<B = BytesMut> {
    buf: B,
    session: SerializationSession,
    registry: Option<Arc<dyn TypeRegistry>>,
    config: EncoderConfig,
    depth: usize,
}

impl Amf3Encoder<BytesMut> {
    /// Create a new encoder with default settings
    pub fn new() -> Self {
        Self::with_config(EncoderConfig::default())
    }

    /// Create an encoder with explicit settings
    pub fn with_config(config: EncoderConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(config.initial_capacity),
            session: SerializationSession::new(),
            registry: None,
            config,
            depth: 0,
        }
    }

    /// Get the encoded bytes and start a new session
    pub fn finish(&mut self) -> Bytes {
        tracing::debug!(
            bytes = self.session.stats.bytes_written,
            values = self.session.stats.values_written,
            refs = self.session.stats.total_refs(),
            "AMF3 message encoded"
        );
        self.reset();
        self.buf.split().freeze()
    }

    /// Get current encoded length
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if encoder is empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for Amf3Encoder<BytesMut> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BufMut> Amf3Encoder<B> {
    /// Create an encoder writing into a caller-supplied sink
    pub fn with_sink(sink: B) -> Self {
        Self {
            buf: sink,
            session: SerializationSession::new(),
            registry: None,
            config: EncoderConfig::default(),
            depth: 0,
        }
    }

    /// Attach a type registry for class-name mapping and resource conversion
    pub fn with_registry(mut self, registry: Arc<dyn TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Limit nesting depth (0 = unlimited)
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Session state for the message in progress
    pub fn session(&self) -> &SerializationSession {
        &self.session
    }

    /// Counters for the message in progress
    pub fn stats(&self) -> &EncodeStats {
        &self.session.stats
    }

    /// Discard the session (reference tables and counters)
    pub fn reset(&mut self) {
        self.session.reset();
        self.depth = 0;
    }

    /// Give back the sink
    pub fn into_inner(self) -> B {
        self.buf
    }

    /// Encode a single value, inferring its marker
    pub fn encode(&mut self, value: &AmfValue) -> Result<(), AmfError> {
        self.enter()?;
        let result = self.encode_inferred(value);
        self.depth -= 1;
        result
    }

    /// Encode multiple values into the same session
    pub fn encode_all(&mut self, values: &[AmfValue]) -> Result<(), AmfError> {
        for value in values {
            self.encode(value)?;
        }
        Ok(())
    }

    /// Encode a value under an explicit marker byte
    pub fn encode_as(&mut self, value: &AmfValue, marker: u8) -> Result<(), AmfError> {
        let marker = Marker::try_from(marker)?;
        self.enter()?;
        let result = self.write_marked(value, marker);
        self.depth -= 1;
        result
    }

    fn enter(&mut self) -> Result<(), AmfError> {
        if self.config.max_depth > 0 && self.depth >= self.config.max_depth {
            return Err(AmfError::NestingTooDeep);
        }
        self.depth += 1;
        Ok(())
    }

    fn encode_inferred(&mut self, value: &AmfValue) -> Result<(), AmfError> {
        let converted;
        let value = match value {
            AmfValue::Resource(resource) => {
                converted = self.convert_resource(&**resource)?;
                &converted
            }
            other => other,
        };
        let marker = infer_marker(value)?;
        self.write_marked(value, marker)
    }

    fn convert_resource(&self, resource: &dyn Resource) -> Result<AmfValue, AmfError> {
        self.registry
            .as_ref()
            .and_then(|registry| registry.convert_resource(resource))
            .ok_or_else(|| {
                AmfError::UnsupportedType(format!("resource of type {}", resource.resource_type()))
            })
    }

    fn write_marked(&mut self, value: &AmfValue, marker: Marker) -> Result<(), AmfError> {
        self.session.stats.values_written += 1;
        self.put_u8(marker.as_u8());

        match marker {
            Marker::Null | Marker::False | Marker::True => Ok(()),
            Marker::Integer => {
                let n = match value {
                    AmfValue::Integer(i) => *i,
                    AmfValue::Number(f) => *f as i64,
                    other => return Err(mismatch(other, marker)),
                };
                // Bits above 29 are dropped by the U29 layout
                self.write_u29(n as i32);
                Ok(())
            }
            Marker::Double => {
                let f = match value {
                    AmfValue::Number(f) => *f,
                    AmfValue::Integer(i) => *i as f64,
                    other => return Err(mismatch(other, marker)),
                };
                self.put_f64(f);
                Ok(())
            }
            Marker::String => match value {
                AmfValue::String(s) => {
                    self.write_string(s);
                    Ok(())
                }
                other => Err(mismatch(other, marker)),
            },
            Marker::Date => match value {
                AmfValue::Date(date) => {
                    self.write_date(value, date);
                    Ok(())
                }
                other => Err(mismatch(other, marker)),
            },
            Marker::Array => match value {
                AmfValue::Array(array) => self.write_array(value, array),
                other => Err(mismatch(other, marker)),
            },
            Marker::Object => match value {
                AmfValue::Object(obj) => self.write_object(value, &**obj),
                other => Err(mismatch(other, marker)),
            },
            Marker::ByteArray => self.write_byte_array(value),
            Marker::Xml => self.write_xml(value),
        }
    }

    /// Write a U29 integer
    pub fn write_u29(&mut self, n: i32) {
        let written = u29::write_u29(&mut self.buf, n);
        self.session.stats.bytes_written += written as u64;
    }

    /// Write a string body, as a back-reference when already written
    pub fn write_string(&mut self, s: &str) {
        if s.is_empty() {
            self.write_u29(LITERAL_EMPTY);
            return;
        }

        match self.session.strings.lookup_or_insert(s) {
            Some(index) => {
                tracing::trace!(index, "AMF3 string reference");
                self.session.stats.string_refs += 1;
                self.write_u29((index << 1) as i32);
            }
            None => self.write_binary_string(s.as_bytes()),
        }
    }

    /// Write a length-prefixed byte run without touching the string table
    ///
    /// The length shares the U29 with a flag bit, so payloads must stay
    /// below 2^28 bytes; longer ones wrap the prefix.
    fn write_binary_string(&mut self, data: &[u8]) {
        self.write_u29(literal_header(data.len()));
        self.put_slice(data);
    }

    /// Write a back-reference if this instance was already written,
    /// otherwise record it. Returns true when the reference was written.
    fn try_reference(&mut self, value: &AmfValue) -> bool {
        match self.session.objects.lookup_or_insert(value) {
            Some(index) => {
                tracing::trace!(index, kind = value.kind_name(), "AMF3 object reference");
                self.session.stats.object_refs += 1;
                self.write_u29((index << 1) as i32);
                true
            }
            None => false,
        }
    }

    fn write_date(&mut self, value: &AmfValue, date: &AmfDate) {
        if self.try_reference(value) {
            return;
        }
        self.write_u29(LITERAL_EMPTY);
        // Whole seconds; milliseconds are not carried
        self.put_f64(date.epoch_seconds() as f64);
    }

    fn write_byte_array(&mut self, value: &AmfValue) -> Result<(), AmfError> {
        if self.try_reference(value) {
            return Ok(());
        }
        match value {
            AmfValue::ByteArray(bytes) => self.write_binary_string(bytes.data()),
            AmfValue::String(s) => self.write_binary_string(s.as_bytes()),
            _ => return Err(AmfError::InvalidByteArray),
        }
        Ok(())
    }

    fn write_xml(&mut self, value: &AmfValue) -> Result<(), AmfError> {
        if self.try_reference(value) {
            return Ok(());
        }
        match value {
            AmfValue::String(s) => self.write_binary_string(s.as_bytes()),
            AmfValue::Xml(doc) => {
                let text = doc.to_xml_string()?;
                self.write_binary_string(text.as_bytes());
            }
            other => {
                return Err(AmfError::InvalidXml(format!(
                    "expected an XML document or string, got {}",
                    other.kind_name()
                )))
            }
        }
        Ok(())
    }

    fn write_array(&mut self, value: &AmfValue, array: &AmfArray) -> Result<(), AmfError> {
        // Arrays take a reference slot but are never looked up
        self.session.objects.append(value);

        let mut dense = Vec::new();
        let mut named = Vec::new();
        for (key, item) in array.entries() {
            match key {
                ArrayKey::Index(_) => dense.push(item),
                ArrayKey::Name(name) => named.push((name.as_str(), item)),
            }
        }

        self.write_u29(((dense.len() << 1) | 1) as i32);

        // Associative part first, closed by the empty string
        for (name, item) in named {
            self.write_string(name);
            self.encode(item)?;
        }
        self.write_string("");

        for item in dense {
            self.encode(item)?;
        }
        Ok(())
    }

    fn write_object(&mut self, value: &AmfValue, obj: &dyn Serializable) -> Result<(), AmfError> {
        if self.try_reference(value) {
            return Ok(());
        }

        let class_name = self.resolve_class_name(obj);
        let fields = obj.fields();

        let definition = match self.session.traits.get(&class_name) {
            Some(definition) => {
                let definition = definition.clone();
                self.session.stats.trait_refs += 1;
                self.write_u29(((definition.id << 2) | 1) as i32);
                definition
            }
            None => {
                let encoding = if obj.is_externalizable() {
                    TraitEncoding::External
                } else if class_name.is_empty() {
                    TraitEncoding::Dynamic
                } else {
                    TraitEncoding::PropList
                };
                let property_names = match encoding {
                    TraitEncoding::PropList => fields
                        .iter()
                        .map(|(name, _)| name)
                        .filter(|name| !is_private(name))
                        .cloned()
                        .collect(),
                    _ => Vec::new(),
                };
                let definition = self
                    .session
                    .traits
                    .define(&class_name, encoding, property_names)
                    .clone();
                self.write_traits(&class_name, &definition);
                definition
            }
        };

        self.write_members(&class_name, &definition, &fields)
            .map_err(|e| AmfError::Encode {
                class_name,
                source: Box::new(e),
            })
    }

    fn resolve_class_name(&self, obj: &dyn Serializable) -> String {
        let mapped = self
            .registry
            .as_ref()
            .and_then(|registry| registry.resolve_wire_class_name(obj.runtime_type()))
            .filter(|name| !name.is_empty());

        if let Some(name) = mapped {
            name
        } else if let Some(name) = obj.explicit_type() {
            name
        } else if let Some(name) = obj.class_name() {
            name
        } else if obj.is_anonymous() {
            String::new()
        } else {
            obj.runtime_type().to_string()
        }
    }

    fn write_traits(&mut self, class_name: &str, definition: &TraitDefinition) {
        let count = definition.property_names.len() as u32;
        let header = OBJECT_INLINE_TRAITS | (definition.encoding.bits() << 2) | (count << 4);

        tracing::debug!(
            class = class_name,
            id = definition.id,
            encoding = %definition.encoding,
            properties = count,
            "AMF3 traits defined"
        );
        self.session.stats.traits_defined += 1;

        self.write_u29(header as i32);
        self.write_string(class_name);
        for name in &definition.property_names {
            self.write_string(name);
        }
    }

    fn write_members(
        &mut self,
        class_name: &str,
        definition: &TraitDefinition,
        fields: &[(String, AmfValue)],
    ) -> Result<(), AmfError> {
        if definition.encoding == TraitEncoding::External {
            return Err(AmfError::UnsupportedEncoding(TraitEncoding::External));
        }

        // Sealed values follow the cached name list, not this object's fields
        for name in &definition.property_names {
            match fields.iter().find(|(field, _)| field == name) {
                Some((_, item)) => self.encode(item)?,
                None => {
                    tracing::warn!(
                        class = class_name,
                        property = name.as_str(),
                        "Sealed property missing, writing null"
                    );
                    self.encode(&AmfValue::Null)?;
                }
            }
        }

        if definition.encoding == TraitEncoding::Dynamic {
            for (name, item) in fields {
                if is_private(name) || definition.property_names.contains(name) {
                    continue;
                }
                self.write_string(name);
                self.encode(item)?;
            }
            self.write_string("");
        }
        Ok(())
    }

    fn put_u8(&mut self, byte: u8) {
        self.buf.put_u8(byte);
        self.session.stats.bytes_written += 1;
    }

    fn put_f64(&mut self, n: f64) {
        self.buf.put_f64(n);
        self.session.stats.bytes_written += 8;
    }

    fn put_slice(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
        self.session.stats.bytes_written += data.len() as u64;
    }
}

/// Pick the marker for a value from its kind
fn infer_marker(value: &AmfValue) -> Result<Marker, AmfError> {
    let marker = match value {
        AmfValue::Null => Marker::Null,
        AmfValue::Boolean(false) => Marker::False,
        AmfValue::Boolean(true) => Marker::True,
        AmfValue::Integer(i) if (INTEGER_MIN..=INTEGER_MAX).contains(i) => Marker::Integer,
        AmfValue::Integer(_) | AmfValue::Number(_) => Marker::Double,
        AmfValue::String(_) => Marker::String,
        AmfValue::Date(_) => Marker::Date,
        AmfValue::Array(_) => Marker::Array,
        AmfValue::Object(_) => Marker::Object,
        AmfValue::ByteArray(_) => Marker::ByteArray,
        AmfValue::Xml(_) => Marker::Xml,
        AmfValue::Resource(resource) => {
            return Err(AmfError::UnsupportedType(format!(
                "resource of type {}",
                resource.resource_type()
            )))
        }
    };
    Ok(marker)
}

/// U29 prefix of a literal body: byte length shifted over the inline flag
fn literal_header(len: usize) -> i32 {
    debug_assert!(
        len <= INTEGER_MAX as usize,
        "AMF3 payload of {} bytes exceeds the U29 length limit",
        len
    );
    ((len << 1) | 1) as i32
}

fn mismatch(value: &AmfValue, marker: Marker) -> AmfError {
    AmfError::UnsupportedType(format!("{} under {} marker", value.kind_name(), marker))
}

/// Underscore-prefixed fields are private and never serialized
fn is_private(name: &str) -> bool {
    name.starts_with('_')
}

/// Convenience function to encode a single value
pub fn encode(value: &AmfValue) -> Result<Bytes, AmfError> {
    let mut encoder = Amf3Encoder::new();
    encoder.encode(value)?;
    Ok(encoder.finish())
}

/// Convenience function to encode multiple values in one session
pub fn encode_all(values: &[AmfValue]) -> Result<Bytes, AmfError> {
    let mut encoder = Amf3Encoder::new();
    encoder.encode_all(values)?;
    Ok(encoder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amf::u29::tests::read_u29;
    use crate::amf::value::{AmfObject, ByteArray};
    use crate::amf::xml::{XmlDocument, XmlElement};
    use crate::registry::ClassRegistry;

    fn double(marker: u8, n: f64) -> Vec<u8> {
        let mut out = vec![marker];
        out.extend_from_slice(&n.to_be_bytes());
        out
    }

    #[derive(Debug)]
    struct User {
        id: i64,
        name: &'static str,
        secret: &'static str,
    }

    impl Serializable for User {
        fn fields(&self) -> Vec<(String, AmfValue)> {
            vec![
                ("id".into(), self.id.into()),
                ("name".into(), self.name.into()),
                ("_secret".into(), self.secret.into()),
            ]
        }
    }

    #[derive(Debug)]
    struct Named;

    impl Serializable for Named {
        fn fields(&self) -> Vec<(String, AmfValue)> {
            Vec::new()
        }

        fn class_name(&self) -> Option<String> {
            Some("flex.messaging.Ack".into())
        }
    }

    #[derive(Debug)]
    struct Custom;

    impl Serializable for Custom {
        fn fields(&self) -> Vec<(String, AmfValue)> {
            Vec::new()
        }

        fn is_externalizable(&self) -> bool {
            true
        }

        fn class_name(&self) -> Option<String> {
            Some("flex.messaging.io.ArrayCollection".into())
        }
    }

    #[derive(Debug)]
    struct Socket;

    impl Resource for Socket {
        fn resource_type(&self) -> &str {
            "socket"
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(&encode(&AmfValue::Null).unwrap()[..], &[0x01]);
        assert_eq!(&encode(&false.into()).unwrap()[..], &[0x02]);
        assert_eq!(&encode(&true.into()).unwrap()[..], &[0x03]);
        assert_eq!(&encode(&1.5.into()).unwrap()[..], &double(0x05, 1.5)[..]);
    }

    #[test]
    fn test_integer_selection() {
        assert_eq!(&encode(&5.into()).unwrap()[..], &[0x04, 0x05]);
        assert_eq!(&encode(&200.into()).unwrap()[..], &[0x04, 0x81, 0x48]);

        let bytes = encode(&AmfValue::Integer(INTEGER_MAX)).unwrap();
        assert_eq!(bytes[0], 0x04);
        assert_eq!(read_u29(&bytes[1..]), (INTEGER_MAX as i32, 4));

        let bytes = encode(&AmfValue::Integer(INTEGER_MIN)).unwrap();
        assert_eq!(bytes[0], 0x04);
        assert_eq!(read_u29(&bytes[1..]), (INTEGER_MIN as i32, 4));

        let over = INTEGER_MAX + 1;
        assert_eq!(
            &encode(&AmfValue::Integer(over)).unwrap()[..],
            &double(0x05, over as f64)[..]
        );
        let under = INTEGER_MIN - 1;
        assert_eq!(
            &encode(&AmfValue::Integer(under)).unwrap()[..],
            &double(0x05, under as f64)[..]
        );
    }

    #[test]
    fn test_string_dedup() {
        let bytes = encode_all(&[AmfValue::from("hello"), AmfValue::from("hello")]).unwrap();
        assert_eq!(
            &bytes[..],
            &[0x06, 0x0B, b'h', b'e', b'l', b'l', b'o', 0x06, 0x00]
        );
    }

    #[test]
    fn test_empty_string_never_referenced() {
        let bytes = encode_all(&[AmfValue::from(""), AmfValue::from(""), AmfValue::from("")]).unwrap();
        assert_eq!(&bytes[..], &[0x06, 0x01, 0x06, 0x01, 0x06, 0x01]);
    }

    #[test]
    fn test_string_length_is_byte_length() {
        let bytes = encode(&"é".into()).unwrap();
        assert_eq!(&bytes[..], &[0x06, 0x05, 0xC3, 0xA9]);
    }

    #[test]
    fn test_generic_object_is_dynamic() {
        let obj = AmfValue::object(AmfObject::new().with("a", 1).with("b", "x"));
        let bytes = encode(&obj).unwrap();
        assert_eq!(
            &bytes[..],
            &[
                0x0A, 0x0B, 0x01, // dynamic traits, 0 sealed, class ""
                0x03, b'a', 0x04, 0x01, // a -> 1
                0x03, b'b', 0x06, 0x03, b'x', // b -> "x"
                0x01, // end of dynamic members
            ]
        );
    }

    #[test]
    fn test_same_instance_is_back_referenced() {
        let obj = AmfValue::object(AmfObject::new().with("a", 1));
        let bytes = encode_all(&[obj.clone(), obj]).unwrap();
        assert_eq!(
            &bytes[..],
            &[0x0A, 0x0B, 0x01, 0x03, b'a', 0x04, 0x01, 0x01, 0x0A, 0x00]
        );
    }

    #[test]
    fn test_distinct_instances_encoded_in_full() {
        let first = AmfValue::object(AmfObject::new().with("a", 1));
        let second = AmfValue::object(AmfObject::new().with("a", 1));
        let mut encoder = Amf3Encoder::new();
        encoder.encode_all(&[first, second]).unwrap();
        assert_eq!(encoder.stats().object_refs, 0);
        let bytes = encoder.finish();

        // Second object: trait reference, "a" string reference, value, end
        assert_eq!(&bytes[8..], &[0x0A, 0x01, 0x00, 0x04, 0x01, 0x01]);
    }

    #[test]
    fn test_traits_reused_for_same_class() {
        let first = AmfValue::object(AmfObject::typed("U").with("id", 1).with("name", "a"));
        let second = AmfValue::object(
            AmfObject::typed("U")
                .with("name", "b")
                .with("id", 2)
                .with("extra", true),
        );
        let bytes = encode_all(&[first, second]).unwrap();

        let mut expected = vec![
            0x0A, 0x23, // proplist traits, 2 sealed
            0x03, b'U', // class name
            0x05, b'i', b'd', 0x09, b'n', b'a', b'm', b'e', // sealed names
            0x04, 0x01, 0x06, 0x03, b'a', // values
        ];
        // Trait id 0 reference; values follow the cached order; "extra" dropped
        expected.extend_from_slice(&[0x0A, 0x01, 0x04, 0x02, 0x06, 0x03, b'b']);
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn test_cached_traits_write_null_for_missing_field() {
        // The first object's sealed names are reused even when a later
        // object lacks one of them
        let first = AmfValue::object(AmfObject::typed("U").with("id", 1).with("name", "a"));
        let second = AmfValue::object(AmfObject::typed("U").with("id", 2));
        let bytes = encode_all(&[first, second]).unwrap();

        assert_eq!(&bytes[bytes.len() - 5..], &[0x0A, 0x01, 0x04, 0x02, 0x01]);
    }

    #[test]
    fn test_private_fields_skipped() {
        let user = AmfValue::object(User {
            id: 7,
            name: "ann",
            secret: "hunter2",
        });
        let registry = ClassRegistry::new().map_class::<User>("com.example.User");
        let mut encoder = Amf3Encoder::new().with_registry(Arc::new(registry));
        encoder.encode(&user).unwrap();
        let bytes = encoder.finish();

        let mut expected = vec![0x0A, 0x23, 0x21];
        expected.extend_from_slice(b"com.example.User");
        expected.extend_from_slice(&[0x05, b'i', b'd', 0x09, b'n', b'a', b'm', b'e']);
        expected.extend_from_slice(&[0x04, 0x07, 0x06, 0x07, b'a', b'n', b'n']);
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn test_class_name_precedence() {
        // Without a mapping the Rust type name is the last resort
        let user = AmfValue::object(User {
            id: 1,
            name: "x",
            secret: "",
        });
        let mut encoder = Amf3Encoder::new();
        encoder.encode(&user).unwrap();
        assert!(encoder
            .session()
            .traits
            .get(std::any::type_name::<User>())
            .is_some());

        // Self-reported name
        let mut encoder = Amf3Encoder::new();
        encoder.encode(&AmfValue::object(Named)).unwrap();
        let bytes = encoder.finish();
        let mut expected = vec![0x0A, 0x03, 0x25];
        expected.extend_from_slice(b"flex.messaging.Ack");
        assert_eq!(&bytes[..], &expected[..]);

        // Registry mapping wins over an explicit type
        let registry = ClassRegistry::new().map_class::<AmfObject>("mapped.Generic");
        let mut encoder = Amf3Encoder::new().with_registry(Arc::new(registry));
        encoder
            .encode(&AmfValue::object(AmfObject::typed("explicit.Type")))
            .unwrap();
        assert!(encoder.session().traits.get("mapped.Generic").is_some());
        assert!(encoder.session().traits.get("explicit.Type").is_none());
    }

    #[test]
    fn test_externalizable_rejected() {
        let err = encode(&AmfValue::object(Custom)).unwrap_err();
        match err {
            AmfError::Encode { class_name, source } => {
                assert_eq!(class_name, "flex.messaging.io.ArrayCollection");
                assert!(matches!(
                    *source,
                    AmfError::UnsupportedEncoding(TraitEncoding::External)
                ));
            }
            other => panic!("expected Encode error, got {:?}", other),
        }
    }

    #[test]
    fn test_field_errors_are_wrapped() {
        let obj = AmfObject::typed("Holder").with("sock", AmfValue::resource(Socket));
        let err = encode(&AmfValue::object(obj)).unwrap_err();
        match err {
            AmfError::Encode { class_name, source } => {
                assert_eq!(class_name, "Holder");
                assert!(matches!(*source, AmfError::UnsupportedType(_)));
            }
            other => panic!("expected Encode error, got {:?}", other),
        }
    }

    #[test]
    fn test_array_split() {
        let mut array = AmfArray::new();
        array.push(1);
        array.insert("k", "v");
        array.push(2);
        let bytes = encode(&AmfValue::array(array)).unwrap();

        assert_eq!(bytes[0], 0x09);
        let (header, used) = read_u29(&bytes[1..]);
        assert_eq!(header & 1, 1);
        assert_eq!(header >> 1, 2);
        assert_eq!(
            &bytes[1 + used..],
            &[
                0x03, b'k', 0x06, 0x03, b'v', // named pair
                0x01, // end of named pairs
                0x04, 0x01, 0x04, 0x02, // dense values
            ]
        );
    }

    #[test]
    fn test_dense_array() {
        let bytes = encode(&vec!["a", "a"].into()).unwrap();
        assert_eq!(&bytes[..], &[0x09, 0x05, 0x01, 0x06, 0x03, b'a', 0x06, 0x00]);
    }

    #[test]
    fn test_arrays_take_slot_but_are_not_referenced() {
        let array = AmfValue::from(vec![1]);
        let obj = AmfValue::object(AmfObject::new());
        let mut encoder = Amf3Encoder::new();
        encoder
            .encode_all(&[array.clone(), array, obj.clone(), obj])
            .unwrap();
        let bytes = encoder.finish();

        // Both arrays written in full; the object reference index is 2
        assert_eq!(
            &bytes[..],
            &[
                0x09, 0x03, 0x01, 0x04, 0x01, // array
                0x09, 0x03, 0x01, 0x04, 0x01, // same array again
                0x0A, 0x0B, 0x01, 0x01, // empty dynamic object
                0x0A, 0x04, // reference to index 2
            ]
        );
    }

    #[test]
    fn test_date() {
        let date = AmfValue::date(AmfDate::from_millis(1_500_750));
        let bytes = encode_all(&[date.clone(), date]).unwrap();

        let mut expected = vec![0x08, 0x01];
        expected.extend_from_slice(&1500.0f64.to_be_bytes());
        expected.extend_from_slice(&[0x08, 0x00]);
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn test_byte_array() {
        let data = AmfValue::ByteArray(Arc::new(ByteArray::new(vec![1u8, 2, 3])));
        let bytes = encode_all(&[data.clone(), data]).unwrap();
        assert_eq!(&bytes[..], &[0x0C, 0x07, 1, 2, 3, 0x0C, 0x00]);
    }

    #[test]
    fn test_byte_array_from_string_skips_string_table() {
        let mut encoder = Amf3Encoder::new();
        encoder.encode_as(&"ab".into(), 0x0C).unwrap();
        encoder.encode(&"ab".into()).unwrap();
        let bytes = encoder.finish();
        assert_eq!(
            &bytes[..],
            &[0x0C, 0x05, b'a', b'b', 0x06, 0x05, b'a', b'b']
        );
    }

    #[test]
    fn test_raw_string_payloads_referenced_by_value() {
        let mut encoder = Amf3Encoder::new();
        encoder.encode_as(&"ab".into(), 0x0C).unwrap();
        encoder.encode_as(&"ab".into(), 0x0C).unwrap();
        encoder.encode_as(&"ab".into(), 0x0B).unwrap();
        encoder.encode_as(&"cd".into(), 0x0B).unwrap();
        let bytes = encoder.finish();
        assert_eq!(
            &bytes[..],
            &[
                0x0C, 0x05, b'a', b'b', // literal
                0x0C, 0x00, // same text, index 0
                0x0B, 0x00, // same text under the XML marker
                0x0B, 0x05, b'c', b'd', // new text, index 1
            ]
        );
    }

    #[test]
    fn test_literal_header_limit() {
        assert_eq!(literal_header(0), 0x01);
        assert_eq!(literal_header(5), 0x0B);
        assert_eq!(literal_header(INTEGER_MAX as usize), 0x1FFF_FFFF);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "exceeds the U29 length limit")]
    fn test_literal_header_overflow_panics_in_debug() {
        literal_header(INTEGER_MAX as usize + 1);
    }

    #[test]
    fn test_invalid_byte_array() {
        let mut encoder = Amf3Encoder::new();
        let err = encoder.encode_as(&AmfValue::Integer(1), 0x0C).unwrap_err();
        assert!(matches!(err, AmfError::InvalidByteArray));
    }

    #[test]
    fn test_xml() {
        let text = AmfValue::xml(XmlDocument::Text("<a/>".into()));
        let bytes = encode(&text).unwrap();
        assert_eq!(&bytes[..], &[0x0B, 0x09, b'<', b'a', b'/', b'>']);

        let tree = AmfValue::xml(XmlElement::new("r").into());
        let bytes = encode(&tree).unwrap();
        let body = br#"<?xml version="1.0"?><r/>"#;
        assert_eq!(bytes[0], 0x0B);
        assert_eq!(read_u29(&bytes[1..]).0 as usize, (body.len() << 1) | 1);
        assert_eq!(&bytes[2..], &body[..]);

        let mut encoder = Amf3Encoder::new();
        let err = encoder.encode_as(&AmfValue::Integer(1), 0x0B).unwrap_err();
        assert!(matches!(err, AmfError::InvalidXml(_)));
    }

    #[test]
    fn test_explicit_markers() {
        let mut encoder = Amf3Encoder::new();
        encoder.encode_as(&AmfValue::Integer(5), 0x05).unwrap();
        assert_eq!(&encoder.finish()[..], &double(0x05, 5.0)[..]);

        encoder.encode_as(&AmfValue::Null, 0x02).unwrap();
        assert_eq!(&encoder.finish()[..], &[0x02]);

        let err = encoder.encode_as(&AmfValue::Null, 0x00).unwrap_err();
        assert!(matches!(err, AmfError::UnknownMarker(0x00)));

        let err = encoder.encode_as(&"s".into(), 0x09).unwrap_err();
        assert!(matches!(err, AmfError::UnsupportedType(_)));
    }

    #[test]
    fn test_resources_go_through_registry() {
        let err = encode(&AmfValue::resource(Socket)).unwrap_err();
        assert!(matches!(err, AmfError::UnsupportedType(_)));

        let registry = ClassRegistry::new().on_resource("socket", |_| Some(AmfValue::Integer(7)));
        let mut encoder = Amf3Encoder::new().with_registry(Arc::new(registry));
        encoder.encode(&AmfValue::resource(Socket)).unwrap();
        assert_eq!(&encoder.finish()[..], &[0x04, 0x07]);

        // A conversion yielding another resource is not followed
        let registry = ClassRegistry::new()
            .on_resource("socket", |_| Some(AmfValue::resource(Socket)));
        let mut encoder = Amf3Encoder::new().with_registry(Arc::new(registry));
        let err = encoder.encode(&AmfValue::resource(Socket)).unwrap_err();
        assert!(matches!(err, AmfError::UnsupportedType(_)));
    }

    #[test]
    fn test_max_depth() {
        let nested = AmfValue::from(vec![AmfValue::from(vec![AmfValue::from(vec![1])])]);

        let mut encoder = Amf3Encoder::with_config(EncoderConfig::new().max_depth(3));
        assert!(matches!(
            encoder.encode(&nested),
            Err(AmfError::NestingTooDeep)
        ));

        let mut encoder = Amf3Encoder::with_config(EncoderConfig::new().max_depth(4));
        assert!(encoder.encode(&nested).is_ok());

        // Unlimited by default
        assert!(encode(&nested).is_ok());
    }

    #[test]
    fn test_finish_starts_new_session() {
        let mut encoder = Amf3Encoder::new();
        encoder.encode(&"x".into()).unwrap();
        let first = encoder.finish();
        encoder.encode(&"x".into()).unwrap();
        let second = encoder.finish();

        assert_eq!(first, second);
        assert!(encoder.session().is_empty());
    }

    #[test]
    fn test_stats() {
        let obj = AmfValue::object(AmfObject::typed("P").with("v", "s"));
        let other = AmfValue::object(AmfObject::typed("P").with("v", "s"));
        let mut encoder = Amf3Encoder::new();
        encoder.encode_all(&[obj.clone(), obj, other]).unwrap();

        let stats = encoder.stats().clone();
        assert_eq!(stats.traits_defined, 1);
        assert_eq!(stats.trait_refs, 1);
        assert_eq!(stats.object_refs, 1);
        assert_eq!(stats.string_refs, 1);
        assert_eq!(stats.values_written, 5);
        assert_eq!(stats.bytes_written as usize, encoder.len());
    }

    #[test]
    fn test_custom_sink() {
        let mut encoder = Amf3Encoder::with_sink(Vec::<u8>::new());
        encoder.encode(&5.into()).unwrap();
        assert_eq!(encoder.into_inner(), vec![0x04, 0x05]);
    }
}
