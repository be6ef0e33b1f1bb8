//! AMF3 value types
//!
//! `AmfValue` is the closed set of kinds the serializer dispatches on.
//! Composite kinds live behind an `Arc`: cloning a value shares the
//! instance, and the object reference table dedups by that allocation,
//! not by structural equality.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use super::xml::XmlDocument;
use crate::registry::Resource;

/// Unified AMF3 value representation
#[derive(Debug, Clone)]
pub enum AmfValue {
    /// Null (0x01)
    Null,

    /// Boolean (0x02 false / 0x03 true)
    Boolean(bool),

    /// Integral number; Integer (0x04) when within 29 bits, else Double
    Integer(i64),

    /// IEEE 754 double (0x05)
    Number(f64),

    /// UTF-8 string (0x06)
    String(String),

    /// Date (0x08)
    Date(Arc<AmfDate>),

    /// Array with dense and associative parts (0x09)
    Array(Arc<AmfArray>),

    /// Typed, sealed or dynamic object (0x0A)
    Object(Arc<dyn Serializable>),

    /// Raw bytes (0x0C)
    ByteArray(Arc<ByteArray>),

    /// XML text or tree (0x0B)
    Xml(Arc<XmlDocument>),

    /// Opaque handle converted through the type registry before dispatch
    Resource(Arc<dyn Resource>),
}

impl AmfValue {
    /// Wrap a serializable value as a new object instance
    pub fn object<T: Serializable>(obj: T) -> Self {
        AmfValue::Object(Arc::new(obj))
    }

    /// Wrap an array as a new instance
    pub fn array(array: AmfArray) -> Self {
        AmfValue::Array(Arc::new(array))
    }

    /// Wrap a date as a new instance
    pub fn date(date: AmfDate) -> Self {
        AmfValue::Date(Arc::new(date))
    }

    /// Wrap raw bytes as a new byte-array instance
    pub fn byte_array(data: impl Into<Bytes>) -> Self {
        AmfValue::ByteArray(Arc::new(ByteArray::new(data)))
    }

    /// Wrap an XML document as a new instance
    pub fn xml(doc: XmlDocument) -> Self {
        AmfValue::Xml(Arc::new(doc))
    }

    /// Wrap a resource handle
    pub fn resource<R: Resource>(resource: R) -> Self {
        AmfValue::Resource(Arc::new(resource))
    }

    /// Identity of the shared instance behind a composite value
    ///
    /// Scalars and strings have no identity.
    pub fn identity(&self) -> Option<usize> {
        let ptr = match self {
            AmfValue::Date(d) => Arc::as_ptr(d) as *const (),
            AmfValue::Array(a) => Arc::as_ptr(a) as *const (),
            AmfValue::Object(o) => Arc::as_ptr(o) as *const (),
            AmfValue::ByteArray(b) => Arc::as_ptr(b) as *const (),
            AmfValue::Xml(x) => Arc::as_ptr(x) as *const (),
            AmfValue::Resource(r) => Arc::as_ptr(r) as *const (),
            _ => return None,
        };
        Some(ptr as usize)
    }

    /// Short kind name used in error messages and logs
    pub fn kind_name(&self) -> &'static str {
        match self {
            AmfValue::Null => "null",
            AmfValue::Boolean(_) => "boolean",
            AmfValue::Integer(_) => "integer",
            AmfValue::Number(_) => "number",
            AmfValue::String(_) => "string",
            AmfValue::Date(_) => "date",
            AmfValue::Array(_) => "array",
            AmfValue::Object(_) => "object",
            AmfValue::ByteArray(_) => "bytearray",
            AmfValue::Xml(_) => "xml",
            AmfValue::Resource(_) => "resource",
        }
    }

    /// Try to get this value as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AmfValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AmfValue::Number(n) => Some(*n),
            AmfValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AmfValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, AmfValue::Null)
    }
}

impl Default for AmfValue {
    fn default() -> Self {
        AmfValue::Null
    }
}

impl From<bool> for AmfValue {
    fn from(v: bool) -> Self {
        AmfValue::Boolean(v)
    }
}

impl From<f64> for AmfValue {
    fn from(v: f64) -> Self {
        AmfValue::Number(v)
    }
}

impl From<i32> for AmfValue {
    fn from(v: i32) -> Self {
        AmfValue::Integer(v as i64)
    }
}

impl From<i64> for AmfValue {
    fn from(v: i64) -> Self {
        AmfValue::Integer(v)
    }
}

impl From<u32> for AmfValue {
    fn from(v: u32) -> Self {
        AmfValue::Integer(v as i64)
    }
}

impl From<String> for AmfValue {
    fn from(v: String) -> Self {
        AmfValue::String(v)
    }
}

impl From<&str> for AmfValue {
    fn from(v: &str) -> Self {
        AmfValue::String(v.to_string())
    }
}

impl<V: Into<AmfValue>> From<Vec<V>> for AmfValue {
    fn from(v: Vec<V>) -> Self {
        AmfValue::array(v.into_iter().collect())
    }
}

impl<V: Into<AmfValue>> From<Option<V>> for AmfValue {
    fn from(v: Option<V>) -> Self {
        v.map(Into::into).unwrap_or(AmfValue::Null)
    }
}

/// A value the object encoder can write
///
/// `fields` returns the instance's own fields in declaration order,
/// including any whose name starts with an underscore; the encoder skips
/// those. The naming hooks are consulted after the type registry:
/// `explicit_type`, then `class_name`, then `is_anonymous`, then
/// `runtime_type`.
pub trait Serializable: fmt::Debug + Send + Sync + 'static {
    /// Own fields as ordered (name, value) pairs
    fn fields(&self) -> Vec<(String, AmfValue)>;

    /// Explicit wire class name attached to this instance
    fn explicit_type(&self) -> Option<String> {
        None
    }

    /// Wire class name reported by the type itself
    fn class_name(&self) -> Option<String> {
        None
    }

    /// Generic untyped value, written as an anonymous dynamic object
    fn is_anonymous(&self) -> bool {
        false
    }

    /// Class owns its serialization (rejected by the encoder)
    fn is_externalizable(&self) -> bool {
        false
    }

    /// Runtime type identity used for registry lookups and as the
    /// last-resort class name
    fn runtime_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Generic object with ordered fields
///
/// Without a class name it is anonymous and goes out as a dynamic object
/// with no sealed members. With one, the name is used as an explicit type.
#[derive(Debug, Clone, Default)]
pub struct AmfObject {
    class_name: Option<String>,
    fields: Vec<(String, AmfValue)>,
}

impl AmfObject {
    /// Create an anonymous object
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object carrying an explicit wire class name
    pub fn typed(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            fields: Vec::new(),
        }
    }

    /// Add a field, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AmfValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing an existing value in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AmfValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Get a field by name
    pub fn get(&self, name: &str) -> Option<&AmfValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the object has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serializable for AmfObject {
    fn fields(&self) -> Vec<(String, AmfValue)> {
        self.fields.clone()
    }

    fn explicit_type(&self) -> Option<String> {
        self.class_name.clone()
    }

    fn is_anonymous(&self) -> bool {
        self.class_name.is_none()
    }
}

/// Key of an array entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayKey {
    Index(i64),
    Name(String),
}

impl From<i64> for ArrayKey {
    fn from(i: i64) -> Self {
        ArrayKey::Index(i)
    }
}

impl From<&str> for ArrayKey {
    fn from(s: &str) -> Self {
        ArrayKey::Name(s.to_string())
    }
}

impl From<String> for ArrayKey {
    fn from(s: String) -> Self {
        ArrayKey::Name(s)
    }
}

/// Ordered container mixing integer-indexed and named entries
#[derive(Debug, Clone, Default)]
pub struct AmfArray {
    entries: Vec<(ArrayKey, AmfValue)>,
    next_index: i64,
}

impl AmfArray {
    /// Create an empty array
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value at the next integer index
    pub fn push(&mut self, value: impl Into<AmfValue>) {
        let index = self.next_index;
        self.insert(ArrayKey::Index(index), value);
    }

    /// Set an entry, replacing an existing key in place
    pub fn insert(&mut self, key: impl Into<ArrayKey>, value: impl Into<AmfValue>) {
        let key = key.into();
        if let ArrayKey::Index(i) = key {
            if i >= self.next_index {
                self.next_index = i + 1;
            }
        }
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style `insert`
    pub fn with(mut self, key: impl Into<ArrayKey>, value: impl Into<AmfValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[(ArrayKey, AmfValue)] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the array is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Into<AmfValue>> FromIterator<V> for AmfArray {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut array = AmfArray::new();
        for value in iter {
            array.push(value);
        }
        array
    }
}

/// Point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmfDate(SystemTime);

impl AmfDate {
    /// Wrap a system time
    pub fn new(time: SystemTime) -> Self {
        Self(time)
    }

    /// Current time
    pub fn now() -> Self {
        Self(SystemTime::now())
    }

    /// Date from milliseconds since the Unix epoch
    pub fn from_millis(millis: i64) -> Self {
        let offset = Duration::from_millis(millis.unsigned_abs());
        if millis >= 0 {
            Self(UNIX_EPOCH + offset)
        } else {
            Self(UNIX_EPOCH - offset)
        }
    }

    /// Underlying system time
    pub fn time(&self) -> SystemTime {
        self.0
    }

    /// Whole seconds since the Unix epoch, rounded toward negative infinity
    pub fn epoch_seconds(&self) -> i64 {
        match self.0.duration_since(UNIX_EPOCH) {
            Ok(after) => after.as_secs() as i64,
            Err(before) => {
                let before = before.duration();
                let secs = before.as_secs() as i64;
                if before.subsec_nanos() > 0 {
                    -secs - 1
                } else {
                    -secs
                }
            }
        }
    }
}

impl From<SystemTime> for AmfDate {
    fn from(time: SystemTime) -> Self {
        Self(time)
    }
}

/// Raw byte payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByteArray(Bytes);

impl ByteArray {
    /// Wrap bytes
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }

    /// Borrow the payload
    pub fn data(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
