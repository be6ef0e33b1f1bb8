//! Type registry
//!
//! The registry is the serializer's seam to the application's type
//! system. It answers two questions:
//!
//! - which wire class name a runtime type is published under, and
//! - what plain value an opaque resource handle stands for.
//!
//! ```text
//!            AmfValue::Resource ──► convert_resource() ──► AmfValue
//!                                                            │
//!   AmfValue::Object ──► runtime_type() ──► resolve_wire_class_name()
//!                                             │
//!                                             ▼
//!                                     traits header class name
//! ```
//!
//! `ClassRegistry` is a map-backed implementation; applications with their
//! own type loader implement `TypeRegistry` directly.

use std::collections::HashMap;
use std::fmt;

use crate::amf::value::AmfValue;

/// Opaque handle that must be converted before it can be serialized
pub trait Resource: fmt::Debug + Send + Sync + 'static {
    /// Kind of resource, used to pick a converter
    fn resource_type(&self) -> &str;
}

/// Maps runtime types to wire class names and converts resources
pub trait TypeRegistry: Send + Sync {
    /// Wire class name registered for a runtime type, if any
    fn resolve_wire_class_name(&self, runtime_type: &str) -> Option<String>;

    /// Plain value standing in for a resource, if a conversion exists
    fn convert_resource(&self, resource: &dyn Resource) -> Option<AmfValue>;
}

type ResourceConverter = Box<dyn Fn(&dyn Resource) -> Option<AmfValue> + Send + Sync>;

/// Map-backed type registry
#[derive(Default)]
pub struct ClassRegistry {
    classes: HashMap<String, String>,
    converters: HashMap<String, ResourceConverter>,
}

impl ClassRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish Rust type `T` under a wire class name
    pub fn map_class<T: ?Sized>(self, wire_name: impl Into<String>) -> Self {
        self.map_type_name(std::any::type_name::<T>(), wire_name)
    }

    /// Publish a runtime type name under a wire class name
    pub fn map_type_name(
        mut self,
        runtime_type: impl Into<String>,
        wire_name: impl Into<String>,
    ) -> Self {
        self.classes.insert(runtime_type.into(), wire_name.into());
        self
    }

    /// Register a converter for one resource kind
    pub fn on_resource<F>(mut self, resource_type: impl Into<String>, converter: F) -> Self
    where
        F: Fn(&dyn Resource) -> Option<AmfValue> + Send + Sync + 'static,
    {
        self.converters
            .insert(resource_type.into(), Box::new(converter));
        self
    }

    /// Number of class mappings
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

impl TypeRegistry for ClassRegistry {
    fn resolve_wire_class_name(&self, runtime_type: &str) -> Option<String> {
        self.classes.get(runtime_type).cloned()
    }

    fn convert_resource(&self, resource: &dyn Resource) -> Option<AmfValue> {
        let converter = self.converters.get(resource.resource_type())?;
        converter(resource)
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.classes)
            .field("converters", &self.converters.keys().collect::<Vec<_>>())
            .finish()
    }
}
