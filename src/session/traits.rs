//! Trait cache
//!
//! The first object written for a wire class name defines its traits
//! (encoding + sealed property names). Later objects of the same class
//! name reuse that definition verbatim, even when their own field set
//! differs.

use std::collections::HashMap;

use crate::amf::marker::TraitEncoding;

/// Cached traits for one wire class name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitDefinition {
    /// Index in the peer's traits table
    pub id: usize,
    /// Member layout
    pub encoding: TraitEncoding,
    /// Sealed member names in wire order
    pub property_names: Vec<String>,
}

/// Traits keyed by wire class name
#[derive(Debug, Default)]
pub struct TraitTable {
    definitions: HashMap<String, TraitDefinition>,
}

impl TraitTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached definition for a class name
    pub fn get(&self, class_name: &str) -> Option<&TraitDefinition> {
        self.definitions.get(class_name)
    }

    /// Record a definition for a class name not seen before
    ///
    /// The id is the table size at the time of the call. An existing
    /// definition is returned unchanged.
    pub fn define(
        &mut self,
        class_name: &str,
        encoding: TraitEncoding,
        property_names: Vec<String>,
    ) -> &TraitDefinition {
        let id = self.definitions.len();
        self.definitions
            .entry(class_name.to_string())
            .or_insert(TraitDefinition {
                id,
                encoding,
                property_names,
            })
    }

    /// Number of cached definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Remove all definitions
    pub fn clear(&mut self) {
        self.definitions.clear();
    }
}
