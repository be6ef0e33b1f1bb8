//! Serialization session state
//!
//! One `SerializationSession` covers one outbound message. It owns the
//! three AMF3 reference tables:
//! - strings already written (dedup by value)
//! - composite values already written (dedup by instance)
//! - object traits already written (dedup by wire class name)
//!
//! Indices are insertion order and are what the peer's decoder rebuilds
//! while reading, so a session must never outlive its message nor be
//! resumed after an error.

pub mod tables;
pub mod traits;

pub use tables::{ReferenceTable, StringTable};
pub use traits::{TraitDefinition, TraitTable};

use crate::stats::EncodeStats;

/// Reference tables and counters for one outbound message
#[derive(Debug, Default)]
pub struct SerializationSession {
    /// Strings written in literal form
    pub strings: StringTable,
    /// Objects, arrays, dates, byte arrays and XML written in full
    pub objects: ReferenceTable,
    /// Traits written inline
    pub traits: TraitTable,
    /// Counters for this message
    pub stats: EncodeStats,
}

impl SerializationSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all references (call between messages)
    pub fn reset(&mut self) {
        self.strings.clear();
        self.objects.clear();
        self.traits.clear();
        self.stats = EncodeStats::default();
    }

    /// Check if nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty() && self.objects.is_empty() && self.traits.is_empty()
    }
}
