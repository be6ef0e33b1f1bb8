//! Per-session encode counters

/// Counters for one serialization session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Values passed through the dispatcher, nested values included
    pub values_written: u64,
    /// Strings written as back-references
    pub string_refs: u64,
    /// Composite values written as back-references
    pub object_refs: u64,
    /// Objects written with a cached traits reference
    pub trait_refs: u64,
    /// Traits written inline
    pub traits_defined: u64,
    /// Total bytes written to the sink
    pub bytes_written: u64,
}

impl EncodeStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Back-references of any kind
    pub fn total_refs(&self) -> u64 {
        self.string_refs + self.object_refs + self.trait_refs
    }
}
