//! Encoder configuration

/// Encoder configuration options
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Initial capacity of the owned output buffer
    pub initial_capacity: usize,

    /// Maximum nesting depth of composite values (0 = unlimited)
    ///
    /// Unlimited by default: cyclic input then recurses without bound.
    pub max_depth: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
            max_depth: 0, // Unlimited
        }
    }
}

impl EncoderConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial buffer capacity
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Limit nesting depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
