//! Statistics
//!
//! Counters describing how much the reference tables saved in a message.

pub mod metrics;

pub use metrics::EncodeStats;
