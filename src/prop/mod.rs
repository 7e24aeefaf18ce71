//! Prop Module
//!
//! Typed properties over an untyped backing store: read/write through a
//! per-type codec, lazily-computed defaults, and fingerprint-based
//! invalidation of cached defaults when monitored upstream values drift.

mod property;
mod tracking;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use property::{DefaultInit, Prop};
pub use tracking::is_tracking_key;
