//! Dependency Tracking Module
//!
//! Derives the reserved store keys and value fingerprints used to detect
//! upstream drift. For a property named `P` with dependency index `i`, the
//! persisted baseline lives under `P-DEPENDENCY#i` in the same store as
//! ordinary values.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Marker embedded in every derived tracking key.
const TRACKING_KEY_MARKER: &str = "-DEPENDENCY#";

/// Fingerprint stored when a dependency target is absent.
pub(crate) const NULL_TARGET: &str = "NULL";

// == Reserved Keys ==
/// Returns true if `key` is a derived dependency-tracking key.
///
/// Callers enumerating the raw store should treat matching keys as internal.
pub fn is_tracking_key(key: &str) -> bool {
    key.contains(TRACKING_KEY_MARKER)
}

/// Derives the tracking key for one dependency of a property.
pub(crate) fn tracking_key(name: &str, index: usize) -> String {
    format!("{name}{TRACKING_KEY_MARKER}{index}")
}

// == Fingerprint ==
/// Computes the stored fingerprint of a dependency target.
///
/// A shallow, lossy hash: two targets that collide are treated as unchanged.
/// Absent targets map to a sentinel so that present/absent transitions are
/// always visible.
pub(crate) fn fingerprint<U: Hash>(target: Option<&U>) -> String {
    match target {
        None => NULL_TARGET.to_string(),
        Some(target) => {
            let mut hasher = DefaultHasher::new();
            target.hash(&mut hasher);
            format!("{:016x}", hasher.finish())
        }
    }
}
