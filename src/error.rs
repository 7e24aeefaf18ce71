//! Error types for the property layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Prop Error Enum ==
/// Unified error type for property definition and access.
///
/// Store and codec failures carry the underlying error unchanged; nothing is
/// retried or swallowed inside the library.
#[derive(Error, Debug)]
pub enum PropError {
    /// No codec registered for the requested value type
    #[error("no codec registered for type {0}")]
    MissingCodec(&'static str),

    /// Raw string could not be parsed into the property's value type
    #[error("failed to decode property '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Value could not be rendered into its raw string form
    #[error("failed to encode property '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Backing store read or write failed
    #[error("store access failed for key '{key}': {source}")]
    Store {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

// == Result Type Alias ==
/// Convenience Result type for property operations.
pub type Result<T> = std::result::Result<T, PropError>;
