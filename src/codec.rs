//! Codec Module
//!
//! Per-type translation between a raw stored string and a typed value. A
//! codec is resolved once at definition time and shared by every clone of the
//! resulting property.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::anyhow;
use serde::de::DeserializeOwned;
use serde::Serialize;

type ParseFn<T> = dyn Fn(&str) -> anyhow::Result<T> + Send + Sync;
type FormatFn<T> = dyn Fn(&T) -> anyhow::Result<String> + Send + Sync;

// == Codec ==
/// A parse/format closure pair for one value type.
///
/// Parsing may fail (malformed raw data); formatting may fail for types whose
/// serialized form is not total. Both failures surface to the caller of the
/// property operation that triggered them.
pub struct Codec<T> {
    parse: Arc<ParseFn<T>>,
    format: Arc<FormatFn<T>>,
}

impl<T> Clone for Codec<T> {
    fn clone(&self) -> Self {
        Self {
            parse: Arc::clone(&self.parse),
            format: Arc::clone(&self.format),
        }
    }
}

impl<T> Codec<T> {
    // == Constructor ==
    /// Creates a codec from explicit parse and format closures.
    pub fn new<P, F>(parse: P, format: F) -> Self
    where
        T: 'static,
        P: Fn(&str) -> anyhow::Result<T> + Send + Sync + 'static,
        F: Fn(&T) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        Self {
            parse: Arc::new(parse),
            format: Arc::new(format),
        }
    }

    /// Codec for types with a string round trip via `FromStr` and `Display`.
    ///
    /// Covers the simple scalar types (integers, floats, `String`, enums with
    /// hand-written `FromStr`).
    pub fn parsed() -> Self
    where
        T: FromStr + Display + 'static,
        T::Err: Display,
    {
        Self::new(
            |raw| raw.parse::<T>().map_err(|e| anyhow!("{e}")),
            |value| Ok(value.to_string()),
        )
    }

    /// Codec storing the value as JSON.
    ///
    /// The escape hatch for structured types that have no natural flat string
    /// form.
    pub fn json() -> Self
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        Self::new(
            |raw| serde_json::from_str(raw).map_err(anyhow::Error::from),
            |value| serde_json::to_string(value).map_err(anyhow::Error::from),
        )
    }

    /// Parses a raw stored string into a typed value.
    pub fn decode(&self, raw: &str) -> anyhow::Result<T> {
        (self.parse)(raw)
    }

    /// Renders a typed value into its raw stored string.
    pub fn encode(&self, value: &T) -> anyhow::Result<String> {
        (self.format)(value)
    }
}
