//! Propdefs - typed property accessors over an untyped string store
//!
//! Callers define strongly-typed properties against a string-keyed backing
//! store: each property knows how to read, parse, default-initialize, write,
//! and serialize one value. A property may also monitor upstream values; when
//! a monitored value drifts, the property's cached default is invalidated and
//! recomputed on the next read.
//!
//! ```
//! use propdefs::{Codec, DefinerBuilder, PropertyMap};
//!
//! let definer = DefinerBuilder::<PropertyMap>::new()
//!     .codec(Codec::<u32>::parsed())
//!     .codec(Codec::<f64>::parsed())
//!     .build();
//!
//! let replicas = definer.define::<u32>("replicas").unwrap();
//! let availability = {
//!     let replicas_for_default = replicas.clone();
//!     definer
//!         .define_with("availability", move |ctx: &mut PropertyMap| {
//!             Ok(replicas_for_default
//!                 .get(ctx)?
//!                 .map_or(0.0, |n| f64::from(n) / 10.0))
//!         })
//!         .unwrap()
//!         .depends_on(&replicas)
//! };
//!
//! let mut props = PropertyMap::from_lines("replicas=2");
//! assert_eq!(availability.get(&mut props).unwrap(), Some(0.2));
//!
//! replicas.set(&mut props, Some(&3)).unwrap();
//! assert_eq!(availability.get(&mut props).unwrap(), Some(0.3));
//! ```

pub mod codec;
pub mod definer;
pub mod error;
pub mod prop;
pub mod store;

pub use codec::Codec;
pub use definer::{Definer, DefinerBuilder, EventHandler};
pub use error::{PropError, Result};
pub use prop::{is_tracking_key, Prop};
pub use store::{PropertyMap, PropertyStore};
