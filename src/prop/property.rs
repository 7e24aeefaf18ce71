//! Typed Property Module
//!
//! The unit of access: a named, typed accessor bound to a backing store, with
//! an optional lazily-computed default and an ordered list of dependencies
//! whose drift invalidates the cached default.
//!
//! A property owns no state of its own; everything it reads and writes lives
//! in the caller-supplied context, so property values are fully determined by
//! the store contents and definitions can be cloned and shared freely.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::codec::Codec;
use crate::definer::EventHandler;
use crate::error::{PropError, Result};
use crate::prop::tracking;
use crate::store::PropertyStore;

/// Lazily-computed default for an absent property value.
pub type DefaultInit<C, T> = Arc<dyn Fn(&mut C) -> Result<T> + Send + Sync>;

/// A registered dependency, reduced to the fingerprint of its current target.
type DependencyFn<C> = Arc<dyn Fn(&mut C) -> Result<String> + Send + Sync>;

// == Prop ==
/// A typed property bound to a string-keyed backing store.
///
/// Identity is the name alone: equality and hashing ignore codec, default and
/// dependencies, and the name doubles as the storage key and as the prefix of
/// the derived tracking keys.
pub struct Prop<C, T> {
    name: Arc<str>,
    codec: Codec<T>,
    default_init: Option<DefaultInit<C, T>>,
    dependencies: Vec<DependencyFn<C>>,
    after_init: Option<EventHandler<C>>,
    after_get: Option<EventHandler<C>>,
    after_set: Option<EventHandler<C>>,
}

impl<C, T> Prop<C, T> {
    // == Constructor ==
    pub(crate) fn new(
        name: &str,
        codec: Codec<T>,
        default_init: Option<DefaultInit<C, T>>,
        after_init: Option<EventHandler<C>>,
        after_get: Option<EventHandler<C>>,
        after_set: Option<EventHandler<C>>,
    ) -> Self {
        Self {
            name: Arc::from(name),
            codec,
            default_init,
            dependencies: Vec::new(),
            after_init,
            after_get,
            after_set,
        }
    }

    /// Returns the property name, which is also its storage key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current default initializer, if one is configured.
    pub fn default_initializer(&self) -> Option<DefaultInit<C, T>> {
        self.default_init.clone()
    }

    /// Replaces the default initializer on this handle.
    ///
    /// Clones taken before the override keep the previous initializer.
    pub fn override_default_initializer<F>(&mut self, default_init: F)
    where
        F: Fn(&mut C) -> Result<T> + Send + Sync + 'static,
    {
        self.default_init = Some(Arc::new(default_init));
    }

    // == Dependency Registration ==
    /// Appends a dependency accessor (fluent).
    ///
    /// The accessor resolves the upstream target from the context; its
    /// position in append order permanently fixes the tracking-key index.
    /// Accessors are never deduplicated.
    pub fn add_dependency<U, F>(mut self, accessor: F) -> Self
    where
        U: Hash + 'static,
        F: Fn(&mut C) -> Result<Option<U>> + Send + Sync + 'static,
    {
        self.dependencies.push(Arc::new(move |ctx| {
            let target = accessor(ctx)?;
            Ok(tracking::fingerprint(target.as_ref()))
        }));
        self
    }

    fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }
}

impl<C: PropertyStore + 'static, T> Prop<C, T> {
    /// Registers another property as a dependency (fluent).
    ///
    /// Equivalent to `add_dependency(|ctx| upstream.get(ctx))`: the upstream
    /// read runs its own default initialization and invalidation.
    pub fn depends_on<U>(self, upstream: &Prop<C, U>) -> Self
    where
        U: Hash + Send + Sync + 'static,
    {
        let upstream = upstream.clone();
        self.add_dependency(move |ctx| upstream.get(ctx))
    }
}

impl<C: PropertyStore, T> Prop<C, T> {
    // == Read Path ==
    /// Reads the property value, running default initialization if absent.
    ///
    /// Shorthand for `get_or(ctx, None)`.
    pub fn get(&self, ctx: &mut C) -> Result<Option<T>> {
        self.get_or(ctx, None)
    }

    /// Reads the property value, substituting `substitute` when absent and no
    /// default initializer is configured.
    ///
    /// A present value is first checked for staleness: when a default
    /// initializer and at least one dependency are configured, each
    /// dependency's current fingerprint is compared against the baseline
    /// captured at the last write. Any existing baseline that differs marks
    /// the value stale; it is cleared (a real write, observable through the
    /// after-set handler) and recomputed from the default initializer. A
    /// missing baseline never counts as drift, so the first read after
    /// definition is never stale.
    pub fn get_or(&self, ctx: &mut C, substitute: Option<T>) -> Result<Option<T>> {
        let mut raw = self.read_raw(ctx)?;

        if raw.is_some()
            && self.default_init.is_some()
            && self.has_dependencies()
            && self.any_dependency_changed(ctx)?
        {
            debug!(property = %self.name, "dependency drift, discarding cached value");
            self.set(ctx, None)?;
            raw = None;
        }

        let (value, raw) = match raw {
            Some(raw) => {
                let value = self
                    .codec
                    .decode(&raw)
                    .map_err(|source| PropError::Decode {
                        key: self.name.to_string(),
                        source,
                    })?;
                (Some(value), Some(raw))
            }
            None => match &self.default_init {
                Some(init) => {
                    let value = init(ctx)?;
                    let raw = self.write_value(ctx, Some(&value))?;
                    debug!(property = %self.name, "initialized from default");
                    self.fire(&self.after_init, ctx, raw.as_deref());
                    (Some(value), raw)
                }
                None => {
                    let raw = match (&self.after_get, substitute.as_ref()) {
                        (Some(_), Some(value)) => Some(self.encode(value)?),
                        _ => None,
                    };
                    (substitute, raw)
                }
            },
        };

        self.fire(&self.after_get, ctx, raw.as_deref());
        Ok(value)
    }

    /// Returns true if `get` yields no value.
    ///
    /// A property with a default initializer is never absent: probing runs
    /// the initializer.
    pub fn is_absent(&self, ctx: &mut C) -> Result<bool> {
        Ok(self.get(ctx)?.is_none())
    }

    /// Returns true if `get` yields a value.
    pub fn is_present(&self, ctx: &mut C) -> Result<bool> {
        Ok(!self.is_absent(ctx)?)
    }

    // == Write Path ==
    /// Writes `value` through the store adapter, `None` clearing the key.
    ///
    /// Every write re-captures the dependency baselines: each accessor is
    /// evaluated and its fingerprint stored at the matching tracking key, or
    /// the tracking key is cleared when the written value is `None`. A later
    /// read only invalidates relative to the baselines of the most recent
    /// write.
    pub fn set(&self, ctx: &mut C, value: Option<&T>) -> Result<()> {
        let raw = self.write_value(ctx, value)?;
        self.fire(&self.after_set, ctx, raw.as_deref());
        Ok(())
    }

    /// Writes `value` only when the property currently yields no value.
    pub fn set_if_absent(&self, ctx: &mut C, value: &T) -> Result<()> {
        if self.is_absent(ctx)? {
            self.set(ctx, Some(value))?;
        }
        Ok(())
    }

    /// Writes `value` only when the property currently yields a value.
    pub fn set_if_present(&self, ctx: &mut C, value: &T) -> Result<()> {
        if self.is_present(ctx)? {
            self.set(ctx, Some(value))?;
        }
        Ok(())
    }

    // == Internals ==
    fn read_raw(&self, ctx: &C) -> Result<Option<String>> {
        ctx.read(&self.name).map_err(|source| PropError::Store {
            key: self.name.to_string(),
            source,
        })
    }

    fn encode(&self, value: &T) -> Result<String> {
        self.codec.encode(value).map_err(|source| PropError::Encode {
            key: self.name.to_string(),
            source,
        })
    }

    /// Writes the raw value and refreshes all tracking baselines, returning
    /// the raw form for event handlers.
    fn write_value(&self, ctx: &mut C, value: Option<&T>) -> Result<Option<String>> {
        let raw = match value {
            Some(value) => Some(self.encode(value)?),
            None => None,
        };
        ctx.write(&self.name, raw.as_deref())
            .map_err(|source| PropError::Store {
                key: self.name.to_string(),
                source,
            })?;
        trace!(property = %self.name, present = raw.is_some(), "raw value written");
        self.refresh_tracking(ctx, raw.is_some())?;
        Ok(raw)
    }

    fn refresh_tracking(&self, ctx: &mut C, value_present: bool) -> Result<()> {
        for (index, accessor) in self.dependencies.iter().enumerate() {
            // Accessors run on every write, clears included.
            let fresh = accessor(ctx)?;
            let key = tracking::tracking_key(&self.name, index);
            let baseline = if value_present {
                Some(fresh.as_str())
            } else {
                None
            };
            ctx.write(&key, baseline).map_err(|source| PropError::Store {
                key: key.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn any_dependency_changed(&self, ctx: &mut C) -> Result<bool> {
        for (index, accessor) in self.dependencies.iter().enumerate() {
            let fresh = accessor(ctx)?;
            let key = tracking::tracking_key(&self.name, index);
            let stored = ctx.read(&key).map_err(|source| PropError::Store {
                key: key.clone(),
                source,
            })?;
            match stored {
                Some(baseline) if baseline != fresh => return Ok(true),
                // No baseline yet: not a change.
                _ => {}
            }
        }
        Ok(false)
    }

    fn fire(&self, handler: &Option<EventHandler<C>>, ctx: &C, raw: Option<&str>) {
        if let Some(handler) = handler {
            handler(ctx, &self.name, raw);
        }
    }
}

// == Identity ==
impl<C, T> Clone for Prop<C, T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            codec: self.codec.clone(),
            default_init: self.default_init.clone(),
            dependencies: self.dependencies.clone(),
            after_init: self.after_init.clone(),
            after_get: self.after_get.clone(),
            after_set: self.after_set.clone(),
        }
    }
}

impl<C, T> PartialEq for Prop<C, T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<C, T> Eq for Prop<C, T> {}

impl<C, T> Hash for Prop<C, T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<C, T> fmt::Display for Prop<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<C, T> fmt::Debug for Prop<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prop")
            .field("name", &self.name)
            .field("has_default", &self.default_init.is_some())
            .field("dependencies", &self.dependencies.len())
            .finish()
    }
}
