//! Definer Module
//!
//! The property registry: a builder accumulates per-type codecs and optional
//! event handlers, then freezes into an immutable [`Definer`] that wires a
//! name and a value type into a [`Prop`]. Codec resolution happens at
//! definition time, so a missing codec surfaces immediately rather than at
//! first use.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::Codec;
use crate::error::{PropError, Result};
use crate::prop::{DefaultInit, Prop};

// == Event Handler ==
/// Observer invoked after init, get, or set.
///
/// Receives the context, the property name, and the final value in its raw
/// string form (`None` when the operation yielded no value). Handlers are
/// shared across all properties of a definer, so the value is type-erased.
pub type EventHandler<C> = Arc<dyn Fn(&C, &str, Option<&str>) + Send + Sync>;

// == Definer Builder ==
/// Accumulates codecs and event handlers for a context type.
///
/// Codecs are keyed by `TypeId` and resolved when a property is defined.
pub struct DefinerBuilder<C> {
    codecs: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    after_init: Option<EventHandler<C>>,
    after_get: Option<EventHandler<C>>,
    after_set: Option<EventHandler<C>>,
}

impl<C> DefinerBuilder<C> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
            after_init: None,
            after_get: None,
            after_set: None,
        }
    }

    /// Registers the codec used for properties of type `T` (fluent).
    ///
    /// Registering a second codec for the same type replaces the first.
    pub fn codec<T: 'static>(mut self, codec: Codec<T>) -> Self {
        self.codecs.insert(TypeId::of::<T>(), Box::new(codec));
        self
    }

    /// Installs the handler fired after a default value is initialized.
    pub fn after_init<F>(mut self, handler: F) -> Self
    where
        F: Fn(&C, &str, Option<&str>) + Send + Sync + 'static,
    {
        self.after_init = Some(Arc::new(handler));
        self
    }

    /// Installs the handler fired after every read.
    pub fn after_get<F>(mut self, handler: F) -> Self
    where
        F: Fn(&C, &str, Option<&str>) + Send + Sync + 'static,
    {
        self.after_get = Some(Arc::new(handler));
        self
    }

    /// Installs the handler fired after every write.
    pub fn after_set<F>(mut self, handler: F) -> Self
    where
        F: Fn(&C, &str, Option<&str>) + Send + Sync + 'static,
    {
        self.after_set = Some(Arc::new(handler));
        self
    }

    /// Freezes the accumulated configuration into a definer.
    pub fn build(self) -> Definer<C> {
        Definer {
            codecs: Arc::new(self.codecs),
            after_init: self.after_init,
            after_get: self.after_get,
            after_set: self.after_set,
        }
    }
}

impl<C> Default for DefinerBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

// == Definer ==
/// Immutable property factory produced by [`DefinerBuilder::build`].
///
/// Cheap to clone; all definitions share the frozen codec table and handlers.
pub struct Definer<C> {
    codecs: Arc<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
    after_init: Option<EventHandler<C>>,
    after_get: Option<EventHandler<C>>,
    after_set: Option<EventHandler<C>>,
}

impl<C> Definer<C> {
    // == Define ==
    /// Defines a property of type `T` with no default initializer.
    ///
    /// Fails with [`PropError::MissingCodec`] when no codec is registered for
    /// `T`.
    pub fn define<T: 'static>(&self, name: &str) -> Result<Prop<C, T>> {
        let codec = self.resolve::<T>()?;
        Ok(self.make(name, codec, None))
    }

    /// Defines a property of type `T` with a default initializer.
    ///
    /// The initializer runs on the first read that finds no stored value and
    /// whenever a dependency invalidates the cached default.
    pub fn define_with<T, F>(&self, name: &str, default_init: F) -> Result<Prop<C, T>>
    where
        T: 'static,
        F: Fn(&mut C) -> Result<T> + Send + Sync + 'static,
    {
        let codec = self.resolve::<T>()?;
        Ok(self.make(name, codec, Some(Arc::new(default_init))))
    }

    /// Defines a property with an explicit codec, bypassing the registry.
    pub fn define_with_codec<T>(&self, name: &str, codec: Codec<T>) -> Prop<C, T> {
        self.make(name, codec, None)
    }

    fn make<T>(
        &self,
        name: &str,
        codec: Codec<T>,
        default_init: Option<DefaultInit<C, T>>,
    ) -> Prop<C, T> {
        Prop::new(
            name,
            codec,
            default_init,
            self.after_init.clone(),
            self.after_get.clone(),
            self.after_set.clone(),
        )
    }

    fn resolve<T: 'static>(&self) -> Result<Codec<T>> {
        self.codecs
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Codec<T>>())
            .cloned()
            .ok_or(PropError::MissingCodec(type_name::<T>()))
    }
}

impl<C> Clone for Definer<C> {
    fn clone(&self) -> Self {
        Self {
            codecs: Arc::clone(&self.codecs),
            after_init: self.after_init.clone(),
            after_get: self.after_get.clone(),
            after_set: self.after_set.clone(),
        }
    }
}
