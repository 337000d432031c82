//! Handler registry.
//!
//! [`HandlerRegistry`] holds the named handlers of a pipeline and decides the
//! order they run in.
//!
//! # Ordering
//!
//! Handlers run by ascending [`order`](HandlerDescriptor::order). Handlers
//! sharing an order run in registration sequence, so the execution order is
//! the total order `(order, registration index)`. Handlers registered without
//! an order get [`DEFAULT_ORDER`](crate::DEFAULT_ORDER) and therefore run
//! after explicitly early handlers, before explicitly late ones, and in
//! registration sequence among themselves.
//!
//! The sorted order is computed on first use and cached until the registry
//! changes.
//!
//! # Replacement
//!
//! Registering a name that is already present replaces that handler. The
//! replacement takes over the original registration slot, so among equal
//! orders it keeps the position of the handler it replaced.
//!
//! ```rust
//! use chatter_render::{HandlerDescriptor, HandlerRegistry};
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register(HandlerDescriptor::from_fn("late", |r, _| Ok(r)))?;
//! registry.register(HandlerDescriptor::from_fn("early", |r, _| Ok(r)).with_order(10))?;
//!
//! assert_eq!(registry.names(), vec!["early", "late"]);
//! # Ok::<(), chatter_render::RegistryError>(())
//! ```

use std::slice;

use once_cell::sync::OnceCell;

use crate::error::RegistryError;
use crate::handler::HandlerDescriptor;
use crate::tags::TagSet;

/// Named handlers with a deterministic execution order.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    /// Handlers in registration order.
    handlers: Vec<HandlerDescriptor>,
    /// Indices into `handlers`, sorted by execution order. Reset on mutation.
    order: OnceCell<Vec<usize>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler, or replaces the one registered under the same name.
    ///
    /// Descriptors without a name are rejected and leave the registry
    /// unchanged.
    pub fn register(&mut self, descriptor: HandlerDescriptor) -> Result<(), RegistryError> {
        if descriptor.name().is_empty() {
            tracing::warn!(
                order = descriptor.order(),
                "ignoring handler registration without a name"
            );
            return Err(RegistryError::MissingName);
        }

        match self.position(descriptor.name()) {
            Some(slot) => {
                tracing::debug!(
                    handler = descriptor.name(),
                    order = descriptor.order(),
                    "replacing handler"
                );
                self.handlers[slot] = descriptor;
            }
            None => {
                tracing::debug!(
                    handler = descriptor.name(),
                    order = descriptor.order(),
                    "registering handler"
                );
                self.handlers.push(descriptor);
            }
        }

        self.invalidate();
        Ok(())
    }

    /// Adds a handler, builder style.
    pub fn with(mut self, descriptor: HandlerDescriptor) -> Result<Self, RegistryError> {
        self.register(descriptor)?;
        Ok(self)
    }

    /// Removes a handler by name, returning it.
    ///
    /// Handlers are meant to be registered once at startup; removal exists
    /// so tests can reshape a registry.
    pub fn unregister(&mut self, name: &str) -> Option<HandlerDescriptor> {
        let slot = self.position(name)?;
        let removed = self.handlers.remove(slot);
        self.invalidate();
        Some(removed)
    }

    pub fn get(&self, name: &str) -> Option<&HandlerDescriptor> {
        self.position(name).map(|slot| &self.handlers[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Names of all handlers in execution order, ignoring tags.
    pub fn names(&self) -> Vec<&str> {
        self.sorted()
            .iter()
            .map(|&index| self.handlers[index].name())
            .collect()
    }

    /// Returns the handlers that run for `enabled`, in execution order.
    ///
    /// The iterator is lazy and can be restarted by cloning it before use.
    /// Handlers whose required tags are not all in `enabled` are skipped.
    pub fn ordered_handlers<'a>(&'a self, enabled: &'a TagSet) -> OrderedHandlers<'a> {
        OrderedHandlers {
            handlers: &self.handlers,
            indices: self.sorted().iter(),
            enabled,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.handlers.iter().position(|h| h.name() == name)
    }

    fn invalidate(&mut self) {
        self.order = OnceCell::new();
    }

    fn sorted(&self) -> &[usize] {
        self.order.get_or_init(|| {
            let mut indices: Vec<usize> = (0..self.handlers.len()).collect();
            // Stable sort: equal orders stay in registration sequence.
            indices.sort_by_key(|&index| self.handlers[index].order());
            tracing::debug!(handlers = indices.len(), "rebuilt handler order");
            indices
        })
    }
}

/// Iterator over the enabled handlers of a registry, in execution order.
#[derive(Debug, Clone)]
pub struct OrderedHandlers<'a> {
    handlers: &'a [HandlerDescriptor],
    indices: slice::Iter<'a, usize>,
    enabled: &'a TagSet,
}

impl<'a> Iterator for OrderedHandlers<'a> {
    type Item = &'a HandlerDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        for &index in self.indices.by_ref() {
            let handler = &self.handlers[index];
            if handler.is_enabled_by(self.enabled) {
                return Some(handler);
            }
            tracing::trace!(
                handler = handler.name(),
                required = ?handler.required_tags(),
                "skipping handler, required tags not active"
            );
        }
        None
    }
}
