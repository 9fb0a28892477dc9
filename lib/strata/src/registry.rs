//! Ordered middleware registry and the stack builder.
//!
//! The registry is an ordered sequence of component registrations, folded
//! into a handler chain by [`Registry::assemble`] on every request so that
//! registrations changed between calls are always honored.
//!
//! Storage order is wrap order: the entry at index 0 wraps the terminal
//! first (innermost), later entries wrap around it. Non-compatibility
//! components are inserted at the front, so the first-enabled one ends up
//! outermost among them; the [`Compatibility`] bridge is pinned at the back
//! and therefore always wraps last, at the boundary nearest the caller.

use std::any::TypeId;

use crate::bridge::Compatibility;
use crate::chain::{BoxHandler, Component};

/// One registration: a component and its identity.
struct Registration {
    id: TypeId,
    name: &'static str,
    component: Box<dyn Component>,
}

impl Registration {
    fn of<C: Component>(component: C) -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
            component: Box::new(component),
        }
    }
}

/// Ordered collection of enabled middleware components.
///
/// A new registry holds the single default [`Compatibility`] registration.
/// Component identity is the component's type: enabling an already-enabled
/// type replaces its registration in place of duplicating it.
pub struct Registry {
    entries: Vec<Registration>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            entries: vec![Registration::of(Compatibility)],
        }
    }
}

impl Registry {
    /// Creates a registry with the default [`Compatibility`] entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables a component, replacing any registration of the same type.
    ///
    /// [`Compatibility`] keeps its pinned outermost slot; any other
    /// component is inserted at the innermost end.
    pub fn enable<C: Component>(&mut self, component: C) {
        self.disable::<C>();
        let registration = Registration::of(component);
        if registration.id == TypeId::of::<Compatibility>() {
            self.entries.push(registration);
        } else {
            self.entries.insert(0, registration);
        }
    }

    /// Disables a component by type; no-op when absent.
    pub fn disable<C: Component>(&mut self) {
        self.entries.retain(|entry| entry.id != TypeId::of::<C>());
    }

    /// Returns `true` if a component of this type is enabled.
    #[must_use]
    pub fn enabled<C: Component>(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.id == TypeId::of::<C>())
    }

    /// Clears everything back to the single default [`Compatibility`] entry.
    pub fn reset(&mut self) {
        self.entries = vec![Registration::of(Compatibility)];
    }

    /// Number of enabled registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Type names of the registrations, in wrap order (innermost first).
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }

    /// Folds the registrations around the terminal handler, innermost first,
    /// producing the composed chain.
    #[must_use]
    pub fn assemble(&self, terminal: BoxHandler) -> BoxHandler {
        self.entries
            .iter()
            .fold(terminal, |inner, entry| entry.component.wrap(inner))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.names())
            .finish()
    }
}
