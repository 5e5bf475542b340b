#![forbid(unsafe_code)]

//! Snapshot-dispatch notification core.
//!
//! A [`Notifier<L>`] holds a set of shared listeners of type `Rc<L>`, where
//! `L` is usually a listener trait object such as
//! `dyn PropertyListener<T>`. Composing observables call
//! [`Notifier::notify`] with a closure that delivers their typed event plus a
//! back-reference to themselves.
//!
//! # Invariants
//!
//! 1. `notify` copies the listener set before invoking anyone. Listeners
//!    added or removed during a dispatch are seen by the next dispatch only.
//! 2. The notifier never holds a borrow of its listener set while a listener
//!    runs, so re-entrant `add_listener`/`remove_listener` are always legal.
//! 3. Listener identity is the `Rc` allocation. Registering the same
//!    allocation twice is a no-op.
//! 4. Moving a notifier moves its whole listener set. Nothing is
//!    re-subscribed and no event is emitted.
//!
//! # Failure Modes
//!
//! - `remove_listener` for an unknown listener returns `false`.
//! - The bare notifier emits nothing on drop; composing types decide what a
//!   final event looks like.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Whether two shared handles point at the same allocation.
///
/// Compares addresses only, so two `Rc<dyn Trait>` built from the same
/// allocation through different vtables still compare equal.
#[inline]
#[must_use]
pub fn same_rc<T: ?Sized>(a: &Rc<T>, b: &Rc<T>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Listener registry with snapshot-consistent dispatch.
pub struct Notifier<L: ?Sized> {
    listeners: RefCell<Vec<Rc<L>>>,
}

impl<L: ?Sized> Notifier<L> {
    /// Create a notifier with no listeners.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Register `listener`. Returns `false` if it was already registered.
    pub fn add_listener(&self, listener: Rc<L>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        if listeners.iter().any(|l| same_rc(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Unregister `listener`. Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Rc<L>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter().position(|l| same_rc(l, listener)) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether `listener` is currently registered.
    #[must_use]
    pub fn has_listener(&self, listener: &Rc<L>) -> bool {
        self.listeners.borrow().iter().any(|l| same_rc(l, listener))
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Invoke `deliver` once for every listener registered right now.
    pub fn notify(&self, mut deliver: impl FnMut(&L)) {
        let snapshot: Vec<Rc<L>> = self.listeners.borrow().clone();
        #[cfg(feature = "tracing")]
        tracing::trace!(listeners = snapshot.len(), "notify");
        for listener in &snapshot {
            deliver(listener);
        }
    }

    /// Move the listener set out, leaving this notifier empty.
    #[must_use]
    pub fn take(&self) -> Self {
        Self {
            listeners: RefCell::new(self.listeners.take()),
        }
    }

    /// Drop every registration.
    pub fn clear(&self) {
        let released = self.listeners.take();
        drop(released);
    }
}

impl<L: ?Sized> Default for Notifier<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> fmt::Debug for Notifier<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.len())
            .finish()
    }
}
