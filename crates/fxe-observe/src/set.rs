//! Unordered owning membership set.
//!
//! A [`Set<T>`] owns its members (`Rc<T>`) and identifies them by allocation,
//! never by value: two equal values in distinct allocations are distinct
//! members.
//!
//! # Invariants
//!
//! 1. `add` of a present member and `remove` of an absent one are silent
//!    no-ops.
//! 2. Bulk operations (`clear`, drop) emit one `on_remove` per member, most
//!    recently added first.
//! 3. `on_add` fires after the member is in the set; `on_remove` after it
//!    left. The set keeps the removed member alive until listeners ran.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::notifier::{Notifier, same_rc};

/// Receives membership changes from a [`Set`].
pub trait SetListener<T: ?Sized> {
    /// `member` joined the set.
    fn on_add(&self, _set: &Set<T>, _member: &Rc<T>) {}

    /// `member` left the set.
    fn on_remove(&self, _set: &Set<T>, _member: &Rc<T>) {}
}

/// Observable owning set with identity membership.
pub struct Set<T: ?Sized> {
    members: RefCell<Vec<Rc<T>>>,
    notifier: Notifier<dyn SetListener<T>>,
}

impl<T: ?Sized> Set<T> {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            members: RefCell::new(Vec::new()),
            notifier: Notifier::new(),
        }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// Whether `member` belongs to the set.
    #[must_use]
    pub fn has(&self, member: &Rc<T>) -> bool {
        self.members.borrow().iter().any(|m| same_rc(m, member))
    }

    /// Members in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Rc<T>> {
        self.members.borrow().clone()
    }

    /// Take ownership of `member`. Returns `false` if it was already present.
    pub fn add(&self, member: Rc<T>) -> bool {
        {
            let mut members = self.members.borrow_mut();
            if members.iter().any(|m| same_rc(m, &member)) {
                return false;
            }
            members.push(Rc::clone(&member));
        }
        self.notifier.notify(|l| l.on_add(self, &member));
        true
    }

    /// Release `member`. Returns `false` if it was not present.
    pub fn remove(&self, member: &Rc<T>) -> bool {
        let removed = {
            let mut members = self.members.borrow_mut();
            match members.iter().position(|m| same_rc(m, member)) {
                Some(index) => members.remove(index),
                None => return false,
            }
        };
        self.notifier.notify(|l| l.on_remove(self, &removed));
        true
    }

    /// Remove every member, most recently added first.
    pub fn clear(&self) {
        loop {
            let last = self.members.borrow_mut().pop();
            let Some(removed) = last else { break };
            self.notifier.notify(|l| l.on_remove(self, &removed));
        }
    }

    /// Make the membership equal `members`: absent ones are removed (newest
    /// first), missing ones are added in the given order.
    pub fn reconcile(&self, members: &[Rc<T>]) {
        for existing in self.to_vec().iter().rev() {
            if !members.iter().any(|m| same_rc(m, existing)) {
                self.remove(existing);
            }
        }
        for member in members {
            self.add(Rc::clone(member));
        }
    }

    /// Register a listener. Returns `false` if it was already registered.
    pub fn add_listener(&self, listener: Rc<dyn SetListener<T>>) -> bool {
        self.notifier.add_listener(listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Rc<dyn SetListener<T>>) -> bool {
        self.notifier.remove_listener(listener)
    }
}

impl<T: ?Sized> Default for Set<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Drop for Set<T> {
    fn drop(&mut self) {
        if !self.notifier.is_empty() {
            self.clear();
        }
    }
}

impl<T: ?Sized> fmt::Debug for Set<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Set")
            .field("len", &self.len())
            .field("listeners", &self.notifier.len())
            .finish()
    }
}
