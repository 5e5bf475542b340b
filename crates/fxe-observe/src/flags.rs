//! Observable bit-flag set.
//!
//! [`FlagSet<F>`] wraps any [`bitflags::Flags`] type. Raising and clearing
//! report the exact bits that transitioned, so a listener never has to diff
//! old and new values itself.
//!
//! # Invariants
//!
//! 1. `on_raise(delta)`: `delta` is exactly the bits of the mask that were
//!    clear before the call. An empty delta emits nothing.
//! 2. `on_clear(delta)`: `delta` is exactly the bits of the mask that were
//!    set before the call. An empty delta emits nothing.
//! 3. Bits outside the named flags are preserved like any other bit.
//! 4. Dropping a set that still has bits raised emits one final `on_clear`
//!    carrying all of them.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use bitflags::Flags;

use crate::notifier::Notifier;

/// Receives bit transitions from a [`FlagSet`].
pub trait FlagListener<F: Flags + Copy> {
    /// The bits in `delta` went from clear to set.
    fn on_raise(&self, _flags: &FlagSet<F>, _delta: F) {}

    /// The bits in `delta` went from set to clear.
    fn on_clear(&self, _flags: &FlagSet<F>, _delta: F) {}
}

/// Observable bitmask.
pub struct FlagSet<F: Flags + Copy> {
    value: Cell<F>,
    notifier: Notifier<dyn FlagListener<F>>,
}

impl<F: Flags + Copy> FlagSet<F> {
    /// Create a set holding `value`.
    #[must_use]
    pub fn new(value: F) -> Self {
        Self {
            value: Cell::new(value),
            notifier: Notifier::new(),
        }
    }

    /// Current bits.
    #[must_use]
    pub fn get(&self) -> F {
        self.value.get()
    }

    /// Whether every bit of `mask` is raised.
    #[must_use]
    pub fn has_raised(&self, mask: F) -> bool {
        self.value.get().contains(mask)
    }

    /// Raise the bits of `mask`. Returns the bits that actually changed.
    pub fn raise(&self, mask: F) -> F {
        let current = self.value.get();
        let delta = mask.difference(current);
        if delta.is_empty() {
            return delta;
        }
        self.value.set(current.union(delta));
        self.notifier.notify(|l| l.on_raise(self, delta));
        delta
    }

    /// Clear the bits of `mask`. Returns the bits that actually changed.
    pub fn clear(&self, mask: F) -> F {
        let current = self.value.get();
        let delta = mask.intersection(current);
        if delta.is_empty() {
            return delta;
        }
        self.value.set(current.difference(delta));
        self.notifier.notify(|l| l.on_clear(self, delta));
        delta
    }

    /// Make the stored bits equal `value`, clearing first and raising second.
    pub fn assign(&self, value: F) {
        let current = self.value.get();
        self.clear(current.difference(value));
        self.raise(value);
    }

    /// Register a listener. Returns `false` if it was already registered.
    pub fn add_listener(&self, listener: Rc<dyn FlagListener<F>>) -> bool {
        self.notifier.add_listener(listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Rc<dyn FlagListener<F>>) -> bool {
        self.notifier.remove_listener(listener)
    }
}

impl<F: Flags + Copy> Default for FlagSet<F> {
    fn default() -> Self {
        Self::new(F::empty())
    }
}

impl<F: Flags + Copy> Drop for FlagSet<F> {
    fn drop(&mut self) {
        let remaining = self.value.get();
        if remaining.is_empty() {
            return;
        }
        let this: &Self = self;
        this.value.set(F::empty());
        this.notifier.notify(|l| l.on_clear(this, remaining));
    }
}

impl<F: Flags + Copy + fmt::Debug> fmt::Debug for FlagSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSet")
            .field("value", &self.value.get())
            .field("listeners", &self.notifier.len())
            .finish()
    }
}
