#![forbid(unsafe_code)]

//! Owning and observing object handles.
//!
//! [`Ref<T>`] holds its target strongly; [`Ptr<T>`] holds it weakly and
//! reports "unassigned" once the last owner elsewhere let go. Both signal
//! `on_assign` whenever the held identity changes.
//!
//! # Invariants
//!
//! 1. Assigning the identity already held (including `None` to an empty
//!    handle) is a silent no-op.
//! 2. Listeners run after the new target is stored. A `Ref` releases its
//!    previous target only after every listener ran.
//! 3. A `Ptr` whose target died does not signal; it reads as unassigned.
//! 4. Dropping a handle that still holds a live target emits exactly one
//!    `on_assign(None)`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::notifier::{Notifier, same_rc};

fn same_target<T: ?Sized>(a: Option<&Rc<T>>, b: Option<&Rc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same_rc(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Receives reassignments of a [`Ref`].
pub trait RefListener<T: ?Sized> {
    /// `handle` now holds `target`.
    fn on_assign(&self, handle: &Ref<T>, target: Option<&Rc<T>>);
}

/// Receives reassignments of a [`Ptr`].
pub trait PtrListener<T: ?Sized> {
    /// `handle` now points at `target`.
    fn on_assign(&self, handle: &Ptr<T>, target: Option<&Rc<T>>);
}

// ---------------------------------------------------------------------------
// Ref
// ---------------------------------------------------------------------------

/// Observable owning handle.
pub struct Ref<T: ?Sized> {
    target: RefCell<Option<Rc<T>>>,
    notifier: Notifier<dyn RefListener<T>>,
}

impl<T: ?Sized> Ref<T> {
    /// Create an unassigned handle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            target: RefCell::new(None),
            notifier: Notifier::new(),
        }
    }

    /// Current target.
    #[must_use]
    pub fn assigned(&self) -> Option<Rc<T>> {
        self.target.borrow().clone()
    }

    /// Whether the handle holds a target.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.target.borrow().is_some()
    }

    /// Hold `target` instead of the current one. Returns whether the held
    /// identity changed.
    pub fn assign(&self, target: Option<Rc<T>>) -> bool {
        if same_target(self.target.borrow().as_ref(), target.as_ref()) {
            return false;
        }
        let event = target.clone();
        let previous = self.target.replace(target);
        self.notifier.notify(|l| l.on_assign(self, event.as_ref()));
        drop(previous);
        true
    }

    /// Register a listener. Returns `false` if it was already registered.
    pub fn add_listener(&self, listener: Rc<dyn RefListener<T>>) -> bool {
        self.notifier.add_listener(listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Rc<dyn RefListener<T>>) -> bool {
        self.notifier.remove_listener(listener)
    }
}

impl<T: ?Sized> Default for Ref<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Drop for Ref<T> {
    fn drop(&mut self) {
        if self.is_assigned() && !self.notifier.is_empty() {
            self.assign(None);
        }
    }
}

impl<T: ?Sized> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("assigned", &self.is_assigned())
            .field("listeners", &self.notifier.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Ptr
// ---------------------------------------------------------------------------

/// Observable weak handle.
pub struct Ptr<T: ?Sized> {
    target: RefCell<Option<Weak<T>>>,
    notifier: Notifier<dyn PtrListener<T>>,
}

impl<T: ?Sized> Ptr<T> {
    /// Create an unassigned handle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            target: RefCell::new(None),
            notifier: Notifier::new(),
        }
    }

    /// Current target, if it is still alive.
    #[must_use]
    pub fn assigned(&self) -> Option<Rc<T>> {
        self.target.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Whether the handle points at a live target.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.assigned().is_some()
    }

    /// Point at `target` without keeping it alive. Returns whether the
    /// observed identity changed.
    pub fn assign(&self, target: Option<&Rc<T>>) -> bool {
        let current = self.assigned();
        if same_target(current.as_ref(), target) {
            return false;
        }
        *self.target.borrow_mut() = target.map(Rc::downgrade);
        self.notifier.notify(|l| l.on_assign(self, target));
        drop(current);
        true
    }

    /// Register a listener. Returns `false` if it was already registered.
    pub fn add_listener(&self, listener: Rc<dyn PtrListener<T>>) -> bool {
        self.notifier.add_listener(listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Rc<dyn PtrListener<T>>) -> bool {
        self.notifier.remove_listener(listener)
    }
}

impl<T: ?Sized> Default for Ptr<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Drop for Ptr<T> {
    fn drop(&mut self) {
        if !self.notifier.is_empty() && self.is_assigned() {
            self.assign(None);
        }
    }
}

impl<T: ?Sized> fmt::Debug for Ptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ptr")
            .field("assigned", &self.is_assigned())
            .field("listeners", &self.notifier.len())
            .finish()
    }
}
