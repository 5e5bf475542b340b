#![forbid(unsafe_code)]

//! Grouped listener lifetimes.
//!
//! A view usually attaches listeners to many observables of one object and
//! must detach all of them when it goes away. [`ListenerScope`] records one
//! detach action per attachment and runs them together.
//!
//! The scope never keeps an observable alive: it holds the owner (or the
//! observable itself) weakly, and a detach whose owner is already gone does
//! nothing.
//!
//! # Invariants
//!
//! 1. Detach actions run in reverse attachment order, on drop or `clear`.
//! 2. After `clear` or drop, no listener attached through this scope is still
//!    registered on a live observable.
//! 3. `clear` leaves the scope reusable.

use std::fmt;
use std::rc::{Rc, Weak};

use bitflags::Flags;

use crate::flags::{FlagListener, FlagSet};
use crate::handle::{Ptr, PtrListener, Ref, RefListener};
use crate::list::{List, ListListener};
use crate::property::{Property, PropertyListener};
use crate::sequence::{Sequence, SequenceListener};
use crate::set::{Set, SetListener};
use crate::vector::{Vector, VectorListener};

/// An observable that accepts listeners of one trait-object type.
pub trait Listenable {
    /// The listener trait object, e.g. `dyn PropertyListener<T>`.
    type Listener: ?Sized;

    /// Register `listener`. Returns `false` if it was already registered.
    fn attach(&self, listener: Rc<Self::Listener>) -> bool;

    /// Unregister `listener`. Returns `false` if it was not registered.
    fn detach(&self, listener: &Rc<Self::Listener>) -> bool;
}

macro_rules! impl_listenable {
    ($([$($gen:tt)*] $ty:ty => $listener:ty;)*) => {
        $(
            impl<$($gen)*> Listenable for $ty {
                type Listener = $listener;

                fn attach(&self, listener: Rc<Self::Listener>) -> bool {
                    self.add_listener(listener)
                }

                fn detach(&self, listener: &Rc<Self::Listener>) -> bool {
                    self.remove_listener(listener)
                }
            }
        )*
    };
}

impl_listenable! {
    [T: 'static] Property<T> => dyn PropertyListener<T>;
    [F: Flags + Copy + 'static] FlagSet<F> => dyn FlagListener<F>;
    [T: 'static] List<T> => dyn ListListener<T>;
    [T: 'static] Vector<T> => dyn VectorListener<T>;
    [T: ?Sized + 'static] Set<T> => dyn SetListener<T>;
    [T: ?Sized + 'static] Sequence<T> => dyn SequenceListener<T>;
    [T: ?Sized + 'static] Ref<T> => dyn RefListener<T>;
    [T: ?Sized + 'static] Ptr<T> => dyn PtrListener<T>;
}

/// Detaches a group of listeners together.
///
/// # Usage
///
/// ```
/// use fxe_observe::{ListenerScope, Property, PropertyListener};
/// use std::rc::Rc;
///
/// struct Light {
///     dimmer: Property<f32>,
/// }
///
/// struct Redraw;
/// impl PropertyListener<f32> for Redraw {
///     fn on_set(&self, _p: &Property<f32>, _v: &f32) {}
/// }
///
/// let light = Rc::new(Light { dimmer: Property::new(1.0) });
/// let mut scope = ListenerScope::new();
/// let redraw: Rc<dyn PropertyListener<f32>> = Rc::new(Redraw);
/// scope.attach(&light, |l: &Light| &l.dimmer, redraw);
/// assert_eq!(light.dimmer.listener_count(), 1);
/// drop(scope);
/// assert_eq!(light.dimmer.listener_count(), 0);
/// ```
#[derive(Default)]
pub struct ListenerScope {
    detachers: Vec<Box<dyn FnOnce()>>,
}

impl ListenerScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            detachers: Vec::new(),
        }
    }

    /// Attach `listener` to the observable `select` picks out of `owner`.
    ///
    /// The detach action holds `owner` weakly.
    pub fn attach<O, S>(
        &mut self,
        owner: &Rc<O>,
        select: fn(&O) -> &S,
        listener: Rc<S::Listener>,
    ) -> &mut Self
    where
        O: ?Sized + 'static,
        S: Listenable + ?Sized + 'static,
        S::Listener: 'static,
    {
        select(owner).attach(Rc::clone(&listener));
        let owner = Rc::downgrade(owner);
        self.detachers.push(Box::new(move || {
            if let Some(owner) = owner.upgrade() {
                select(&owner).detach(&listener);
            }
        }));
        self
    }

    /// Attach `listener` to a shared observable.
    pub fn attach_to<S>(&mut self, source: &Rc<S>, listener: Rc<S::Listener>) -> &mut Self
    where
        S: Listenable + ?Sized + 'static,
        S::Listener: 'static,
    {
        source.attach(Rc::clone(&listener));
        let source: Weak<S> = Rc::downgrade(source);
        self.detachers.push(Box::new(move || {
            if let Some(source) = source.upgrade() {
                source.detach(&listener);
            }
        }));
        self
    }

    /// Record an arbitrary action to run when the scope is cleared.
    pub fn hold(&mut self, detach: impl FnOnce() + 'static) {
        self.detachers.push(Box::new(detach));
    }

    /// Number of recorded attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.detachers.len()
    }

    /// Whether nothing is left to detach.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detachers.is_empty()
    }

    /// Detach everything now, newest first.
    pub fn clear(&mut self) {
        while let Some(detach) = self.detachers.pop() {
            detach();
        }
    }
}

impl Drop for ListenerScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for ListenerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerScope")
            .field("attachments", &self.detachers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Emitter {
        speed: Property<f32>,
        keys: Vector<u8>,
        target: Ptr<u32>,
    }

    #[derive(Default)]
    struct Hits(Cell<u32>);

    impl PropertyListener<f32> for Hits {
        fn on_set(&self, _property: &Property<f32>, _value: &f32) {
            self.0.set(self.0.get() + 1);
        }
    }

    impl VectorListener<u8> for Hits {
        fn on_insert(&self, _vector: &Vector<u8>, _pos: usize) {
            self.0.set(self.0.get() + 1);
        }
    }

    impl PtrListener<u32> for Hits {
        fn on_assign(&self, _handle: &Ptr<u32>, _target: Option<&Rc<u32>>) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn drop_detaches_everything() {
        let emitter = Rc::new(Emitter::default());
        let hits = Rc::new(Hits::default());
        {
            let mut scope = ListenerScope::new();
            let speed: Rc<dyn PropertyListener<f32>> = hits.clone();
            let keys: Rc<dyn VectorListener<u8>> = hits.clone();
            let target: Rc<dyn PtrListener<u32>> = hits.clone();
            scope
                .attach(&emitter, |e: &Emitter| &e.speed, speed)
                .attach(&emitter, |e: &Emitter| &e.keys, keys)
                .attach(&emitter, |e: &Emitter| &e.target, target);
            assert_eq!(scope.len(), 3);

            emitter.speed.set(2.0);
            emitter.keys.push_back(1);
            assert_eq!(hits.0.get(), 2);
        }
        emitter.speed.set(3.0);
        emitter.keys.push_back(2);
        emitter.target.assign(Some(&Rc::new(1)));
        assert_eq!(hits.0.get(), 2);
    }

    #[test]
    fn clear_runs_newest_first_and_is_reusable() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut scope = ListenerScope::new();
        for n in 0..3 {
            let order = order.clone();
            scope.hold(move || order.borrow_mut().push(n));
        }
        scope.clear();
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
        assert!(scope.is_empty());

        let shared = Rc::new(Property::new(0.0_f32));
        let hits = Rc::new(Hits::default());
        let listener: Rc<dyn PropertyListener<f32>> = hits.clone();
        scope.attach_to(&shared, listener);
        shared.set(1.0);
        scope.clear();
        shared.set(2.0);
        assert_eq!(hits.0.get(), 1);
    }

    #[test]
    fn scope_does_not_keep_owner_alive() {
        let emitter = Rc::new(Emitter::default());
        let weak = Rc::downgrade(&emitter);
        let mut scope = ListenerScope::new();
        let listener: Rc<dyn PropertyListener<f32>> = Rc::new(Hits::default());
        scope.attach(&emitter, |e: &Emitter| &e.speed, listener);
        drop(emitter);
        assert!(weak.upgrade().is_none());
        scope.clear();
    }
}
