#![forbid(unsafe_code)]

//! Single-value observable.
//!
//! [`Property<T>`] stores one value and tells its listeners when the value
//! changes. Equality decides what "changes" means: setting a value equal to
//! the stored one is a silent no-op.
//!
//! # Invariants
//!
//! 1. `on_set` fires iff the new value differs from the previous one.
//! 2. Listeners observe the stored value already updated; the event carries
//!    the value that was set, even if an earlier listener set another one.
//! 3. The stored value is never borrowed while a listener runs.
//!
//! # Example
//!
//! ```
//! use fxe_observe::Property;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let name = Property::new(String::from("Scene Root"));
//! let hits = Rc::new(Cell::new(0));
//! let h = Rc::clone(&hits);
//! let _listener = name.subscribe(move |_| h.set(h.get() + 1));
//!
//! name.set("Scene Root".to_string());
//! assert_eq!(hits.get(), 0);
//! name.set("Sparks".to_string());
//! assert_eq!(hits.get(), 1);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::notifier::Notifier;

/// Receives value changes from a [`Property`].
pub trait PropertyListener<T> {
    /// `property` now holds `value`, which differs from what it held before.
    fn on_set(&self, property: &Property<T>, value: &T);
}

/// Adapter turning a closure into a [`PropertyListener`].
struct FnListener<F>(F);

impl<T, F: Fn(&T)> PropertyListener<T> for FnListener<F> {
    fn on_set(&self, _property: &Property<T>, value: &T) {
        (self.0)(value);
    }
}

/// Observable single value.
pub struct Property<T> {
    value: RefCell<T>,
    notifier: Notifier<dyn PropertyListener<T>>,
}

impl<T> Property<T> {
    /// Create a property holding `value`, with no listeners.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            notifier: Notifier::new(),
        }
    }

    /// Read the value through a closure without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Register a listener. Returns `false` if it was already registered.
    pub fn add_listener(&self, listener: Rc<dyn PropertyListener<T>>) -> bool {
        self.notifier.add_listener(listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Rc<dyn PropertyListener<T>>) -> bool {
        self.notifier.remove_listener(listener)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.notifier.len()
    }
}

impl<T: Clone> Property<T> {
    /// Clone the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Store `value`, notifying listeners if it differs from the current one.
    ///
    /// Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        if *self.value.borrow() == value {
            return false;
        }
        let event = value.clone();
        let previous = self.value.replace(value);
        self.notifier.notify(|l| l.on_set(self, &event));
        drop(previous);
        true
    }

    /// Store `value` and return the previous one, with the same notification
    /// rule as [`Property::set`].
    pub fn replace(&self, value: T) -> T {
        if *self.value.borrow() == value {
            return value;
        }
        let event = value.clone();
        let previous = self.value.replace(value);
        self.notifier.notify(|l| l.on_set(self, &event));
        previous
    }
}

impl<T: 'static> Property<T> {
    /// Register a closure as a listener.
    ///
    /// Keep the returned handle to unregister it later with
    /// [`Property::remove_listener`].
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Rc<dyn PropertyListener<T>> {
        let listener: Rc<dyn PropertyListener<T>> = Rc::new(FnListener(callback));
        self.notifier.add_listener(Rc::clone(&listener));
        listener
    }
}

impl<T: Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.value.borrow())
            .field("listeners", &self.notifier.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<i32>>,
    }

    impl PropertyListener<i32> for Recorder {
        fn on_set(&self, _property: &Property<i32>, value: &i32) {
            self.seen.borrow_mut().push(*value);
        }
    }

    #[test]
    fn set_signals_only_on_change() {
        let p = Property::new(1);
        let rec = Rc::new(Recorder::default());
        p.add_listener(rec.clone());

        assert!(!p.set(1));
        assert!(p.set(2));
        assert!(!p.set(2));
        assert!(!p.set(2));
        assert!(p.set(3));
        assert_eq!(*rec.seen.borrow(), vec![2, 3]);
        assert_eq!(p.get(), 3);
    }

    #[test]
    fn replace_returns_previous() {
        let p = Property::new(String::from("a"));
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _l = p.subscribe(move |_| h.set(h.get() + 1));

        assert_eq!(p.replace("b".into()), "a");
        assert_eq!(p.replace("b".into()), "b");
        assert_eq!(hits.get(), 1);
    }

    /// Writes the value back from inside the listener.
    struct Clamp;

    impl PropertyListener<i32> for Clamp {
        fn on_set(&self, property: &Property<i32>, value: &i32) {
            if *value > 10 {
                property.set(10);
            }
        }
    }

    #[test]
    fn listener_may_set_reentrantly() {
        let p = Property::new(0);
        let rec = Rc::new(Recorder::default());
        p.add_listener(Rc::new(Clamp));
        p.add_listener(rec.clone());

        p.set(42);
        assert_eq!(p.get(), 10);
        // Inner dispatch delivered 10 first, then the outer one finished with 42.
        assert_eq!(*rec.seen.borrow(), vec![10, 42]);
    }

    #[test]
    fn nan_is_never_equal() {
        let p = Property::new(f32::NAN);
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _l = p.subscribe(move |_| h.set(h.get() + 1));
        p.set(f32::NAN);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn moved_property_keeps_listeners() {
        let rec = Rc::new(Recorder::default());
        let p = Property::new(0);
        p.add_listener(rec.clone());
        let moved = Box::new(p);
        moved.set(5);
        assert_eq!(*rec.seen.borrow(), vec![5]);
        assert_eq!(moved.listener_count(), 1);
    }

    #[test]
    fn removed_listener_is_silent() {
        let p = Property::new(0);
        let listener = p.subscribe(|_| panic!("must not fire"));
        assert!(p.remove_listener(&listener));
        p.set(1);
    }
}
