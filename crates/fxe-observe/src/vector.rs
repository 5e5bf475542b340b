#![forbid(unsafe_code)]

//! Ordered observable collection with contiguous storage.
//!
//! A [`Vector<T>`] keeps its elements in one `Vec` of shared element
//! handles. Inserts, erases and resizes shift elements to new positions;
//! observables nested inside an element keep their listener registrations
//! because a listener is handed its observable at dispatch time instead of
//! remembering a position.
//!
//! Element access clones the handle out, so no borrow of the vector is held
//! while a nested observable dispatches. A listener on an element's property
//! may change the vector's structure.
//!
//! # Invariants
//!
//! 1. `on_insert(pos)` fires after the element is in place at `pos`.
//! 2. `on_erase(pos, removed)` fires after the element left `pos`.
//! 3. One event per element; `resize`, `clear` and drop never batch.
//! 4. `clear` and drop erase from the back towards the front.
//!
//! # Failure Modes
//!
//! - Out-of-range `erase`/`at` return `None`; `insert` past the end appends.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::notifier::Notifier;

/// Receives structural changes from a [`Vector`].
pub trait VectorListener<T> {
    /// An element was inserted at `pos`.
    fn on_insert(&self, _vector: &Vector<T>, _pos: usize) {}

    /// `removed` was erased from `pos`.
    fn on_erase(&self, _vector: &Vector<T>, _pos: usize, _removed: &T) {}
}

/// Observable contiguous vector.
pub struct Vector<T> {
    items: RefCell<Vec<Rc<T>>>,
    notifier: Notifier<dyn VectorListener<T>>,
}

impl<T> Vector<T> {
    /// Create an empty vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: RefCell::new(Vec::new()),
            notifier: Notifier::new(),
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether the vector has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// The element at `pos`.
    #[must_use]
    pub fn at(&self, pos: usize) -> Option<Rc<T>> {
        self.items.borrow().get(pos).cloned()
    }

    #[must_use]
    pub fn front(&self) -> Option<Rc<T>> {
        self.at(0)
    }

    #[must_use]
    pub fn back(&self) -> Option<Rc<T>> {
        self.items.borrow().last().cloned()
    }

    /// Visit every element in order. `f` may change the vector; the visit
    /// covers the elements present when it started.
    pub fn for_each(&self, mut f: impl FnMut(usize, &T)) {
        let items = self.items.borrow().clone();
        for (pos, item) in items.iter().enumerate() {
            f(pos, item);
        }
    }

    /// Insert `value` at `pos`. A position past the end appends. Returns the
    /// position actually used.
    pub fn insert(&self, pos: usize, value: T) -> usize {
        let pos = {
            let mut items = self.items.borrow_mut();
            let pos = pos.min(items.len());
            items.insert(pos, Rc::new(value));
            pos
        };
        self.notifier.notify(|l| l.on_insert(self, pos));
        pos
    }

    /// Prepend `value`.
    pub fn push_front(&self, value: T) {
        self.insert(0, value);
    }

    /// Append `value`.
    pub fn push_back(&self, value: T) {
        self.insert(usize::MAX, value);
    }

    /// Erase the element at `pos`, returning it.
    pub fn erase(&self, pos: usize) -> Option<Rc<T>> {
        let removed = {
            let mut items = self.items.borrow_mut();
            if pos >= items.len() {
                return None;
            }
            items.remove(pos)
        };
        self.notifier.notify(|l| l.on_erase(self, pos, &removed));
        Some(removed)
    }

    /// Erase the first element.
    pub fn pop_front(&self) -> Option<Rc<T>> {
        self.erase(0)
    }

    /// Erase the last element.
    pub fn pop_back(&self) -> Option<Rc<T>> {
        let len = self.len();
        len.checked_sub(1).and_then(|last| self.erase(last))
    }

    /// Erase every element, last first.
    pub fn clear(&self) {
        while self.pop_back().is_some() {}
    }

    /// Register a listener. Returns `false` if it was already registered.
    pub fn add_listener(&self, listener: Rc<dyn VectorListener<T>>) -> bool {
        self.notifier.add_listener(listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Rc<dyn VectorListener<T>>) -> bool {
        self.notifier.remove_listener(listener)
    }
}

impl<T: Default> Vector<T> {
    /// Grow with default elements or shrink from the back until `len == n`.
    pub fn resize(&self, n: usize) {
        while self.len() > n {
            self.pop_back();
        }
        while self.len() < n {
            self.push_back(T::default());
        }
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Vector<T> {
    fn drop(&mut self) {
        if !self.notifier.is_empty() {
            self.clear();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.borrow().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{Property, PropertyListener};
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Key {
        time: Property<f32>,
    }

    #[derive(Default)]
    struct Hits(Cell<u32>);

    impl PropertyListener<f32> for Hits {
        fn on_set(&self, _property: &Property<f32>, _value: &f32) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<(char, usize)>>,
    }

    impl VectorListener<Key> for Recorder {
        fn on_insert(&self, _vector: &Vector<Key>, pos: usize) {
            self.seen.borrow_mut().push(('+', pos));
        }

        fn on_erase(&self, _vector: &Vector<Key>, pos: usize, _removed: &Key) {
            self.seen.borrow_mut().push(('-', pos));
        }
    }

    #[test]
    fn nested_listener_survives_relocation() {
        let keys: Vector<Key> = Vector::new();
        keys.push_back(Key::default());
        let hits = Rc::new(Hits::default());
        keys.at(0).expect("present").time.add_listener(hits.clone());

        // Force several reallocations and shifts of the watched element.
        for _ in 0..64 {
            keys.push_front(Key::default());
        }
        keys.erase(0);
        keys.resize(200);

        let watched = 63;
        keys.at(watched).expect("present").time.set(1.5);
        assert_eq!(hits.0.get(), 1);
        assert_eq!(keys.at(watched).expect("present").time.get(), 1.5);
    }

    #[test]
    fn events_carry_exact_positions() {
        let keys: Vector<Key> = Vector::new();
        let rec = Rc::new(Recorder::default());
        keys.add_listener(rec.clone());
        keys.push_back(Key::default());
        keys.push_back(Key::default());
        keys.insert(1, Key::default());
        keys.erase(0);
        keys.resize(0);
        assert_eq!(
            *rec.seen.borrow(),
            vec![('+', 0), ('+', 1), ('+', 1), ('-', 0), ('-', 1), ('-', 0)]
        );
    }

    #[test]
    fn erased_element_is_handed_to_listener() {
        struct Check;
        impl VectorListener<i32> for Check {
            fn on_erase(&self, vector: &Vector<i32>, pos: usize, removed: &i32) {
                assert_eq!(*removed, 7);
                assert_eq!(pos, 1);
                assert_eq!(vector.len(), 2);
            }
        }
        let v = Vector::new();
        v.push_back(1);
        v.push_back(7);
        v.push_back(9);
        let check: Rc<dyn VectorListener<i32>> = Rc::new(Check);
        v.add_listener(Rc::clone(&check));
        assert_eq!(v.erase(1).as_deref(), Some(&7));
        assert!(v.remove_listener(&check));
    }

    #[test]
    fn nested_listener_may_restructure_the_vector() {
        struct Grow(Rc<Vector<Key>>);
        impl PropertyListener<f32> for Grow {
            fn on_set(&self, _property: &Property<f32>, _value: &f32) {
                self.0.push_back(Key::default());
                self.0.erase(0);
            }
        }

        let keys = Rc::new(Vector::new());
        keys.push_back(Key::default());
        let first = keys.at(0).expect("present");
        first.time.add_listener(Rc::new(Grow(Rc::clone(&keys))));
        first.time.set(1.0);

        assert_eq!(keys.len(), 1);
        assert_eq!(first.time.get(), 1.0);
        assert!(!Rc::ptr_eq(&first, &keys.at(0).expect("present")));
    }

    #[test]
    fn insert_past_the_end_appends() {
        let keys: Vector<Key> = Vector::new();
        let rec = Rc::new(Recorder::default());
        keys.add_listener(rec.clone());
        assert_eq!(keys.insert(5, Key::default()), 0);
        assert_eq!(keys.insert(5, Key::default()), 1);
        assert_eq!(*rec.seen.borrow(), vec![('+', 0), ('+', 1)]);
    }

    #[test]
    fn drop_erases_back_to_front() {
        let rec = Rc::new(Recorder::default());
        {
            let keys: Vector<Key> = Vector::new();
            keys.resize(3);
            keys.add_listener(rec.clone());
        }
        assert_eq!(*rec.seen.borrow(), vec![('-', 2), ('-', 1), ('-', 0)]);
    }

    #[test]
    fn for_each_visits_in_order() {
        let v = Vector::new();
        v.push_back(3);
        v.push_back(4);
        let mut seen = Vec::new();
        v.for_each(|pos, value| seen.push((pos, *value)));
        assert_eq!(seen, vec![(0, 3), (1, 4)]);
        assert_eq!(v.back().as_deref(), Some(&4));
    }
}
