#![forbid(unsafe_code)]

//! Ordered observable collection with stable element addresses.
//!
//! Every element of a [`List<T>`] lives in its own `Rc<T>`. Inserting or
//! erasing elsewhere in the list never moves an existing element, so a handle
//! obtained from [`List::at`] stays valid (and keeps pointing at the same
//! logical element) across any structural change.
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
//! - Out-of-range `erase`/`at` return `None`; `insert` past the end
//!   appends, like every ordered collection in this crate.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::notifier::{Notifier, same_rc};

/// Receives structural changes from a [`List`].
pub trait ListListener<T> {
    /// An element was inserted at `pos`.
    fn on_insert(&self, _list: &List<T>, _pos: usize) {}

    /// `removed` was erased from `pos`.
    fn on_erase(&self, _list: &List<T>, _pos: usize, _removed: &Rc<T>) {}
}

/// Observable list with stable element addresses.
pub struct List<T> {
    items: RefCell<Vec<Rc<T>>>,
    notifier: Notifier<dyn ListListener<T>>,
}

impl<T> List<T> {
    /// Create an empty list.
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

    /// Whether the list has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Element at `pos`.
    #[must_use]
    pub fn at(&self, pos: usize) -> Option<Rc<T>> {
        self.items.borrow().get(pos).cloned()
    }

    /// First element.
    #[must_use]
    pub fn front(&self) -> Option<Rc<T>> {
        self.items.borrow().first().cloned()
    }

    /// Last element.
    #[must_use]
    pub fn back(&self) -> Option<Rc<T>> {
        self.items.borrow().last().cloned()
    }

    /// Position of the element `item` points at.
    #[must_use]
    pub fn position(&self, item: &Rc<T>) -> Option<usize> {
        self.items.borrow().iter().position(|i| same_rc(i, item))
    }

    /// Handles to every element, front to back.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Rc<T>> {
        self.items.borrow().clone()
    }

    /// Insert `value` at `pos` and return its handle. A position past the
    /// end appends.
    pub fn insert(&self, pos: usize, value: T) -> Rc<T> {
        let item = Rc::new(value);
        let pos = {
            let mut items = self.items.borrow_mut();
            let pos = pos.min(items.len());
            items.insert(pos, Rc::clone(&item));
            pos
        };
        self.notifier.notify(|l| l.on_insert(self, pos));
        item
    }

    /// Prepend `value`.
    pub fn push_front(&self, value: T) -> Rc<T> {
        self.insert(0, value)
    }

    /// Append `value`.
    pub fn push_back(&self, value: T) -> Rc<T> {
        let end = self.len();
        self.insert(end, value)
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
    pub fn add_listener(&self, listener: Rc<dyn ListListener<T>>) -> bool {
        self.notifier.add_listener(listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Rc<dyn ListListener<T>>) -> bool {
        self.notifier.remove_listener(listener)
    }
}

impl<T: Default> List<T> {
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

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        if !self.notifier.is_empty() {
            self.clear();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.borrow().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Seen {
        Insert(usize),
        Erase(usize, i32),
    }

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<Seen>>,
    }

    impl ListListener<i32> for Recorder {
        fn on_insert(&self, list: &List<i32>, pos: usize) {
            assert!(list.at(pos).is_some(), "inserted element is in place");
            self.seen.borrow_mut().push(Seen::Insert(pos));
        }

        fn on_erase(&self, _list: &List<i32>, pos: usize, removed: &Rc<i32>) {
            self.seen.borrow_mut().push(Seen::Erase(pos, **removed));
        }
    }

    fn recorded(list: &List<i32>) -> Rc<Recorder> {
        let rec = Rc::new(Recorder::default());
        list.add_listener(rec.clone());
        rec
    }

    #[test]
    fn handles_stay_valid_across_inserts() {
        let list = List::new();
        let middle = list.push_back(2);
        list.push_front(1);
        list.push_back(3);
        list.insert(1, 10);
        assert_eq!(*middle, 2);
        assert_eq!(list.position(&middle), Some(2));
        list.erase(0);
        assert_eq!(list.position(&middle), Some(1));
        assert_eq!(*list.at(1).expect("present"), 2);
    }

    #[test]
    fn events_carry_exact_positions() {
        let list = List::new();
        let rec = recorded(&list);
        list.push_back(1);
        list.push_back(2);
        list.push_front(0);
        list.erase(1);
        list.pop_front();
        assert_eq!(
            *rec.seen.borrow(),
            vec![
                Seen::Insert(0),
                Seen::Insert(1),
                Seen::Insert(0),
                Seen::Erase(1, 1),
                Seen::Erase(0, 0),
            ]
        );
        assert_eq!(list.to_vec().iter().map(|v| **v).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn insert_past_the_end_appends() {
        let list = List::new();
        let rec = recorded(&list);
        list.push_back(1);
        let tail = list.insert(9, 2);
        assert_eq!(list.position(&tail), Some(1));
        assert_eq!(*rec.seen.borrow(), vec![Seen::Insert(0), Seen::Insert(1)]);
    }

    #[test]
    fn resize_reports_each_element() {
        let list: List<i32> = List::new();
        let rec = recorded(&list);
        list.resize(3);
        list.resize(1);
        assert_eq!(
            *rec.seen.borrow(),
            vec![
                Seen::Insert(0),
                Seen::Insert(1),
                Seen::Insert(2),
                Seen::Erase(2, 0),
                Seen::Erase(1, 0),
            ]
        );
    }

    #[test]
    fn out_of_range_is_none() {
        let list: List<i32> = List::new();
        assert!(list.erase(0).is_none());
        assert!(list.pop_back().is_none());
        assert!(list.pop_front().is_none());
        assert!(list.front().is_none());
        assert!(list.back().is_none());
    }

    #[test]
    fn drop_erases_back_to_front() {
        let rec = Rc::new(Recorder::default());
        {
            let list = List::new();
            list.push_back(1);
            list.push_back(2);
            list.push_back(3);
            list.add_listener(rec.clone());
        }
        assert_eq!(
            *rec.seen.borrow(),
            vec![Seen::Erase(2, 3), Seen::Erase(1, 2), Seen::Erase(0, 1)]
        );
    }
}
