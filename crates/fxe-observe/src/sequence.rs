#![forbid(unsafe_code)]

//! Ordered owning sequence with identity lookup.
//!
//! A [`Sequence<T>`] owns its elements (`Rc<T>`), keeps them in a caller-given
//! order, and never holds the same allocation twice. It is the collection
//! used for owned child lists in the object graph (node children, particle
//! modifiers, controller sequences).
//!
//! # Invariants
//!
//! 1. `insert(pos, obj)` with `obj` already present is a pure no-op: nothing
//!    moves, nothing is signalled, and the existing position is returned.
//! 2. `on_insert(pos)` fires after the element is in place; `on_erase(pos,
//!    removed)` after it left.
//! 3. `clear` and drop erase from the back, one event per element.
//! 4. `find` is a linear identity search; `None` is the "absent" sentinel.
//! 5. `insert` past the end appends, as in [`crate::List`] and
//!    [`crate::Vector`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::notifier::{Notifier, same_rc};

/// Receives structural changes from a [`Sequence`].
pub trait SequenceListener<T: ?Sized> {
    /// An element was inserted at `pos`.
    fn on_insert(&self, _sequence: &Sequence<T>, _pos: usize) {}

    /// `removed` was erased from `pos`.
    fn on_erase(&self, _sequence: &Sequence<T>, _pos: usize, _removed: &Rc<T>) {}
}

/// Observable owning sequence.
pub struct Sequence<T: ?Sized> {
    items: RefCell<Vec<Rc<T>>>,
    notifier: Notifier<dyn SequenceListener<T>>,
}

impl<T: ?Sized> Sequence<T> {
    /// Create an empty sequence.
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

    /// Whether the sequence has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Element at `pos`.
    #[must_use]
    pub fn at(&self, pos: usize) -> Option<Rc<T>> {
        self.items.borrow().get(pos).cloned()
    }

    /// Position of `obj`, by identity.
    #[must_use]
    pub fn find(&self, obj: &Rc<T>) -> Option<usize> {
        self.items.borrow().iter().position(|i| same_rc(i, obj))
    }

    /// Elements in order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Rc<T>> {
        self.items.borrow().clone()
    }

    /// Insert `obj` at `pos` unless it is already present.
    ///
    /// Returns the position `obj` occupies afterwards. A position past the
    /// end appends.
    pub fn insert(&self, pos: usize, obj: Rc<T>) -> usize {
        let pos = {
            let mut items = self.items.borrow_mut();
            if let Some(existing) = items.iter().position(|i| same_rc(i, &obj)) {
                return existing;
            }
            let pos = pos.min(items.len());
            items.insert(pos, obj);
            pos
        };
        self.notifier.notify(|l| l.on_insert(self, pos));
        pos
    }

    /// Append `obj` unless it is already present.
    pub fn push_back(&self, obj: Rc<T>) -> usize {
        self.insert(usize::MAX, obj)
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

    /// Erase `obj` wherever it is. Returns the position it occupied.
    pub fn remove(&self, obj: &Rc<T>) -> Option<usize> {
        let pos = self.find(obj)?;
        self.erase(pos).map(|_| pos)
    }

    /// Erase every element, last first.
    pub fn clear(&self) {
        loop {
            let len = self.len();
            let Some(last) = len.checked_sub(1) else { break };
            self.erase(last);
        }
    }

    /// Make the sequence equal `target`, in order.
    ///
    /// Elements absent from `target` are erased (last first); the rest are
    /// moved or inserted so that position `i` holds `target[i]`. Elements
    /// already in the right place emit nothing. A repeated allocation in
    /// `target` keeps only its last occurrence.
    pub fn reconcile(&self, target: &[Rc<T>]) {
        for pos in (0..self.len()).rev() {
            let keep = self
                .at(pos)
                .is_some_and(|item| target.iter().any(|t| same_rc(t, &item)));
            if !keep {
                self.erase(pos);
            }
        }
        for (index, item) in target.iter().enumerate() {
            match self.find(item) {
                Some(pos) if pos == index => {}
                Some(pos) => {
                    if let Some(moved) = self.erase(pos) {
                        self.insert(index, moved);
                    }
                }
                None => {
                    self.insert(index, Rc::clone(item));
                }
            }
        }
    }

    /// Register a listener. Returns `false` if it was already registered.
    pub fn add_listener(&self, listener: Rc<dyn SequenceListener<T>>) -> bool {
        self.notifier.add_listener(listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, listener: &Rc<dyn SequenceListener<T>>) -> bool {
        self.notifier.remove_listener(listener)
    }
}

impl<T: ?Sized> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Drop for Sequence<T> {
    fn drop(&mut self) {
        if !self.notifier.is_empty() {
            self.clear();
        }
    }
}

impl<T: ?Sized> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("len", &self.len())
            .field("listeners", &self.notifier.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Seen {
        Insert(usize),
        Erase(usize, u32),
    }

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<Seen>>,
    }

    impl SequenceListener<u32> for Recorder {
        fn on_insert(&self, _sequence: &Sequence<u32>, pos: usize) {
            self.seen.borrow_mut().push(Seen::Insert(pos));
        }

        fn on_erase(&self, _sequence: &Sequence<u32>, pos: usize, removed: &Rc<u32>) {
            self.seen.borrow_mut().push(Seen::Erase(pos, **removed));
        }
    }

    fn values(seq: &Sequence<u32>) -> Vec<u32> {
        seq.to_vec().iter().map(|v| **v).collect()
    }

    #[test]
    fn insert_of_present_element_is_noop() {
        let seq = Sequence::new();
        let a = Rc::new(1);
        let b = Rc::new(2);
        let c = Rc::new(3);
        seq.push_back(a.clone());
        seq.push_back(b.clone());
        seq.push_back(c.clone());
        let rec = Rc::new(Recorder::default());
        seq.add_listener(rec.clone());

        assert_eq!(seq.insert(0, c.clone()), 2);
        assert_eq!(seq.find(&c), Some(2));
        assert_eq!(seq.len(), 3);
        assert_eq!(values(&seq), vec![1, 2, 3]);
        assert!(rec.seen.borrow().is_empty());
    }

    #[test]
    fn find_uses_identity() {
        let seq = Sequence::new();
        let a = Rc::new(7);
        seq.push_back(a.clone());
        assert_eq!(seq.find(&a), Some(0));
        assert_eq!(seq.find(&Rc::new(7)), None);
    }

    #[test]
    fn insert_clamps_to_end() {
        let seq = Sequence::new();
        let rec = Rc::new(Recorder::default());
        seq.add_listener(rec.clone());
        assert_eq!(seq.insert(10, Rc::new(1)), 0);
        assert_eq!(seq.insert(10, Rc::new(2)), 1);
        assert_eq!(*rec.seen.borrow(), vec![Seen::Insert(0), Seen::Insert(1)]);
    }

    #[test]
    fn remove_reports_position() {
        let seq = Sequence::new();
        let a = Rc::new(1);
        let b = Rc::new(2);
        seq.push_back(a.clone());
        seq.push_back(b.clone());
        assert_eq!(seq.remove(&b), Some(1));
        assert_eq!(seq.remove(&b), None);
        assert_eq!(values(&seq), vec![1]);
    }

    #[test]
    fn drop_erases_back_to_front() {
        let rec = Rc::new(Recorder::default());
        {
            let seq = Sequence::new();
            for v in [10, 20, 30] {
                seq.push_back(Rc::new(v));
            }
            seq.add_listener(rec.clone());
        }
        assert_eq!(
            *rec.seen.borrow(),
            vec![Seen::Erase(2, 30), Seen::Erase(1, 20), Seen::Erase(0, 10)]
        );
    }

    #[test]
    fn reconcile_reorders_with_minimal_events() {
        let seq = Sequence::new();
        let items: Vec<Rc<u32>> = (0..4).map(Rc::new).collect();
        for item in &items {
            seq.push_back(item.clone());
        }
        let rec = Rc::new(Recorder::default());
        seq.add_listener(rec.clone());

        let fresh = Rc::new(9);
        seq.reconcile(&[items[0].clone(), items[2].clone(), fresh.clone(), items[3].clone()]);
        assert_eq!(values(&seq), vec![0, 2, 9, 3]);
        assert_eq!(*rec.seen.borrow(), vec![Seen::Erase(1, 1), Seen::Insert(2)]);

        rec.seen.borrow_mut().clear();
        seq.reconcile(&[items[0].clone(), items[2].clone(), fresh, items[3].clone()]);
        assert!(rec.seen.borrow().is_empty());
    }
}
