//! A listener that records every event it receives.
//!
//! One [`Recorder`] implements every listener trait of `fxe-observe`, so a
//! test can attach the same recorder to several observables and assert on
//! the interleaved event stream.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bitflags::Flags;
use fxe_observe::{
    FlagListener, FlagSet, List, ListListener, Property, PropertyListener, Ptr, PtrListener, Ref,
    RefListener, Sequence, SequenceListener, Set, SetListener, Vector, VectorListener,
};

/// One recorded event. Values are kept in their `Debug` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Set(String),
    Raise(String),
    Clear(String),
    Insert(usize),
    Erase(usize),
    Add,
    Remove,
    /// `true` when the handle now holds a target.
    Assign(bool),
}

#[derive(Default)]
pub struct Recorder {
    events: RefCell<Vec<Event>>,
}

impl Recorder {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.events.borrow().iter()).finish()
    }
}

impl<T: fmt::Debug> PropertyListener<T> for Recorder {
    fn on_set(&self, _property: &Property<T>, value: &T) {
        self.push(Event::Set(format!("{value:?}")));
    }
}

impl<F: Flags + Copy + fmt::Debug> FlagListener<F> for Recorder {
    fn on_raise(&self, _flags: &FlagSet<F>, delta: F) {
        self.push(Event::Raise(format!("{delta:?}")));
    }

    fn on_clear(&self, _flags: &FlagSet<F>, delta: F) {
        self.push(Event::Clear(format!("{delta:?}")));
    }
}

impl<T> ListListener<T> for Recorder {
    fn on_insert(&self, _list: &List<T>, pos: usize) {
        self.push(Event::Insert(pos));
    }

    fn on_erase(&self, _list: &List<T>, pos: usize, _removed: &Rc<T>) {
        self.push(Event::Erase(pos));
    }
}

impl<T> VectorListener<T> for Recorder {
    fn on_insert(&self, _vector: &Vector<T>, pos: usize) {
        self.push(Event::Insert(pos));
    }

    fn on_erase(&self, _vector: &Vector<T>, pos: usize, _removed: &T) {
        self.push(Event::Erase(pos));
    }
}

impl<T: ?Sized> SequenceListener<T> for Recorder {
    fn on_insert(&self, _sequence: &Sequence<T>, pos: usize) {
        self.push(Event::Insert(pos));
    }

    fn on_erase(&self, _sequence: &Sequence<T>, pos: usize, _removed: &Rc<T>) {
        self.push(Event::Erase(pos));
    }
}

impl<T: ?Sized> SetListener<T> for Recorder {
    fn on_add(&self, _set: &Set<T>, _member: &Rc<T>) {
        self.push(Event::Add);
    }

    fn on_remove(&self, _set: &Set<T>, _member: &Rc<T>) {
        self.push(Event::Remove);
    }
}

impl<T: ?Sized> RefListener<T> for Recorder {
    fn on_assign(&self, _handle: &Ref<T>, target: Option<&Rc<T>>) {
        self.push(Event::Assign(target.is_some()));
    }
}

impl<T: ?Sized> PtrListener<T> for Recorder {
    fn on_assign(&self, _handle: &Ptr<T>, target: Option<&Rc<T>>) {
        self.push(Event::Assign(target.is_some()));
    }
}
