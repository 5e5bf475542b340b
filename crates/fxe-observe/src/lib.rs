#![forbid(unsafe_code)]

//! Observable primitives for the fxedit object graph.
//!
//! Every reactive surface in the editor is built from the types in this
//! crate:
//!
//! - [`Notifier`]: the publish/subscribe core with snapshot dispatch.
//! - [`Property`] and [`FlagSet`]: scalar observables.
//! - [`List`], [`Vector`], [`Set`], [`Sequence`]: collection observables.
//! - [`Ref`] and [`Ptr`]: owning and weak object handles.
//! - [`ListenerScope`]: detaches a group of listeners together.
//!
//! # Architecture
//!
//! All types are single-threaded and interior-mutable: mutators take `&self`
//! so that a listener, which receives a back-reference to the observable that
//! is dispatching, can read it, mutate it, or change its listener set.
//! Listeners are shared as `Rc<dyn ...Listener>` and identified by their
//! allocation.
//!
//! # Invariants
//!
//! 1. A dispatch reaches exactly the listeners registered when it started.
//! 2. No observable borrows its own state while a listener runs.
//! 3. Setting a scalar to an equal value is silent.
//! 4. Structural events name exactly one position or member each.
//! 5. Dropping an observable that still holds state emits the final
//!    erase/clear/unassign events, newest state first.

pub mod flags;
pub mod handle;
pub mod list;
pub mod notifier;
pub mod property;
pub mod scope;
pub mod sequence;
pub mod set;
pub mod vector;

pub use flags::{FlagListener, FlagSet};
pub use handle::{Ptr, PtrListener, Ref, RefListener};
pub use list::{List, ListListener};
pub use notifier::{Notifier, same_rc};
pub use property::{Property, PropertyListener};
pub use scope::{Listenable, ListenerScope};
pub use sequence::{Sequence, SequenceListener};
pub use set::{Set, SetListener};
pub use vector::{Vector, VectorListener};
