//! References between native blocks.
//!
//! [`Link`] is an owning reference (it keeps the target block alive),
//! [`WeakLink`] a back-reference that does not. Both compare by target
//! identity, never by target contents, so two snapshots of a graph compare
//! equal when they point at the same blocks.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::block::{NativeBlock, NativeRef};
use crate::id::BlockId;

/// Owning reference to a block, possibly null.
#[derive(Clone, Default)]
pub struct Link(Option<NativeRef>);

impl Link {
    /// Link to `block`.
    #[must_use]
    pub fn to(block: &NativeRef) -> Self {
        Self(Some(Rc::clone(block)))
    }

    /// The null link.
    #[must_use]
    pub const fn null() -> Self {
        Self(None)
    }

    /// Target block, if any.
    #[must_use]
    pub fn get(&self) -> Option<&NativeRef> {
        self.0.as_ref()
    }

    /// Target identity, if any.
    #[must_use]
    pub fn id(&self) -> Option<BlockId> {
        self.0.as_ref().map(|b| b.id())
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }
}

impl From<Option<NativeRef>> for Link {
    fn from(block: Option<NativeRef>) -> Self {
        Self(block)
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Link {}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => write!(f, "Link({id})"),
            None => f.write_str("Link(null)"),
        }
    }
}

/// Non-owning reference to a block, possibly null or dangling.
#[derive(Clone, Default)]
pub struct WeakLink {
    id: Option<BlockId>,
    target: Weak<NativeBlock>,
}

impl WeakLink {
    /// Weak link to `block`.
    #[must_use]
    pub fn to(block: &NativeRef) -> Self {
        Self {
            id: Some(block.id()),
            target: Rc::downgrade(block),
        }
    }

    /// The null link.
    #[must_use]
    pub fn null() -> Self {
        Self::default()
    }

    /// Target block, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<NativeRef> {
        self.target.upgrade()
    }

    /// Identity the link was made with, even if the target is gone.
    #[must_use]
    pub fn id(&self) -> Option<BlockId> {
        self.id
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.id.is_none()
    }
}

impl From<Option<&NativeRef>> for WeakLink {
    fn from(block: Option<&NativeRef>) -> Self {
        block.map_or_else(Self::null, Self::to)
    }
}

impl PartialEq for WeakLink {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WeakLink {}

impl fmt::Debug for WeakLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) if self.target.strong_count() > 0 => write!(f, "WeakLink({id})"),
            Some(id) => write!(f, "WeakLink({id}, dangling)"),
            None => f.write_str("WeakLink(null)"),
        }
    }
}
