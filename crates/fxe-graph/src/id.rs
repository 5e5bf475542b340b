//! Wrapper object identities.

use std::cell::Cell;
use std::fmt;

use crate::error::{FileError, Result};

/// Identity of a wrapper object, unique within one [`crate::File`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Get the raw ID value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Hands out object ids from a bounded range, never reusing one.
#[derive(Debug)]
pub(crate) struct IdAllocator {
    next: Cell<Option<u64>>,
    last: u64,
}

impl IdAllocator {
    pub(crate) fn new(first: u64, last: u64) -> Self {
        Self {
            next: Cell::new(Some(first).filter(|f| *f <= last)),
            last,
        }
    }

    pub(crate) fn allocate(&self) -> Result<ObjectId> {
        let id = self
            .next
            .get()
            .ok_or(FileError::IdsExhausted { last: self.last })?;
        self.next
            .set(id.checked_add(1).filter(|n| *n <= self.last));
        Ok(ObjectId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_stops_at_last() {
        let ids = IdAllocator::new(5, 6);
        assert_eq!(ids.allocate().map(ObjectId::get).ok(), Some(5));
        assert_eq!(ids.allocate().map(ObjectId::get).ok(), Some(6));
        assert!(matches!(
            ids.allocate(),
            Err(FileError::IdsExhausted { last: 6 })
        ));
    }

    #[test]
    fn allocator_survives_u64_max() {
        let ids = IdAllocator::new(u64::MAX, u64::MAX);
        assert!(ids.allocate().is_ok());
        assert!(ids.allocate().is_err());
    }
}
