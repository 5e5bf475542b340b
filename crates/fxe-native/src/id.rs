//! Block identities.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for unique block IDs.
static BLOCK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a native block.
///
/// Identities are never reused, so a stale `BlockId` can never alias a newer
/// block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

impl BlockId {
    /// Allocate a fresh identity.
    pub(crate) fn next() -> Self {
        Self(BLOCK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = BlockId::next();
        let b = BlockId::next();
        assert!(b > a);
        assert_eq!(format!("{a}"), format!("#{}", a.get()));
    }
}
