//! A loaded native file: its root blocks and everything they own.

use ahash::AHashSet;

use crate::block::NativeRef;
use crate::id::BlockId;
use crate::link::Link;

/// Root set of a native graph.
///
/// Roots are held strongly. Every other block is alive because some chain of
/// owning [`Link`]s reaches it from a root (or because a caller holds it).
#[derive(Debug, Clone, Default)]
pub struct NativeScene {
    roots: Vec<NativeRef>,
}

impl NativeScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene with the given roots, in order.
    #[must_use]
    pub fn from_roots(roots: Vec<NativeRef>) -> Self {
        Self { roots }
    }

    pub fn push_root(&mut self, root: NativeRef) {
        self.roots.push(root);
    }

    #[must_use]
    pub fn roots(&self) -> &[NativeRef] {
        &self.roots
    }

    /// Every block reachable from the roots through owning links, depth
    /// first, each block once.
    #[must_use]
    pub fn blocks(&self) -> Vec<NativeRef> {
        let mut seen: AHashSet<BlockId> = AHashSet::new();
        let mut out = Vec::new();
        let mut stack: Vec<NativeRef> = self.roots.iter().rev().cloned().collect();
        while let Some(block) = stack.pop() {
            if !seen.insert(block.id()) {
                continue;
            }
            let links: Vec<Link> = block.data().links();
            stack.extend(links.iter().rev().filter_map(|l| l.get().cloned()));
            out.push(block);
        }
        out
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks().len()
    }

    /// Reachable block with identity `id`.
    #[must_use]
    pub fn find(&self, id: BlockId) -> Option<NativeRef> {
        self.blocks().into_iter().find(|b| b.id() == id)
    }
}
