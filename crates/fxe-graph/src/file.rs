//! The identity map.
//!
//! A [`File`] guarantees at most one live wrapper per native block. The map
//! holds wrappers weakly: an entry disappears when the last strong handle to
//! its wrapper goes away, and the next [`File::get`] for that block builds a
//! fresh one. [`File::keep_alive`] pins a wrapper so it survives without any
//! other owner.
//!
//! The file counts the weak handles ([`Ptr`]s of wrappers it built) pointing
//! at each object. A read sync that wraps a weak target nothing owns anchors
//! it here, and the anchor goes away once no weak handle points at the
//! target any more. Owned targets are never anchored, so a back-reference to
//! an owner does not keep that owner alive.
//!
//! # Invariants
//!
//! 1. `get` on the same live block returns the identical wrapper.
//! 2. `create` always returns a wrapper no previous call has returned.
//! 3. Wrapper teardown never runs while the map's state is borrowed: entries
//!    and pins are taken out of the map first and dropped afterwards.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use fxe_native::{BlockId, NativeBlock, NativeRef, NativeScene};
use fxe_observe::{Ptr, PtrListener};
use tracing::{debug, trace};

use crate::config::FileConfig;
use crate::error::Result;
use crate::id::{IdAllocator, ObjectId};
use crate::kind::ObjectKind;
use crate::object::{AnyObject, Class, Concrete, Header, Object};
use crate::sync::{ReadSyncer, WriteSyncer};
use crate::traverse::Forwarder;

struct Entry {
    id: ObjectId,
    wrapper: Weak<dyn Object>,
}

struct Pin {
    object: AnyObject,
    count: u32,
}

#[derive(Default)]
struct MapState {
    by_native: AHashMap<BlockId, Entry>,
    pins: AHashMap<ObjectId, Pin>,
    /// Weak handles pointing at each object.
    weak_refs: AHashMap<ObjectId, u32>,
    /// Unowned weak targets, alive while `weak_refs` counts them.
    anchors: AHashMap<ObjectId, AnyObject>,
}

/// Shared state of a file. Wrapper headers point back here weakly so they can
/// remove their entry on drop.
pub(crate) struct Registry {
    ids: IdAllocator,
    state: RefCell<MapState>,
    config: FileConfig,
}

impl Registry {
    fn new(config: FileConfig) -> Self {
        Self {
            ids: IdAllocator::new(config.first_object_id, config.max_object_id),
            state: RefCell::new(MapState::default()),
            config,
        }
    }

    fn lookup(&self, block: BlockId) -> Option<AnyObject> {
        let wrapper = self.state.borrow().by_native.get(&block)?.wrapper.upgrade()?;
        Some(wrapper.to_any())
    }

    fn register(&self, block: BlockId, object: &AnyObject) {
        let entry = Entry {
            id: object.id(),
            wrapper: Rc::downgrade(&object.as_object()),
        };
        let previous = self.state.borrow_mut().by_native.insert(block, entry);
        debug_assert!(
            previous.is_none_or(|p| p.wrapper.strong_count() == 0),
            "block {block} mapped twice"
        );
        debug!(native = %block, object = %object.id(), kind = %object.kind(), "mapped");
    }

    fn pin(&self, object: AnyObject) -> u32 {
        let id = object.id();
        let count = {
            let mut state = self.state.borrow_mut();
            let pin = state.pins.entry(id).or_insert(Pin { object, count: 0 });
            pin.count += 1;
            pin.count
        };
        trace!(object = %id, count, "pinned");
        count
    }

    fn unpin(&self, id: ObjectId) -> bool {
        let released = {
            let mut state = self.state.borrow_mut();
            let Some(pin) = state.pins.get_mut(&id) else {
                return false;
            };
            pin.count -= 1;
            if pin.count == 0 {
                state.pins.remove(&id)
            } else {
                None
            }
        };
        trace!(object = %id, released = released.is_some(), "unpinned");
        drop(released.map(|pin| pin.object));
        true
    }

    fn pin_count(&self, id: ObjectId) -> u32 {
        self.state.borrow().pins.get(&id).map_or(0, |pin| pin.count)
    }

    fn weak_assigned(&self, id: ObjectId) {
        *self.state.borrow_mut().weak_refs.entry(id).or_insert(0) += 1;
    }

    fn weak_released(&self, id: ObjectId) {
        let released = {
            let mut state = self.state.borrow_mut();
            let Some(count) = state.weak_refs.get_mut(&id) else {
                return;
            };
            *count -= 1;
            if *count == 0 {
                state.weak_refs.remove(&id);
                state.anchors.remove(&id)
            } else {
                None
            }
        };
        if released.is_some() {
            trace!(object = %id, "unanchored");
        }
        drop(released);
    }

    fn anchor(&self, object: AnyObject) -> bool {
        let id = object.id();
        let anchored = {
            let mut state = self.state.borrow_mut();
            if state.weak_refs.contains_key(&id) {
                state.anchors.insert(id, object);
                true
            } else {
                false
            }
        };
        if anchored {
            trace!(object = %id, "anchored");
        }
        anchored
    }

    /// Drop the entry of `block` if it still belongs to `id`.
    pub(crate) fn forget(&self, block: BlockId, id: ObjectId) {
        let removed = {
            let mut state = self.state.borrow_mut();
            state.weak_refs.remove(&id);
            let owned = state.by_native.get(&block).is_some_and(|e| e.id == id);
            if owned {
                state.by_native.remove(&block)
            } else {
                None
            }
        };
        if removed.is_some() {
            trace!(native = %block, object = %id, "unmapped");
        }
    }
}

/// Counts one weak handle against whatever it points at.
struct WeakEdge {
    registry: Weak<Registry>,
    target: Cell<Option<ObjectId>>,
}

impl<T: Object + ?Sized> PtrListener<T> for WeakEdge {
    fn on_assign(&self, _handle: &Ptr<T>, target: Option<&Rc<T>>) {
        let next = target.map(|t| t.id());
        let previous = self.target.replace(next);
        if previous == next {
            return;
        }
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if let Some(id) = next {
            registry.weak_assigned(id);
        }
        if let Some(id) = previous {
            registry.weak_released(id);
        }
    }
}

/// Attach a [`WeakEdge`] to every weak handle of `object`.
fn watch_weak_edges(registry: &Rc<Registry>, object: &AnyObject) {
    let edge = || {
        Rc::new(WeakEdge {
            registry: Rc::downgrade(registry),
            target: Cell::new(None),
        })
    };
    if let Some(level) = object.modifier() {
        level.target.add_listener(edge());
    }
    if let Some(level) = object.gravity() {
        level.gravity_object.add_listener(edge());
    }
    if let Some(level) = object.emitter() {
        level.emitter_object.add_listener(edge());
    }
    if let Some(level) = object.sequence() {
        level.manager.add_listener(edge());
    }
}

/// Identity map between native blocks and wrapper objects.
pub struct File {
    // Roots drop before the registry, so their headers can still unmap.
    roots: RefCell<Vec<AnyObject>>,
    registry: Rc<Registry>,
}

impl File {
    /// An empty file with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(FileConfig::default())
    }

    /// An empty file.
    ///
    /// # Errors
    ///
    /// [`crate::FileError::InvalidConfig`] if `config` does not validate.
    pub fn with_config(config: FileConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: FileConfig) -> Self {
        Self {
            roots: RefCell::new(Vec::new()),
            registry: Rc::new(Registry::new(config)),
        }
    }

    #[must_use]
    pub fn config(&self) -> &FileConfig {
        &self.registry.config
    }

    /// The wrapper for `block`, built on first request.
    ///
    /// Returns `Ok(None)` when the block's type cannot be viewed as `T`; no
    /// wrapper is built in that case.
    ///
    /// # Errors
    ///
    /// [`crate::FileError::IdsExhausted`] when a new wrapper needs an id and
    /// none is left.
    pub fn get<T: Class + ?Sized>(&self, block: &NativeRef) -> Result<Option<Rc<T>>> {
        if !T::accepts(ObjectKind::from_block_type(block.block_type())) {
            debug!(native = %block.id(), ty = %block.block_type(), "type mismatch on get");
            return Ok(None);
        }
        Ok(T::from_any(self.get_any(block)?))
    }

    /// The wrapper for `block` as its concrete kind, built on first request.
    ///
    /// # Errors
    ///
    /// See [`File::get`].
    pub fn get_any(&self, block: &NativeRef) -> Result<AnyObject> {
        if let Some(existing) = self.registry.lookup(block.id()) {
            return Ok(existing);
        }
        let kind = ObjectKind::from_block_type(block.block_type());
        let id = self.registry.ids.allocate()?;
        let header = Header::new(id, Some(Rc::clone(block)), Rc::downgrade(&self.registry));
        let object = AnyObject::construct(kind, header);
        watch_weak_edges(&self.registry, &object);
        self.registry.register(block.id(), &object);
        Ok(object)
    }

    /// The live wrapper for `block`, without building one.
    #[must_use]
    pub fn lookup(&self, block: BlockId) -> Option<AnyObject> {
        self.registry.lookup(block)
    }

    /// The native block behind `object`; `None` for detached wrappers.
    #[must_use]
    pub fn get_native<T: Object + ?Sized>(&self, object: &Rc<T>) -> Option<NativeRef> {
        object.header().native().cloned()
    }

    /// A new object of kind `T` backed by a new default native block.
    ///
    /// # Errors
    ///
    /// [`crate::FileError::IdsExhausted`] when no id is left.
    pub fn create<T: Concrete>(&self) -> Result<Rc<T>> {
        let block = NativeBlock::with_default(T::KIND.block_type());
        let object = self.construct::<T>(Some(Rc::clone(&block)))?;
        let any = Rc::clone(&object).to_any();
        self.registry.register(block.id(), &any);
        let mut syncer = ReadSyncer::new(self);
        syncer.sync_levels(&any)?;
        syncer.finish()?;
        Ok(object)
    }

    /// A new object of kind `T` with no native block. It is never mapped and
    /// is skipped by write syncs.
    ///
    /// # Errors
    ///
    /// [`crate::FileError::IdsExhausted`] when no id is left.
    pub fn create_detached<T: Concrete>(&self) -> Result<Rc<T>> {
        self.construct::<T>(None)
    }

    fn construct<T: Concrete>(&self, native: Option<NativeRef>) -> Result<Rc<T>> {
        let id = self.registry.ids.allocate()?;
        let header = Header::new(id, native, Rc::downgrade(&self.registry));
        debug!(object = %id, kind = %T::KIND, "created");
        let object = Rc::new(T::construct(header));
        watch_weak_edges(&self.registry, &Rc::clone(&object).to_any());
        Ok(object)
    }

    /// Pin `object` so it outlives every other owner. Pins nest; returns the
    /// new pin count.
    pub fn keep_alive<T: Object + ?Sized>(&self, object: &Rc<T>) -> u32 {
        self.registry.pin(Rc::clone(object).to_any())
    }

    /// Undo one [`File::keep_alive`]. Returns `false` if `object` was not
    /// pinned.
    pub fn unpin<T: Object + ?Sized>(&self, object: &Rc<T>) -> bool {
        self.registry.unpin(object.id())
    }

    /// Outstanding [`File::keep_alive`] pins on `object`.
    #[must_use]
    pub fn pin_count<T: Object + ?Sized>(&self, object: &Rc<T>) -> u32 {
        self.registry.pin_count(object.id())
    }

    /// Number of mapped blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.state.borrow().by_native.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `object` is alive only because a weak handle points at it.
    #[must_use]
    pub fn is_anchored<T: Object + ?Sized>(&self, object: &Rc<T>) -> bool {
        self.registry
            .state
            .borrow()
            .anchors
            .contains_key(&object.id())
    }

    /// Keep `object` alive while weak handles point at it. Returns `false`
    /// when none does.
    pub(crate) fn anchor(&self, object: AnyObject) -> bool {
        self.registry.anchor(object)
    }

    #[must_use]
    pub fn contains_native(&self, block: BlockId) -> bool {
        self.registry.state.borrow().by_native.contains_key(&block)
    }

    /// Wrap every root of `scene` and read-sync everything they own.
    ///
    /// # Errors
    ///
    /// Configuration and id exhaustion errors; see [`File::with_config`] and
    /// [`File::get`].
    pub fn load(scene: &NativeScene, config: FileConfig) -> Result<Self> {
        let file = Self::with_config(config)?;
        let _span = tracing::debug_span!("load", roots = scene.roots().len()).entered();
        for block in scene.roots() {
            let root = file.get_any(block)?;
            file.add_root(root);
        }
        let roots = file.roots();
        file.read_sync_all(&roots)?;
        Ok(file)
    }

    /// Write-sync every root and return the native scene they form.
    /// Detached roots are skipped.
    ///
    /// # Errors
    ///
    /// [`crate::FileError::Native`] if the native side rejects an update.
    pub fn save(&self) -> Result<NativeScene> {
        let roots = self.roots();
        let _span = tracing::debug_span!("save", roots = roots.len()).entered();
        self.write_sync_all(&roots)?;
        let mut scene = NativeScene::new();
        for root in &roots {
            match root.header().native() {
                Some(block) => scene.push_root(Rc::clone(block)),
                None => debug!(object = %root.id(), "skipping detached root"),
            }
        }
        Ok(scene)
    }

    /// Current roots, in insertion order.
    #[must_use]
    pub fn roots(&self) -> Vec<AnyObject> {
        self.roots.borrow().clone()
    }

    /// Own `root` as a top-level object. Returns `false` if it already is one.
    pub fn add_root(&self, root: AnyObject) -> bool {
        let mut roots = self.roots.borrow_mut();
        if roots.contains(&root) {
            return false;
        }
        roots.push(root);
        true
    }

    pub fn remove_root(&self, root: &AnyObject) -> bool {
        let removed = {
            let mut roots = self.roots.borrow_mut();
            roots
                .iter()
                .position(|r| r == root)
                .map(|pos| roots.remove(pos))
        };
        removed.is_some()
    }

    /// Pull native state into `entry` and everything it owns. Returns the
    /// number of objects synced.
    ///
    /// # Errors
    ///
    /// Id exhaustion while wrapping newly reachable blocks.
    pub fn read_sync(&self, entry: &AnyObject) -> Result<usize> {
        self.read_sync_all(std::slice::from_ref(entry))
    }

    /// Push wrapper state from `entry` and everything it owns to the native
    /// side. Returns the number of objects synced.
    ///
    /// # Errors
    ///
    /// [`crate::FileError::Native`] if the native side rejects an update.
    pub fn write_sync(&self, entry: &AnyObject) -> Result<usize> {
        self.write_sync_all(std::slice::from_ref(entry))
    }

    fn read_sync_all(&self, entries: &[AnyObject]) -> Result<usize> {
        let _span = tracing::debug_span!("read_sync", entries = entries.len()).entered();
        let mut syncer = ReadSyncer::new(self);
        {
            let mut forwarder = Forwarder::new(&mut syncer);
            for entry in entries {
                forwarder.dispatch(entry);
            }
        }
        let synced = syncer.finish()?;
        debug!(synced, "read sync finished");
        Ok(synced)
    }

    fn write_sync_all(&self, entries: &[AnyObject]) -> Result<usize> {
        let _span = tracing::debug_span!("write_sync", entries = entries.len()).entered();
        let mut syncer = WriteSyncer::new(self);
        {
            let mut forwarder = Forwarder::new(&mut syncer);
            for entry in entries {
                forwarder.dispatch(entry);
            }
        }
        let synced = syncer.finish()?;
        debug!(synced, "write sync finished");
        Ok(synced)
    }
}

impl Default for File {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.registry.state.borrow();
        f.debug_struct("File")
            .field("roots", &self.roots.borrow().len())
            .field("mapped", &state.by_native.len())
            .field("pinned", &state.pins.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileError;
    use crate::object::{AvObject, GravityModifier, Node, PointLight};
    use fxe_native::{BlockData, BlockType};

    #[test]
    fn get_returns_the_same_wrapper_while_alive() {
        let file = File::new();
        let block = NativeBlock::with_default(BlockType::Node);
        let a = file.get::<Node>(&block).expect("get").expect("node");
        let b = file.get::<Node>(&block).expect("get").expect("node");
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(file.len(), 1);
    }

    #[test]
    fn get_through_a_trait_class_shares_identity() {
        let file = File::new();
        let block = NativeBlock::with_default(BlockType::PointLight);
        let light = file.get::<PointLight>(&block).expect("get").expect("light");
        let av = file.get::<dyn AvObject>(&block).expect("get").expect("av");
        assert_eq!(light.id(), av.id());
    }

    #[test]
    fn get_with_wrong_class_is_none_and_builds_nothing() {
        let file = File::new();
        let block = NativeBlock::with_default(BlockType::PointLight);
        assert!(file.get::<Node>(&block).expect("get").is_none());
        assert!(file.is_empty());
    }

    #[test]
    fn entry_is_removed_when_wrapper_drops() {
        let file = File::new();
        let block = NativeBlock::with_default(BlockType::Node);
        let first = file.get::<Node>(&block).expect("get").expect("node");
        let first_id = first.id();
        assert!(file.contains_native(block.id()));
        drop(first);
        assert!(!file.contains_native(block.id()));
        let second = file.get::<Node>(&block).expect("get").expect("node");
        assert_ne!(second.id(), first_id);
    }

    #[test]
    fn create_returns_distinct_mapped_wrappers() {
        let file = File::new();
        let a = file.create::<Node>().expect("create");
        let b = file.create::<Node>().expect("create");
        assert_ne!(a.id(), b.id());
        let native = file.get_native(&a).expect("native");
        let again = file.get::<Node>(&native).expect("get").expect("node");
        assert!(Rc::ptr_eq(&a, &again));
    }

    #[test]
    fn detached_objects_have_no_native() {
        let file = File::new();
        let node = file.create_detached::<Node>().expect("create");
        assert!(file.get_native(&node).is_none());
        assert!(file.is_empty());
    }

    #[test]
    fn keep_alive_nests_and_unpin_releases() {
        let file = File::new();
        let block = NativeBlock::with_default(BlockType::Node);
        let node = file.get::<Node>(&block).expect("get").expect("node");
        assert_eq!(file.keep_alive(&node), 1);
        assert_eq!(file.keep_alive(&node), 2);
        let id = node.id();
        drop(node);

        let pinned = file.lookup(block.id()).expect("pinned wrapper");
        assert_eq!(pinned.id(), id);
        let node = Node::from_any(pinned).expect("node");
        assert!(file.unpin(&node));
        assert_eq!(file.pin_count(&node), 1);
        assert!(file.unpin(&node));
        assert!(!file.unpin(&node));
        drop(node);
        assert!(file.lookup(block.id()).is_none());
    }

    #[test]
    fn anchors_last_while_a_weak_handle_points_at_the_target() {
        let file = File::new();
        let gravity = file.create::<GravityModifier>().expect("gravity");
        let node = file.create::<Node>().expect("node");
        let block = file.get_native(&node).expect("native");
        assert!(!file.anchor(Rc::clone(&node).to_any()));

        let target: Rc<dyn AvObject> = node;
        gravity.gravity.gravity_object.assign(Some(&target));
        assert!(file.anchor(Rc::clone(&target).to_any()));
        assert!(file.is_anchored(&target));
        drop(target);
        assert!(file.contains_native(block.id()));

        gravity.gravity.gravity_object.assign(None);
        assert!(!file.contains_native(block.id()));
    }

    #[test]
    fn dropping_a_weak_holder_releases_the_anchor() {
        let file = File::new();
        let gravity = file.create::<GravityModifier>().expect("gravity");
        let target: Rc<dyn AvObject> = file.create::<PointLight>().expect("light");
        let block = file.get_native(&target).expect("native");
        gravity.gravity.gravity_object.assign(Some(&target));
        assert!(file.anchor(Rc::clone(&target).to_any()));
        drop(target);

        drop(gravity);
        assert!(!file.contains_native(block.id()));
    }

    #[test]
    fn ids_exhaust_at_configured_maximum() {
        let file = File::with_config(
            FileConfig::default()
                .with_first_object_id(1)
                .with_max_object_id(2),
        )
        .expect("config");
        let _a = file.create::<Node>().expect("first");
        let _b = file.create::<Node>().expect("second");
        assert!(matches!(
            file.create::<Node>(),
            Err(FileError::IdsExhausted { last: 2 })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = FileConfig::default().with_first_object_id(0);
        assert!(matches!(
            File::with_config(config),
            Err(FileError::InvalidConfig(_))
        ));
    }

    #[test]
    fn load_wraps_roots_and_save_returns_them() {
        let root = NativeBlock::with_default(BlockType::Node);
        if let BlockData::Node { net, .. } = &mut *root.data_mut() {
            net.name = "Scene Root".into();
        }
        let scene = NativeScene::from_roots(vec![Rc::clone(&root)]);
        let file = File::load(&scene, FileConfig::default()).expect("load");
        let roots = file.roots();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].net().map(|n| n.name.get()).as_deref(), Some("Scene Root"));

        let saved = file.save().expect("save");
        assert!(Rc::ptr_eq(&saved.roots()[0], &root));
    }

    #[test]
    fn roots_are_unique() {
        let file = File::new();
        let node = file.create::<Node>().expect("create").to_any();
        assert!(file.add_root(node.clone()));
        assert!(!file.add_root(node.clone()));
        assert!(file.remove_root(&node));
        assert!(!file.remove_root(&node));
    }
}
