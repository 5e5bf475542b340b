//! Synchronization between wrapper levels and native fields.
//!
//! A [`ReadSyncer`] pulls native values into wrappers, a [`WriteSyncer`]
//! pushes them back. Both are [`Visitor`]s meant to run inside a
//! [`crate::traverse::Forwarder`], and both walk each object's levels base
//! first.
//!
//! Owning links resolve through [`File::get`], so a read builds wrappers for
//! newly reachable blocks and the owning collection keeps them alive. Weak
//! links resolve the same way. A weak target wrapped for the first time is
//! read-synced, with everything it owns, before [`ReadSyncer::finish`]
//! returns; if nothing owns it by then, the file anchors it for as long as a
//! weak handle points at it (see [`crate::file`]).
//!
//! Wrappers an owning collection lets go of during a read stay alive until
//! `finish`, so a child that moved to an owner visited later in the pass
//! keeps its wrapper.
//!
//! Null and mistyped links in owning lists are dropped on read.

use std::convert::Infallible;
use std::rc::Rc;

use ahash::AHashSet;
use fxe_native::{
    AvFields, BillboardFields, BlockData, BoxEmitterFields, ColorFields, ColorKeyValue,
    ControllerManagerFields, ControllerSequenceFields, ExtraFields, FloatInterpolatorFields,
    GravityFields, Link, ModifierFields, NativeRef, NetFields, NodeFields, ParticleSystemFields,
    PointLightFields, StringFields, TextKeyValue, WeakLink,
};
use tracing::{debug, trace, warn};

use crate::error::{FileError, Result};
use crate::file::File;
use crate::id::ObjectId;
use crate::kind::Level;
use crate::levels::{AvFlags, BillboardMode};
use crate::object::{
    AnyObject, AvObject, Class, ControllerManager, ControllerSequence, ExtraData,
    FloatInterpolator, Modifier, Object, ParticleSystem, PointLight,
};
use crate::traverse::{Forwarder, LevelHandler, Visitor, down};

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// Pulls native field values into wrapper levels.
pub struct ReadSyncer<'f> {
    file: &'f File,
    /// Wrappers kept alive until the pass ends.
    held: Vec<AnyObject>,
    /// Weak targets wrapped during the pass and not yet synced.
    pending: Vec<AnyObject>,
    /// Weak targets wrapped and synced during the pass.
    fresh: Vec<AnyObject>,
    seen: AHashSet<ObjectId>,
    synced: usize,
    error: Option<FileError>,
}

impl<'f> ReadSyncer<'f> {
    #[must_use]
    pub fn new(file: &'f File) -> Self {
        Self {
            file,
            held: Vec::new(),
            pending: Vec::new(),
            fresh: Vec::new(),
            seen: AHashSet::new(),
            synced: 0,
            error: None,
        }
    }

    /// Sync `object`'s own levels without following its owned edges. An
    /// object is synced at most once per pass.
    ///
    /// # Errors
    ///
    /// Id exhaustion while wrapping a linked block.
    pub fn sync_levels(&mut self, object: &AnyObject) -> Result<()> {
        if object.header().native().is_none() || !self.seen.insert(object.id()) {
            return Ok(());
        }
        down(object, self)?;
        self.synced += 1;
        Ok(())
    }

    /// Sync the weak targets wrapped so far, anchor the unowned ones,
    /// release transient holds and report the outcome of the pass.
    ///
    /// # Errors
    ///
    /// The first error raised while visiting.
    pub fn finish(mut self) -> Result<usize> {
        self.sync_pending();
        let Self {
            file,
            held,
            pending,
            fresh,
            synced,
            error,
            ..
        } = self;
        drop(pending);
        drop(held);
        for target in fresh {
            if target.strong_count() == 1 {
                file.anchor(target);
            }
        }
        match error {
            Some(error) => Err(error),
            None => Ok(synced),
        }
    }

    fn sync_pending(&mut self) {
        while self.error.is_none() && !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            {
                let mut forwarder = Forwarder::new(&mut *self);
                for object in &pending {
                    forwarder.dispatch(object);
                }
            }
            self.fresh.extend(pending);
        }
    }

    /// Keep `items` alive until the pass ends.
    fn hold<T: Object + ?Sized>(&mut self, items: Vec<Rc<T>>) {
        self.held.extend(items.into_iter().map(|item| item.to_any()));
    }

    fn resolve<T: Class + ?Sized>(&self, link: &Link) -> Result<Option<Rc<T>>> {
        match link.get() {
            Some(block) => self.file.get::<T>(block),
            None => Ok(None),
        }
    }

    fn resolve_all<T: Class + ?Sized>(&self, links: &[Link]) -> Result<Vec<Rc<T>>> {
        let mut resolved = Vec::with_capacity(links.len());
        for link in links {
            match self.resolve::<T>(link)? {
                Some(object) => resolved.push(object),
                None => debug!(link = ?link.id(), "dropping unresolved owning link"),
            }
        }
        Ok(resolved)
    }

    fn resolve_weak<T: Class + ?Sized>(&mut self, link: &WeakLink) -> Result<Option<Rc<T>>> {
        let Some(block) = link.upgrade() else {
            return Ok(None);
        };
        let fresh = self.file.lookup(block.id()).is_none();
        let Some(target) = self.file.get::<T>(&block)? else {
            return Ok(None);
        };
        if fresh {
            if self.file.config().pin_weak_targets {
                self.file.keep_alive(&target);
            }
            self.pending.push(Rc::clone(&target).to_any());
        }
        Ok(Some(target))
    }

    fn read_net(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.net(), native.data().net().cloned()) else {
            return Ok(());
        };
        level.name.set(fields.name);
        self.hold(level.extra_data.to_vec());
        let extra = self.resolve_all::<dyn ExtraData>(&fields.extra_data)?;
        level.extra_data.reconcile(&extra);
        self.hold(level.controller.assigned().into_iter().collect());
        level
            .controller
            .assign(self.resolve::<ControllerManager>(&fields.controller)?);
        Ok(())
    }

    fn read_av(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.av(), native.data().av().cloned()) else {
            return Ok(());
        };
        level.flags.assign(AvFlags::from_bits_retain(fields.flags));
        level.transform.set(fields.transform);
        Ok(())
    }

    fn read_node(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.node(), native.data().node().cloned()) else {
            return Ok(());
        };
        self.hold(level.children.to_vec());
        self.hold(level.effects.to_vec());
        let children = self.resolve_all::<dyn AvObject>(&fields.children)?;
        level.children.reconcile(&children);
        let effects = self.resolve_all::<PointLight>(&fields.effects)?;
        level.effects.reconcile(&effects);
        Ok(())
    }

    fn read_billboard(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.billboard(), native.data().billboard().copied())
        else {
            return Ok(());
        };
        level.mode.set(BillboardMode::from_raw(fields.mode));
        Ok(())
    }

    fn read_light(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.light(), native.data().light().copied()) else {
            return Ok(());
        };
        level.dimmer.set(fields.dimmer);
        level.diffuse.set(fields.diffuse);
        Ok(())
    }

    fn read_particles(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.particles(), native.data().particles().cloned())
        else {
            return Ok(());
        };
        level.max_particles.set(fields.max_particles);
        self.hold(level.modifiers.to_vec());
        let modifiers = self.resolve_all::<dyn Modifier>(&fields.modifiers)?;
        level.modifiers.reconcile(&modifiers);
        Ok(())
    }

    fn read_modifier(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.modifier(), native.data().modifier().cloned())
        else {
            return Ok(());
        };
        level.name.set(fields.name);
        level.order.set(fields.order);
        level.active.set(fields.active);
        let target = self.resolve_weak::<ParticleSystem>(&fields.target)?;
        level.target.assign(target.as_ref());
        Ok(())
    }

    fn read_gravity(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.gravity(), native.data().gravity().cloned())
        else {
            return Ok(());
        };
        level.strength.set(fields.strength);
        level.axis.set(fields.axis);
        let target = self.resolve_weak::<dyn AvObject>(&fields.gravity_object)?;
        level.gravity_object.assign(target.as_ref());
        Ok(())
    }

    fn read_color(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.color(), native.data().color().cloned()) else {
            return Ok(());
        };
        level.keys.resize(fields.keys.len());
        for (i, key) in fields.keys.iter().enumerate() {
            if let Some(slot) = level.keys.at(i) {
                slot.time.set(key.time);
                slot.color.set(key.color);
            }
        }
        Ok(())
    }

    fn read_emitter(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.emitter(), native.data().emitter().cloned())
        else {
            return Ok(());
        };
        level.speed.set(fields.speed);
        level.life_span.set(fields.life_span);
        level.extent.set(fields.extent);
        let target = self.resolve_weak::<dyn AvObject>(&fields.emitter_object)?;
        level.emitter_object.assign(target.as_ref());
        Ok(())
    }

    fn read_extra(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.extra(), native.data().extra().cloned()) else {
            return Ok(());
        };
        level.name.set(fields.name);
        Ok(())
    }

    fn read_string(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.string(), native.data().string().cloned()) else {
            return Ok(());
        };
        level.value.set(fields.value);
        Ok(())
    }

    fn read_manager(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.manager(), native.data().manager().cloned())
        else {
            return Ok(());
        };
        level.cumulative.set(fields.cumulative);
        self.hold(level.sequences.to_vec());
        let sequences = self.resolve_all::<ControllerSequence>(&fields.sequences)?;
        level.sequences.reconcile(&sequences);
        Ok(())
    }

    fn read_sequence(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (object.sequence(), native.data().sequence().cloned())
        else {
            return Ok(());
        };
        level.name.set(fields.name);
        level.frequency.set(fields.frequency);
        level.text_keys.resize(fields.text_keys.len());
        for (i, key) in fields.text_keys.into_iter().enumerate() {
            if let Some(slot) = level.text_keys.at(i) {
                slot.time.set(key.time);
                slot.text.set(key.text);
            }
        }
        self.hold(level.interpolators.to_vec());
        let interpolators = self.resolve_all::<FloatInterpolator>(&fields.interpolators)?;
        level.interpolators.reconcile(&interpolators);
        let manager = self.resolve_weak::<ControllerManager>(&fields.manager)?;
        level.manager.assign(manager.as_ref());
        Ok(())
    }

    fn read_interpolator(&mut self, object: &AnyObject, native: &NativeRef) -> Result<()> {
        let (Some(level), Some(fields)) = (
            object.interpolator(),
            native.data().interpolator().copied(),
        ) else {
            return Ok(());
        };
        level.value.set(fields.value);
        Ok(())
    }
}

impl LevelHandler for ReadSyncer<'_> {
    type Error = FileError;

    fn level(&mut self, level: Level, object: &AnyObject) -> Result<()> {
        let Some(native) = object.header().native().cloned() else {
            return Ok(());
        };
        if self.file.config().trace_sync {
            trace!(object = %object.id(), native = %native.id(), step = %level, "read level");
        }
        match level {
            Level::Object => Ok(()),
            Level::ObjectNet => self.read_net(object, &native),
            Level::AvObject => self.read_av(object, &native),
            Level::Node => self.read_node(object, &native),
            Level::BillboardNode => self.read_billboard(object, &native),
            Level::PointLight => self.read_light(object, &native),
            Level::ParticleSystem => self.read_particles(object, &native),
            Level::Modifier => self.read_modifier(object, &native),
            Level::GravityModifier => self.read_gravity(object, &native),
            Level::ColorModifier => self.read_color(object, &native),
            Level::BoxEmitter => self.read_emitter(object, &native),
            Level::ExtraData => self.read_extra(object, &native),
            Level::StringData => self.read_string(object, &native),
            Level::ControllerManager => self.read_manager(object, &native),
            Level::ControllerSequence => self.read_sequence(object, &native),
            Level::FloatInterpolator => self.read_interpolator(object, &native),
        }
    }
}

impl Visitor for ReadSyncer<'_> {
    fn visit_any(&mut self, object: &AnyObject) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.sync_levels(object) {
            warn!(object = %object.id(), %error, "read sync failed");
            self.error = Some(error);
        }
    }
}

// ---------------------------------------------------------------------------
// Write
// ---------------------------------------------------------------------------

/// Pushes wrapper level values to native blocks.
pub struct WriteSyncer<'f> {
    file: &'f File,
    synced: usize,
    error: Option<FileError>,
}

impl<'f> WriteSyncer<'f> {
    #[must_use]
    pub fn new(file: &'f File) -> Self {
        Self {
            file,
            synced: 0,
            error: None,
        }
    }

    /// Rebuild `object`'s native data from its levels. Detached objects are
    /// skipped.
    ///
    /// # Errors
    ///
    /// [`FileError::Native`] if the block rejects the new data.
    pub fn sync_levels(&mut self, object: &AnyObject) -> Result<()> {
        let Some(native) = object.header().native().cloned() else {
            return Ok(());
        };
        let mut writer = LevelWriter {
            file: self.file,
            data: BlockData::default_for(native.block_type()),
        };
        let Ok(()) = down(object, &mut writer);
        native.replace(writer.data)?;
        self.synced += 1;
        Ok(())
    }

    /// # Errors
    ///
    /// The first error raised while visiting.
    pub fn finish(self) -> Result<usize> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.synced),
        }
    }
}

impl Visitor for WriteSyncer<'_> {
    fn visit_any(&mut self, object: &AnyObject) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.sync_levels(object) {
            warn!(object = %object.id(), %error, "write sync failed");
            self.error = Some(error);
        }
    }
}

/// Fills one block's data, level by level.
struct LevelWriter<'f> {
    file: &'f File,
    data: BlockData,
}

fn link<T: Object + ?Sized>(file: &File, target: Option<Rc<T>>) -> Link {
    target
        .and_then(|t| file.get_native(&t))
        .map_or_else(Link::null, |block| Link::to(&block))
}

fn links<T: Object + ?Sized>(file: &File, targets: &[Rc<T>]) -> Vec<Link> {
    targets
        .iter()
        .filter_map(|t| file.get_native(t))
        .map(|block| Link::to(&block))
        .collect()
}

fn weak_link<T: Object + ?Sized>(file: &File, target: Option<Rc<T>>) -> WeakLink {
    target
        .and_then(|t| file.get_native(&t))
        .map_or_else(WeakLink::null, |block| WeakLink::to(&block))
}

impl LevelHandler for LevelWriter<'_> {
    type Error = Infallible;

    fn level(&mut self, level: Level, object: &AnyObject) -> Result<(), Infallible> {
        let file = self.file;
        if file.config().trace_sync {
            trace!(object = %object.id(), step = %level, "write level");
        }
        match level {
            Level::Object => {}
            Level::ObjectNet => {
                if let (Some(src), Some(slot)) = (object.net(), self.data.net_mut()) {
                    *slot = NetFields {
                        name: src.name.get(),
                        extra_data: links(file, &src.extra_data.to_vec()),
                        controller: link(file, src.controller.assigned()),
                    };
                }
            }
            Level::AvObject => {
                if let (Some(src), Some(slot)) = (object.av(), self.data.av_mut()) {
                    *slot = AvFields {
                        flags: src.flags.get().bits(),
                        transform: src.transform.get(),
                    };
                }
            }
            Level::Node => {
                if let (Some(src), Some(slot)) = (object.node(), self.data.node_mut()) {
                    *slot = NodeFields {
                        children: links(file, &src.children.to_vec()),
                        effects: links(file, &src.effects.to_vec()),
                    };
                }
            }
            Level::BillboardNode => {
                if let (Some(src), Some(slot)) = (object.billboard(), self.data.billboard_mut()) {
                    *slot = BillboardFields {
                        mode: src.mode.get().to_raw(),
                    };
                }
            }
            Level::PointLight => {
                if let (Some(src), Some(slot)) = (object.light(), self.data.light_mut()) {
                    *slot = PointLightFields {
                        dimmer: src.dimmer.get(),
                        diffuse: src.diffuse.get(),
                    };
                }
            }
            Level::ParticleSystem => {
                if let (Some(src), Some(slot)) = (object.particles(), self.data.particles_mut()) {
                    *slot = ParticleSystemFields {
                        max_particles: src.max_particles.get(),
                        modifiers: links(file, &src.modifiers.to_vec()),
                    };
                }
            }
            Level::Modifier => {
                if let (Some(src), Some(slot)) = (object.modifier(), self.data.modifier_mut()) {
                    *slot = ModifierFields {
                        name: src.name.get(),
                        order: src.order.get(),
                        active: src.active.get(),
                        target: weak_link(file, src.target.assigned()),
                    };
                }
            }
            Level::GravityModifier => {
                if let (Some(src), Some(slot)) = (object.gravity(), self.data.gravity_mut()) {
                    *slot = GravityFields {
                        strength: src.strength.get(),
                        axis: src.axis.get(),
                        gravity_object: weak_link(file, src.gravity_object.assigned()),
                    };
                }
            }
            Level::ColorModifier => {
                if let (Some(src), Some(slot)) = (object.color(), self.data.color_mut()) {
                    let mut keys = Vec::with_capacity(src.keys.len());
                    src.keys.for_each(|_, key| {
                        keys.push(ColorKeyValue {
                            time: key.time.get(),
                            color: key.color.get(),
                        });
                    });
                    *slot = ColorFields { keys };
                }
            }
            Level::BoxEmitter => {
                if let (Some(src), Some(slot)) = (object.emitter(), self.data.emitter_mut()) {
                    *slot = BoxEmitterFields {
                        speed: src.speed.get(),
                        life_span: src.life_span.get(),
                        emitter_object: weak_link(file, src.emitter_object.assigned()),
                        extent: src.extent.get(),
                    };
                }
            }
            Level::ExtraData => {
                if let (Some(src), Some(slot)) = (object.extra(), self.data.extra_mut()) {
                    *slot = ExtraFields {
                        name: src.name.get(),
                    };
                }
            }
            Level::StringData => {
                if let (Some(src), Some(slot)) = (object.string(), self.data.string_mut()) {
                    *slot = StringFields {
                        value: src.value.get(),
                    };
                }
            }
            Level::ControllerManager => {
                if let (Some(src), Some(slot)) = (object.manager(), self.data.manager_mut()) {
                    *slot = ControllerManagerFields {
                        cumulative: src.cumulative.get(),
                        sequences: links(file, &src.sequences.to_vec()),
                    };
                }
            }
            Level::ControllerSequence => {
                if let (Some(src), Some(slot)) = (object.sequence(), self.data.sequence_mut()) {
                    *slot = ControllerSequenceFields {
                        name: src.name.get(),
                        frequency: src.frequency.get(),
                        text_keys: src
                            .text_keys
                            .to_vec()
                            .iter()
                            .map(|key| TextKeyValue {
                                time: key.time.get(),
                                text: key.text.get(),
                            })
                            .collect(),
                        interpolators: links(file, &src.interpolators.to_vec()),
                        manager: weak_link(file, src.manager.assigned()),
                    };
                }
            }
            Level::FloatInterpolator => {
                if let (Some(src), Some(slot)) = (object.interpolator(), self.data.interpolator_mut())
                {
                    *slot = FloatInterpolatorFields {
                        value: src.value.get(),
                    };
                }
            }
        }
        Ok(())
    }
}
