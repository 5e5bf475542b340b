//! Native blocks and their typed data.
//!
//! A [`NativeBlock`] is one object of the native graph: a stable
//! [`BlockId`] plus mutable [`BlockData`]. Blocks are shared as
//! [`NativeRef`] (`Rc<NativeBlock>`); owning edges between blocks are
//! [`Link`]s, back-references are [`WeakLink`]s.
//!
//! # Invariants
//!
//! 1. A block's [`BlockType`] never changes after construction.
//!    [`NativeBlock::replace`] rejects data of a different type.
//! 2. `BlockData` holds, per variant, exactly the level structs along that
//!    type's chain.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::error::NativeError;
use crate::fields::{
    AvFields, BillboardFields, BoxEmitterFields, ColorFields, ControllerManagerFields,
    ControllerSequenceFields, ExtraFields, FloatInterpolatorFields, GravityFields, ModifierFields,
    NetFields, NodeFields, ParticleSystemFields, PointLightFields, StringFields,
};
use crate::id::BlockId;
use crate::link::{Link, WeakLink};

/// Shared handle to a native block.
pub type NativeRef = Rc<NativeBlock>;

/// Runtime type of a native block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Node,
    BillboardNode,
    PointLight,
    ParticleSystem,
    GravityModifier,
    ColorModifier,
    BoxEmitter,
    StringData,
    ControllerManager,
    ControllerSequence,
    FloatInterpolator,
}

impl BlockType {
    /// Every block type, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Node,
        Self::BillboardNode,
        Self::PointLight,
        Self::ParticleSystem,
        Self::GravityModifier,
        Self::ColorModifier,
        Self::BoxEmitter,
        Self::StringData,
        Self::ControllerManager,
        Self::ControllerSequence,
        Self::FloatInterpolator,
    ];

    /// Type name as written in files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Node => "NiNode",
            Self::BillboardNode => "NiBillboardNode",
            Self::PointLight => "NiPointLight",
            Self::ParticleSystem => "NiParticleSystem",
            Self::GravityModifier => "NiPSysGravityModifier",
            Self::ColorModifier => "NiPSysColorModifier",
            Self::BoxEmitter => "NiPSysBoxEmitter",
            Self::StringData => "NiStringExtraData",
            Self::ControllerManager => "NiControllerManager",
            Self::ControllerSequence => "NiControllerSequence",
            Self::FloatInterpolator => "NiFloatInterpolator",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field storage of a block, one variant per block type.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockData {
    Node {
        net: NetFields,
        av: AvFields,
        node: NodeFields,
    },
    BillboardNode {
        net: NetFields,
        av: AvFields,
        node: NodeFields,
        billboard: BillboardFields,
    },
    PointLight {
        net: NetFields,
        av: AvFields,
        light: PointLightFields,
    },
    ParticleSystem {
        net: NetFields,
        av: AvFields,
        particles: ParticleSystemFields,
    },
    GravityModifier {
        modifier: ModifierFields,
        gravity: GravityFields,
    },
    ColorModifier {
        modifier: ModifierFields,
        color: ColorFields,
    },
    BoxEmitter {
        modifier: ModifierFields,
        emitter: BoxEmitterFields,
    },
    StringData {
        extra: ExtraFields,
        string: StringFields,
    },
    ControllerManager {
        manager: ControllerManagerFields,
    },
    ControllerSequence {
        sequence: ControllerSequenceFields,
    },
    FloatInterpolator {
        interpolator: FloatInterpolatorFields,
    },
}

macro_rules! level_access {
    ($($field:ident, $field_mut:ident: $ty:ty => [$($variant:ident),+];)*) => {
        $(
            #[must_use]
            pub fn $field(&self) -> Option<&$ty> {
                match self {
                    $(Self::$variant { $field, .. })|+ => Some($field),
                    _ => None,
                }
            }

            pub fn $field_mut(&mut self) -> Option<&mut $ty> {
                match self {
                    $(Self::$variant { $field, .. })|+ => Some($field),
                    _ => None,
                }
            }
        )*
    };
}

impl BlockData {
    /// Default-initialised data for `ty`.
    #[must_use]
    pub fn default_for(ty: BlockType) -> Self {
        match ty {
            BlockType::Node => Self::Node {
                net: NetFields::default(),
                av: AvFields::default(),
                node: NodeFields::default(),
            },
            BlockType::BillboardNode => Self::BillboardNode {
                net: NetFields::default(),
                av: AvFields::default(),
                node: NodeFields::default(),
                billboard: BillboardFields::default(),
            },
            BlockType::PointLight => Self::PointLight {
                net: NetFields::default(),
                av: AvFields::default(),
                light: PointLightFields::default(),
            },
            BlockType::ParticleSystem => Self::ParticleSystem {
                net: NetFields::default(),
                av: AvFields::default(),
                particles: ParticleSystemFields::default(),
            },
            BlockType::GravityModifier => Self::GravityModifier {
                modifier: ModifierFields::default(),
                gravity: GravityFields::default(),
            },
            BlockType::ColorModifier => Self::ColorModifier {
                modifier: ModifierFields::default(),
                color: ColorFields::default(),
            },
            BlockType::BoxEmitter => Self::BoxEmitter {
                modifier: ModifierFields::default(),
                emitter: BoxEmitterFields::default(),
            },
            BlockType::StringData => Self::StringData {
                extra: ExtraFields::default(),
                string: StringFields::default(),
            },
            BlockType::ControllerManager => Self::ControllerManager {
                manager: ControllerManagerFields::default(),
            },
            BlockType::ControllerSequence => Self::ControllerSequence {
                sequence: ControllerSequenceFields::default(),
            },
            BlockType::FloatInterpolator => Self::FloatInterpolator {
                interpolator: FloatInterpolatorFields::default(),
            },
        }
    }

    /// Runtime type of this data.
    #[must_use]
    pub const fn block_type(&self) -> BlockType {
        match self {
            Self::Node { .. } => BlockType::Node,
            Self::BillboardNode { .. } => BlockType::BillboardNode,
            Self::PointLight { .. } => BlockType::PointLight,
            Self::ParticleSystem { .. } => BlockType::ParticleSystem,
            Self::GravityModifier { .. } => BlockType::GravityModifier,
            Self::ColorModifier { .. } => BlockType::ColorModifier,
            Self::BoxEmitter { .. } => BlockType::BoxEmitter,
            Self::StringData { .. } => BlockType::StringData,
            Self::ControllerManager { .. } => BlockType::ControllerManager,
            Self::ControllerSequence { .. } => BlockType::ControllerSequence,
            Self::FloatInterpolator { .. } => BlockType::FloatInterpolator,
        }
    }

    level_access! {
        net, net_mut: NetFields => [Node, BillboardNode, PointLight, ParticleSystem];
        av, av_mut: AvFields => [Node, BillboardNode, PointLight, ParticleSystem];
        node, node_mut: NodeFields => [Node, BillboardNode];
        billboard, billboard_mut: BillboardFields => [BillboardNode];
        light, light_mut: PointLightFields => [PointLight];
        particles, particles_mut: ParticleSystemFields => [ParticleSystem];
        modifier, modifier_mut: ModifierFields => [GravityModifier, ColorModifier, BoxEmitter];
        gravity, gravity_mut: GravityFields => [GravityModifier];
        color, color_mut: ColorFields => [ColorModifier];
        emitter, emitter_mut: BoxEmitterFields => [BoxEmitter];
        extra, extra_mut: ExtraFields => [StringData];
        string, string_mut: StringFields => [StringData];
        manager, manager_mut: ControllerManagerFields => [ControllerManager];
        sequence, sequence_mut: ControllerSequenceFields => [ControllerSequence];
        interpolator, interpolator_mut: FloatInterpolatorFields => [FloatInterpolator];
    }

    /// Owning links, in field order.
    #[must_use]
    pub fn links(&self) -> Vec<Link> {
        let mut out = Vec::new();
        if let Some(net) = self.net() {
            out.extend(net.extra_data.iter().cloned());
            out.push(net.controller.clone());
        }
        if let Some(node) = self.node() {
            out.extend(node.children.iter().cloned());
            out.extend(node.effects.iter().cloned());
        }
        if let Some(particles) = self.particles() {
            out.extend(particles.modifiers.iter().cloned());
        }
        if let Some(manager) = self.manager() {
            out.extend(manager.sequences.iter().cloned());
        }
        if let Some(sequence) = self.sequence() {
            out.extend(sequence.interpolators.iter().cloned());
        }
        out.retain(|l| !l.is_null());
        out
    }

    /// Back-references, in field order.
    #[must_use]
    pub fn weak_links(&self) -> Vec<WeakLink> {
        let mut out = Vec::new();
        if let Some(modifier) = self.modifier() {
            out.push(modifier.target.clone());
        }
        if let Some(gravity) = self.gravity() {
            out.push(gravity.gravity_object.clone());
        }
        if let Some(emitter) = self.emitter() {
            out.push(emitter.emitter_object.clone());
        }
        if let Some(sequence) = self.sequence() {
            out.push(sequence.manager.clone());
        }
        out.retain(|l| !l.is_null());
        out
    }
}

/// One object of the native graph.
pub struct NativeBlock {
    id: BlockId,
    data: RefCell<BlockData>,
}

impl NativeBlock {
    /// Allocate a block holding `data`.
    #[must_use]
    pub fn new(data: BlockData) -> NativeRef {
        Rc::new(Self {
            id: BlockId::next(),
            data: RefCell::new(data),
        })
    }

    /// Allocate a default-initialised block of type `ty`.
    #[must_use]
    pub fn with_default(ty: BlockType) -> NativeRef {
        Self::new(BlockData::default_for(ty))
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> BlockId {
        self.id
    }

    #[must_use]
    pub fn block_type(&self) -> BlockType {
        self.data.borrow().block_type()
    }

    /// Borrow the block's data.
    ///
    /// # Panics
    ///
    /// Panics if the data is currently borrowed mutably.
    pub fn data(&self) -> Ref<'_, BlockData> {
        self.data.borrow()
    }

    /// Borrow the block's data mutably.
    ///
    /// # Panics
    ///
    /// Panics if the data is currently borrowed.
    pub fn data_mut(&self) -> RefMut<'_, BlockData> {
        self.data.borrow_mut()
    }

    /// Clone the block's data.
    #[must_use]
    pub fn snapshot(&self) -> BlockData {
        self.data.borrow().clone()
    }

    /// Swap in `data`, returning the previous data.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError::TypeMismatch`] if `data` is of another type;
    /// the block is left unchanged.
    pub fn replace(&self, data: BlockData) -> Result<BlockData, NativeError> {
        let expected = self.block_type();
        let found = data.block_type();
        if expected != found {
            return Err(NativeError::TypeMismatch {
                block: self.id,
                expected,
                found,
            });
        }
        Ok(self.data.replace(data))
    }
}

impl fmt::Debug for NativeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBlock")
            .field("id", &self.id)
            .field("type", &self.block_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_data_matches_type() {
        for ty in BlockType::ALL {
            assert_eq!(BlockData::default_for(ty).block_type(), ty);
            assert_eq!(NativeBlock::with_default(ty).block_type(), ty);
        }
    }

    #[test]
    fn level_accessors_follow_chain() {
        let billboard = BlockData::default_for(BlockType::BillboardNode);
        assert!(billboard.net().is_some());
        assert!(billboard.av().is_some());
        assert!(billboard.node().is_some());
        assert!(billboard.billboard().is_some());
        assert!(billboard.light().is_none());

        let gravity = BlockData::default_for(BlockType::GravityModifier);
        assert!(gravity.net().is_none());
        assert!(gravity.modifier().is_some_and(|m| m.active));
    }

    #[test]
    fn replace_rejects_other_type() {
        let block = NativeBlock::with_default(BlockType::PointLight);
        let err = block
            .replace(BlockData::default_for(BlockType::Node))
            .expect_err("type mismatch");
        assert!(matches!(err, NativeError::TypeMismatch { .. }));
        assert_eq!(block.block_type(), BlockType::PointLight);

        let mut data = block.snapshot();
        if let Some(light) = data.light_mut() {
            light.dimmer = 0.25;
        }
        block.replace(data).expect("same type");
        assert_eq!(block.data().light().map(|l| l.dimmer), Some(0.25));
    }

    #[test]
    fn links_skip_null_and_weak() {
        let child = NativeBlock::with_default(BlockType::Node);
        let manager = NativeBlock::with_default(BlockType::ControllerManager);
        let mut data = BlockData::default_for(BlockType::Node);
        if let Some(node) = data.node_mut() {
            node.children = vec![Link::to(&child), Link::null()];
        }
        assert_eq!(data.links(), vec![Link::to(&child)]);
        assert!(data.weak_links().is_empty());

        let mut seq = BlockData::default_for(BlockType::ControllerSequence);
        if let Some(s) = seq.sequence_mut() {
            s.manager = WeakLink::to(&manager);
        }
        assert!(seq.links().is_empty());
        assert_eq!(seq.weak_links(), vec![WeakLink::to(&manager)]);
    }
}
