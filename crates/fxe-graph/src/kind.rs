//! The closed set of object kinds and their level chains.
//!
//! Every concrete [`ObjectKind`] sits at the end of a single-inheritance
//! chain of [`Level`]s rooted at [`Level::Object`]. A level owns the fields
//! it introduces; a kind's data is the union of its chain's levels.
//!
//! ```text
//! Object
//! ├── ObjectNet
//! │   └── AvObject
//! │       ├── Node ── BillboardNode
//! │       ├── PointLight
//! │       └── ParticleSystem
//! ├── Modifier
//! │   ├── GravityModifier
//! │   ├── ColorModifier
//! │   └── BoxEmitter
//! ├── ExtraData ── StringData
//! ├── ControllerManager
//! ├── ControllerSequence
//! └── FloatInterpolator
//! ```

use std::fmt;

use fxe_native::BlockType;

/// One step of a level chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Object,
    ObjectNet,
    AvObject,
    Node,
    BillboardNode,
    PointLight,
    ParticleSystem,
    Modifier,
    GravityModifier,
    ColorModifier,
    BoxEmitter,
    ExtraData,
    StringData,
    ControllerManager,
    ControllerSequence,
    FloatInterpolator,
}

impl Level {
    /// The level this one derives from.
    #[must_use]
    pub const fn base(self) -> Option<Self> {
        match self {
            Self::Object => None,
            Self::ObjectNet
            | Self::Modifier
            | Self::ExtraData
            | Self::ControllerManager
            | Self::ControllerSequence
            | Self::FloatInterpolator => Some(Self::Object),
            Self::AvObject => Some(Self::ObjectNet),
            Self::Node | Self::PointLight | Self::ParticleSystem => Some(Self::AvObject),
            Self::BillboardNode => Some(Self::Node),
            Self::GravityModifier | Self::ColorModifier | Self::BoxEmitter => Some(Self::Modifier),
            Self::StringData => Some(Self::ExtraData),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Runtime type of a wrapper object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
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

impl ObjectKind {
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

    /// Levels of this kind, base first.
    #[must_use]
    pub const fn chain(self) -> &'static [Level] {
        use Level as L;
        match self {
            Self::Node => &[L::Object, L::ObjectNet, L::AvObject, L::Node],
            Self::BillboardNode => &[
                L::Object,
                L::ObjectNet,
                L::AvObject,
                L::Node,
                L::BillboardNode,
            ],
            Self::PointLight => &[L::Object, L::ObjectNet, L::AvObject, L::PointLight],
            Self::ParticleSystem => &[L::Object, L::ObjectNet, L::AvObject, L::ParticleSystem],
            Self::GravityModifier => &[L::Object, L::Modifier, L::GravityModifier],
            Self::ColorModifier => &[L::Object, L::Modifier, L::ColorModifier],
            Self::BoxEmitter => &[L::Object, L::Modifier, L::BoxEmitter],
            Self::StringData => &[L::Object, L::ExtraData, L::StringData],
            Self::ControllerManager => &[L::Object, L::ControllerManager],
            Self::ControllerSequence => &[L::Object, L::ControllerSequence],
            Self::FloatInterpolator => &[L::Object, L::FloatInterpolator],
        }
    }

    /// The most derived level of this kind.
    #[must_use]
    pub const fn level(self) -> Level {
        match self {
            Self::Node => Level::Node,
            Self::BillboardNode => Level::BillboardNode,
            Self::PointLight => Level::PointLight,
            Self::ParticleSystem => Level::ParticleSystem,
            Self::GravityModifier => Level::GravityModifier,
            Self::ColorModifier => Level::ColorModifier,
            Self::BoxEmitter => Level::BoxEmitter,
            Self::StringData => Level::StringData,
            Self::ControllerManager => Level::ControllerManager,
            Self::ControllerSequence => Level::ControllerSequence,
            Self::FloatInterpolator => Level::FloatInterpolator,
        }
    }

    /// Whether `level` is on this kind's chain.
    #[must_use]
    pub fn is_a(self, level: Level) -> bool {
        self.chain().contains(&level)
    }

    #[must_use]
    pub const fn from_block_type(ty: BlockType) -> Self {
        match ty {
            BlockType::Node => Self::Node,
            BlockType::BillboardNode => Self::BillboardNode,
            BlockType::PointLight => Self::PointLight,
            BlockType::ParticleSystem => Self::ParticleSystem,
            BlockType::GravityModifier => Self::GravityModifier,
            BlockType::ColorModifier => Self::ColorModifier,
            BlockType::BoxEmitter => Self::BoxEmitter,
            BlockType::StringData => Self::StringData,
            BlockType::ControllerManager => Self::ControllerManager,
            BlockType::ControllerSequence => Self::ControllerSequence,
            BlockType::FloatInterpolator => Self::FloatInterpolator,
        }
    }

    #[must_use]
    pub const fn block_type(self) -> BlockType {
        match self {
            Self::Node => BlockType::Node,
            Self::BillboardNode => BlockType::BillboardNode,
            Self::PointLight => BlockType::PointLight,
            Self::ParticleSystem => BlockType::ParticleSystem,
            Self::GravityModifier => BlockType::GravityModifier,
            Self::ColorModifier => BlockType::ColorModifier,
            Self::BoxEmitter => BlockType::BoxEmitter,
            Self::StringData => BlockType::StringData,
            Self::ControllerManager => BlockType::ControllerManager,
            Self::ControllerSequence => BlockType::ControllerSequence,
            Self::FloatInterpolator => BlockType::FloatInterpolator,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chains_follow_base_links() {
        for kind in ObjectKind::ALL {
            let chain = kind.chain();
            assert_eq!(chain.first(), Some(&Level::Object));
            assert_eq!(chain.last(), Some(&kind.level()));
            for pair in chain.windows(2) {
                assert_eq!(pair[1].base(), Some(pair[0]), "{kind}");
            }
        }
    }

    #[test]
    fn block_types_round_trip() {
        for kind in ObjectKind::ALL {
            assert_eq!(ObjectKind::from_block_type(kind.block_type()), kind);
        }
        assert_eq!(ObjectKind::ALL.len(), BlockType::ALL.len());
    }

    #[test]
    fn is_a_includes_bases() {
        assert!(ObjectKind::BillboardNode.is_a(Level::Node));
        assert!(ObjectKind::BillboardNode.is_a(Level::ObjectNet));
        assert!(!ObjectKind::Node.is_a(Level::BillboardNode));
        assert!(!ObjectKind::BoxEmitter.is_a(Level::AvObject));
    }
}
