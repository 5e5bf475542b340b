//! Observable field storage, one struct per level.
//!
//! Owning edges are [`Sequence`]s, [`Set`]s and [`Ref`]s; back-references
//! are [`Ptr`]s. Every field is public: views attach listeners directly.

use bitflags::bitflags;
use fxe_native::Transform;
use fxe_observe::{FlagSet, List, Property, Ptr, Ref, Sequence, Set, Vector};

use crate::object::{
    AvObject, ControllerManager, ControllerSequence, ExtraData, FloatInterpolator, Modifier,
    ParticleSystem, PointLight,
};

bitflags! {
    /// Scene object flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AvFlags: u32 {
        const HIDDEN = 0x1;
        const SELECTIVE_UPDATE = 0x2;
        const SELECTIVE_XFORMS = 0x4;
        const SELECTIVE_CONTROLLER = 0x8;
        const SELECTIVE_RIGID = 0x10;
        const DISPLAY_OBJECT = 0x20;
    }
}

/// How a billboard node turns towards the camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BillboardMode {
    #[default]
    AlwaysFaceCamera,
    RotateAboutUp,
    RigidFaceCamera,
    AlwaysFaceCenter,
    RigidFaceCenter,
    /// A raw value this editor has no name for; kept as is.
    Other(u16),
}

impl BillboardMode {
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Self::AlwaysFaceCamera,
            1 => Self::RotateAboutUp,
            2 => Self::RigidFaceCamera,
            3 => Self::AlwaysFaceCenter,
            4 => Self::RigidFaceCenter,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub const fn to_raw(self) -> u16 {
        match self {
            Self::AlwaysFaceCamera => 0,
            Self::RotateAboutUp => 1,
            Self::RigidFaceCamera => 2,
            Self::AlwaysFaceCenter => 3,
            Self::RigidFaceCenter => 4,
            Self::Other(raw) => raw,
        }
    }
}

/// Color key of a color modifier. Views watch the nested properties.
#[derive(Debug, Default)]
pub struct ColorKey {
    pub time: Property<f32>,
    pub color: Property<[f32; 4]>,
}

/// Text marker of a controller sequence.
#[derive(Debug, Default)]
pub struct TextKey {
    pub time: Property<f32>,
    pub text: Property<String>,
}

#[derive(Debug, Default)]
pub struct NetLevel {
    pub name: Property<String>,
    pub extra_data: Sequence<dyn ExtraData>,
    pub controller: Ref<ControllerManager>,
}

#[derive(Debug, Default)]
pub struct AvLevel {
    pub flags: FlagSet<AvFlags>,
    pub transform: Property<Transform>,
}

#[derive(Debug, Default)]
pub struct NodeLevel {
    pub children: Sequence<dyn AvObject>,
    pub effects: Set<PointLight>,
}

#[derive(Debug, Default)]
pub struct BillboardLevel {
    pub mode: Property<BillboardMode>,
}

#[derive(Debug)]
pub struct PointLightLevel {
    pub dimmer: Property<f32>,
    pub diffuse: Property<[f32; 3]>,
}

impl Default for PointLightLevel {
    fn default() -> Self {
        Self {
            dimmer: Property::new(1.0),
            diffuse: Property::new([1.0; 3]),
        }
    }
}

#[derive(Debug, Default)]
pub struct ParticleSystemLevel {
    pub max_particles: Property<u16>,
    pub modifiers: Sequence<dyn Modifier>,
}

#[derive(Debug)]
pub struct ModifierLevel {
    pub name: Property<String>,
    pub order: Property<u32>,
    pub active: Property<bool>,
    /// The particle system this modifier belongs to.
    pub target: Ptr<ParticleSystem>,
}

impl Default for ModifierLevel {
    fn default() -> Self {
        Self {
            name: Property::default(),
            order: Property::default(),
            active: Property::new(true),
            target: Ptr::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct GravityLevel {
    pub strength: Property<f32>,
    pub axis: Property<[f32; 3]>,
    pub gravity_object: Ptr<dyn AvObject>,
}

#[derive(Debug, Default)]
pub struct ColorLevel {
    pub keys: Vector<ColorKey>,
}

#[derive(Debug, Default)]
pub struct BoxEmitterLevel {
    pub speed: Property<f32>,
    pub life_span: Property<f32>,
    pub emitter_object: Ptr<dyn AvObject>,
    pub extent: Property<[f32; 3]>,
}

#[derive(Debug, Default)]
pub struct ExtraLevel {
    pub name: Property<String>,
}

#[derive(Debug, Default)]
pub struct StringLevel {
    pub value: Property<String>,
}

#[derive(Debug, Default)]
pub struct ControllerManagerLevel {
    pub cumulative: Property<bool>,
    pub sequences: Sequence<ControllerSequence>,
}

#[derive(Debug, Default)]
pub struct ControllerSequenceLevel {
    pub name: Property<String>,
    pub frequency: Property<f32>,
    pub text_keys: List<TextKey>,
    pub interpolators: Sequence<FloatInterpolator>,
    /// The manager that plays this sequence.
    pub manager: Ptr<ControllerManager>,
}

#[derive(Debug, Default)]
pub struct FloatInterpolatorLevel {
    pub value: Property<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billboard_mode_keeps_unknown_values() {
        for raw in [0u16, 1, 2, 3, 4, 9, u16::MAX] {
            assert_eq!(BillboardMode::from_raw(raw).to_raw(), raw);
        }
        assert_eq!(BillboardMode::from_raw(9), BillboardMode::Other(9));
    }

    #[test]
    fn level_defaults_match_native_defaults() {
        let light = PointLightLevel::default();
        let native = fxe_native::PointLightFields::default();
        assert_eq!(light.dimmer.get(), native.dimmer);
        assert_eq!(light.diffuse.get(), native.diffuse);
        assert_eq!(
            ModifierLevel::default().active.get(),
            fxe_native::ModifierFields::default().active
        );
    }
}
