//! Per-level native field storage.
//!
//! Each struct holds the fields one level of the block hierarchy introduces.
//! A block's data is the set of structs along its level chain; see
//! [`crate::BlockData`].

use crate::link::{Link, WeakLink};

/// Position, orientation and uniform scale of a scene object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: [f32; 3],
    /// Row-major rotation matrix.
    pub rotation: [[f32; 3]; 3],
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: [0.0; 3],
        rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        scale: 1.0,
    };
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Time-stamped RGBA color.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorKeyValue {
    pub time: f32,
    pub color: [f32; 4],
}

/// Time-stamped text marker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextKeyValue {
    pub time: f32,
    pub text: String,
}

/// Named, controllable object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetFields {
    pub name: String,
    pub extra_data: Vec<Link>,
    pub controller: Link,
}

/// Object placed in the scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvFields {
    pub flags: u32,
    pub transform: Transform,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeFields {
    pub children: Vec<Link>,
    pub effects: Vec<Link>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BillboardFields {
    pub mode: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightFields {
    pub dimmer: f32,
    pub diffuse: [f32; 3],
}

impl Default for PointLightFields {
    fn default() -> Self {
        Self {
            dimmer: 1.0,
            diffuse: [1.0; 3],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleSystemFields {
    pub max_particles: u16,
    pub modifiers: Vec<Link>,
}

/// Behaviour attached to a particle system.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierFields {
    pub name: String,
    pub order: u32,
    pub active: bool,
    /// Back-reference to the owning particle system.
    pub target: WeakLink,
}

impl Default for ModifierFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            order: 0,
            active: true,
            target: WeakLink::null(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GravityFields {
    pub strength: f32,
    pub axis: [f32; 3],
    pub gravity_object: WeakLink,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorFields {
    pub keys: Vec<ColorKeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxEmitterFields {
    pub speed: f32,
    pub life_span: f32,
    pub emitter_object: WeakLink,
    pub extent: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraFields {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringFields {
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerManagerFields {
    pub cumulative: bool,
    pub sequences: Vec<Link>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerSequenceFields {
    pub name: String,
    pub frequency: f32,
    pub text_keys: Vec<TextKeyValue>,
    pub interpolators: Vec<Link>,
    /// Back-reference to the manager that plays this sequence.
    pub manager: WeakLink,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FloatInterpolatorFields {
    pub value: f32,
}
