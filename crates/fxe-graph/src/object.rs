//! Wrapper objects.
//!
//! Every concrete object is an `Rc`-shared struct whose first field is its
//! [`Header`] (identity plus the strong hold on its native block), followed
//! by one public level struct per step of its chain. Abstract levels are
//! traits ([`ObjectNet`], [`AvObject`], [`NodeObject`], [`Modifier`],
//! [`ExtraData`]) so that owning edges can hold any subtype, e.g.
//! `Sequence<dyn AvObject>`.
//!
//! [`AnyObject`] is the closed sum of all concrete kinds. It is what the
//! identity map hands around internally and what horizontal traversal
//! dispatches on.
//!
//! # Invariants
//!
//! 1. The header is declared first, so it drops first: the identity-map
//!    entry disappears as soon as the last strong handle goes away, before
//!    any level (and any nested listener event) is torn down.
//! 2. A concrete class accepts exactly its own kind; a trait-object class
//!    accepts every kind whose chain contains its level.

use std::fmt;
use std::rc::{Rc, Weak};

use fxe_native::NativeRef;

use crate::file::Registry;
use crate::id::ObjectId;
use crate::kind::{Level, ObjectKind};
use crate::levels::{
    AvLevel, BillboardLevel, BoxEmitterLevel, ColorLevel, ControllerManagerLevel,
    ControllerSequenceLevel, ExtraLevel, FloatInterpolatorLevel, GravityLevel, ModifierLevel,
    NetLevel, NodeLevel, ParticleSystemLevel, PointLightLevel, StringLevel,
};
use crate::traverse::Visitor;

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Identity of a wrapper object and its link to the native side.
pub struct Header {
    id: ObjectId,
    native: Option<NativeRef>,
    registry: Weak<Registry>,
}

impl Header {
    pub(crate) fn new(id: ObjectId, native: Option<NativeRef>, registry: Weak<Registry>) -> Self {
        Self {
            id,
            native,
            registry,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The native block this object mirrors, if it has one.
    #[must_use]
    pub fn native(&self) -> Option<&NativeRef> {
        self.native.as_ref()
    }
}

impl Drop for Header {
    fn drop(&mut self) {
        if let (Some(registry), Some(native)) = (self.registry.upgrade(), self.native.as_ref()) {
            registry.forget(native.id(), self.id);
        }
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("id", &self.id)
            .field("native", &self.native.as_ref().map(|n| n.id()))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Level traits
// ---------------------------------------------------------------------------

/// Root of the object hierarchy.
pub trait Object: 'static {
    fn header(&self) -> &Header;

    /// Runtime kind.
    fn kind(&self) -> ObjectKind;

    /// Re-wrap as the closed sum type.
    fn to_any(self: Rc<Self>) -> AnyObject;

    fn id(&self) -> ObjectId {
        self.header().id()
    }
}

/// Named object that can carry extra data and a controller.
pub trait ObjectNet: Object {
    fn net(&self) -> &NetLevel;
}

/// Object placed in the scene.
pub trait AvObject: ObjectNet {
    fn av(&self) -> &AvLevel;
}

/// Scene object with children.
pub trait NodeObject: AvObject {
    fn node(&self) -> &NodeLevel;
}

/// Particle system behaviour.
pub trait Modifier: Object {
    fn modifier(&self) -> &ModifierLevel;
}

/// Data attached to an [`ObjectNet`].
pub trait ExtraData: Object {
    fn extra(&self) -> &ExtraLevel;
}

/// A type the identity map can hand out: a concrete object or a level trait
/// object.
pub trait Class: Object {
    /// Whether objects of `kind` can be viewed as `Self`.
    fn accepts(kind: ObjectKind) -> bool;

    /// View `object` as `Self`, or `None` if its kind is not accepted.
    fn from_any(object: AnyObject) -> Option<Rc<Self>>;
}

/// A concrete object kind.
pub trait Concrete: Class + Sized {
    const KIND: ObjectKind;

    /// Build an object with default level values.
    fn construct(header: Header) -> Self;
}

// ---------------------------------------------------------------------------
// Concrete objects
// ---------------------------------------------------------------------------

macro_rules! concrete_objects {
    ($(
        $(#[$meta:meta])*
        $name:ident => $visit:ident { $($field:ident: $level:ty),+ $(,)? }
    )+) => {
        $(
            $(#[$meta])*
            pub struct $name {
                header: Header,
                $(pub $field: $level,)+
            }

            impl Object for $name {
                fn header(&self) -> &Header {
                    &self.header
                }

                fn kind(&self) -> ObjectKind {
                    ObjectKind::$name
                }

                fn to_any(self: Rc<Self>) -> AnyObject {
                    AnyObject::$name(self)
                }
            }

            impl Class for $name {
                fn accepts(kind: ObjectKind) -> bool {
                    kind == ObjectKind::$name
                }

                fn from_any(object: AnyObject) -> Option<Rc<Self>> {
                    match object {
                        AnyObject::$name(o) => Some(o),
                        _ => None,
                    }
                }
            }

            impl Concrete for $name {
                const KIND: ObjectKind = ObjectKind::$name;

                fn construct(header: Header) -> Self {
                    Self {
                        header,
                        $($field: <$level>::default(),)+
                    }
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($name))
                        .field("header", &self.header)
                        $(.field(stringify!($field), &self.$field))+
                        .finish()
                }
            }
        )+

        /// Any concrete object, by shared handle.
        #[derive(Clone)]
        pub enum AnyObject {
            $($name(Rc<$name>),)+
        }

        impl AnyObject {
            #[must_use]
            pub fn kind(&self) -> ObjectKind {
                match self {
                    $(Self::$name(_) => ObjectKind::$name,)+
                }
            }

            #[must_use]
            pub fn header(&self) -> &Header {
                match self {
                    $(Self::$name(o) => &o.header,)+
                }
            }

            /// Upcast to the root trait object.
            #[must_use]
            pub fn as_object(&self) -> Rc<dyn Object> {
                match self {
                    $(Self::$name(o) => Rc::clone(o) as Rc<dyn Object>,)+
                }
            }

            /// Dispatch to the visitor method for this object's kind.
            pub fn receive(&self, visitor: &mut dyn Visitor) {
                match self {
                    $(Self::$name(o) => visitor.$visit(o),)+
                }
            }

            /// Strong handles to this object, this one included.
            pub(crate) fn strong_count(&self) -> usize {
                match self {
                    $(Self::$name(o) => Rc::strong_count(o),)+
                }
            }

            pub(crate) fn construct(kind: ObjectKind, header: Header) -> Self {
                match kind {
                    $(ObjectKind::$name => Self::$name(Rc::new($name::construct(header))),)+
                }
            }
        }
    };
}

concrete_objects! {
    /// Scene graph node with children and light effects.
    Node => visit_node {
        net: NetLevel,
        av: AvLevel,
        node: NodeLevel,
    }
    /// Node that turns towards the camera.
    BillboardNode => visit_billboard_node {
        net: NetLevel,
        av: AvLevel,
        node: NodeLevel,
        billboard: BillboardLevel,
    }
    PointLight => visit_point_light {
        net: NetLevel,
        av: AvLevel,
        light: PointLightLevel,
    }
    ParticleSystem => visit_particle_system {
        net: NetLevel,
        av: AvLevel,
        particles: ParticleSystemLevel,
    }
    GravityModifier => visit_gravity_modifier {
        modifier: ModifierLevel,
        gravity: GravityLevel,
    }
    ColorModifier => visit_color_modifier {
        modifier: ModifierLevel,
        color: ColorLevel,
    }
    BoxEmitter => visit_box_emitter {
        modifier: ModifierLevel,
        emitter: BoxEmitterLevel,
    }
    StringData => visit_string_data {
        extra: ExtraLevel,
        string: StringLevel,
    }
    /// Owner of the animation sequences of an object.
    ControllerManager => visit_controller_manager {
        manager: ControllerManagerLevel,
    }
    ControllerSequence => visit_controller_sequence {
        sequence: ControllerSequenceLevel,
    }
    FloatInterpolator => visit_float_interpolator {
        interpolator: FloatInterpolatorLevel,
    }
}

macro_rules! impl_level {
    ($trait:ident :: $method:ident -> $level:ty { $($name:ident),+ }) => {
        $(
            impl $trait for $name {
                fn $method(&self) -> &$level {
                    &self.$method
                }
            }
        )+
    };
}

impl_level!(ObjectNet::net -> NetLevel { Node, BillboardNode, PointLight, ParticleSystem });
impl_level!(AvObject::av -> AvLevel { Node, BillboardNode, PointLight, ParticleSystem });
impl_level!(NodeObject::node -> NodeLevel { Node, BillboardNode });
impl_level!(Modifier::modifier -> ModifierLevel { GravityModifier, ColorModifier, BoxEmitter });
impl_level!(ExtraData::extra -> ExtraLevel { StringData });

// ---------------------------------------------------------------------------
// AnyObject views
// ---------------------------------------------------------------------------

macro_rules! level_views {
    ($($method:ident: $level:ty => [$($name:ident),+];)+) => {
        impl AnyObject {
            $(
                #[must_use]
                pub fn $method(&self) -> Option<&$level> {
                    match self {
                        $(Self::$name(o) => Some(&o.$method),)+
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            )+
        }
    };
}

level_views! {
    net: NetLevel => [Node, BillboardNode, PointLight, ParticleSystem];
    av: AvLevel => [Node, BillboardNode, PointLight, ParticleSystem];
    node: NodeLevel => [Node, BillboardNode];
    billboard: BillboardLevel => [BillboardNode];
    light: PointLightLevel => [PointLight];
    particles: ParticleSystemLevel => [ParticleSystem];
    modifier: ModifierLevel => [GravityModifier, ColorModifier, BoxEmitter];
    gravity: GravityLevel => [GravityModifier];
    color: ColorLevel => [ColorModifier];
    emitter: BoxEmitterLevel => [BoxEmitter];
    extra: ExtraLevel => [StringData];
    string: StringLevel => [StringData];
    manager: ControllerManagerLevel => [ControllerManager];
    sequence: ControllerSequenceLevel => [ControllerSequence];
    interpolator: FloatInterpolatorLevel => [FloatInterpolator];
}

macro_rules! upcasts {
    ($($method:ident -> $trait:ident [$($name:ident),+];)+) => {
        impl AnyObject {
            $(
                #[must_use]
                pub fn $method(self) -> Option<Rc<dyn $trait>> {
                    match self {
                        $(Self::$name(o) => Some(o as Rc<dyn $trait>),)+
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            )+
        }
    };
}

upcasts! {
    into_net -> ObjectNet [Node, BillboardNode, PointLight, ParticleSystem];
    into_av -> AvObject [Node, BillboardNode, PointLight, ParticleSystem];
    into_node -> NodeObject [Node, BillboardNode];
    into_modifier -> Modifier [GravityModifier, ColorModifier, BoxEmitter];
    into_extra -> ExtraData [StringData];
}

impl AnyObject {
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.header().id()
    }

    /// Whether both handles point at the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.header(), other.header())
    }
}

impl PartialEq for AnyObject {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for AnyObject {}

impl fmt::Debug for AnyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.id())
    }
}

// ---------------------------------------------------------------------------
// Trait-object classes
// ---------------------------------------------------------------------------

impl Class for dyn Object {
    fn accepts(_kind: ObjectKind) -> bool {
        true
    }

    fn from_any(object: AnyObject) -> Option<Rc<Self>> {
        Some(object.as_object())
    }
}

macro_rules! trait_classes {
    ($($trait:ident => $level:ident, $upcast:ident;)+) => {
        $(
            impl Class for dyn $trait {
                fn accepts(kind: ObjectKind) -> bool {
                    kind.is_a(Level::$level)
                }

                fn from_any(object: AnyObject) -> Option<Rc<Self>> {
                    object.$upcast()
                }
            }
        )+
    };
}

trait_classes! {
    ObjectNet => ObjectNet, into_net;
    AvObject => AvObject, into_av;
    NodeObject => Node, into_node;
    Modifier => Modifier, into_modifier;
    ExtraData => ExtraData, into_extra;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdAllocator;

    fn detached(kind: ObjectKind) -> AnyObject {
        let ids = IdAllocator::new(1, u64::MAX);
        let id = ids.allocate().expect("id");
        AnyObject::construct(kind, Header::new(id, None, Weak::new()))
    }

    #[test]
    fn construct_builds_requested_kind() {
        for kind in ObjectKind::ALL {
            let object = detached(kind);
            assert_eq!(object.kind(), kind);
            assert_eq!(object.as_object().kind(), kind);
            assert!(object.header().native().is_none());
        }
    }

    #[test]
    fn trait_classes_follow_chains() {
        for kind in ObjectKind::ALL {
            let object = detached(kind);
            assert_eq!(
                <dyn AvObject as Class>::accepts(kind),
                object.clone().into_av().is_some()
            );
            assert_eq!(
                <dyn NodeObject as Class>::accepts(kind),
                object.clone().into_node().is_some()
            );
            assert_eq!(
                <dyn Modifier as Class>::accepts(kind),
                object.clone().into_modifier().is_some()
            );
            assert_eq!(object.net().is_some(), kind.is_a(Level::ObjectNet));
        }
    }

    #[test]
    fn concrete_class_is_exact() {
        let billboard = detached(ObjectKind::BillboardNode);
        assert!(Node::from_any(billboard.clone()).is_none());
        assert!(BillboardNode::from_any(billboard.clone()).is_some());
        assert!(<dyn NodeObject as Class>::from_any(billboard).is_some());
    }

    #[test]
    fn any_object_equality_is_identity() {
        let a = detached(ObjectKind::PointLight);
        let b = detached(ObjectKind::PointLight);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        let back = a.as_object().to_any();
        assert_eq!(a, back);
    }
}
