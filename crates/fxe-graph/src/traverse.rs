//! Vertical and horizontal traversal.
//!
//! **Vertical** traversal walks one object's level chain. A
//! [`LevelHandler`] gets one call per level; [`down`] goes base to derived,
//! [`up`] derived to base. Synchronization always goes down, so a derived
//! level never sees its bases stale.
//!
//! **Horizontal** traversal walks the object graph. [`AnyObject::receive`]
//! calls the [`Visitor`] method for the object's runtime kind; a
//! [`Forwarder`] wraps a visitor and carries it on into every object the
//! visited one owns.
//!
//! # Invariants
//!
//! 1. A forwarder follows owning edges only (extra data, controller,
//!    children, effects, modifiers, sequences, interpolators). Weak
//!    back-references are never followed.
//! 2. A forwarder visits each object at most once per dispatch, even when
//!    several owning edges share a target.
//! 3. Objects are visited before the objects they own (pre-order), in field
//!    order.
//!
//! # Failure Modes
//!
//! - A visitor without a case for some kind reaches [`Visitor::visit_any`],
//!   whose default is a debug assertion. Release builds skip the object.

use std::convert::Infallible;
use std::rc::Rc;

use ahash::AHashSet;

use crate::id::ObjectId;
use crate::kind::Level;
use crate::object::{
    AnyObject, BillboardNode, BoxEmitter, ColorModifier, ControllerManager, ControllerSequence,
    FloatInterpolator, GravityModifier, Node, Object, ParticleSystem, PointLight, StringData,
};

// ---------------------------------------------------------------------------
// Vertical
// ---------------------------------------------------------------------------

/// Handles one level of one object.
pub trait LevelHandler {
    type Error;

    fn level(&mut self, level: Level, object: &AnyObject) -> Result<(), Self::Error>;
}

/// Run `handler` over `object`'s levels, base first.
///
/// # Errors
///
/// Stops at the first level whose handler fails.
pub fn down<H: LevelHandler + ?Sized>(object: &AnyObject, handler: &mut H) -> Result<(), H::Error> {
    for &level in object.kind().chain() {
        handler.level(level, object)?;
    }
    Ok(())
}

/// Run `handler` over `object`'s levels, most derived first.
///
/// # Errors
///
/// Stops at the first level whose handler fails.
pub fn up<H: LevelHandler + ?Sized>(object: &AnyObject, handler: &mut H) -> Result<(), H::Error> {
    for &level in object.kind().chain().iter().rev() {
        handler.level(level, object)?;
    }
    Ok(())
}

/// Collects the targets of owning edges, level by level.
struct OwnedEdges(Vec<AnyObject>);

impl LevelHandler for OwnedEdges {
    type Error = Infallible;

    fn level(&mut self, level: Level, object: &AnyObject) -> Result<(), Infallible> {
        match level {
            Level::ObjectNet => {
                if let Some(net) = object.net() {
                    self.0.extend(net.extra_data.to_vec().into_iter().map(|o| o.to_any()));
                    self.0.extend(net.controller.assigned().map(|o| o.to_any()));
                }
            }
            Level::Node => {
                if let Some(node) = object.node() {
                    self.0.extend(node.children.to_vec().into_iter().map(|o| o.to_any()));
                    self.0.extend(node.effects.to_vec().into_iter().map(|o| o.to_any()));
                }
            }
            Level::ParticleSystem => {
                if let Some(particles) = object.particles() {
                    self.0.extend(particles.modifiers.to_vec().into_iter().map(|o| o.to_any()));
                }
            }
            Level::ControllerManager => {
                if let Some(manager) = object.manager() {
                    self.0.extend(manager.sequences.to_vec().into_iter().map(|o| o.to_any()));
                }
            }
            Level::ControllerSequence => {
                if let Some(sequence) = object.sequence() {
                    self.0.extend(
                        sequence
                            .interpolators
                            .to_vec()
                            .into_iter()
                            .map(|o| o.to_any()),
                    );
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Objects `object` owns directly, in field order.
#[must_use]
pub fn owned(object: &AnyObject) -> Vec<AnyObject> {
    let mut edges = OwnedEdges(Vec::new());
    match down(object, &mut edges) {
        Ok(()) => edges.0,
        Err(never) => match never {},
    }
}

// ---------------------------------------------------------------------------
// Horizontal
// ---------------------------------------------------------------------------

/// One method per concrete kind.
///
/// Every method defaults to [`Visitor::visit_any`]; a uniform visitor
/// overrides only that one.
pub trait Visitor {
    /// Fallback for kinds without a dedicated case.
    fn visit_any(&mut self, object: &AnyObject) {
        debug_assert!(false, "no visitor case for {object:?}");
    }

    fn visit_node(&mut self, object: &Rc<Node>) {
        self.visit_any(&AnyObject::Node(Rc::clone(object)));
    }

    fn visit_billboard_node(&mut self, object: &Rc<BillboardNode>) {
        self.visit_any(&AnyObject::BillboardNode(Rc::clone(object)));
    }

    fn visit_point_light(&mut self, object: &Rc<PointLight>) {
        self.visit_any(&AnyObject::PointLight(Rc::clone(object)));
    }

    fn visit_particle_system(&mut self, object: &Rc<ParticleSystem>) {
        self.visit_any(&AnyObject::ParticleSystem(Rc::clone(object)));
    }

    fn visit_gravity_modifier(&mut self, object: &Rc<GravityModifier>) {
        self.visit_any(&AnyObject::GravityModifier(Rc::clone(object)));
    }

    fn visit_color_modifier(&mut self, object: &Rc<ColorModifier>) {
        self.visit_any(&AnyObject::ColorModifier(Rc::clone(object)));
    }

    fn visit_box_emitter(&mut self, object: &Rc<BoxEmitter>) {
        self.visit_any(&AnyObject::BoxEmitter(Rc::clone(object)));
    }

    fn visit_string_data(&mut self, object: &Rc<StringData>) {
        self.visit_any(&AnyObject::StringData(Rc::clone(object)));
    }

    fn visit_controller_manager(&mut self, object: &Rc<ControllerManager>) {
        self.visit_any(&AnyObject::ControllerManager(Rc::clone(object)));
    }

    fn visit_controller_sequence(&mut self, object: &Rc<ControllerSequence>) {
        self.visit_any(&AnyObject::ControllerSequence(Rc::clone(object)));
    }

    fn visit_float_interpolator(&mut self, object: &Rc<FloatInterpolator>) {
        self.visit_any(&AnyObject::FloatInterpolator(Rc::clone(object)));
    }
}

/// Carries a visitor through the owned subgraph of an entry object.
///
/// ```
/// use fxe_graph::traverse::{Forwarder, Visitor};
/// use fxe_graph::{AnyObject, File, Node, Object, PointLight};
///
/// #[derive(Default)]
/// struct Names(Vec<String>);
///
/// impl Visitor for Names {
///     fn visit_any(&mut self, object: &AnyObject) {
///         self.0.push(object.kind().to_string());
///     }
/// }
///
/// let file = File::new();
/// let root = file.create::<Node>().unwrap();
/// root.node.effects.add(file.create::<PointLight>().unwrap());
///
/// let mut names = Names::default();
/// Forwarder::new(&mut names).dispatch(&root.to_any());
/// assert_eq!(names.0, ["Node", "PointLight"]);
/// ```
pub struct Forwarder<'v> {
    inner: &'v mut dyn Visitor,
    visited: AHashSet<ObjectId>,
}

impl<'v> Forwarder<'v> {
    pub fn new(inner: &'v mut dyn Visitor) -> Self {
        Self {
            inner,
            visited: AHashSet::new(),
        }
    }

    /// Visit `entry` and everything it owns, transitively.
    pub fn dispatch(&mut self, entry: &AnyObject) {
        entry.receive(self);
    }

    /// Number of distinct objects visited so far.
    #[must_use]
    pub fn visited(&self) -> usize {
        self.visited.len()
    }
}

impl Visitor for Forwarder<'_> {
    fn visit_any(&mut self, object: &AnyObject) {
        if !self.visited.insert(object.id()) {
            return;
        }
        object.receive(&mut *self.inner);
        for child in owned(object) {
            child.receive(self);
        }
    }
}
