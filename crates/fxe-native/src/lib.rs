#![forbid(unsafe_code)]

//! In-memory native block graph.
//!
//! This crate models the object graph a scene file decodes into: typed
//! [`NativeBlock`]s, owning [`Link`]s and weak [`WeakLink`]s between them,
//! and a [`NativeScene`] holding the roots. It does no parsing; the
//! `fxe-graph` crate mirrors these blocks into observable wrapper objects and
//! writes edits back.
//!
//! # Example
//!
//! ```
//! use fxe_native::{BlockType, Link, NativeBlock, NativeScene};
//!
//! let root = NativeBlock::with_default(BlockType::Node);
//! let light = NativeBlock::with_default(BlockType::PointLight);
//! if let Some(node) = root.data_mut().node_mut() {
//!     node.effects.push(Link::to(&light));
//! }
//! let scene = NativeScene::from_roots(vec![root]);
//! assert_eq!(scene.block_count(), 2);
//! ```

pub mod block;
pub mod error;
pub mod fields;
pub mod id;
pub mod link;
pub mod scene;

pub use block::{BlockData, BlockType, NativeBlock, NativeRef};
pub use error::NativeError;
pub use fields::{
    AvFields, BillboardFields, BoxEmitterFields, ColorFields, ColorKeyValue,
    ControllerManagerFields, ControllerSequenceFields, ExtraFields, FloatInterpolatorFields,
    GravityFields, ModifierFields, NetFields, NodeFields, ParticleSystemFields, PointLightFields,
    StringFields, TextKeyValue, Transform,
};
pub use id::BlockId;
pub use link::{Link, WeakLink};
pub use scene::NativeScene;
