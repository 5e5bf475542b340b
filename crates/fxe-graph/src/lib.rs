#![forbid(unsafe_code)]

//! Observable wrapper objects over a native block graph.
//!
//! # Overview
//!
//! - [`File`]: the identity map. One live wrapper per native block,
//!   wrappers built on demand, held weakly, pinned with
//!   [`File::keep_alive`].
//! - [`object`]: wrapper kinds. Each concrete kind is a struct of observable
//!   [`levels`], one per step of its [`Level`] chain; abstract levels are
//!   traits such as [`AvObject`] and [`Modifier`].
//! - [`traverse`]: vertical traversal of one object's levels and horizontal
//!   traversal of the owned graph through a [`Forwarder`].
//! - [`sync`]: [`ReadSyncer`] and [`WriteSyncer`], which move field values
//!   between native blocks and wrapper levels.
//!
//! # Example
//!
//! ```
//! use fxe_graph::{File, FileConfig, Node};
//! use fxe_native::{BlockType, Link, NativeBlock, NativeScene};
//!
//! let root = NativeBlock::with_default(BlockType::Node);
//! let light = NativeBlock::with_default(BlockType::PointLight);
//! if let Some(node) = root.data_mut().node_mut() {
//!     node.children.push(Link::to(&light));
//! }
//!
//! let file = File::load(&NativeScene::from_roots(vec![root.clone()]), FileConfig::default())?;
//! let node = file.get::<Node>(&root)?.expect("root is a node");
//! assert_eq!(node.node.children.len(), 1);
//!
//! node.net.name.set("Scene Root".into());
//! file.save()?;
//! assert_eq!(root.snapshot().net().map(|n| n.name.clone()).as_deref(), Some("Scene Root"));
//! # Ok::<(), fxe_graph::FileError>(())
//! ```

pub mod config;
pub mod error;
pub mod file;
pub mod id;
pub mod kind;
pub mod levels;
pub mod object;
pub mod sync;
pub mod traverse;

pub use config::FileConfig;
pub use error::{FileError, Result};
pub use file::File;
pub use id::ObjectId;
pub use kind::{Level, ObjectKind};
pub use levels::{
    AvFlags, AvLevel, BillboardLevel, BillboardMode, BoxEmitterLevel, ColorKey, ColorLevel,
    ControllerManagerLevel, ControllerSequenceLevel, ExtraLevel, FloatInterpolatorLevel,
    GravityLevel, ModifierLevel, NetLevel, NodeLevel, ParticleSystemLevel, PointLightLevel,
    StringLevel, TextKey,
};
pub use object::{
    AnyObject, AvObject, BillboardNode, BoxEmitter, Class, ColorModifier, Concrete,
    ControllerManager, ControllerSequence, ExtraData, FloatInterpolator, GravityModifier, Header,
    Modifier, Node, NodeObject, Object, ObjectNet, ParticleSystem, PointLight, StringData,
};
pub use sync::{ReadSyncer, WriteSyncer};
pub use traverse::{Forwarder, LevelHandler, Visitor};
