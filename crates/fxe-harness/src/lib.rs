#![forbid(unsafe_code)]

//! Test harness and reference fixtures for fxedit.
//!
//! - [`fixtures`]: native scenes exercising every block type and the
//!   back-reference shapes the synchronizer must not loop on.
//! - [`recorder`]: a listener for every observable that records what it
//!   hears.
//! - [`logging`]: run a closure under a capturing `tracing` subscriber.
//! - [`ops`]: proptest strategies and reference models for collections.

pub mod fixtures;
pub mod logging;
pub mod ops;
pub mod recorder;

pub use fixtures::{BackReferenceScene, SampleScene, back_reference_scene, sample_scene};
pub use logging::capture_logs;
pub use ops::{SeqModel, SeqOp, Token, seq_op, token_pool};
pub use recorder::{Event, Recorder};
