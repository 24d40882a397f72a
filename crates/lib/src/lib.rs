//! mpysync-lib: Core types and logic for mpysync
//!
//! This crate provides the fundamental pieces of the deployment pipeline:
//! - `Project`: a MicroPython project root and its ordered source files
//! - `Artifact`: a compiled source file with its content hash and device path
//! - `Manifest`: the file/dir/hash listing rendered into the device agent
//! - `ChangeBitmap`: the per-file changed flags reported back by the device
//! - `sync()`: the orchestrator driving compile, probe, and transfer

pub mod artifact;
pub mod autostart;
pub mod bitmap;
pub mod compile;
pub mod config;
pub mod hash;
pub mod manifest;
pub mod paths;
pub mod project;
pub mod scratch;
pub mod sync;
pub mod transport;
