//! A small real-time renderer core: a row-major math kernel, a Wavefront
//! `.obj` loader and a frame loop that keeps several frames in flight on a
//! GPU timeline, guarded by a monotonic fence.

pub mod assets;
pub mod config;
pub mod core;
pub mod error;
pub mod gpu;
pub mod scene;

pub use crate::{
    config::EngineConfig,
    core::FrameLoop,
    error::{EngineError, EngineResult},
};
