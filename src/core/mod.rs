pub mod gameloop;
pub mod input;
pub mod pipeline;

pub use self::{
    gameloop::{FrameLoop, FrameState},
    input::{EventSource, LoopControl, SceneEditor, ScriptedInput},
    pipeline::FrameMatrices,
};
