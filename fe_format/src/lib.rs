//! Hardware-oriented data shared between the model loader and the engine.

pub mod error;
pub mod gpu;
pub mod model;

pub use error::{FormatError, Result};
pub use gpu::{DirectionalLight, Material, TransformationMatrix};
pub use model::{MaterialData, ModelData, VertexData};
