use std::path::PathBuf;

use crate::{
    config::ConfigError,
    gpu::{GpuError, SyncError},
};

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Failed to load model: {0}")]
    Asset(#[from] fe_asset::ParserError),
    #[error("Failed to load texture `{path}`: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("Synchronization error: {0}")]
    Sync(#[from] SyncError),
    #[error("The {0} matrix is not invertible")]
    NonInvertible(&'static str),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Whether the frame loop can not continue after this error.
    pub fn is_fatal(&self) -> bool {
        match self {
            EngineError::Sync(_) => true,
            EngineError::Gpu(error) => error.is_fatal(),
            _ => false,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors() {
        assert!(EngineError::Sync(SyncError::DeviceLost(3)).is_fatal());
        assert!(EngineError::Gpu(GpuError::DeviceLost).is_fatal());
        assert!(!EngineError::Gpu(GpuError::OutOfMemory {
            requested: 1,
            available: 0
        })
        .is_fatal());
        assert!(!EngineError::NonInvertible("view").is_fatal());
    }
}
