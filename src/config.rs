//! Engine settings, read from a TOML file. Every field has a default.

use std::{
    f32::consts::PI,
    path::{Path, PathBuf},
};

use crystal::prelude::*;
use serde::Deserialize;

use crate::{
    gpu::{headless::HeadlessConfig, Extent},
    scene::Transform,
};

pub const MAX_FRAMES_IN_FLIGHT: usize = 3;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Could not read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid TOML in `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub frames_in_flight: usize,
    pub clear_color: [f32; 4],
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: 2,
            clear_color: [0.1, 0.25, 0.5, 1.0],
            fov_y: 0.45,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub model: PathBuf,
    pub default_texture: PathBuf,
    /// Draw the model with its own `map_Kd` texture instead of the default one.
    pub use_model_texture: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("resources/plane.obj"),
            default_texture: PathBuf::from("resources/uvChecker.png"),
            use_model_texture: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub scale: Vec3<f32>,
    pub rotate: Vec3<f32>,
    pub translate: Vec3<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            scale: Vec3::new(1.0, 1.0, 1.0),
            rotate: Vec3::new(0.3, 0.0, 0.0),
            translate: Vec3::new(0.0, 4.0, -10.0),
        }
    }
}

impl From<CameraConfig> for Transform {
    fn from(camera: CameraConfig) -> Self {
        Transform::new(camera.scale, camera.rotate, camera.translate)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub headless: HeadlessConfig,
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = toml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate()?;

        log::debug!("Loaded configuration from `{}`", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let render = &self.render;

        if !(1..=MAX_FRAMES_IN_FLIGHT).contains(&render.frames_in_flight) {
            return Err(ConfigError::Invalid(format!(
                "frames_in_flight must be in 1..={}, got {}",
                MAX_FRAMES_IN_FLIGHT, render.frames_in_flight
            )));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must not be zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if !(render.near > 0.0 && render.near < render.far) {
            return Err(ConfigError::Invalid(format!(
                "expected 0 < near < far, got near = {}, far = {}",
                render.near, render.far
            )));
        }
        if !(render.fov_y > 0.0 && render.fov_y < PI) {
            return Err(ConfigError::Invalid(format!(
                "fov_y must be in (0, pi), got {}",
                render.fov_y
            )));
        }
        if self.headless.back_buffers == 0 {
            return Err(ConfigError::Invalid("back_buffers must not be zero".into()));
        }
        Ok(())
    }

    pub fn extent(&self) -> Extent {
        Extent {
            width: self.window.width,
            height: self.window.height,
        }
    }
}
