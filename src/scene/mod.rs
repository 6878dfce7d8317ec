pub mod camera;
pub mod material;
pub mod sprite;
pub mod transform;

use fe_format::DirectionalLight;

pub use self::{
    camera::Camera,
    material::{MaterialParams, UvTransform},
    transform::Transform,
};
use crate::config::EngineConfig;

/// Everything the UI may edit between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneParams {
    pub camera: Camera,
    pub object: Transform,
    pub sprite: Transform,
    pub object_material: MaterialParams,
    pub sprite_material: MaterialParams,
    pub light: DirectionalLight,
    pub use_model_texture: bool,
}

impl SceneParams {
    pub fn from_config(config: &EngineConfig) -> Self {
        let camera = Camera::builder()
            .transform(config.camera.into())
            .fov_y(config.render.fov_y)
            .near(config.render.near)
            .far(config.render.far)
            .build();

        Self {
            camera,
            object: Transform::default(),
            sprite: Transform::default(),
            object_material: MaterialParams::lit(),
            sprite_material: MaterialParams::unlit(),
            light: DirectionalLight::default(),
            use_model_texture: config.assets.use_model_texture,
        }
    }
}

impl Default for SceneParams {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
