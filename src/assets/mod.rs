//! CPU-side assets loaded before the frame loop starts.

mod texture;

use fe_format::ModelData;

pub use self::texture::{MipLevel, TextureData};
use crate::{config::AssetConfig, error::EngineResult};

#[derive(Debug, Clone, PartialEq)]
pub struct SceneAssets {
    pub model: ModelData,
    pub default_texture: TextureData,
    /// The model's own diffuse texture, if its material declares one.
    pub model_texture: Option<TextureData>,
}

impl SceneAssets {
    pub fn load(config: &AssetConfig) -> EngineResult<Self> {
        let model = fe_asset::load(&config.model)?;
        log::info!(
            "Loaded `{}` ({} triangles)",
            config.model.display(),
            model.triangle_count()
        );

        let default_texture = TextureData::from_file(&config.default_texture)?;
        let model_texture = match &model.material.texture_file_path {
            Some(path) => Some(TextureData::from_file(path)?),
            None => None,
        };

        Ok(Self {
            model,
            default_texture,
            model_texture,
        })
    }

    /// Assets without any files: no geometry and white textures.
    pub fn empty() -> Self {
        Self {
            model: ModelData::default(),
            default_texture: TextureData::white(),
            model_texture: None,
        }
    }
}
