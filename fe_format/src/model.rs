use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use crystal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One corner of a triangle as the vertex shader consumes it.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
pub struct VertexData {
    pub position: Vec4<f32>,
    pub texcoord: Vec2<f32>,
    pub normal: Vec3<f32>,
}

impl VertexData {
    pub const fn new(position: Vec4<f32>, texcoord: Vec2<f32>, normal: Vec3<f32>) -> Self {
        Self {
            position,
            texcoord,
            normal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialData {
    /// Diffuse texture, already joined with the model's directory.
    /// `None` when the model declares no material library or no `map_Kd`.
    pub texture_file_path: Option<PathBuf>,
}

/// Flat, non-indexed triangle list plus its material.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelData {
    pub vertices: Vec<VertexData>,
    pub material: MaterialData,
}

impl ModelData {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize::<ModelData>(bytes)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        ModelData::from_bytes(&data)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Raw vertex stream as uploaded into a vertex buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
