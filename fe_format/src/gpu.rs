//! Constant-buffer layouts. Field order and padding follow the 16-byte packing
//! rule of shader constant buffers.

use bytemuck::{Pod, Zeroable};
use crystal::prelude::*;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TransformationMatrix {
    pub wvp: Mat4<f32>,
    pub world: Mat4<f32>,
}

impl Default for TransformationMatrix {
    fn default() -> Self {
        Self {
            wvp: Mat4::identity(),
            world: Mat4::identity(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DirectionalLight {
    pub color: Vec4<f32>,
    /// Unit length whenever it reaches the GPU.
    pub direction: Vec3<f32>,
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            direction: Vec3::new(0.0, -1.0, 0.0),
            intensity: 1.0,
        }
    }
}

impl DirectionalLight {
    pub fn renormalized(mut self) -> Self {
        self.direction = self.direction.normalize();
        self
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Material {
    pub color: Vec4<f32>,
    pub enable_lighting: i32,
    pub padding: [f32; 3],
    pub uv_transform: Mat4<f32>,
}

impl Material {
    pub fn new(color: Vec4<f32>, enable_lighting: bool) -> Self {
        Self {
            color,
            enable_lighting: enable_lighting as i32,
            padding: [0.0; 3],
            uv_transform: Mat4::identity(),
        }
    }

    pub fn lighting_enabled(&self) -> bool {
        self.enable_lighting != 0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vec4::new(1.0, 1.0, 1.0, 1.0), true)
    }
}
