use crystal::prelude::*;
use serde::{Deserialize, Serialize};

/// Scale, Euler rotation in radians (applied X, Y, Z) and translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub scale: Vec3<f32>,
    pub rotate: Vec3<f32>,
    pub translate: Vec3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vec3::new(1.0, 1.0, 1.0),
            rotate: Vec3::new(0.0, 0.0, 0.0),
            translate: Vec3::new(0.0, 0.0, 0.0),
        }
    }
}

impl Transform {
    pub fn new(scale: Vec3<f32>, rotate: Vec3<f32>, translate: Vec3<f32>) -> Self {
        Self {
            scale,
            rotate,
            translate,
        }
    }

    pub fn from_translation(translate: Vec3<f32>) -> Self {
        Self {
            translate,
            ..Default::default()
        }
    }

    pub fn matrix(&self) -> Mat4<f32> {
        Mat4::affine(self.scale, self.rotate, self.translate)
    }
}
