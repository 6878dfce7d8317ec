//! Screen-space overlay quad, positioned in pixels.

use crystal::prelude::*;
use fe_format::VertexData;

use crate::gpu::Extent;

const SPRITE_NORMAL: Vec3<f32> = Vec3::new(0.0, 0.0, -1.0);

/// 640x360 quad with its top-left corner at the origin.
pub const SPRITE_VERTICES: [VertexData; 4] = [
    VertexData::new(Vec4::new(0.0, 360.0, 0.0, 1.0), Vec2::new(0.0, 1.0), SPRITE_NORMAL),
    VertexData::new(Vec4::new(0.0, 0.0, 0.0, 1.0), Vec2::new(0.0, 0.0), SPRITE_NORMAL),
    VertexData::new(Vec4::new(640.0, 360.0, 0.0, 1.0), Vec2::new(1.0, 1.0), SPRITE_NORMAL),
    VertexData::new(Vec4::new(640.0, 0.0, 0.0, 1.0), Vec2::new(1.0, 0.0), SPRITE_NORMAL),
];

pub const SPRITE_INDICES: [u32; 6] = [0, 1, 2, 1, 3, 2];

/// Pixel coordinates with Y down to normalized device coordinates.
pub fn overlay_projection(extent: Extent) -> Mat4<f32> {
    Mat4::orthographic(
        0.0,
        0.0,
        extent.width as f32,
        extent.height as f32,
        0.0,
        100.0,
    )
}
