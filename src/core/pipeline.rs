//! Per-frame composition of world, view and projection matrices.

use crystal::prelude::*;
use fe_format::TransformationMatrix;

use crate::{
    error::EngineResult,
    gpu::Extent,
    scene::{sprite, Camera, Transform},
};

/// View-projection products shared by every drawable of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    view_projection: Mat4<f32>,
    overlay_projection: Mat4<f32>,
}

impl FrameMatrices {
    pub fn new(camera: &Camera, extent: Extent) -> EngineResult<Self> {
        let view = camera.view_matrix()?;
        let projection = camera.projection_matrix(extent.aspect());

        Ok(Self {
            view_projection: &view * &projection,
            // the overlay has an identity view
            overlay_projection: sprite::overlay_projection(extent),
        })
    }

    /// World and world-view-projection of a scene object.
    pub fn transformation(&self, transform: &Transform) -> TransformationMatrix {
        Self::compose(transform.matrix(), &self.view_projection)
    }

    /// Same as [`transformation`](Self::transformation), in screen space.
    pub fn overlay_transformation(&self, transform: &Transform) -> TransformationMatrix {
        Self::compose(transform.matrix(), &self.overlay_projection)
    }

    fn compose(world: Mat4<f32>, view_projection: &Mat4<f32>) -> TransformationMatrix {
        TransformationMatrix {
            wvp: &world * view_projection,
            world,
        }
    }
}

#[cfg(test)]
mod tests {
    use crystal::test_util::MatrixCmp;

    use super::*;
    use crate::{error::EngineError, scene::sprite::SPRITE_VERTICES};

    const EXTENT: Extent = Extent {
        width: 1280,
        height: 720,
    };

    fn ndc(point: &Vec4<f32>, wvp: &Mat4<f32>) -> Vec4<f32> {
        let clip = wvp.transform_point(point);
        let w = *clip.w();
        &clip * (1.0 / w)
    }

    fn camera_at(translate: Vec3<f32>) -> Camera {
        Camera::builder()
            .transform(Transform::from_translation(translate))
            .fov_y(0.45)
            .near(0.1)
            .far(100.0)
            .build()
    }

    #[test]
    fn origin_lands_in_the_center() -> EngineResult<()> {
        let matrices = FrameMatrices::new(&camera_at(Vec3::new(0.0, 0.0, -10.0)), EXTENT)?;
        let transformation = matrices.transformation(&Transform::default());

        let projected = ndc(&Vec4::new(0.0, 0.0, 0.0, 1.0), &transformation.wvp);
        assert!(projected.x().abs() < 1e-5);
        assert!(projected.y().abs() < 1e-5);
        assert!(*projected.z() > 0.0 && *projected.z() < 1.0);
        assert_eq!(transformation.world, Mat4::identity());
        Ok(())
    }

    #[test]
    fn world_is_applied_before_view() -> EngineResult<()> {
        let matrices = FrameMatrices::new(&camera_at(Vec3::new(0.0, 0.0, -10.0)), EXTENT)?;
        let moved = Transform::from_translation(Vec3::new(0.0, 0.0, 10.0));

        // origin moved back by 10 projects deeper, but still centered
        let near = ndc(
            &Vec4::new(0.0, 0.0, 0.0, 1.0),
            &matrices.transformation(&Transform::default()).wvp,
        );
        let far = ndc(
            &Vec4::new(0.0, 0.0, 0.0, 1.0),
            &matrices.transformation(&moved).wvp,
        );
        assert!(far.x().abs() < 1e-5);
        assert!(far.z() > near.z());
        Ok(())
    }

    #[test]
    fn sprite_corners_cover_the_upper_left_quarter() -> EngineResult<()> {
        let matrices = FrameMatrices::new(&Camera::builder().build(), EXTENT)?;
        let wvp = matrices.overlay_transformation(&Transform::default()).wvp;

        let corners: Vec<_> = SPRITE_VERTICES
            .iter()
            .map(|vertex| ndc(&vertex.position, &wvp))
            .collect();

        let cmp = MatrixCmp::<f32>::DEFAULT;
        cmp.eq(&corners[0], &Vec4::new(-1.0, 0.0, 0.0, 1.0));
        cmp.eq(&corners[1], &Vec4::new(-1.0, 1.0, 0.0, 1.0));
        cmp.eq(&corners[2], &Vec4::new(0.0, 0.0, 0.0, 1.0));
        cmp.eq(&corners[3], &Vec4::new(0.0, 1.0, 0.0, 1.0));
        Ok(())
    }

    #[test]
    fn singular_camera_is_an_error() {
        let camera = Camera::builder()
            .transform(Transform::new(
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
            ))
            .build();

        assert!(matches!(
            FrameMatrices::new(&camera, EXTENT),
            Err(EngineError::NonInvertible(_))
        ));
    }
}
