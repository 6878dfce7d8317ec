use crystal::prelude::*;

use super::Transform;
use crate::error::{EngineError, EngineResult};

/// Perspective camera placed in the world by a [`Transform`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub transform: Transform,
    fov_y: f32,
    near: f32,
    far: f32,
}

impl Camera {
    pub fn builder() -> CameraBuilder {
        CameraBuilder {
            transform: Transform::new(
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(0.3, 0.0, 0.0),
                Vec3::new(0.0, 4.0, -10.0),
            ),
            fov_y: 0.45,
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Inverse of the camera's world matrix.
    pub fn view_matrix(&self) -> EngineResult<Mat4<f32>> {
        self.transform
            .matrix()
            .try_inverse()
            .ok_or(EngineError::NonInvertible("camera"))
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4<f32> {
        Mat4::perspective_fov(self.fov_y, aspect, self.near, self.far)
    }
}

pub struct CameraBuilder {
    transform: Transform,
    fov_y: f32,
    near: f32,
    far: f32,
}

impl CameraBuilder {
    pub fn transform(&mut self, transform: Transform) -> &mut Self {
        self.transform = transform;
        self
    }

    pub fn fov_y(&mut self, fov_y: f32) -> &mut Self {
        const MIN: f32 = 0.01;
        const MAX: f32 = std::f32::consts::PI - 0.01;

        self.fov_y = fov_y.max(MIN).min(MAX);
        if (self.fov_y - fov_y).abs() > 1e-6 {
            log::warn!("FovY out of bounds: {} <= `{}` <= {}", MIN, fov_y, MAX);
        }
        self
    }

    pub fn near(&mut self, near: f32) -> &mut Self {
        if near <= 0.0 {
            log::warn!("Near is not positive: `{}`", near);
        }
        self.near = near;
        self
    }

    pub fn far(&mut self, far: f32) -> &mut Self {
        if far <= 0.0 {
            log::warn!("Far is not positive: `{}`", far);
        }
        self.far = far;
        self
    }

    pub fn build(&mut self) -> Camera {
        if self.far < self.near {
            log::warn!("Far is closer than near: `{}` `{}`", self.far, self.near);
        }

        Camera {
            transform: self.transform,
            fov_y: self.fov_y,
            near: self.near,
            far: self.far,
        }
    }
}

#[cfg(test)]
mod tests {
    use crystal::test_util::MatrixCmp;

    use super::*;

    #[test]
    fn view_is_inverse_of_camera_pose() -> EngineResult<()> {
        let camera = Camera::builder().build();

        let product = &camera.transform.matrix() * &camera.view_matrix()?;
        MatrixCmp::<f32>::DEFAULT.eq(&product, &Mat4::identity());
        Ok(())
    }

    #[test]
    fn degenerate_pose_has_no_view() {
        let camera = Camera::builder()
            .transform(Transform::new(
                Vec3::new(0.0, 1.0, 1.0),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, -10.0),
            ))
            .build();

        assert!(matches!(
            camera.view_matrix(),
            Err(EngineError::NonInvertible("camera"))
        ));
    }

    #[test]
    fn fov_is_clamped() {
        let camera = Camera::builder().fov_y(4.0).build();

        assert!(camera.fov_y() < std::f32::consts::PI);
    }
}
