use crystal::prelude::*;
use fe_format::Material;

/// Texture coordinate transform: scale, then rotate around Z, then translate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvTransform {
    pub scale: Vec3<f32>,
    pub rotate_z: f32,
    pub translate: Vec3<f32>,
}

impl Default for UvTransform {
    fn default() -> Self {
        Self {
            scale: Vec3::new(1.0, 1.0, 1.0),
            rotate_z: 0.0,
            translate: Vec3::new(0.0, 0.0, 0.0),
        }
    }
}

impl UvTransform {
    pub fn matrix(&self) -> Mat4<f32> {
        &(&Mat4::scale(self.scale) * &Mat4::rotation_z(self.rotate_z))
            * &Mat4::translate(self.translate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub color: Vec4<f32>,
    pub enable_lighting: bool,
    pub uv_transform: UvTransform,
}

impl MaterialParams {
    pub fn lit() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            enable_lighting: true,
            uv_transform: UvTransform::default(),
        }
    }

    pub fn unlit() -> Self {
        Self {
            enable_lighting: false,
            ..Self::lit()
        }
    }

    pub fn to_gpu(&self) -> Material {
        Material {
            uv_transform: self.uv_transform.matrix(),
            ..Material::new(self.color, self.enable_lighting)
        }
    }
}

#[cfg(test)]
mod tests {
    use crystal::test_util::MatrixCmp;

    use super::*;

    #[test]
    fn uv_transform_scales_then_rotates_then_translates() {
        let uv = UvTransform {
            scale: Vec3::new(2.0, 2.0, 1.0),
            rotate_z: std::f32::consts::FRAC_PI_2,
            translate: Vec3::new(0.5, 0.0, 0.0),
        };

        // (1, 0) -> (2, 0) -> (0, 2) -> (0.5, 2)
        let moved = &Vec4::new(1.0, 0.0, 0.0, 1.0) * &uv.matrix();
        MatrixCmp::<f32>::DEFAULT.eq(&moved, &Vec4::new(0.5, 2.0, 0.0, 1.0));
    }

    #[test]
    fn default_uv_transform_is_identity() {
        assert_eq!(UvTransform::default().matrix(), Mat4::identity());
        assert_eq!(MaterialParams::lit().to_gpu(), Material::default());
        assert_eq!(MaterialParams::unlit().to_gpu().enable_lighting, 0);
    }
}
