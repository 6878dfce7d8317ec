use std::ops::{Add, Div, Mul, MulAssign, Neg, Sub};

use crate::{
    matn::MatN,
    scalar::{One, Zero},
    vector::{Vec3, Vec4},
};

pub type Mat4<T> = MatN<T, 4>;

impl<T> Mat4<T> {
    #[rustfmt::skip]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        r0c0: T, r0c1: T, r0c2: T, r0c3: T,
        r1c0: T, r1c1: T, r1c2: T, r1c3: T,
        r2c0: T, r2c1: T, r2c2: T, r2c3: T,
        r3c0: T, r3c1: T, r3c2: T, r3c3: T,
    ) -> Self {
        Self::from_data([
            [r0c0, r0c1, r0c2, r0c3],
            [r1c0, r1c1, r1c2, r1c3],
            [r2c0, r2c1, r2c2, r2c3],
            [r3c0, r3c1, r3c2, r3c3],
        ])
    }

    /// Non-uniform scale along the three axes.
    pub fn scale(factor: Vec3<T>) -> Self
    where
        T: Copy + Zero + One,
    {
        let mut matrix = Self::identity();
        matrix[(0, 0)] = *factor.x();
        matrix[(1, 1)] = *factor.y();
        matrix[(2, 2)] = *factor.z();
        matrix
    }

    /// Translation lives in the last row (row-vector convention).
    pub fn translate(direction: Vec3<T>) -> Self
    where
        T: Copy + Zero + One,
    {
        let mut matrix = Self::identity();
        matrix[(3, 0)] = *direction.x();
        matrix[(3, 1)] = *direction.y();
        matrix[(3, 2)] = *direction.z();
        matrix
    }

    pub fn transform_point(&self, point: &Vec4<T>) -> Vec4<T>
    where
        T: Copy + Zero + std::ops::AddAssign<T> + Mul<T, Output = T>,
    {
        point * self
    }

    /// Cofactor expansion of the inverse.
    ///
    /// Returns `None` when the determinant is exactly zero.
    pub fn try_inverse(&self) -> Option<Self>
    where
        T: Copy
            + Zero
            + One
            + PartialEq
            + Add<T, Output = T>
            + Sub<T, Output = T>
            + Mul<T, Output = T>
            + MulAssign<T>
            + Div<T, Output = T>
            + Neg<Output = T>,
    {
        let d = &self.data;
        let m = [
            d[0][0], d[0][1], d[0][2], d[0][3],
            d[1][0], d[1][1], d[1][2], d[1][3],
            d[2][0], d[2][1], d[2][2], d[2][3],
            d[3][0], d[3][1], d[3][2], d[3][3],
        ];
        let mut inv = [T::zero(); 16];

        inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14]
            + m[13] * m[6] * m[11]
            - m[13] * m[7] * m[10];

        inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14]
            - m[12] * m[6] * m[11]
            + m[12] * m[7] * m[10];

        inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13]
            + m[12] * m[5] * m[11]
            - m[12] * m[7] * m[9];

        inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13]
            - m[12] * m[5] * m[10]
            + m[12] * m[6] * m[9];

        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14]
            - m[13] * m[2] * m[11]
            + m[13] * m[3] * m[10];

        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14]
            + m[12] * m[2] * m[11]
            - m[12] * m[3] * m[10];

        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13]
            - m[12] * m[1] * m[11]
            + m[12] * m[3] * m[9];

        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13]
            + m[12] * m[1] * m[10]
            - m[12] * m[2] * m[9];

        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14]
            + m[13] * m[2] * m[7]
            - m[13] * m[3] * m[6];

        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14]
            - m[12] * m[2] * m[7]
            + m[12] * m[3] * m[6];

        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13]
            + m[12] * m[1] * m[7]
            - m[12] * m[3] * m[5];

        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13]
            - m[12] * m[1] * m[6]
            + m[12] * m[2] * m[5];

        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10]
            - m[9] * m[2] * m[7]
            + m[9] * m[3] * m[6];

        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10]
            + m[8] * m[2] * m[7]
            - m[8] * m[3] * m[6];

        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9]
            - m[8] * m[1] * m[7]
            + m[8] * m[3] * m[5];

        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9]
            + m[8] * m[1] * m[6]
            - m[8] * m[2] * m[5];

        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        if det == T::zero() {
            return None;
        }

        let inv_det = T::one() / det;
        for value in inv.iter_mut() {
            *value *= inv_det;
        }

        Some(Self::from_fn(|row, col| inv[row * 4 + col]))
    }
}

impl Mat4<f32> {
    pub fn rotation_x(rad: f32) -> Self {
        let sin = rad.sin();
        let cos = rad.cos();

        Self::from_data([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, cos, sin, 0.0],
            [0.0, -sin, cos, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotation_y(rad: f32) -> Self {
        let sin = rad.sin();
        let cos = rad.cos();

        Self::from_data([
            [cos, 0.0, -sin, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [sin, 0.0, cos, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotation_z(rad: f32) -> Self {
        let sin = rad.sin();
        let cos = rad.cos();

        Self::from_data([
            [cos, sin, 0.0, 0.0],
            [-sin, cos, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Scale, then rotate X, Y, Z, then translate.
    ///
    /// Built in fused form: the rotation `Rx * Ry * Rz` gets its first three
    /// rows multiplied by the scale components and the translation row is
    /// assigned directly. Keep it that way, it is not a generic
    /// `S * R * T` product.
    pub fn affine(scale: Vec3<f32>, rotate: Vec3<f32>, translate: Vec3<f32>) -> Self {
        let rotation = &(&Self::rotation_x(*rotate.x()) * &Self::rotation_y(*rotate.y()))
            * &Self::rotation_z(*rotate.z());
        let mut result = rotation;

        let factors = [*scale.x(), *scale.y(), *scale.z()];
        for (row, factor) in factors.iter().enumerate() {
            for col in 0..3 {
                result[(row, col)] *= factor;
            }
        }

        result[(3, 0)] = *translate.x();
        result[(3, 1)] = *translate.y();
        result[(3, 2)] = *translate.z();
        result
    }

    /// Left-handed perspective projection mapping view depth `near..far` to `0..1`.
    #[rustfmt::skip]
    pub fn perspective_fov(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let cot_half_fov = 1.0 / (fov_y / 2.0).tan();

        Self::new(
            cot_half_fov / aspect, 0.0, 0.0, 0.0,
            0.0, cot_half_fov, 0.0, 0.0,
            0.0, 0.0, far / (far - near), 1.0,
            0.0, 0.0, -(near * far) / (far - near), 0.0,
        )
    }

    /// Maps the screen rectangle to `-1..1` (Y up) and `near..far` to `0..1`.
    #[rustfmt::skip]
    pub fn orthographic(left: f32, top: f32, right: f32, bottom: f32, near: f32, far: f32) -> Self {
        Self::new(
            2.0 / (right - left), 0.0, 0.0, 0.0,
            0.0, 2.0 / (top - bottom), 0.0, 0.0,
            0.0, 0.0, 1.0 / (far - near), 0.0,
            (left + right) / (left - right), (top + bottom) / (bottom - top), near / (near - far), 1.0,
        )
    }
}
