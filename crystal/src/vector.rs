use std::ops::{AddAssign, Mul, Sub};

use crate::{matrix::Matrix, norm::Normed, scalar::Zero};

pub type RowVector<T, const C: usize> = Matrix<T, 1, C>;

pub type Vec2<T> = RowVector<T, 2>;
pub type Vec3<T> = RowVector<T, 3>;
pub type Vec4<T> = RowVector<T, 4>;

impl<T, const C: usize> RowVector<T, C> {
    pub fn dot_product(&self, rhs: &Self) -> T
    where
        T: Copy + Zero + AddAssign<T> + Mul<T, Output = T>,
    {
        let mut value = T::zero();
        for idx in 0..C {
            value += self.data[0][idx] * rhs.data[0][idx];
        }
        value
    }
}

macro_rules! impl_vec_accessors {
    ( $vec:ident => $( $idx:literal $get:ident $get_mut:ident ),+ ) => {
        impl<T> $vec<T> {
            $(
                pub fn $get(&self) -> &T {
                    &self.data[0][$idx]
                }

                pub fn $get_mut(&mut self) -> &mut T {
                    &mut self.data[0][$idx]
                }
            )+
        }
    };
}

impl_vec_accessors!(Vec2 => 0 x x_mut, 1 y y_mut);
impl_vec_accessors!(Vec3 => 0 x x_mut, 1 y y_mut, 2 z z_mut);
impl_vec_accessors!(Vec4 => 0 x x_mut, 1 y y_mut, 2 z z_mut, 3 w w_mut);

impl<T> Vec2<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self::from_data([[x, y]])
    }
}

impl<T> Vec3<T> {
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self::from_data([[x, y, z]])
    }

    pub fn extend(self, w: T) -> Vec4<T> {
        let [[x, y, z]] = self.data;
        Vec4::new(x, y, z, w)
    }

    pub fn cross_product(&self, rhs: &Self) -> Self
    where
        T: Copy + Mul<T, Output = T> + Sub<T, Output = T>,
    {
        let [[a1, a2, a3]] = self.data;
        let [[b1, b2, b3]] = rhs.data;

        let s1 = a2 * b3 - a3 * b2;
        let s2 = a3 * b1 - a1 * b3;
        let s3 = a1 * b2 - a2 * b1;

        Vec3::new(s1, s2, s3)
    }
}

impl<T> Vec4<T> {
    pub const fn new(x: T, y: T, z: T, w: T) -> Self {
        Self::from_data([[x, y, z, w]])
    }

    pub fn truncate(self) -> Vec3<T> {
        let [[x, y, z, _]] = self.data;
        Vec3::new(x, y, z)
    }
}

impl Vec4<f32> {
    /// Divides by `w`, taking a clip-space position to normalized device coordinates.
    pub fn perspective_divide(&self) -> Vec3<f32> {
        let [[x, y, z, w]] = self.data;
        Vec3::new(x / w, y / w, z / w)
    }
}

macro_rules! impl_normed_float_vector {
    ( $( $float:ty )+ ) => {
        $(
            impl<const C: usize> Normed for RowVector<$float, C> {
                type Norm = $float;

                fn norm(&self) -> Self::Norm {
                    self.norm_squared().sqrt()
                }

                fn norm_squared(&self) -> Self::Norm {
                    self.dot_product(self)
                }

                fn scale_mut(&mut self, n: Self::Norm) {
                    for value in self.data[0].iter_mut() {
                        *value *= n;
                    }
                }

                fn unscale_mut(&mut self, n: Self::Norm) {
                    for value in self.data[0].iter_mut() {
                        *value /= n;
                    }
                }
            }
        )+
    }
}

impl_normed_float_vector! { f32 f64 }
