use std::{fmt, ops::Sub};

use crate::{matrix::Matrix, scalar::Abs};

/// Component-wise approximate comparison for tests.
#[derive(Debug, Clone)]
pub struct MatrixCmp<T> {
    error_margin: T,
}

impl<T> MatrixCmp<T>
where
    T: fmt::Debug + Copy + PartialOrd + Abs<Output = T> + Sub<T, Output = T>,
{
    pub const fn with_margin(error_margin: T) -> Self {
        Self { error_margin }
    }

    pub fn eq_margin<const R: usize, const C: usize>(
        &self,
        is: &Matrix<T, R, C>,
        should: &Matrix<T, R, C>,
        error_margin: T,
    ) {
        for row in 0..R {
            for col in 0..C {
                let (v1, v2) = (is[(row, col)], should[(row, col)]);
                let diff_abs = (v1 - v2).abs();

                assert!(
                    diff_abs <= error_margin,
                    "is: {:?} should: {:?} (+- {:?}) @ ({}, {})",
                    v1,
                    v2,
                    error_margin,
                    row,
                    col
                );
            }
        }
    }

    pub fn eq<const R: usize, const C: usize>(
        &self,
        is: &Matrix<T, R, C>,
        should: &Matrix<T, R, C>,
    ) {
        self.eq_margin(is, should, self.error_margin)
    }
}

impl MatrixCmp<f32> {
    pub const DEFAULT: Self = Self { error_margin: 1e-4 };
}

impl MatrixCmp<f64> {
    pub const DEFAULT: Self = Self { error_margin: 1e-8 };
}

impl Default for MatrixCmp<f32> {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Default for MatrixCmp<f64> {
    fn default() -> Self {
        Self::DEFAULT
    }
}
