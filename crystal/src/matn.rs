use crate::{
    matrix::Matrix,
    scalar::{One, Zero},
};

/// Square matrix.
pub type MatN<T, const N: usize> = Matrix<T, N, N>;

impl<T: Zero + One, const N: usize> MatN<T, N> {
    pub fn identity() -> Self {
        Self::from_fn(|row, col| match row == col {
            true => T::one(),
            false => T::zero(),
        })
    }

    pub fn is_identity(&self) -> bool
    where
        T: PartialEq,
    {
        *self == Self::identity()
    }
}
