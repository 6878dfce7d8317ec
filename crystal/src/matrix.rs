use std::{
    array, fmt,
    ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub},
};

use crate::scalar::Zero;

/// Row-major `R x C` matrix.
///
/// `data[row][col]`. Vectors are `1 x N` matrices (see [`crate::RowVector`]),
/// which makes `&point * &matrix` the transformation of a point.
#[repr(C)]
pub struct Matrix<T, const R: usize, const C: usize> {
    pub(crate) data: [[T; C]; R],
}

impl<T, const R: usize, const C: usize> Matrix<T, R, C> {
    pub const fn from_data(data: [[T; C]; R]) -> Self {
        Self { data }
    }

    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        Self::from_data(array::from_fn(|row| array::from_fn(|col| f(row, col))))
    }

    pub const fn shape(&self) -> (usize, usize) {
        (R, C)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.data.get(row)?.get(col)
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        self.data.get_mut(row)?.get_mut(col)
    }

    pub fn rows(&self) -> &[[T; C]; R] {
        &self.data
    }

    pub fn transpose(&self) -> Matrix<T, C, R>
    where
        T: Copy,
    {
        Matrix::from_fn(|row, col| self.data[col][row])
    }
}

impl<T, const R: usize, const C: usize> Clone for Matrix<T, R, C>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self::from_data(self.data.clone())
    }
}

impl<T, const R: usize, const C: usize> Copy for Matrix<T, R, C> where T: Copy {}

impl<T, const R: usize, const C: usize> fmt::Debug for Matrix<T, R, C>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("shape", &self.shape())
            .field("data", &self.data)
            .finish()
    }
}

impl<T, const R: usize, const C: usize> Default for Matrix<T, R, C>
where
    T: Default,
{
    fn default() -> Self {
        Self::from_fn(|_, _| T::default())
    }
}

impl<T, const R: usize, const C: usize> PartialEq<Self> for Matrix<T, R, C>
where
    T: PartialEq<T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.data.eq(&other.data)
    }
}

impl<T, const R: usize, const C: usize> From<[[T; C]; R]> for Matrix<T, R, C> {
    fn from(data: [[T; C]; R]) -> Self {
        Self::from_data(data)
    }
}

impl<T, const C: usize> From<[T; C]> for Matrix<T, 1, C> {
    fn from(data: [T; C]) -> Self {
        Self::from_data([data])
    }
}

impl<T, const R: usize, const C: usize> From<Matrix<T, R, C>> for [[T; C]; R] {
    fn from(value: Matrix<T, R, C>) -> Self {
        value.data
    }
}

impl<T, const R: usize, const C: usize> Index<(usize, usize)> for Matrix<T, R, C> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.data[row][col]
    }
}

impl<T, const R: usize, const C: usize> IndexMut<(usize, usize)> for Matrix<T, R, C> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        &mut self.data[row][col]
    }
}

impl<T, const R: usize, const C: usize> Zero for Matrix<T, R, C>
where
    T: Zero,
{
    fn zero() -> Self {
        Self::from_fn(|_, _| T::zero())
    }
}

impl<T, const R: usize, const C: usize> AddAssign<&Matrix<T, R, C>> for Matrix<T, R, C>
where
    T: Copy + AddAssign<T>,
{
    fn add_assign(&mut self, rhs: &Matrix<T, R, C>) {
        for row in 0..R {
            for col in 0..C {
                self.data[row][col] += rhs.data[row][col];
            }
        }
    }
}

impl<'a, 'b, T, const R: usize, const C: usize> Add<&'a Matrix<T, R, C>> for &'b Matrix<T, R, C>
where
    T: Copy + Add<T, Output = T>,
{
    type Output = Matrix<T, R, C>;

    fn add(self, rhs: &'a Matrix<T, R, C>) -> Self::Output {
        Matrix::from_fn(|row, col| self.data[row][col] + rhs.data[row][col])
    }
}

impl<'a, 'b, T, const R: usize, const C: usize> Sub<&'a Matrix<T, R, C>> for &'b Matrix<T, R, C>
where
    T: Copy + Sub<T, Output = T>,
{
    type Output = Matrix<T, R, C>;

    fn sub(self, rhs: &'a Matrix<T, R, C>) -> Self::Output {
        Matrix::from_fn(|row, col| self.data[row][col] - rhs.data[row][col])
    }
}

/// `self * rhs`. For transforms this reads "apply `self`, then `rhs`".
impl<'a, 'b, T, const R: usize, const SHARED: usize, const C: usize>
    Mul<&'a Matrix<T, SHARED, C>> for &'b Matrix<T, R, SHARED>
where
    T: Copy + Zero + AddAssign<T> + Mul<T, Output = T>,
{
    type Output = Matrix<T, R, C>;

    fn mul(self, rhs: &'a Matrix<T, SHARED, C>) -> Self::Output {
        Matrix::from_fn(|row, col| {
            let mut value = T::zero();
            for idx in 0..SHARED {
                value += self.data[row][idx] * rhs.data[idx][col];
            }
            value
        })
    }
}

impl<'a, T, const R: usize, const C: usize> Mul<T> for &'a Matrix<T, R, C>
where
    T: Copy + Mul<T, Output = T>,
{
    type Output = Matrix<T, R, C>;

    fn mul(self, rhs: T) -> Self::Output {
        Matrix::from_fn(|row, col| self.data[row][col] * rhs)
    }
}

impl<'a, T, const R: usize, const C: usize> Neg for &'a Matrix<T, R, C>
where
    T: Copy + Neg<Output = T>,
{
    type Output = Matrix<T, R, C>;

    fn neg(self) -> Self::Output {
        Matrix::from_fn(|row, col| -self.data[row][col])
    }
}

impl<T, const R: usize, const C: usize> Neg for Matrix<T, R, C>
where
    T: Copy + Neg<Output = T>,
{
    type Output = Self;

    fn neg(self) -> Self::Output {
        -&self
    }
}

#[cfg(feature = "bytemuck")]
unsafe impl<T, const R: usize, const C: usize> bytemuck::Zeroable for Matrix<T, R, C> where
    T: bytemuck::Zeroable
{
}

#[cfg(feature = "bytemuck")]
unsafe impl<T, const R: usize, const C: usize> bytemuck::Pod for Matrix<T, R, C> where T: bytemuck::Pod {}
