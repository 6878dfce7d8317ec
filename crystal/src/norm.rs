use crate::scalar::Zero;

pub trait Normed {
    type Norm: Copy + PartialEq + Zero;

    fn norm(&self) -> Self::Norm;
    fn norm_squared(&self) -> Self::Norm;
    fn scale_mut(&mut self, n: Self::Norm);
    fn unscale_mut(&mut self, n: Self::Norm);

    /// Returns `self` scaled to unit length.
    ///
    /// A zero-length input is returned unchanged.
    fn normalize(&self) -> Self
    where
        Self: Clone,
    {
        let norm = self.norm();
        let mut normalized = self.clone();
        if norm != <Self::Norm as Zero>::zero() {
            normalized.unscale_mut(norm);
        }
        normalized
    }
}
