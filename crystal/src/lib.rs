//! Small linear-algebra kernel used by the renderer.
//!
//! All matrices are stored row-major and vectors are row vectors, so a point
//! is transformed as `p * M`. Composing "apply `A`, then `B`" is `&a * &b`.

mod mat4;
mod matn;
mod matrix;
mod norm;
mod scalar;
#[cfg(feature = "serde-serialize")]
mod serde;
mod vector;

pub mod test_util;

pub use crate::mat4::Mat4;
pub use crate::matn::MatN;
pub use crate::matrix::Matrix;
pub use crate::norm::Normed;
pub use crate::scalar::{Abs, One, Zero};
pub use crate::vector::{RowVector, Vec2, Vec3, Vec4};

pub mod prelude {
    pub use crate::mat4::Mat4;
    pub use crate::matn::MatN;
    pub use crate::matrix::Matrix;
    pub use crate::norm::Normed;
    pub use crate::scalar::{One, Zero};
    pub use crate::vector::{Vec2, Vec3, Vec4};
}
