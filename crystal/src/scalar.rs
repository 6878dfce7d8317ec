//! Numeric traits the matrix types are generic over.

/// Additive identity.
pub trait Zero {
    fn zero() -> Self;
}

/// Multiplicative identity.
pub trait One {
    fn one() -> Self;
}

/// Magnitude, used by approximate comparisons.
pub trait Abs {
    type Output;

    fn abs(&self) -> Self::Output;
}

macro_rules! scalar {
    (signed: $( $num:ty ),+) => {
        $(
            scalar!(@identities $num);

            impl Abs for $num {
                type Output = Self;

                fn abs(&self) -> Self {
                    <$num>::abs(*self)
                }
            }
        )+
    };
    (unsigned: $( $num:ty ),+) => {
        $(
            scalar!(@identities $num);

            impl Abs for $num {
                type Output = Self;

                fn abs(&self) -> Self {
                    *self
                }
            }
        )+
    };
    (@identities $num:ty) => {
        impl Zero for $num {
            fn zero() -> Self {
                0 as $num
            }
        }

        impl One for $num {
            fn one() -> Self {
                1 as $num
            }
        }
    };
}

scalar!(signed: i8, i16, i32, i64, isize, f32, f64);
scalar!(unsigned: u8, u16, u32, u64, usize);
