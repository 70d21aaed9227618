//! Types and traits for real numbers
use num_traits::{Float, FloatConst, FromPrimitive, Signed};
use std::fmt::Debug;
use std::iter::Sum;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

/// Floating point scalar, used throughout the basis and
/// interpolation layers of this crate
pub trait FloatNum:
    Float
    + FloatConst
    + FromPrimitive
    + Signed
    + Sum
    + Debug
    + Send
    + Sync
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + 'static
{
}

impl<T> FloatNum for T where
    T: Float
        + FloatConst
        + FromPrimitive
        + Signed
        + Sum
        + Debug
        + Send
        + Sync
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
        + 'static
{
}
