use num_traits::Float;
use std::fmt::Debug;
use std::iter::Sum;
use std::ops::AddAssign;

/// Numeric element type stored inside a [`crate::value::Value`].
///
/// Bundles the `num_traits` and marker bounds the engine needs everywhere so
/// individual signatures stay readable. Implemented for `f32` and `f64`.
pub trait Element:
    Float + AddAssign + Sum + Debug + Default + Send + Sync + 'static
{
}

impl Element for f32 {}
impl Element for f64 {}
