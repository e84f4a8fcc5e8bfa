//! Method-style access to the forward operators.

use crate::error::RevGradError;
use crate::ops::arithmetic::{add_op, div_op, mul_op, neg_op, pow_op, sub_op};
use crate::ops::math_elem::{exp_op, ln_op};
use crate::ops::reduction::{max_op, mean_op, sum_op};
use crate::types::Element;
use crate::value::Value;

impl<T: Element> Value<T> {
    /// Elementwise addition with broadcasting.
    pub fn add(&self, other: &Value<T>) -> Result<Value<T>, RevGradError> {
        add_op(self, other)
    }

    /// Elementwise subtraction with broadcasting.
    pub fn sub(&self, other: &Value<T>) -> Result<Value<T>, RevGradError> {
        sub_op(self, other)
    }

    /// Elementwise multiplication with broadcasting.
    pub fn mul(&self, other: &Value<T>) -> Result<Value<T>, RevGradError> {
        mul_op(self, other)
    }

    /// Elementwise division with broadcasting.
    pub fn div(&self, other: &Value<T>) -> Result<Value<T>, RevGradError> {
        div_op(self, other)
    }

    /// Elementwise negation.
    pub fn neg(&self) -> Result<Value<T>, RevGradError> {
        neg_op(self)
    }

    /// Elementwise power with a constant exponent.
    pub fn powf(&self, exponent: T) -> Result<Value<T>, RevGradError> {
        pow_op(self, exponent)
    }

    /// Elementwise exponential.
    pub fn exp(&self) -> Result<Value<T>, RevGradError> {
        exp_op(self)
    }

    /// Elementwise natural logarithm.
    pub fn ln(&self) -> Result<Value<T>, RevGradError> {
        ln_op(self)
    }

    /// Sum of all elements, as a scalar value.
    pub fn sum(&self) -> Result<Value<T>, RevGradError> {
        sum_op(self)
    }

    /// Mean of all elements, as a scalar value.
    pub fn mean(&self) -> Result<Value<T>, RevGradError> {
        mean_op(self)
    }

    /// Maximum element, as a scalar value.
    pub fn max(&self) -> Result<Value<T>, RevGradError> {
        max_op(self)
    }
}
