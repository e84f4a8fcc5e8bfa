//! Elementwise transcendental operators.

use crate::autograd::OpKind;
use crate::error::RevGradError;
use crate::ops::unary_op;
use crate::types::Element;
use crate::value::Value;

/// Elementwise exponential.
pub fn exp_op<T: Element>(input: &Value<T>) -> Result<Value<T>, RevGradError> {
    unary_op(input, OpKind::Exp, |x| x.exp())
}

/// Elementwise natural logarithm. Non-positive inputs follow IEEE float
/// semantics (`NaN`/`-inf`).
pub fn ln_op<T: Element>(input: &Value<T>) -> Result<Value<T>, RevGradError> {
    unary_op(input, OpKind::Ln, |x| x.ln())
}
