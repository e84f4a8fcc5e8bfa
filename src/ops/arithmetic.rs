//! Broadcasting arithmetic operators: add, sub, mul, div, neg, pow.

use crate::autograd::OpKind;
use crate::error::RevGradError;
use crate::ops::{attach_if_tracked, unary_op};
use crate::types::Element;
use crate::value::utils::{broadcast_shapes, for_each_broadcast_pair};
use crate::value::Value;

/// Shared skeleton for elementwise binary operators with broadcasting.
fn binary_op<T, F>(
    a: &Value<T>,
    b: &Value<T>,
    op: OpKind<T>,
    f: F,
) -> Result<Value<T>, RevGradError>
where
    T: Element,
    F: Fn(T, T) -> T,
{
    let out = {
        let a_guard = a.read_data();
        let b_guard = b.read_data();
        let out_shape = broadcast_shapes(&a_guard.shape, &b_guard.shape)?;
        let numel: usize = out_shape.iter().product();
        let mut payload = Vec::with_capacity(numel);
        for_each_broadcast_pair(&out_shape, &a_guard.shape, &b_guard.shape, |_, ai, bi| {
            payload.push(f(a_guard.payload[ai], b_guard.payload[bi]));
        });
        Value::new(payload, out_shape)?
    };
    attach_if_tracked(&out, op, &[a, b]);
    Ok(out)
}

/// Elementwise addition with broadcasting.
pub fn add_op<T: Element>(a: &Value<T>, b: &Value<T>) -> Result<Value<T>, RevGradError> {
    binary_op(a, b, OpKind::Add, |x, y| x + y)
}

/// Elementwise subtraction with broadcasting.
pub fn sub_op<T: Element>(a: &Value<T>, b: &Value<T>) -> Result<Value<T>, RevGradError> {
    binary_op(a, b, OpKind::Sub, |x, y| x - y)
}

/// Elementwise multiplication with broadcasting.
pub fn mul_op<T: Element>(a: &Value<T>, b: &Value<T>) -> Result<Value<T>, RevGradError> {
    binary_op(a, b, OpKind::Mul, |x, y| x * y)
}

/// Elementwise division with broadcasting. Division by zero follows IEEE
/// float semantics.
pub fn div_op<T: Element>(a: &Value<T>, b: &Value<T>) -> Result<Value<T>, RevGradError> {
    binary_op(a, b, OpKind::Div, |x, y| x / y)
}

/// Elementwise negation.
pub fn neg_op<T: Element>(input: &Value<T>) -> Result<Value<T>, RevGradError> {
    unary_op(input, OpKind::Neg, |x| -x)
}

/// Elementwise power with a constant exponent.
pub fn pow_op<T: Element>(input: &Value<T>, exponent: T) -> Result<Value<T>, RevGradError> {
    unary_op(input, OpKind::Pow(exponent), move |x| x.powf(exponent))
}
