//! Local-gradient rules for every primitive operator.
//!
//! The backward engine hands each record's accumulated upstream gradient to
//! [`local_input_gradients`], which dispatches on the record's [`OpKind`]
//! tag and returns one gradient per input (`None` for inputs that do not
//! track gradients, so no slot is ever allocated for them).
//!
//! Input payloads are read directly: the capture invariant guarantees they
//! have not changed since the forward pass.

use crate::autograd::record::{OpKind, OpRecord};
use crate::error::RevGradError;
use crate::types::Element;
use crate::value::utils::for_each_broadcast_pair;
use crate::value::Value;

pub(crate) fn local_input_gradients<T: Element>(
    record: &OpRecord<T>,
    upstream: &[T],
    out_shape: &[usize],
) -> Result<Vec<Option<Vec<T>>>, RevGradError> {
    match record.op {
        OpKind::Add => binary_grads(
            record,
            out_shape,
            upstream,
            |u, _a, _b| u,
            |u, _a, _b| u,
        ),
        OpKind::Sub => binary_grads(
            record,
            out_shape,
            upstream,
            |u, _a, _b| u,
            |u, _a, _b| -u,
        ),
        OpKind::Mul => binary_grads(
            record,
            out_shape,
            upstream,
            |u, _a, b| u * b,
            |u, a, _b| u * a,
        ),
        OpKind::Div => binary_grads(
            record,
            out_shape,
            upstream,
            |u, _a, b| u / b,
            |u, a, b| -u * a / (b * b),
        ),
        OpKind::Neg => unary_grad(record, upstream, |u, _a| -u),
        OpKind::Pow(exponent) => unary_grad(record, upstream, |u, a| {
            u * exponent * a.powf(exponent - T::one())
        }),
        OpKind::Exp => unary_grad(record, upstream, |u, a| u * a.exp()),
        OpKind::Ln => unary_grad(record, upstream, |u, a| u / a),
        OpKind::Sum => reduction_grad(record, upstream, |n, _input| {
            Ok(vec![upstream[0]; n])
        }),
        OpKind::Mean => reduction_grad(record, upstream, |n, _input| {
            let count = T::from(n).ok_or_else(|| {
                RevGradError::InternalError("mean element count overflows element type".to_string())
            })?;
            Ok(vec![upstream[0] / count; n])
        }),
        OpKind::Max { argmax } => reduction_grad(record, upstream, |n, _input| {
            // Gradient flows only along the argmax-selected element.
            let mut grad = vec![T::zero(); n];
            grad[argmax] = upstream[0];
            Ok(grad)
        }),
    }
}

/// Gradient of a broadcasting binary operator.
///
/// Contributions are accumulated directly at the inputs' offsets while
/// walking the output index space, which folds the broadcast-axis reduction
/// into the same pass.
fn binary_grads<T, DA, DB>(
    record: &OpRecord<T>,
    out_shape: &[usize],
    upstream: &[T],
    da: DA,
    db: DB,
) -> Result<Vec<Option<Vec<T>>>, RevGradError>
where
    T: Element,
    DA: Fn(T, T, T) -> T,
    DB: Fn(T, T, T) -> T,
{
    let (a, b) = expect_binary(record)?;
    let a_guard = a.read_data();
    let b_guard = b.read_data();

    let mut grad_a = a_guard
        .tracks_gradient
        .then(|| vec![T::zero(); a_guard.numel()]);
    let mut grad_b = b_guard
        .tracks_gradient
        .then(|| vec![T::zero(); b_guard.numel()]);

    if grad_a.is_some() || grad_b.is_some() {
        for_each_broadcast_pair(out_shape, &a_guard.shape, &b_guard.shape, |i, ai, bi| {
            let u = upstream[i];
            let a_val = a_guard.payload[ai];
            let b_val = b_guard.payload[bi];
            if let Some(grad) = grad_a.as_mut() {
                grad[ai] += da(u, a_val, b_val);
            }
            if let Some(grad) = grad_b.as_mut() {
                grad[bi] += db(u, a_val, b_val);
            }
        });
    }

    Ok(vec![grad_a, grad_b])
}

/// Gradient of an elementwise unary operator (output shape equals input
/// shape).
fn unary_grad<T, D>(
    record: &OpRecord<T>,
    upstream: &[T],
    d: D,
) -> Result<Vec<Option<Vec<T>>>, RevGradError>
where
    T: Element,
    D: Fn(T, T) -> T,
{
    let input = expect_unary(record)?;
    let guard = input.read_data();
    if !guard.tracks_gradient {
        return Ok(vec![None]);
    }
    let grad = upstream
        .iter()
        .zip(guard.payload.iter())
        .map(|(&u, &a)| d(u, a))
        .collect();
    Ok(vec![Some(grad)])
}

/// Gradient of a full reduction: the upstream gradient is a single element
/// and the rule expands it back over the input.
fn reduction_grad<T, D>(
    record: &OpRecord<T>,
    upstream: &[T],
    expand: D,
) -> Result<Vec<Option<Vec<T>>>, RevGradError>
where
    T: Element,
    D: Fn(usize, &[T]) -> Result<Vec<T>, RevGradError>,
{
    if upstream.len() != 1 {
        return Err(RevGradError::InternalError(format!(
            "reduction upstream gradient has {} elements, expected 1",
            upstream.len()
        )));
    }
    let input = expect_unary(record)?;
    let guard = input.read_data();
    if !guard.tracks_gradient {
        return Ok(vec![None]);
    }
    let grad = expand(guard.numel(), &guard.payload)?;
    Ok(vec![Some(grad)])
}

fn expect_binary<T: Element>(
    record: &OpRecord<T>,
) -> Result<(&Value<T>, &Value<T>), RevGradError> {
    match record.inputs.as_slice() {
        [a, b] => Ok((a, b)),
        other => Err(RevGradError::InternalError(format!(
            "{:?} record has {} inputs, expected 2",
            record.op,
            other.len()
        ))),
    }
}

fn expect_unary<T: Element>(record: &OpRecord<T>) -> Result<&Value<T>, RevGradError> {
    match record.inputs.as_slice() {
        [input] => Ok(input),
        other => Err(RevGradError::InternalError(format!(
            "{:?} record has {} inputs, expected 1",
            record.op,
            other.len()
        ))),
    }
}
