//! Forward operators. Each operator computes its result eagerly and, when
//! any operand tracks gradients, attaches an [`OpRecord`] to the output,
//! growing the computation DAG.

pub mod arithmetic;
pub mod math_elem;
pub mod reduction;

use std::sync::Arc;

use crate::autograd::{OpKind, OpRecord};
use crate::error::RevGradError;
use crate::types::Element;
use crate::value::Value;

/// Shared skeleton for elementwise unary operators.
pub(crate) fn unary_op<T, F>(
    input: &Value<T>,
    op: OpKind<T>,
    f: F,
) -> Result<Value<T>, RevGradError>
where
    T: Element,
    F: Fn(T) -> T,
{
    let out = {
        let guard = input.read_data();
        let payload = guard.payload.iter().map(|&x| f(x)).collect();
        Value::new(payload, guard.shape.clone())?
    };
    attach_if_tracked(&out, op, &[input]);
    Ok(out)
}

/// Attaches a record referencing exactly the operand values when at least
/// one of them tracks gradients. Detached operands silently produce a
/// non-differentiable result.
pub(crate) fn attach_if_tracked<T: Element>(out: &Value<T>, op: OpKind<T>, inputs: &[&Value<T>]) {
    if inputs.iter().any(|v| v.requires_grad()) {
        let captured: Vec<Value<T>> = inputs.iter().map(|v| (*v).clone()).collect();
        let record: Arc<OpRecord<T>> = OpRecord::new(op, captured);
        out.attach_record(record);
    }
}
