use std::sync::Arc;

use crate::types::Element;
use crate::value::Value;

/// Tag identifying the primitive operation a record captured.
///
/// An explicit enum keeps the operator set auditable and lets the backward
/// engine dispatch local-gradient rules through a single `match` (see
/// [`crate::autograd::gradients`]). Variants carry the forward-time
/// constants their gradient rule needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpKind<T> {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    /// Elementwise power with a constant exponent.
    Pow(T),
    Exp,
    Ln,
    /// Full reduction to a scalar.
    Sum,
    Mean,
    /// Full max reduction. Ties are broken deterministically towards the
    /// lowest linear index; `argmax` is saved at forward time.
    Max {
        argmax: usize,
    },
}

/// A DAG node capturing one primitive computation and its inputs.
///
/// Creating a record marks every input as captured; while captured, input
/// payloads must not be mutated (`IllegalMutation`), so the gradient rules
/// can read the inputs' current payloads at backward time instead of saving
/// copies. Dropping the record (normally when the backward engine releases
/// the graph) lifts the captures again.
///
/// Records only reference values created strictly before them, so the graph
/// is acyclic by construction.
#[derive(Debug)]
pub struct OpRecord<T: Element> {
    pub(crate) op: OpKind<T>,
    pub(crate) inputs: Vec<Value<T>>,
}

impl<T: Element> OpRecord<T> {
    pub(crate) fn new(op: OpKind<T>, inputs: Vec<Value<T>>) -> Arc<Self> {
        for input in &inputs {
            input.write_data().live_captures += 1;
        }
        Arc::new(OpRecord { op, inputs })
    }

    /// The operator tag of this record.
    pub fn op(&self) -> &OpKind<T> {
        &self.op
    }
}

impl<T: Element> Drop for OpRecord<T> {
    fn drop(&mut self) {
        for input in &self.inputs {
            // Avoid panicking in drop if a lock was poisoned elsewhere.
            if let Ok(mut guard) = input.data.write() {
                guard.live_captures = guard.live_captures.saturating_sub(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::create::scalar;

    #[test]
    fn test_record_captures_inputs() {
        let a = scalar(1.0f64).unwrap();
        let b = scalar(2.0f64).unwrap();
        let record = OpRecord::new(OpKind::Add, vec![a.clone(), b.clone()]);
        assert_eq!(a.read_data().live_captures, 1);
        assert_eq!(b.read_data().live_captures, 1);
        drop(record);
        assert_eq!(a.read_data().live_captures, 0);
        assert_eq!(b.read_data().live_captures, 0);
    }

    #[test]
    fn test_same_input_captured_twice() {
        let a = scalar(3.0f64).unwrap();
        let record = OpRecord::new(OpKind::Mul, vec![a.clone(), a.clone()]);
        assert_eq!(a.read_data().live_captures, 2);
        drop(record);
        assert_eq!(a.read_data().live_captures, 0);
    }
}
