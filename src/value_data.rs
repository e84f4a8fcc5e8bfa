use std::sync::Arc;

use crate::autograd::OpRecord;
use crate::error::RevGradError;
use crate::types::Element;
use crate::value::Value;

/// Internal storage and metadata for a [`Value`].
///
/// Holds the dense row-major payload, the fixed shape and the autograd
/// bookkeeping. Wrapped in `Arc<RwLock<ValueData>>` by `Value` for shared
/// ownership and interior mutability.
#[derive(Debug)]
pub struct ValueData<T: Element> {
    /// Flattened row-major element buffer. Its length never changes.
    pub(crate) payload: Vec<T>,
    /// The shape (dimensions) of the value, fixed at creation.
    pub(crate) shape: Vec<usize>,

    /// Flag indicating whether operations on this value are recorded in the
    /// computation graph.
    pub(crate) tracks_gradient: bool,
    /// Accumulated gradient, same shape as the payload. Absent until a
    /// backward pass reaches this leaf.
    pub(crate) grad: Option<Value<T>>,
    /// Back-reference to the operation record that produced this value.
    /// `None` for leaves.
    pub(crate) producer: Option<Arc<OpRecord<T>>>,
    /// Set once the backward engine has released the record that produced
    /// this value. A later backward through it fails with `GraphAlreadyFreed`.
    pub(crate) graph_freed: bool,
    /// Number of live operation records holding this value as an input.
    /// While non-zero the payload must not be mutated.
    pub(crate) live_captures: usize,
}

impl<T: Element> ValueData<T> {
    /// Creates leaf value data from a flat payload and a shape.
    ///
    /// # Errors
    /// Returns `ValueCreationError` if the payload length does not match the
    /// number of elements implied by `shape`.
    pub fn new(payload: Vec<T>, shape: Vec<usize>) -> Result<Self, RevGradError> {
        let numel: usize = shape.iter().product();
        if payload.len() != numel {
            return Err(RevGradError::ValueCreationError {
                data_len: payload.len(),
                shape,
            });
        }
        Ok(ValueData {
            payload,
            shape,
            tracks_gradient: false,
            grad: None,
            producer: None,
            graph_freed: false,
            live_captures: 0,
        })
    }

    /// Number of elements. An empty shape denotes a scalar (one element).
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Fails with `IllegalMutation` if this value is currently captured as
    /// an input of a live operation record.
    pub(crate) fn ensure_mutable(&self, operation: &str) -> Result<(), RevGradError> {
        if self.live_captures > 0 {
            return Err(RevGradError::IllegalMutation {
                shape: self.shape.clone(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }
}
