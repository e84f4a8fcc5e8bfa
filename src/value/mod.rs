use std::sync::{Arc, RwLock};

use crate::autograd::OpRecord;
use crate::error::RevGradError;
use crate::types::Element;
use crate::value_data::ValueData;

mod autograd_methods;
pub mod create;
mod ops_methods;
pub mod utils;

pub use create::{full, ones, ones_like, randn, scalar, zeros, zeros_like};

/// A differentiable-or-not numeric container participating in the
/// computation DAG.
///
/// `Value` uses `Arc<RwLock<ValueData>>` internally to allow for:
/// 1. **Shared ownership:** every operation record that reads a value keeps
///    it alive through a cheap clone; DAG joins reuse the same node.
/// 2. **Interior mutability:** the gradient slot and graph bookkeeping are
///    updated through an immutable `Value` reference during backward.
pub struct Value<T: Element> {
    pub(crate) data: Arc<RwLock<ValueData<T>>>,
}

impl<T: Element> Value<T> {
    /// Creates a new leaf value from a flat row-major payload and a shape.
    ///
    /// Gradient tracking defaults to off; enable it with
    /// [`Value::requires_grad_`].
    pub fn new(payload: Vec<T>, shape: Vec<usize>) -> Result<Self, RevGradError> {
        let value_data = ValueData::new(payload, shape)?;
        Ok(Value {
            data: Arc::new(RwLock::new(value_data)),
        })
    }

    pub(crate) fn from_data(value_data: ValueData<T>) -> Self {
        Value {
            data: Arc::new(RwLock::new(value_data)),
        }
    }

    /// Returns a clone of the value's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns the number of elements.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Returns a copy of the flat row-major payload.
    pub fn get_data(&self) -> Vec<T> {
        self.read_data().payload.clone()
    }

    /// Returns the single element of a scalar value.
    pub fn item(&self) -> Result<T, RevGradError> {
        let guard = self.read_data();
        if guard.numel() != 1 {
            return Err(RevGradError::ShapeMismatch {
                expected: vec![],
                actual: guard.shape.clone(),
                operation: "item".to_string(),
            });
        }
        Ok(guard.payload[0])
    }

    /// Replaces the payload in place. The new data must match the fixed
    /// shape, and the value must not be captured by a live operation record.
    pub fn set_data(&self, payload: Vec<T>) -> Result<(), RevGradError> {
        let mut guard = self.write_data();
        guard.ensure_mutable("set_data")?;
        if payload.len() != guard.numel() {
            return Err(RevGradError::ValueCreationError {
                data_len: payload.len(),
                shape: guard.shape.clone(),
            });
        }
        guard.payload = payload;
        Ok(())
    }

    /// Fills every element with `value` in place.
    pub fn fill_(&self, value: T) -> Result<(), RevGradError> {
        self.update_payload("fill_", |data| {
            for x in data.iter_mut() {
                *x = value;
            }
        })
    }

    /// Runs `mutate` over the payload after checking the capture invariant.
    /// This is the single mutation point used by the optimizers.
    pub(crate) fn update_payload<F>(
        &self,
        operation: &str,
        mutate: F,
    ) -> Result<(), RevGradError>
    where
        F: FnOnce(&mut [T]),
    {
        let mut guard = self.write_data();
        guard.ensure_mutable(operation)?;
        mutate(&mut guard.payload);
        Ok(())
    }

    /// Stable identity of the underlying node, used as a graph key.
    pub(crate) fn node_id(&self) -> usize {
        Arc::as_ptr(&self.data) as usize
    }

    /// Marks the value as produced by `record`. The result of a recorded
    /// operation always tracks gradients.
    pub(crate) fn attach_record(&self, record: Arc<OpRecord<T>>) {
        let mut guard = self.write_data();
        guard.tracks_gradient = true;
        guard.producer = Some(record);
    }

    /// Acquires a read lock on the value's data.
    /// Panics only if the lock is poisoned.
    pub(crate) fn read_data(&self) -> std::sync::RwLockReadGuard<'_, ValueData<T>> {
        self.data.read().expect("Value RwLock poisoned")
    }

    /// Acquires a write lock on the value's data.
    /// Panics only if the lock is poisoned.
    pub(crate) fn write_data(&self) -> std::sync::RwLockWriteGuard<'_, ValueData<T>> {
        self.data.write().expect("Value RwLock poisoned")
    }
}

impl<T: Element> Clone for Value<T> {
    fn clone(&self) -> Self {
        Value {
            data: Arc::clone(&self.data), // clone the Arc, not the ValueData
        }
    }
}

impl<T: Element> std::fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.read_data();
        f.debug_struct("Value")
            .field("shape", &guard.shape)
            .field("payload", &guard.payload)
            .field("tracks_gradient", &guard.tracks_gradient)
            .field("is_leaf", &guard.producer.is_none())
            .finish()
    }
}
