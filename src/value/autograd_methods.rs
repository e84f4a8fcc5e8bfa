use crate::autograd::backward::run_backward;
use crate::error::RevGradError;
use crate::types::Element;
use crate::value::Value;
use crate::value_data::ValueData;

impl<T: Element> Value<T> {
    /// Checks whether this value tracks gradients.
    pub fn requires_grad(&self) -> bool {
        self.read_data().tracks_gradient
    }

    /// Toggles gradient tracking **in place**. Only allowed on leaf values;
    /// the output of a recorded operation always tracks gradients.
    pub fn requires_grad_(&self, tracks_gradient: bool) -> Result<(), RevGradError> {
        let mut guard = self.write_data();
        if guard.producer.is_some() {
            return Err(RevGradError::RequiresGradOnNonLeaf);
        }
        guard.tracks_gradient = tracks_gradient;
        Ok(())
    }

    /// `true` if this value has no producing operation record.
    pub fn is_leaf(&self) -> bool {
        self.read_data().producer.is_none()
    }

    /// Returns the accumulated gradient.
    ///
    /// # Errors
    /// `MissingGradient` if the value never tracked gradients or no backward
    /// pass has reached it yet. An absent gradient is distinct from a zero
    /// gradient.
    pub fn grad(&self) -> Result<Value<T>, RevGradError> {
        let guard = self.read_data();
        match (&guard.grad, guard.tracks_gradient) {
            (Some(grad), _) => Ok(grad.clone()),
            _ => Err(RevGradError::MissingGradient {
                shape: guard.shape.clone(),
            }),
        }
    }

    /// Returns the accumulated gradient if one exists.
    pub fn grad_opt(&self) -> Option<Value<T>> {
        self.read_data().grad.clone()
    }

    /// Resets the gradient accumulator to absent. Required between
    /// independent optimization steps, or stale gradients silently add into
    /// the new ones.
    pub fn zero_grad(&self) {
        self.write_data().grad = None;
    }

    /// Creates a new leaf value with the same payload that is detached from
    /// the computation graph. Everything built from the result is
    /// non-differentiable until tracking is re-enabled on it.
    pub fn detach(&self) -> Value<T> {
        let guard = self.read_data();
        let detached = ValueData {
            payload: guard.payload.clone(),
            shape: guard.shape.clone(),
            tracks_gradient: false,
            grad: None,
            producer: None,
            graph_freed: false,
            live_captures: 0,
        };
        Value::from_data(detached)
    }

    /// Computes gradients of this scalar value w.r.t. the graph leaves and
    /// releases the graph afterwards. Equivalent to
    /// `backward_with(None, false)`.
    pub fn backward(&self) -> Result<(), RevGradError> {
        self.backward_with(None, false)
    }

    /// Performs the backward pass starting from this value.
    ///
    /// # Arguments
    /// * `seed`: upstream gradient for this value. Defaults to ones, in
    ///   which case the value must hold a single element.
    /// * `retain_graph`: keep the operation records alive so a second
    ///   traversal over a shared sub-graph is possible. Without retention a
    ///   second call fails with `GraphAlreadyFreed`.
    pub fn backward_with(
        &self,
        seed: Option<&Value<T>>,
        retain_graph: bool,
    ) -> Result<(), RevGradError> {
        let seed_payload = {
            let guard = self.read_data();
            if !guard.tracks_gradient {
                return Err(RevGradError::MissingGradient {
                    shape: guard.shape.clone(),
                });
            }
            if guard.graph_freed {
                return Err(RevGradError::GraphAlreadyFreed);
            }
            match seed {
                Some(s) => {
                    let s_guard = s.read_data();
                    if s_guard.shape != guard.shape {
                        return Err(RevGradError::ShapeMismatch {
                            expected: guard.shape.clone(),
                            actual: s_guard.shape.clone(),
                            operation: "backward seed".to_string(),
                        });
                    }
                    s_guard.payload.clone()
                }
                None => {
                    if guard.numel() != 1 {
                        return Err(RevGradError::NonScalarBackward);
                    }
                    vec![T::one(); 1]
                }
            }
        };
        run_backward(self, seed_payload, retain_graph)
    }

    /// Sums `contribution` into the gradient accumulator. Contributions from
    /// every path reaching this value add up; a DAG join receives the sum of
    /// all its uses.
    pub(crate) fn acc_grad(&self, contribution: &[T]) -> Result<(), RevGradError> {
        let mut guard = self.write_data();
        if contribution.len() != guard.numel() {
            return Err(RevGradError::InternalError(format!(
                "gradient contribution length {} does not match value shape {:?}",
                contribution.len(),
                guard.shape
            )));
        }
        let shape = guard.shape.clone();
        let new_grad = match guard.grad.take() {
            Some(existing) => {
                let mut summed = existing.get_data();
                for (acc, &c) in summed.iter_mut().zip(contribution.iter()) {
                    *acc += c;
                }
                Value::new(summed, shape)?
            }
            None => Value::new(contribution.to_vec(), shape)?,
        };
        guard.grad = Some(new_grad);
        Ok(())
    }
}
