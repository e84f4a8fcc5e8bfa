use std::collections::HashMap;

use crate::error::RevGradError;
use crate::optim::{collect_params, Optimizer};
use crate::types::Element;
use crate::value::Value;

/// Stochastic gradient descent, with optional momentum.
///
/// Plain descent updates each parameter as `p ← p − lr·g`. With momentum,
/// a per-parameter velocity buffer `v ← μ·v + g` is applied instead:
/// `p ← p − lr·v`.
#[derive(Debug)]
pub struct Sgd<T: Element> {
    params: Vec<(String, Value<T>)>,
    lr: T,
    momentum: T,
    momentum_buffers: HashMap<String, Vec<T>>,
}

impl<T: Element> Sgd<T> {
    /// Creates a plain gradient-descent optimizer.
    pub fn new(
        params: impl IntoIterator<Item = (String, Value<T>)>,
        lr: T,
    ) -> Result<Self, RevGradError> {
        Self::with_momentum(params, lr, T::zero())
    }

    /// Creates an SGD optimizer with momentum factor `momentum` in `[0, 1)`.
    pub fn with_momentum(
        params: impl IntoIterator<Item = (String, Value<T>)>,
        lr: T,
        momentum: T,
    ) -> Result<Self, RevGradError> {
        if lr <= T::zero() {
            return Err(RevGradError::ConfigurationError(
                "learning rate must be positive".to_string(),
            ));
        }
        if momentum < T::zero() || momentum >= T::one() {
            return Err(RevGradError::ConfigurationError(
                "momentum must be in [0, 1)".to_string(),
            ));
        }
        Ok(Sgd {
            params: collect_params(params)?,
            lr,
            momentum,
            momentum_buffers: HashMap::new(),
        })
    }
}

impl<T: Element> Optimizer<T> for Sgd<T> {
    fn step(&mut self) -> Result<(), RevGradError> {
        for (name, param) in &self.params {
            let grad = match param.grad_opt() {
                Some(grad) => grad.get_data(),
                None => {
                    log::warn!(
                        "sgd: parameter {name:?} has no accumulated gradient, skipping \
                         (was backward() called?)"
                    );
                    continue;
                }
            };

            let lr = self.lr;
            if self.momentum == T::zero() {
                param.update_payload("sgd step", |data| {
                    for (p, &g) in data.iter_mut().zip(grad.iter()) {
                        *p = *p - lr * g;
                    }
                })?;
            } else {
                let momentum = self.momentum;
                let velocity = self
                    .momentum_buffers
                    .entry(name.clone())
                    .or_insert_with(|| vec![T::zero(); grad.len()]);
                for (v, &g) in velocity.iter_mut().zip(grad.iter()) {
                    *v = momentum * *v + g;
                }
                let velocity = &*velocity;
                param.update_payload("sgd step", |data| {
                    for (p, &v) in data.iter_mut().zip(velocity.iter()) {
                        *p = *p - lr * v;
                    }
                })?;
            }
        }
        Ok(())
    }

    fn zero_grad(&mut self) {
        for (_, param) in &self.params {
            param.zero_grad();
        }
    }

    fn params(&self) -> &[(String, Value<T>)] {
        &self.params
    }
}
