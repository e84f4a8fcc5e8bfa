use std::collections::HashMap;

use crate::error::RevGradError;
use crate::optim::{collect_params, Optimizer};
use crate::types::Element;
use crate::value::Value;

/// Per-parameter Adam state: first and second moment running estimates.
#[derive(Debug, Default, Clone)]
struct AdamParamState<T> {
    m: Vec<T>,
    v: Vec<T>,
}

/// Adam optimizer (Kingma & Ba): per-parameter adaptive learning rates from
/// exponential moving averages of the gradient and its square, with bias
/// correction.
#[derive(Debug)]
pub struct Adam<T: Element> {
    params: Vec<(String, Value<T>)>,
    lr: T,
    beta1: T,
    beta2: T,
    eps: T,
    iterations: u64,
    state: HashMap<String, AdamParamState<T>>,
}

impl<T: Element> Adam<T> {
    /// Creates an Adam optimizer with the usual defaults
    /// (`beta1 = 0.9`, `beta2 = 0.999`, `eps = 1e-8`).
    pub fn new(
        params: impl IntoIterator<Item = (String, Value<T>)>,
        lr: T,
    ) -> Result<Self, RevGradError> {
        let beta1 = cast_hyper(0.9)?;
        let beta2 = cast_hyper(0.999)?;
        let eps = cast_hyper(1e-8)?;
        Self::with_config(params, lr, beta1, beta2, eps)
    }

    /// Creates an Adam optimizer with explicit hyperparameters.
    pub fn with_config(
        params: impl IntoIterator<Item = (String, Value<T>)>,
        lr: T,
        beta1: T,
        beta2: T,
        eps: T,
    ) -> Result<Self, RevGradError> {
        if lr <= T::zero() {
            return Err(RevGradError::ConfigurationError(
                "learning rate must be positive".to_string(),
            ));
        }
        if beta1 < T::zero() || beta1 >= T::one() {
            return Err(RevGradError::ConfigurationError(
                "beta1 must be in [0, 1)".to_string(),
            ));
        }
        if beta2 < T::zero() || beta2 >= T::one() {
            return Err(RevGradError::ConfigurationError(
                "beta2 must be in [0, 1)".to_string(),
            ));
        }
        if eps <= T::zero() {
            return Err(RevGradError::ConfigurationError(
                "epsilon must be positive".to_string(),
            ));
        }
        Ok(Adam {
            params: collect_params(params)?,
            lr,
            beta1,
            beta2,
            eps,
            iterations: 0,
            state: HashMap::new(),
        })
    }
}

fn cast_hyper<T: Element>(value: f64) -> Result<T, RevGradError> {
    T::from(value).ok_or_else(|| {
        RevGradError::ConfigurationError(format!(
            "hyperparameter {value} not representable in element type"
        ))
    })
}

impl<T: Element> Optimizer<T> for Adam<T> {
    fn step(&mut self) -> Result<(), RevGradError> {
        self.iterations += 1;
        let t = self.iterations as i32;
        let bias_correction1 = T::one() - self.beta1.powi(t);
        let bias_correction2 = T::one() - self.beta2.powi(t);

        for (name, param) in &self.params {
            let grad = match param.grad_opt() {
                Some(grad) => grad.get_data(),
                None => {
                    log::warn!(
                        "adam: parameter {name:?} has no accumulated gradient, skipping \
                         (was backward() called?)"
                    );
                    continue;
                }
            };

            let state = self
                .state
                .entry(name.clone())
                .or_insert_with(|| AdamParamState {
                    m: vec![T::zero(); grad.len()],
                    v: vec![T::zero(); grad.len()],
                });

            let (beta1, beta2) = (self.beta1, self.beta2);
            for ((m, v), &g) in state.m.iter_mut().zip(state.v.iter_mut()).zip(grad.iter()) {
                *m = beta1 * *m + (T::one() - beta1) * g;
                *v = beta2 * *v + (T::one() - beta2) * g * g;
            }

            let (lr, eps) = (self.lr, self.eps);
            let (m, v) = (&state.m, &state.v);
            param.update_payload("adam step", |data| {
                for (i, p) in data.iter_mut().enumerate() {
                    let m_hat = m[i] / bias_correction1;
                    let v_hat = v[i] / bias_correction2;
                    *p = *p - lr * m_hat / (v_hat.sqrt() + eps);
                }
            })?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::value::create::scalar;

    fn param(name: &str, value: f64) -> (String, Value<f64>) {
        let p = scalar(value).unwrap();
        p.requires_grad_(true).unwrap();
        (name.to_string(), p)
    }

    #[test]
    fn test_first_step_moves_by_lr() {
        // With bias correction, the very first Adam step is close to
        // lr * sign(g) regardless of gradient magnitude.
        let (name, p) = param("w", 1.0);
        let mut opt = Adam::new(vec![(name, p.clone())], 0.1).unwrap();
        p.acc_grad(&[5.0]).unwrap();
        opt.step().unwrap();
        assert_relative_eq!(p.item().unwrap(), 1.0 - 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_moves_opposite_gradient() {
        let (name, p) = param("w", 0.0);
        let mut opt = Adam::new(vec![(name, p.clone())], 0.01).unwrap();
        p.acc_grad(&[-2.0]).unwrap();
        opt.step().unwrap();
        assert!(p.item().unwrap() > 0.0);
    }

    #[test]
    fn test_step_without_grad_is_noop() {
        let (name, p) = param("w", 2.0);
        let mut opt = Adam::new(vec![(name, p.clone())], 0.1).unwrap();
        opt.step().unwrap();
        assert_eq!(p.item().unwrap(), 2.0);
    }

    #[test]
    fn test_hyperparameter_validation() {
        let (name, p) = param("w", 1.0);
        assert!(matches!(
            Adam::with_config(vec![(name.clone(), p.clone())], 0.1, 1.0, 0.999, 1e-8),
            Err(RevGradError::ConfigurationError(_))
        ));
        assert!(matches!(
            Adam::with_config(vec![(name, p)], 0.1, 0.9, 0.999, 0.0),
            Err(RevGradError::ConfigurationError(_))
        ));
    }
}
