//! Numerical gradient checking via central finite differences.
//!
//! Compares the engine's analytical gradients against
//! `(f(x + eps) - f(x - eps)) / (2 eps)` for every element of every
//! tracked input. Mostly used from tests, but public because it is handy
//! when adding new operators.

use approx::RelativeEq;
use thiserror::Error;

use crate::error::RevGradError;
use crate::types::Element;
use crate::value::Value;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError<T: Element> {
    #[error("Gradient mismatch for input {input_index}, element {element_index}: analytical {analytical:?} != numerical {numerical:?}")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical: T,
        numerical: T,
    },

    #[error("Forward function failed during gradient check: {0}")]
    ForwardPass(RevGradError),

    #[error("Backward pass failed during gradient check: {0}")]
    BackwardPass(RevGradError),

    #[error("Gradient check requires a scalar output, got shape {shape:?}")]
    NonScalarOutput { shape: Vec<usize> },

    #[error("Input {input_index} must be a leaf value")]
    InputNotLeaf { input_index: usize },

    #[error("Input {input_index} tracks gradients but received none after backward")]
    MissingAnalyticalGrad { input_index: usize },

    #[error("Value error during gradient check: {0}")]
    Value(#[from] RevGradError),
}

/// Checks analytical gradients of `func` against numerical ones.
///
/// `func` must map the given leaf inputs to a scalar output. Inputs with
/// gradient tracking enabled are checked element by element; others are
/// left alone.
pub fn check_grad<T, F>(
    func: F,
    inputs: &[Value<T>],
    epsilon: T,
    tolerance: T,
) -> Result<(), GradCheckError<T>>
where
    T: Element + RelativeEq<Epsilon = T>,
    F: Fn(&[Value<T>]) -> Result<Value<T>, RevGradError>,
{
    for (i, input) in inputs.iter().enumerate() {
        if !input.is_leaf() {
            return Err(GradCheckError::InputNotLeaf { input_index: i });
        }
        input.zero_grad();
    }

    // Analytical pass. backward() releases the graph, so the inputs are
    // mutable again for the numerical perturbations below.
    let output = func(inputs).map_err(GradCheckError::ForwardPass)?;
    if output.numel() != 1 {
        return Err(GradCheckError::NonScalarOutput {
            shape: output.shape(),
        });
    }
    output.backward().map_err(GradCheckError::BackwardPass)?;

    let two = T::one() + T::one();
    for (i, input) in inputs.iter().enumerate() {
        if !input.requires_grad() {
            continue;
        }
        let analytical = input
            .grad_opt()
            .ok_or(GradCheckError::MissingAnalyticalGrad { input_index: i })?
            .get_data();
        let baseline = input.get_data();

        for j in 0..baseline.len() {
            let loss_plus = eval_at(&func, inputs, input, &baseline, j, epsilon)?;
            let loss_minus = eval_at(&func, inputs, input, &baseline, j, -epsilon)?;
            input.set_data(baseline.clone())?;

            let numerical = (loss_plus - loss_minus) / (two * epsilon);
            if !analytical[j].relative_eq(&numerical, tolerance, tolerance) {
                return Err(GradCheckError::GradientMismatch {
                    input_index: i,
                    element_index: j,
                    analytical: analytical[j],
                    numerical,
                });
            }
        }
    }
    Ok(())
}

fn eval_at<T, F>(
    func: &F,
    inputs: &[Value<T>],
    target: &Value<T>,
    baseline: &[T],
    element: usize,
    delta: T,
) -> Result<T, GradCheckError<T>>
where
    T: Element,
    F: Fn(&[Value<T>]) -> Result<Value<T>, RevGradError>,
{
    let mut perturbed = baseline.to_vec();
    perturbed[element] = perturbed[element] + delta;
    target.set_data(perturbed)?;
    // Dropping the output tears the throwaway graph down again.
    let output = func(inputs).map_err(GradCheckError::ForwardPass)?;
    Ok(output.item()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::arithmetic::{mul_op, pow_op};
    use crate::value::create::scalar;

    #[test]
    fn test_check_grad_product() {
        let x = scalar(1.5f64).unwrap();
        let y = scalar(-2.0f64).unwrap();
        x.requires_grad_(true).unwrap();
        y.requires_grad_(true).unwrap();
        check_grad(
            |inputs| mul_op(&inputs[0], &inputs[1]),
            &[x, y],
            1e-5,
            1e-5,
        )
        .unwrap();
    }

    #[test]
    fn test_check_grad_power() {
        let x = scalar(0.7f64).unwrap();
        x.requires_grad_(true).unwrap();
        check_grad(|inputs| pow_op(&inputs[0], 3.0), &[x], 1e-5, 1e-5).unwrap();
    }

    #[test]
    fn test_check_grad_rejects_non_scalar() {
        let x = Value::new(vec![1.0f64, 2.0], vec![2]).unwrap();
        x.requires_grad_(true).unwrap();
        let err = check_grad(|inputs| Ok(inputs[0].clone()), &[x], 1e-5, 1e-5).unwrap_err();
        assert!(matches!(err, GradCheckError::NonScalarOutput { .. }));
    }
}
