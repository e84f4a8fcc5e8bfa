//! Full reductions producing scalar values.

use crate::autograd::OpKind;
use crate::error::RevGradError;
use crate::ops::attach_if_tracked;
use crate::types::Element;
use crate::value::Value;

/// Sum of all elements, as a scalar value.
pub fn sum_op<T: Element>(input: &Value<T>) -> Result<Value<T>, RevGradError> {
    let total = {
        let guard = input.read_data();
        guard.payload.iter().copied().sum()
    };
    let out = Value::new(vec![total], vec![])?;
    attach_if_tracked(&out, OpKind::Sum, &[input]);
    Ok(out)
}

/// Mean of all elements, as a scalar value.
pub fn mean_op<T: Element>(input: &Value<T>) -> Result<Value<T>, RevGradError> {
    let mean = {
        let guard = input.read_data();
        if guard.numel() == 0 {
            return Err(RevGradError::UnsupportedOperation(
                "mean over an empty Value".to_string(),
            ));
        }
        let count = T::from(guard.numel()).ok_or_else(|| {
            RevGradError::InternalError("element count overflows element type".to_string())
        })?;
        let total: T = guard.payload.iter().copied().sum();
        total / count
    };
    let out = Value::new(vec![mean], vec![])?;
    attach_if_tracked(&out, OpKind::Mean, &[input]);
    Ok(out)
}

/// Maximum element, as a scalar value.
///
/// The gradient routes to the argmax only. Ties break towards the lowest
/// linear index, decided here at forward time with a strict comparison.
pub fn max_op<T: Element>(input: &Value<T>) -> Result<Value<T>, RevGradError> {
    let (best, argmax) = {
        let guard = input.read_data();
        if guard.numel() == 0 {
            return Err(RevGradError::UnsupportedOperation(
                "max over an empty Value".to_string(),
            ));
        }
        let mut best = guard.payload[0];
        let mut argmax = 0;
        for (i, &x) in guard.payload.iter().enumerate().skip(1) {
            if x > best {
                best = x;
                argmax = i;
            }
        }
        (best, argmax)
    };
    let out = Value::new(vec![best], vec![])?;
    attach_if_tracked(&out, OpKind::Max { argmax }, &[input]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tracked(data: Vec<f64>, shape: Vec<usize>) -> Value<f64> {
        let v = Value::new(data, shape).unwrap();
        v.requires_grad_(true).unwrap();
        v
    }

    #[test]
    fn test_sum_forward_backward() {
        let x = tracked(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let s = sum_op(&x).unwrap();
        assert_eq!(s.shape(), Vec::<usize>::new());
        assert_eq!(s.item().unwrap(), 10.0);
        s.backward().unwrap();
        assert_eq!(x.grad().unwrap().get_data(), vec![1.0; 4]);
    }

    #[test]
    fn test_mean_backward() {
        let x = tracked(vec![2.0, 4.0, 6.0, 8.0], vec![4]);
        let m = mean_op(&x).unwrap();
        assert_relative_eq!(m.item().unwrap(), 5.0);
        m.backward().unwrap();
        assert_eq!(x.grad().unwrap().get_data(), vec![0.25; 4]);
    }

    #[test]
    fn test_max_routes_gradient_to_argmax() {
        let x = tracked(vec![1.0, 7.0, 3.0], vec![3]);
        let m = max_op(&x).unwrap();
        assert_eq!(m.item().unwrap(), 7.0);
        m.backward().unwrap();
        assert_eq!(x.grad().unwrap().get_data(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_max_tie_break_first_index() {
        let x = tracked(vec![5.0, 5.0, 5.0], vec![3]);
        let m = max_op(&x).unwrap();
        m.backward().unwrap();
        assert_eq!(x.grad().unwrap().get_data(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_reductions_reject_empty() {
        let x = Value::new(Vec::<f64>::new(), vec![0]).unwrap();
        assert!(matches!(
            max_op(&x),
            Err(RevGradError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            mean_op(&x),
            Err(RevGradError::UnsupportedOperation(_))
        ));
    }
}
