use rand::thread_rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::RevGradError;
use crate::types::Element;
use crate::value::Value;

/// Creates a new value filled with zeros with the specified shape.
pub fn zeros<T: Element>(shape: &[usize]) -> Result<Value<T>, RevGradError> {
    let numel = shape.iter().product();
    Value::new(vec![T::zero(); numel], shape.to_vec())
}

/// Creates a new value filled with ones with the specified shape.
pub fn ones<T: Element>(shape: &[usize]) -> Result<Value<T>, RevGradError> {
    let numel = shape.iter().product();
    Value::new(vec![T::one(); numel], shape.to_vec())
}

/// Creates a new value filled with a specific element with the specified shape.
pub fn full<T: Element>(shape: &[usize], value: T) -> Result<Value<T>, RevGradError> {
    let numel = shape.iter().product();
    Value::new(vec![value; numel], shape.to_vec())
}

/// Creates a scalar value (empty shape, one element).
pub fn scalar<T: Element>(value: T) -> Result<Value<T>, RevGradError> {
    Value::new(vec![value], vec![])
}

/// Creates a zero-filled value with the same shape as `value`.
pub fn zeros_like<T: Element>(value: &Value<T>) -> Result<Value<T>, RevGradError> {
    zeros(&value.shape())
}

/// Creates a one-filled value with the same shape as `value`.
pub fn ones_like<T: Element>(value: &Value<T>) -> Result<Value<T>, RevGradError> {
    ones(&value.shape())
}

/// Creates a value with elements drawn from the standard normal distribution.
///
/// Handy for parameter initialisation before an optimization loop.
pub fn randn<T: Element>(shape: &[usize]) -> Result<Value<T>, RevGradError> {
    let numel: usize = shape.iter().product();
    let mut rng = thread_rng();
    let mut payload = Vec::with_capacity(numel);
    for _ in 0..numel {
        let sample: f64 = StandardNormal.sample(&mut rng);
        let elem = T::from(sample).ok_or_else(|| {
            RevGradError::InternalError("randn sample not representable".to_string())
        })?;
        payload.push(elem);
    }
    Value::new(payload, shape.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_ones_full() {
        let z = zeros::<f64>(&[2, 3]).unwrap();
        assert_eq!(z.get_data(), vec![0.0; 6]);
        let o = ones::<f64>(&[2]).unwrap();
        assert_eq!(o.get_data(), vec![1.0, 1.0]);
        let f = full::<f32>(&[3], 2.5).unwrap();
        assert_eq!(f.get_data(), vec![2.5, 2.5, 2.5]);
    }

    #[test]
    fn test_scalar_shape() {
        let s = scalar(4.0f64).unwrap();
        assert_eq!(s.shape(), Vec::<usize>::new());
        assert_eq!(s.numel(), 1);
    }

    #[test]
    fn test_like_constructors() {
        let v = full::<f64>(&[2, 2], 9.0).unwrap();
        assert_eq!(zeros_like(&v).unwrap().shape(), vec![2, 2]);
        assert_eq!(ones_like(&v).unwrap().get_data(), vec![1.0; 4]);
    }

    #[test]
    fn test_randn_shape() {
        let v = randn::<f64>(&[4, 5]).unwrap();
        assert_eq!(v.shape(), vec![4, 5]);
        assert_eq!(v.numel(), 20);
    }
}
