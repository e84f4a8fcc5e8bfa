use crate::error::RevGradError;

/// Calculates the strides for a contiguous row-major layout of `shape`.
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    if shape.is_empty() {
        return strides;
    }
    strides[shape.len() - 1] = 1;
    for i in (0..shape.len() - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Computes the broadcast result shape of two shapes following NumPy rules.
///
/// Dimensions are aligned from the right; a dimension of size 1 stretches to
/// match the other operand. Incompatible shapes yield `BroadcastError`.
pub fn broadcast_shapes(
    shape1: &[usize],
    shape2: &[usize],
) -> Result<Vec<usize>, RevGradError> {
    let rank = shape1.len().max(shape2.len());
    let mut result = vec![0; rank];
    for i in 0..rank {
        let d1 = if i < shape1.len() {
            shape1[shape1.len() - 1 - i]
        } else {
            1
        };
        let d2 = if i < shape2.len() {
            shape2[shape2.len() - 1 - i]
        } else {
            1
        };
        result[rank - 1 - i] = if d1 == d2 {
            d1
        } else if d1 == 1 {
            d2
        } else if d2 == 1 {
            d1
        } else {
            return Err(RevGradError::BroadcastError {
                shape1: shape1.to_vec(),
                shape2: shape2.to_vec(),
            });
        };
    }
    Ok(result)
}

/// Strides mapping a coordinate of `out_shape` onto a linear offset of
/// `input_shape`, with stride 0 along stretched or missing dimensions.
fn broadcast_strides(input_shape: &[usize], out_shape: &[usize]) -> Vec<usize> {
    let input_strides = calculate_strides(input_shape);
    let rank_diff = out_shape.len() - input_shape.len();
    let mut strides = vec![0; out_shape.len()];
    for (i, &dim) in input_shape.iter().enumerate() {
        if dim != 1 {
            strides[rank_diff + i] = input_strides[i];
        }
    }
    strides
}

/// Visits every linear index of `out_shape` together with the corresponding
/// offsets into two broadcast operands.
///
/// Both the forward kernels and the backward gradient reduction use this: in
/// the backward direction, accumulating into `grad[a_offset]` sums all paths
/// a broadcast dimension fanned out to.
pub(crate) fn for_each_broadcast_pair<F>(
    out_shape: &[usize],
    a_shape: &[usize],
    b_shape: &[usize],
    mut visit: F,
) where
    F: FnMut(usize, usize, usize),
{
    let numel: usize = out_shape.iter().product();
    let a_strides = broadcast_strides(a_shape, out_shape);
    let b_strides = broadcast_strides(b_shape, out_shape);
    let mut coords = vec![0usize; out_shape.len()];
    let mut a_offset = 0usize;
    let mut b_offset = 0usize;

    for i in 0..numel {
        visit(i, a_offset, b_offset);

        // Odometer increment over the output coordinates.
        for dim in (0..out_shape.len()).rev() {
            coords[dim] += 1;
            a_offset += a_strides[dim];
            b_offset += b_strides[dim];
            if coords[dim] < out_shape[dim] {
                break;
            }
            a_offset -= coords[dim] * a_strides[dim];
            b_offset -= coords[dim] * b_strides[dim];
            coords[dim] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_strides() {
        assert_eq!(calculate_strides(&[2, 3, 4]), vec![12, 4, 1]);
        assert_eq!(calculate_strides(&[5]), vec![1]);
        assert_eq!(calculate_strides(&[]), Vec::<usize>::new());
    }

    #[test]
    fn test_broadcast_shapes_ok() {
        assert_eq!(broadcast_shapes(&[2, 3], &[2, 3]).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shapes(&[2, 1], &[1, 3]).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shapes(&[3], &[2, 3]).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shapes(&[], &[4]).unwrap(), vec![4]);
    }

    #[test]
    fn test_broadcast_shapes_err() {
        let err = broadcast_shapes(&[2, 2], &[2, 3]).unwrap_err();
        match err {
            RevGradError::BroadcastError { shape1, shape2 } => {
                assert_eq!(shape1, vec![2, 2]);
                assert_eq!(shape2, vec![2, 3]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_for_each_broadcast_pair_offsets() {
        // a: [2, 1], b: [3] -> out: [2, 3]
        let mut seen = Vec::new();
        for_each_broadcast_pair(&[2, 3], &[2, 1], &[3], |i, ai, bi| {
            seen.push((i, ai, bi));
        });
        assert_eq!(
            seen,
            vec![
                (0, 0, 0),
                (1, 0, 1),
                (2, 0, 2),
                (3, 1, 0),
                (4, 1, 1),
                (5, 1, 2)
            ]
        );
    }

    #[test]
    fn test_for_each_broadcast_pair_scalar() {
        let mut seen = Vec::new();
        for_each_broadcast_pair(&[2, 2], &[], &[2, 2], |i, ai, bi| {
            seen.push((i, ai, bi));
        });
        assert_eq!(seen, vec![(0, 0, 0), (1, 0, 1), (2, 0, 2), (3, 0, 3)]);
    }
}
