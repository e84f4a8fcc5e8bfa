//! Reverse topological walk accumulating gradients from a terminal value to
//! all leaves.

use crate::autograd::gradients::local_input_gradients;
use crate::autograd::graph::GraphArena;
use crate::error::RevGradError;
use crate::types::Element;
use crate::value::Value;

/// Runs the backward traversal from `root` with the given upstream seed.
///
/// Seed validation (shape, scalar-ness, tracking, `GraphAlreadyFreed` on the
/// root itself) happens in [`Value::backward_with`] before this is called.
pub(crate) fn run_backward<T: Element>(
    root: &Value<T>,
    seed: Vec<T>,
    retain_graph: bool,
) -> Result<(), RevGradError> {
    let (arena, order) = GraphArena::build(root);

    // Upstream accumulator per arena slot; joins sum into the same slot.
    let mut upstream: Vec<Option<Vec<T>>> = vec![None; arena.nodes.len()];
    upstream[0] = Some(seed);

    for &node_idx in order.iter().rev() {
        let accumulated = match upstream[node_idx].take() {
            Some(grad) => grad,
            None => continue, // no gradient flowed to this node
        };
        let node = &arena.nodes[node_idx];
        let (record, out_shape, tracks_gradient, graph_freed) = {
            let guard = node.read_data();
            (
                guard.producer.clone(),
                guard.shape.clone(),
                guard.tracks_gradient,
                guard.graph_freed,
            )
        };

        match record {
            Some(record) => {
                let input_grads = local_input_gradients(&record, &accumulated, &out_shape)?;
                if input_grads.len() != record.inputs.len() {
                    return Err(RevGradError::InternalError(format!(
                        "{:?} produced {} gradients for {} inputs",
                        record.op,
                        input_grads.len(),
                        record.inputs.len()
                    )));
                }
                for (input, grad) in record.inputs.iter().zip(input_grads) {
                    let grad = match grad {
                        Some(grad) => grad,
                        None => continue, // non-tracking input, skipped entirely
                    };
                    let input_idx = arena.index_of(input).ok_or_else(|| {
                        RevGradError::InternalError(
                            "record input missing from traversal arena".to_string(),
                        )
                    })?;
                    match upstream[input_idx].as_mut() {
                        Some(existing) => {
                            for (acc, &g) in existing.iter_mut().zip(grad.iter()) {
                                *acc += g;
                            }
                        }
                        None => upstream[input_idx] = Some(grad),
                    }
                }
            }
            None if graph_freed => {
                // A released sub-graph was reached from a second root.
                return Err(RevGradError::GraphAlreadyFreed);
            }
            None if tracks_gradient => {
                node.acc_grad(&accumulated)?;
            }
            None => {
                log::debug!(
                    "backward skipped a non-tracking leaf with shape {:?}",
                    out_shape
                );
            }
        }
    }

    if !retain_graph {
        release(&arena);
    }
    Ok(())
}

/// Drops every producer record reachable from the root and marks its output
/// as freed. Records are dropped after all value locks are released, which
/// also lifts the capture counts on their inputs.
fn release<T: Element>(arena: &GraphArena<T>) {
    let mut records = Vec::new();
    for node in &arena.nodes {
        let mut guard = node.write_data();
        if let Some(record) = guard.producer.take() {
            guard.graph_freed = true;
            records.push(record);
        }
    }
    drop(records);
}
