//! Arena-based view of the DAG reachable from a backward root.
//!
//! Traversal state is addressed by arena index rather than by owning
//! references: the arena keeps one `Value` clone per reachable node, a map
//! from node identity to index, and a topological order of indices.

use std::collections::HashMap;
use std::sync::Arc;

use crate::autograd::record::OpRecord;
use crate::types::Element;
use crate::value::Value;

pub(crate) struct GraphArena<T: Element> {
    /// One entry per reachable node; index 0 is the root.
    pub(crate) nodes: Vec<Value<T>>,
    index: HashMap<usize, usize>,
}

impl<T: Element> GraphArena<T> {
    /// Builds the arena and a topological order (inputs before outputs) by
    /// iterative depth-first traversal. Each node is recorded exactly once
    /// even when reached via multiple paths, so a DAG join contributes a
    /// single arena slot.
    pub(crate) fn build(root: &Value<T>) -> (Self, Vec<usize>) {
        let mut arena = GraphArena {
            nodes: vec![root.clone()],
            index: HashMap::new(),
        };
        arena.index.insert(root.node_id(), 0);

        struct Frame<T: Element> {
            node: usize,
            record: Option<Arc<OpRecord<T>>>,
            next_input: usize,
        }

        let root_record = root.read_data().producer.clone();
        let mut stack = vec![Frame {
            node: 0,
            record: root_record,
            next_input: 0,
        }];
        let mut order = Vec::new();

        while let Some(frame) = stack.last_mut() {
            let input = frame
                .record
                .as_ref()
                .and_then(|r| r.inputs.get(frame.next_input))
                .cloned();
            match input {
                Some(input) => {
                    frame.next_input += 1;
                    let id = input.node_id();
                    if !arena.index.contains_key(&id) {
                        let idx = arena.nodes.len();
                        arena.index.insert(id, idx);
                        let record = input.read_data().producer.clone();
                        arena.nodes.push(input);
                        stack.push(Frame {
                            node: idx,
                            record,
                            next_input: 0,
                        });
                    }
                }
                None => {
                    order.push(frame.node);
                    stack.pop();
                }
            }
        }
        (arena, order)
    }

    pub(crate) fn index_of(&self, value: &Value<T>) -> Option<usize> {
        self.index.get(&value.node_id()).copied()
    }
}
