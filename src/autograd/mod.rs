//! Dynamic computation graph and reverse-mode backward engine.

pub(crate) mod backward;
pub(crate) mod gradients;
pub(crate) mod graph;
mod record;

pub mod grad_check;

pub use record::{OpKind, OpRecord};
