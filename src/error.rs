use thiserror::Error;

/// Custom error type for the revgrad engine.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum RevGradError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Cannot broadcast shapes: {shape1:?} and {shape2:?}")]
    BroadcastError {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Value creation error: data length {data_len} does not match shape {shape:?}")]
    ValueCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Illegal mutation of a Value (shape {shape:?}) still captured by a recorded operation, during {operation}")]
    IllegalMutation {
        shape: Vec<usize>,
        operation: String,
    },

    #[error("Backward called on a graph that has already been freed. Pass retain_graph = true to backward through it a second time.")]
    GraphAlreadyFreed,

    #[error("No gradient available for Value with shape {shape:?}: it never tracked gradients or never participated in a backward pass")]
    MissingGradient { shape: Vec<usize> },

    #[error("Backward called on non-scalar Value without an explicit upstream gradient.")]
    NonScalarBackward,

    #[error("requires_grad can only be changed on leaf Values.")]
    RequiresGradOnNonLeaf,

    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
