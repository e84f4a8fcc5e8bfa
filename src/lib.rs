//! revgrad: a small reverse-mode automatic differentiation engine.
//!
//! Forward operations on [`Value`]s build a dynamic computation DAG through
//! back-references; calling [`Value::backward`] on a scalar result traverses
//! the DAG in reverse topological order and accumulates gradients on the
//! tracked leaves. The [`optim`] module reads those gradients to update
//! parameters in place, and [`checkpoint`] persists parameter sets as JSON.
//!
//! ```
//! # fn main() -> Result<(), revgrad::RevGradError> {
//! let x = revgrad::scalar(5.0f64)?;
//! x.requires_grad_(true)?;
//! let y = revgrad::scalar(3.0f64)?;
//! y.requires_grad_(true)?;
//!
//! // z = x * y^2
//! let z = x.mul(&y.powf(2.0)?)?;
//! z.backward()?;
//!
//! assert_eq!(x.grad()?.item()?, 9.0); // dz/dx = y^2
//! assert_eq!(y.grad()?.item()?, 30.0); // dz/dy = 2xy
//! # Ok(())
//! # }
//! ```

pub mod autograd;
pub mod checkpoint;
pub mod error;
pub mod ops;
pub mod optim;
pub mod types;
pub mod value;

pub(crate) mod value_data;

pub use autograd::{OpKind, OpRecord};
pub use error::RevGradError;
pub use optim::{Adam, Optimizer, Sgd};
pub use types::Element;
pub use value::{full, ones, ones_like, randn, scalar, zeros, zeros_like, Value};

// Re-export traits required by public generic bounds.
pub use num_traits;
