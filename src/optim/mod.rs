//! Gradient-based optimizers over named parameter sets.

mod adam;
mod optimizer;
mod sgd;

pub use adam::Adam;
pub use optimizer::Optimizer;
pub use sgd::Sgd;

use crate::error::RevGradError;
use crate::types::Element;
use crate::value::Value;

/// Collects and validates a named parameter set: every parameter must track
/// gradients, otherwise `step()` would silently have nothing to update.
pub(crate) fn collect_params<T: Element>(
    params: impl IntoIterator<Item = (String, Value<T>)>,
) -> Result<Vec<(String, Value<T>)>, RevGradError> {
    let params: Vec<(String, Value<T>)> = params.into_iter().collect();
    for (name, param) in &params {
        if !param.requires_grad() {
            log::warn!("optimizer parameter {name:?} does not track gradients");
            return Err(RevGradError::MissingGradient {
                shape: param.shape(),
            });
        }
    }
    Ok(params)
}
