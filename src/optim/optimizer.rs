use crate::error::RevGradError;
use crate::types::Element;
use crate::value::Value;

/// Trait defining the common interface for all optimizers.
///
/// Optimizers read the gradients a backward pass accumulated on their
/// parameters and mutate the parameter payloads in place. The intended call
/// order per optimization step is
/// `zero_grad → forward → backward → step`.
pub trait Optimizer<T: Element> {
    /// Performs a single optimization step.
    ///
    /// A parameter with no accumulated gradient is skipped (not an error),
    /// but flagged through `log::warn!` since it usually means `backward()`
    /// was never called.
    fn step(&mut self) -> Result<(), RevGradError>;

    /// Clears the gradient accumulator of every managed parameter.
    ///
    /// Called before the backward pass of a new iteration; without it,
    /// gradients keep accumulating across iterations.
    fn zero_grad(&mut self);

    /// The named parameters managed by this optimizer.
    fn params(&self) -> &[(String, Value<T>)];
}
