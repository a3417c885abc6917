//! Loss function trait

use crate::Tensor;

/// Trait for loss functions.
pub trait LossFn {
    /// Compute the scalar loss and install gradients for backpropagation.
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor;

    /// Name of the loss function.
    fn name(&self) -> &str;
}
