//! Phase-scoped optimizer bindings

use super::{Adam, Optimizer};
use crate::Tensor;

/// An optimizer bound at construction to one parameter set.
///
/// The bound tensors are handles into the owning network's storage, so an
/// `apply` mutates the network's parameters in place. Each binding keeps its
/// own adaptive state; three bindings over the same encoder parameters stay
/// three independent update rules.
pub struct BoundOptimizer {
    optimizer: Adam,
    params: Vec<Tensor>,
}

impl BoundOptimizer {
    /// Bind `optimizer` to `params`.
    pub fn new(optimizer: Adam, params: Vec<Tensor>) -> Self {
        Self { optimizer, params }
    }

    /// Apply the accumulated gradients to the bound parameters.
    pub fn apply(&mut self) {
        self.optimizer.step(&mut self.params);
    }

    /// Clear the accumulators on the bound parameters.
    pub fn clear(&mut self) {
        self.optimizer.zero_grad(&mut self.params);
    }

    /// Learning rate of the bound optimizer.
    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }

    /// Number of optimization steps taken so far.
    pub fn step_count(&self) -> u64 {
        self.optimizer.step_count()
    }
}

/// The six optimizers of the training procedure, one per phase role.
///
/// | binding         | parameters            | phase                          |
/// |-----------------|-----------------------|--------------------------------|
/// | `decoder`       | decoder               | reconstruction                 |
/// | `encoder`       | encoder               | reconstruction                 |
/// | `classifier`    | encoder               | semi-supervised                |
/// | `regularization`| encoder               | regularization (generator)     |
/// | `cat_disc`      | categorical disc.     | regularization (discriminator) |
/// | `gauss_disc`    | gaussian disc.        | regularization (discriminator) |
pub struct OptimizerSet {
    pub decoder: BoundOptimizer,
    pub encoder: BoundOptimizer,
    pub classifier: BoundOptimizer,
    pub regularization: BoundOptimizer,
    pub cat_disc: BoundOptimizer,
    pub gauss_disc: BoundOptimizer,
}

impl OptimizerSet {
    /// Build the six bindings from the four networks' parameter sets.
    pub fn new(
        encoder_params: Vec<Tensor>,
        decoder_params: Vec<Tensor>,
        cat_disc_params: Vec<Tensor>,
        gauss_disc_params: Vec<Tensor>,
        reconstruction_lr: f32,
        regularization_lr: f32,
        classification_lr: f32,
    ) -> Self {
        Self {
            decoder: BoundOptimizer::new(
                Adam::default_params(reconstruction_lr),
                decoder_params,
            ),
            encoder: BoundOptimizer::new(
                Adam::default_params(reconstruction_lr),
                encoder_params.clone(),
            ),
            classifier: BoundOptimizer::new(
                Adam::default_params(classification_lr),
                encoder_params.clone(),
            ),
            regularization: BoundOptimizer::new(
                Adam::default_params(regularization_lr),
                encoder_params,
            ),
            cat_disc: BoundOptimizer::new(
                Adam::default_params(regularization_lr),
                cat_disc_params,
            ),
            gauss_disc: BoundOptimizer::new(
                Adam::default_params(regularization_lr),
                gauss_disc_params,
            ),
        }
    }
}
