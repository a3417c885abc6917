//! Loss functions for the three training phases
//!
//! Each loss computes its scalar in plain `ndarray` math and installs a
//! backward op carrying the analytic gradient, scaled by the upstream seed
//! and propagated into the producing graph.

mod adversarial;
mod classification;
mod reconstruction;
mod traits;

pub use adversarial::{discriminator_loss, generator_loss};
pub use classification::ClassificationLoss;
pub use reconstruction::ReconstructionLoss;
pub use traits::LossFn;

/// Additive epsilon inside every logarithm.
///
/// Part of the numeric contract: loss values are only reproducible across
/// implementations that use the same constant.
pub const TINY: f32 = 1e-15;
