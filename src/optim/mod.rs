//! Optimizers for training networks

mod adam;
mod optimizer;
mod set;

pub use adam::Adam;
pub use optimizer::Optimizer;
pub use set::{BoundOptimizer, OptimizerSet};
