//! Training orchestration
//!
//! The [`epoch`] module holds the core three-phase procedure; [`trainer`]
//! owns networks and optimizers for a whole run and drives it epoch by epoch.

mod batch;
mod config;
mod epoch;
mod loss;
mod metrics;
mod trainer;

pub use batch::{Batch, BatchSource, SliceSource, NO_LABEL};
pub use config::TrainConfig;
pub use epoch::{run_epoch, EpochLosses};
pub use loss::{
    discriminator_loss, generator_loss, ClassificationLoss, LossFn, ReconstructionLoss, TINY,
};
pub use metrics::classification_accuracy;
pub use trainer::train;
