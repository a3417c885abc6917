//! Semi-supervised adversarial autoencoder training
//!
//! An encoder maps inputs to a disentangled latent representation split into
//! a categorical code (class identity) and a continuous code (style); a
//! decoder reconstructs the input from the joined code; two discriminators
//! adversarially push the codes toward a uniform-categorical and a
//! standard-normal prior; a classification head on the encoder is fit on
//! labeled data.
//!
//! The heart of the crate is [`train::run_epoch`]: the per-batch,
//! three-phase optimization procedure interleaving reconstruction,
//! adversarial regularization and supervised classification over paired
//! labeled/unlabeled batch streams, with explicit gradient clears between
//! phases and one optimizer binding per phase role.
//!
//! # Example
//!
//! ```no_run
//! use adversario::train::{train, SliceSource, TrainConfig};
//! # fn batches() -> (Vec<adversario::train::Batch>, Vec<adversario::train::Batch>) { todo!() }
//!
//! let (labeled_batches, unlabeled_batches) = batches();
//! let labeled = SliceSource::new(labeled_batches)?;
//! let unlabeled = SliceSource::new(unlabeled_batches)?;
//!
//! let config = TrainConfig::new().with_epochs(50);
//! let (encoder, decoder) = train(&config, &labeled, &unlabeled, &labeled)?;
//! # Ok::<(), adversario::AdversarioError>(())
//! ```

pub mod autograd;
pub mod error;
pub mod nn;
pub mod optim;
pub mod prior;
pub mod train;

pub use autograd::Tensor;
pub use error::{AdversarioError, Result};
