//! The per-epoch, three-phase training procedure
//!
//! For every positionally paired (unlabeled, labeled) batch the driver runs
//! up to three optimization phases, each touching its own parameter subset
//! through its own optimizer binding:
//!
//! 1. **Reconstruction** (unlabeled only): encoder and decoder minimize the
//!    binary cross-entropy of the reconstruction.
//! 2. **Regularization** (unlabeled only): the discriminators learn to
//!    separate prior samples from encoder codes, then the encoder learns to
//!    fool them.
//! 3. **Semi-supervised** (labeled only): the encoder's categorical head is
//!    fit to the labels.
//!
//! The underlying engine accumulates gradients across backward passes, so the
//! driver clears all four networks' accumulators between phases; a missing
//! clear silently cross-contaminates unrelated objectives instead of failing.
//! Debug builds assert the accumulators are clear before every backward pass.

use rand::rngs::StdRng;

use crate::autograd::{add, backward, concat};
use crate::error::{AdversarioError, Result};
use crate::nn::{Decoder, Discriminator, Encoder, Mode, Networks};
use crate::optim::OptimizerSet;
use crate::prior::{sample_categorical_prior, sample_gaussian_prior};
use crate::train::loss::{
    discriminator_loss, generator_loss, ClassificationLoss, LossFn, ReconstructionLoss,
};
use crate::train::{Batch, BatchSource};
use crate::Tensor;

/// Loss snapshot of an epoch.
///
/// Deliberately the values of the *last* batch that ran each phase, not an
/// epoch average; the snapshot policy is kept for comparable reporting. A
/// field stays `None` when its phase never ran (e.g. no labeled batch was
/// seen).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpochLosses {
    /// Categorical discriminator loss.
    pub d_cat: Option<f32>,
    /// Gaussian discriminator loss.
    pub d_gauss: Option<f32>,
    /// Generator (encoder fooling both discriminators) loss.
    pub generator: Option<f32>,
    /// Reconstruction loss.
    pub reconstruction: Option<f32>,
    /// Classification loss.
    pub classification: Option<f32>,
}

impl EpochLosses {
    /// True once every phase has contributed a value.
    pub fn is_complete(&self) -> bool {
        self.d_cat.is_some()
            && self.d_gauss.is_some()
            && self.generator.is_some()
            && self.reconstruction.is_some()
            && self.classification.is_some()
    }

    /// True if every recorded value is finite.
    pub fn all_finite(&self) -> bool {
        [self.d_cat, self.d_gauss, self.generator, self.reconstruction, self.classification]
            .iter()
            .flatten()
            .all(|v| v.is_finite())
    }
}

/// Run one epoch of the three-phase procedure.
///
/// The two sources are consumed in positional lockstep and iteration stops
/// at the shorter source's exhaustion. Within every pair the unlabeled batch
/// is processed first; whether a batch is labeled is decided per batch by
/// the sentinel check, not by which source it came from.
///
/// # Errors
///
/// Fails fast on a batch-size mismatch between the sources, on an input
/// whose length is not `batch_size × encoder.input_width()`, and on an epoch
/// with no paired batches.
pub fn run_epoch<E, D, C, G, L, U>(
    nets: &mut Networks<E, D, C, G>,
    optims: &mut OptimizerSet,
    labeled_source: &L,
    unlabeled_source: &U,
    n_classes: usize,
    z_dim: usize,
    rng: &mut StdRng,
) -> Result<EpochLosses>
where
    E: Encoder,
    D: Decoder,
    C: Discriminator,
    G: Discriminator,
    L: BatchSource,
    U: BatchSource,
{
    if labeled_source.batch_size() != unlabeled_source.batch_size() {
        return Err(AdversarioError::BatchSizeMismatch {
            labeled: labeled_source.batch_size(),
            unlabeled: unlabeled_source.batch_size(),
        });
    }
    let batch_size = labeled_source.batch_size();

    let mut losses = EpochLosses::default();
    let mut pairs = 0usize;

    for (batch_l, batch_u) in labeled_source.iter().zip(unlabeled_source.iter()) {
        pairs += 1;
        for batch in [batch_u, batch_l] {
            process_batch(nets, optims, batch, batch_size, n_classes, z_dim, rng, &mut losses)?;
        }
    }

    if pairs == 0 {
        return Err(AdversarioError::EmptyEpoch);
    }

    Ok(losses)
}

#[allow(clippy::too_many_arguments)]
fn process_batch<E, D, C, G>(
    nets: &mut Networks<E, D, C, G>,
    optims: &mut OptimizerSet,
    batch: &Batch,
    batch_size: usize,
    n_classes: usize,
    z_dim: usize,
    rng: &mut StdRng,
    losses: &mut EpochLosses,
) -> Result<()>
where
    E: Encoder,
    D: Decoder,
    C: Discriminator,
    G: Discriminator,
{
    let labeled = batch.is_labeled();

    let expected = batch_size * nets.encoder.input_width();
    if batch.inputs.len() != expected {
        return Err(AdversarioError::ShapeMismatch { expected, actual: batch.inputs.len() });
    }
    let x: &Tensor = &batch.inputs;

    nets.zero_all_gradients();

    if !labeled {
        reconstruction_phase(nets, optims, x, batch_size, n_classes, z_dim, losses);
        regularization_phase(nets, optims, x, batch_size, n_classes, z_dim, rng, losses)?;
    } else {
        semi_supervised_phase(nets, optims, x, &batch.targets, batch_size, losses);
    }

    Ok(())
}

/// Reconstruction phase: encode, decode the joined code, descend the
/// reconstruction loss through decoder and encoder.
fn reconstruction_phase<E, D, C, G>(
    nets: &mut Networks<E, D, C, G>,
    optims: &mut OptimizerSet,
    x: &Tensor,
    batch_size: usize,
    n_classes: usize,
    z_dim: usize,
    losses: &mut EpochLosses,
) where
    E: Encoder,
    D: Decoder,
    C: Discriminator,
    G: Discriminator,
{
    debug_assert!(nets.gradients_clear(), "stale gradients entering reconstruction phase");

    let (cat_code, gauss_code) = nets.encoder.forward(x, batch_size);
    let latent = concat(&cat_code, &gauss_code, batch_size, n_classes, z_dim);
    let reconstruction = nets.decoder.forward(&latent, batch_size);

    let mut recon_loss = ReconstructionLoss.forward(&reconstruction, x);
    losses.reconstruction = Some(recon_loss.data()[0]);

    backward(&mut recon_loss, None);
    optims.decoder.apply();
    optims.encoder.apply();

    nets.zero_all_gradients();
}

/// Regularization phase: a discriminator sub-step on prior-vs-code scores,
/// then a generator sub-step updating only the encoder.
#[allow(clippy::too_many_arguments)]
fn regularization_phase<E, D, C, G>(
    nets: &mut Networks<E, D, C, G>,
    optims: &mut OptimizerSet,
    x: &Tensor,
    batch_size: usize,
    n_classes: usize,
    z_dim: usize,
    rng: &mut StdRng,
    losses: &mut EpochLosses,
) -> Result<()>
where
    E: Encoder,
    D: Decoder,
    C: Discriminator,
    G: Discriminator,
{
    // Discriminator sub-step. The encoding pass runs deterministically so
    // the scored codes match the statistics seen at inference time.
    nets.encoder.set_mode(Mode::Eval);

    let z_real_cat = sample_categorical_prior(batch_size, n_classes, rng)?;
    let z_real_gauss = sample_gaussian_prior(batch_size, z_dim, rng)?;

    let (fake_cat, fake_gauss) = nets.encoder.forward(x, batch_size);

    let d_real_cat = nets.cat_disc.forward(&z_real_cat, batch_size);
    let d_real_gauss = nets.gauss_disc.forward(&z_real_gauss, batch_size);
    let d_fake_cat = nets.cat_disc.forward(&fake_cat, batch_size);
    let d_fake_gauss = nets.gauss_disc.forward(&fake_gauss, batch_size);

    let cat_loss = discriminator_loss(&d_real_cat, &d_fake_cat);
    let gauss_loss = discriminator_loss(&d_real_gauss, &d_fake_gauss);
    losses.d_cat = Some(cat_loss.data()[0]);
    losses.d_gauss = Some(gauss_loss.data()[0]);

    debug_assert!(nets.gradients_clear(), "stale gradients entering discriminator sub-step");

    let mut d_loss = add(&cat_loss, &gauss_loss);
    backward(&mut d_loss, None);
    optims.cat_disc.apply();
    optims.gauss_disc.apply();

    nets.zero_all_gradients();

    // Generator sub-step: stochastic encoding again, discriminators fixed.
    nets.encoder.set_mode(Mode::Train);

    let (fake_cat, fake_gauss) = nets.encoder.forward(x, batch_size);
    let d_fake_cat = nets.cat_disc.forward(&fake_cat, batch_size);
    let d_fake_gauss = nets.gauss_disc.forward(&fake_gauss, batch_size);

    let mut g_loss = add(&generator_loss(&d_fake_cat), &generator_loss(&d_fake_gauss));
    losses.generator = Some(g_loss.data()[0]);

    debug_assert!(nets.gradients_clear(), "stale gradients entering generator sub-step");

    backward(&mut g_loss, None);
    optims.regularization.apply();

    nets.zero_all_gradients();

    Ok(())
}

/// Semi-supervised phase: fit the categorical head to the labels.
fn semi_supervised_phase<E, D, C, G>(
    nets: &mut Networks<E, D, C, G>,
    optims: &mut OptimizerSet,
    x: &Tensor,
    targets: &Tensor,
    batch_size: usize,
    losses: &mut EpochLosses,
) where
    E: Encoder,
    D: Decoder,
    C: Discriminator,
    G: Discriminator,
{
    debug_assert!(nets.gradients_clear(), "stale gradients entering semi-supervised phase");

    let (pred, _) = nets.encoder.forward(x, batch_size);
    let mut class_loss = ClassificationLoss.forward(&pred, targets);
    losses.classification = Some(class_loss.data()[0]);

    backward(&mut class_loss, None);
    optims.classifier.apply();

    nets.zero_all_gradients();
}
