//! Run-level training loop

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::epoch::run_epoch;
use super::metrics::{classification_accuracy, report_epoch};
use super::{BatchSource, TrainConfig};
use crate::error::Result;
use crate::nn::{Encoder, MlpDecoder, MlpDiscriminator, MlpEncoder, Mode, Network, Networks};
use crate::optim::OptimizerSet;

/// Train a semi-supervised adversarial autoencoder.
///
/// Builds the four reference networks and the six optimizer bindings from a
/// run RNG seeded with `config.seed` (load-bearing for reproducibility),
/// drives the epoch procedure `config.epochs` times, and every
/// `config.report_interval` epochs evaluates classification accuracy on the
/// labeled training source and the held-out validation source and prints the
/// report.
///
/// Returns the trained encoder and decoder for downstream inference or
/// persistence.
pub fn train<L, U, V>(
    config: &TrainConfig,
    labeled: &L,
    unlabeled: &U,
    validation: &V,
) -> Result<(MlpEncoder, MlpDecoder)>
where
    L: BatchSource,
    U: BatchSource,
    V: BatchSource,
{
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut nets = Networks {
        encoder: MlpEncoder::new(
            config.input_width,
            config.hidden,
            config.n_classes,
            config.z_dim,
            config.dropout,
            &mut rng,
        ),
        decoder: MlpDecoder::new(
            config.n_classes + config.z_dim,
            config.hidden,
            config.input_width,
            &mut rng,
        ),
        cat_disc: MlpDiscriminator::new(config.n_classes, config.hidden, &mut rng),
        gauss_disc: MlpDiscriminator::new(config.z_dim, config.hidden, &mut rng),
    };

    let mut optims = OptimizerSet::new(
        nets.encoder.parameters(),
        nets.decoder.parameters(),
        nets.cat_disc.parameters(),
        nets.gauss_disc.parameters(),
        config.reconstruction_lr,
        config.regularization_lr,
        config.classification_lr,
    );

    for epoch in 0..config.epochs {
        nets.encoder.set_mode(Mode::Train);

        let losses = run_epoch(
            &mut nets,
            &mut optims,
            labeled,
            unlabeled,
            config.n_classes,
            config.z_dim,
            &mut rng,
        )?;

        if epoch % config.report_interval == 0 {
            let train_acc = classification_accuracy(&mut nets.encoder, labeled);
            let val_acc = classification_accuracy(&mut nets.encoder, validation);
            report_epoch(epoch, &losses, train_acc, val_acc);
        }
    }

    let Networks { encoder, decoder, .. } = nets;
    Ok((encoder, decoder))
}
