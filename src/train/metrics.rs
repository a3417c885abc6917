//! Evaluation and reporting

use super::epoch::EpochLosses;
use super::BatchSource;
use crate::nn::{Encoder, Mode};

/// Classification accuracy of the encoder's categorical head, in percent.
///
/// Runs the encoder deterministically (`Eval`) for the pass and restores the
/// previous mode afterwards. Unlabeled batches in the source are skipped.
pub fn classification_accuracy<E, S>(encoder: &mut E, source: &S) -> f32
where
    E: Encoder,
    S: BatchSource,
{
    let saved_mode = encoder.mode();
    encoder.set_mode(Mode::Eval);

    let batch_size = source.batch_size();
    let mut correct = 0usize;
    let mut total = 0usize;

    for batch in source.iter() {
        if !batch.is_labeled() {
            continue;
        }

        let (pred, _) = encoder.forward(&batch.inputs, batch_size);
        let n_classes = pred.len() / batch_size;
        let pred_data = pred.data();
        let targets = batch.targets.data();

        for row in 0..batch_size {
            let slice = &pred_data.as_slice().expect("predictions are contiguous")
                [row * n_classes..(row + 1) * n_classes];
            let argmax = slice
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(idx, _)| idx)
                .unwrap_or(0);
            if argmax == targets[row] as usize {
                correct += 1;
            }
            total += 1;
        }
    }

    encoder.set_mode(saved_mode);

    if total == 0 {
        return 0.0;
    }
    100.0 * correct as f32 / total as f32
}

fn fmt_loss(value: Option<f32>) -> String {
    match value {
        Some(v) => format!("{v:.3}"),
        None => "n/a".to_string(),
    }
}

/// Print the periodic epoch report.
pub(crate) fn report_epoch(epoch: usize, losses: &EpochLosses, train_acc: f32, val_acc: f32) {
    println!(
        "Epoch {epoch}: D_cat={} D_gauss={} G={} recon={} class={}",
        fmt_loss(losses.d_cat),
        fmt_loss(losses.d_gauss),
        fmt_loss(losses.generator),
        fmt_loss(losses.reconstruction),
        fmt_loss(losses.classification),
    );
    println!("  train accuracy: {train_acc:.2}%  validation accuracy: {val_acc:.2}%");
}
