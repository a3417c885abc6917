//! Categorical cross-entropy on the encoder's categorical head

use super::{LossFn, TINY};
use crate::autograd::BackwardOp;
use crate::Tensor;
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Categorical cross-entropy over per-row class probabilities.
///
/// `predictions` is a `[batch × n_classes]` matrix of probabilities (the
/// categorical head is already softmax-normalized); `targets` holds one
/// class index per row. L = −mean_r ln(p[r, target_r] + ε).
pub struct ClassificationLoss;

impl LossFn for ClassificationLoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        let batch = targets.len();
        assert!(batch > 0, "classification loss: empty batch");
        assert_eq!(
            predictions.len() % batch,
            0,
            "classification loss: predictions not divisible by batch size"
        );
        let n_classes = predictions.len() / batch;

        let class_indices: Vec<usize> = targets
            .data()
            .iter()
            .map(|&t| {
                assert!(
                    t >= 0.0 && (t as usize) < n_classes,
                    "classification loss: target {t} outside 0..{n_classes}"
                );
                t as usize
            })
            .collect();

        let total: f32 = {
            let p = predictions.data();
            class_indices
                .iter()
                .enumerate()
                .map(|(r, &c)| (p[r * n_classes + c] + TINY).ln())
                .sum()
        };

        let mut loss = Tensor::from_vec(vec![-total / batch as f32], predictions.requires_grad());

        if predictions.requires_grad() {
            loss.set_backward_op(Rc::new(ClassificationBackward {
                predictions: predictions.clone(),
                class_indices,
                n_classes,
                result_grad: loss.grad_cell(),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "Classification"
    }
}

struct ClassificationBackward {
    predictions: Tensor,
    class_indices: Vec<usize>,
    n_classes: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for ClassificationBackward {
    fn backward(&self) {
        let grad = self.result_grad.borrow_mut().take();
        if let Some(seed) = grad {
            let batch = self.class_indices.len();
            let scale = seed[0] / batch as f32;

            // Only the target column of each row carries gradient:
            // ∂L/∂p[r,c] = −1/(batch·(p+ε)) for c = target_r, else 0.
            let mut grad_p = Array1::zeros(batch * self.n_classes);
            {
                let p = self.predictions.data();
                for (r, &c) in self.class_indices.iter().enumerate() {
                    let idx = r * self.n_classes + c;
                    grad_p[idx] = -scale / (p[idx] + TINY);
                }
            }
            self.predictions.accumulate_grad(grad_p);

            if let Some(op) = self.predictions.backward_op() {
                op.backward();
            }
        }
    }
}
