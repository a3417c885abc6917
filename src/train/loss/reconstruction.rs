//! Elementwise binary cross-entropy between reconstruction and input

use super::{LossFn, TINY};
use crate::autograd::BackwardOp;
use crate::Tensor;
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Binary cross-entropy averaged over all elements.
///
/// L = −mean( (x+ε)·ln(x̂+ε) + (1−x−ε)·ln(1−x̂+ε) )
///
/// with ε = [`TINY`] applied to both operands, guarding `ln(0)` when the
/// sigmoid output saturates.
pub struct ReconstructionLoss;

impl LossFn for ReconstructionLoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "reconstruction loss: operand length mismatch"
        );

        let n = predictions.len() as f32;
        let total: f32 = {
            let p = predictions.data();
            let t = targets.data();
            p.iter()
                .zip(t.iter())
                .map(|(&p, &t)| {
                    let t = t + TINY;
                    t * (p + TINY).ln() + (1.0 - t) * (1.0 - p + TINY).ln()
                })
                .sum()
        };

        let mut loss = Tensor::from_vec(vec![-total / n], predictions.requires_grad());

        if predictions.requires_grad() {
            loss.set_backward_op(Rc::new(ReconstructionBackward {
                predictions: predictions.clone(),
                targets: targets.clone(),
                result_grad: loss.grad_cell(),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "Reconstruction"
    }
}

struct ReconstructionBackward {
    predictions: Tensor,
    targets: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for ReconstructionBackward {
    fn backward(&self) {
        let grad = self.result_grad.borrow_mut().take();
        if let Some(seed) = grad {
            let scale = seed[0] / self.predictions.len() as f32;

            // ∂L/∂x̂ = −( (x+ε)/(x̂+ε) − (1−x−ε)/(1−x̂+ε) ) / n
            let grad_p: Vec<f32> = {
                let p = self.predictions.data();
                let t = self.targets.data();
                p.iter()
                    .zip(t.iter())
                    .map(|(&p, &t)| {
                        let t = t + TINY;
                        -scale * (t / (p + TINY) - (1.0 - t) / (1.0 - p + TINY))
                    })
                    .collect()
            };
            self.predictions.accumulate_grad(Array1::from(grad_p));

            if let Some(op) = self.predictions.backward_op() {
                op.backward();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::backward;

    #[test]
    fn perfect_reconstruction_has_near_zero_loss() {
        let x = Tensor::from_vec(vec![0.0, 1.0, 0.0, 1.0], false);
        let loss = ReconstructionLoss.forward(&x.clone(), &x);
        assert!(loss.data()[0].abs() < 1e-3, "loss {}", loss.data()[0]);
    }

    #[test]
    fn mismatch_is_penalized() {
        let rec = Tensor::from_vec(vec![0.9, 0.1], false);
        let input = Tensor::from_vec(vec![0.1, 0.9], false);
        let close = ReconstructionLoss.forward(&input.clone(), &input);
        let far = ReconstructionLoss.forward(&rec, &input);
        assert!(far.data()[0] > close.data()[0]);
    }

    #[test]
    fn saturated_output_stays_finite() {
        let rec = Tensor::from_vec(vec![0.0, 1.0], true);
        let input = Tensor::from_vec(vec![1.0, 0.0], false);
        let mut loss = ReconstructionLoss.forward(&rec, &input);
        assert!(loss.data()[0].is_finite());

        backward(&mut loss, None);
        for g in rec.grad().expect("gradient should be set") {
            assert!(g.is_finite());
        }
    }

    #[test]
    fn gradient_matches_finite_difference() {
        let p_values = vec![0.2, 0.5, 0.8];
        let t_values = vec![0.0, 1.0, 0.5];

        let p = Tensor::from_vec(p_values.clone(), true);
        let t = Tensor::from_vec(t_values.clone(), false);
        let mut loss = ReconstructionLoss.forward(&p, &t);
        backward(&mut loss, None);

        let f = |v: &[f32]| -> f32 {
            let n = v.len() as f32;
            -v.iter()
                .zip(t_values.iter())
                .map(|(&p, &t)| {
                    let t = t + TINY;
                    t * (p + TINY).ln() + (1.0 - t) * (1.0 - p + TINY).ln()
                })
                .sum::<f32>()
                / n
        };

        let analytic = p.grad().expect("gradient should be set");
        let numeric = crate::autograd::tests::test_utils::finite_difference(f, &p_values, 1e-3);
        for (a, n) in analytic.iter().zip(numeric.iter()) {
            assert!((a - n).abs() < 1e-2, "analytic {a} vs numeric {n}");
        }
    }
}
