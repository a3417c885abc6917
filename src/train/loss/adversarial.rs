//! Adversarial losses for the regularization phase

use super::TINY;
use crate::autograd::BackwardOp;
use crate::Tensor;
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Discriminator loss against one prior.
///
/// L = −mean( ln(D_real + ε) + ln(1 − D_fake + ε) )
///
/// `d_real` scores prior samples, `d_fake` scores encoder codes; both are
/// `[batch]` probability vectors from the same discriminator.
pub fn discriminator_loss(d_real: &Tensor, d_fake: &Tensor) -> Tensor {
    assert_eq!(
        d_real.len(),
        d_fake.len(),
        "discriminator loss: score length mismatch"
    );

    let n = d_real.len() as f32;
    let total: f32 = {
        let real = d_real.data();
        let fake = d_fake.data();
        real.iter()
            .zip(fake.iter())
            .map(|(&r, &f)| (r + TINY).ln() + (1.0 - f + TINY).ln())
            .sum()
    };

    let requires_grad = d_real.requires_grad() || d_fake.requires_grad();
    let mut loss = Tensor::from_vec(vec![-total / n], requires_grad);

    if requires_grad {
        loss.set_backward_op(Rc::new(DiscriminatorBackward {
            d_real: d_real.clone(),
            d_fake: d_fake.clone(),
            result_grad: loss.grad_cell(),
        }));
    }

    loss
}

struct DiscriminatorBackward {
    d_real: Tensor,
    d_fake: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for DiscriminatorBackward {
    fn backward(&self) {
        let grad = self.result_grad.borrow_mut().take();
        if let Some(seed) = grad {
            let scale = seed[0] / self.d_real.len() as f32;

            if self.d_real.requires_grad() {
                // ∂L/∂D_real = −1/(n·(D_real+ε))
                let grad_real: Vec<f32> =
                    self.d_real.data().iter().map(|&r| -scale / (r + TINY)).collect();
                self.d_real.accumulate_grad(Array1::from(grad_real));
            }
            if self.d_fake.requires_grad() {
                // ∂L/∂D_fake = 1/(n·(1−D_fake+ε))
                let grad_fake: Vec<f32> =
                    self.d_fake.data().iter().map(|&f| scale / (1.0 - f + TINY)).collect();
                self.d_fake.accumulate_grad(Array1::from(grad_fake));
            }

            if let Some(op) = self.d_real.backward_op() {
                op.backward();
            }
            if let Some(op) = self.d_fake.backward_op() {
                op.backward();
            }
        }
    }
}

/// Generator loss against one discriminator.
///
/// L = −mean( ln(D_fake + ε) ), low when the encoder's codes fool the
/// discriminator.
pub fn generator_loss(d_fake: &Tensor) -> Tensor {
    let n = d_fake.len() as f32;
    let total: f32 = d_fake.data().iter().map(|&f| (f + TINY).ln()).sum();

    let requires_grad = d_fake.requires_grad();
    let mut loss = Tensor::from_vec(vec![-total / n], requires_grad);

    if requires_grad {
        loss.set_backward_op(Rc::new(GeneratorBackward {
            d_fake: d_fake.clone(),
            result_grad: loss.grad_cell(),
        }));
    }

    loss
}

struct GeneratorBackward {
    d_fake: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for GeneratorBackward {
    fn backward(&self) {
        let grad = self.result_grad.borrow_mut().take();
        if let Some(seed) = grad {
            let scale = seed[0] / self.d_fake.len() as f32;

            // ∂L/∂D_fake = −1/(n·(D_fake+ε))
            let grad_fake: Vec<f32> =
                self.d_fake.data().iter().map(|&f| -scale / (f + TINY)).collect();
            self.d_fake.accumulate_grad(Array1::from(grad_fake));

            if let Some(op) = self.d_fake.backward_op() {
                op.backward();
            }
        }
    }
}
