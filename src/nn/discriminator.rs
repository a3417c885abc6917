//! Reference discriminator: MLP scoring codes against the prior

use super::{Discriminator, Linear, Network};
use crate::autograd::{relu, sigmoid};
use crate::Tensor;
use rand::Rng;

/// Feed-forward discriminator mapping `[batch × code_width]` codes to one
/// probability per example.
pub struct MlpDiscriminator {
    lin1: Linear,
    lin2: Linear,
    lin_out: Linear,
    code_width: usize,
}

impl MlpDiscriminator {
    /// Build a discriminator over codes of the given width.
    pub fn new<R: Rng>(code_width: usize, hidden: usize, rng: &mut R) -> Self {
        Self {
            lin1: Linear::new(code_width, hidden, rng),
            lin2: Linear::new(hidden, hidden, rng),
            lin_out: Linear::new(hidden, 1, rng),
            code_width,
        }
    }

    /// Width of the scored code.
    pub fn code_width(&self) -> usize {
        self.code_width
    }
}

impl Network for MlpDiscriminator {
    fn parameters(&self) -> Vec<Tensor> {
        let mut params = self.lin1.parameters();
        params.extend(self.lin2.parameters());
        params.extend(self.lin_out.parameters());
        params
    }
}

impl Discriminator for MlpDiscriminator {
    fn forward(&self, code: &Tensor, batch_size: usize) -> Tensor {
        assert_eq!(
            code.len(),
            batch_size * self.code_width,
            "discriminator: code size mismatch"
        );

        let h = relu(&self.lin1.forward(code, batch_size));
        let h = relu(&self.lin2.forward(&h, batch_size));
        sigmoid(&self.lin_out.forward(&h, batch_size))
    }
}
