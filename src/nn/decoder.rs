//! Reference decoder: MLP from the joined latent code back to input space

use super::{Decoder, Linear, Network};
use crate::autograd::{relu, sigmoid};
use crate::Tensor;
use rand::Rng;

/// Feed-forward decoder mapping `[batch × (n_classes + z_dim)]` latent
/// vectors to `[batch × output_width]` reconstructions in `(0, 1)`.
#[derive(Debug)]
pub struct MlpDecoder {
    lin1: Linear,
    lin2: Linear,
    lin_out: Linear,
    latent_width: usize,
    output_width: usize,
}

impl MlpDecoder {
    /// Build a decoder for the given latent and output widths.
    pub fn new<R: Rng>(
        latent_width: usize,
        hidden: usize,
        output_width: usize,
        rng: &mut R,
    ) -> Self {
        Self {
            lin1: Linear::new(latent_width, hidden, rng),
            lin2: Linear::new(hidden, hidden, rng),
            lin_out: Linear::new(hidden, output_width, rng),
            latent_width,
            output_width,
        }
    }

    /// Width of the reconstruction.
    pub fn output_width(&self) -> usize {
        self.output_width
    }
}

impl Network for MlpDecoder {
    fn parameters(&self) -> Vec<Tensor> {
        let mut params = self.lin1.parameters();
        params.extend(self.lin2.parameters());
        params.extend(self.lin_out.parameters());
        params
    }
}

impl Decoder for MlpDecoder {
    fn forward(&self, latent: &Tensor, batch_size: usize) -> Tensor {
        assert_eq!(
            latent.len(),
            batch_size * self.latent_width,
            "decoder: latent size mismatch"
        );

        let h = relu(&self.lin1.forward(latent, batch_size));
        let h = relu(&self.lin2.forward(&h, batch_size));
        sigmoid(&self.lin_out.forward(&h, batch_size))
    }
}
