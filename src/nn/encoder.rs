//! Reference encoder: two-layer MLP trunk with a categorical and a gaussian head

use super::{Encoder, Linear, Mode, Network};
use crate::autograd::{dropout, relu, softmax_rows};
use crate::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;

/// Feed-forward encoder producing a split latent representation.
///
/// ```text
/// x → lin1 → dropout → relu → lin2 → dropout → relu ─┬→ lin_cat → softmax  (rows on the simplex)
///                                                    └→ lin_gauss          (unbounded style code)
/// ```
///
/// Dropout runs only in [`Mode::Train`]; the mode is an explicit field read
/// by `forward` and toggled by the epoch driver around the prior-matching
/// passes.
#[derive(Debug)]
pub struct MlpEncoder {
    lin1: Linear,
    lin2: Linear,
    lin_cat: Linear,
    lin_gauss: Linear,
    input_width: usize,
    n_classes: usize,
    z_dim: usize,
    dropout: f32,
    mode: Mode,
    rng: RefCell<StdRng>,
}

impl MlpEncoder {
    /// Build an encoder; weights and the dropout stream both derive from `rng`.
    pub fn new<R: Rng>(
        input_width: usize,
        hidden: usize,
        n_classes: usize,
        z_dim: usize,
        dropout: f32,
        rng: &mut R,
    ) -> Self {
        Self {
            lin1: Linear::new(input_width, hidden, rng),
            lin2: Linear::new(hidden, hidden, rng),
            lin_cat: Linear::new(hidden, n_classes, rng),
            lin_gauss: Linear::new(hidden, z_dim, rng),
            input_width,
            n_classes,
            z_dim,
            dropout,
            mode: Mode::Train,
            rng: RefCell::new(StdRng::seed_from_u64(rng.gen())),
        }
    }

    /// Width of the categorical code.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Width of the gaussian code.
    pub fn z_dim(&self) -> usize {
        self.z_dim
    }

    fn regularize(&self, h: &Tensor) -> Tensor {
        if self.mode == Mode::Train && self.dropout > 0.0 {
            let mut rng = self.rng.borrow_mut();
            dropout(h, self.dropout, &mut *rng)
        } else {
            h.clone()
        }
    }
}

impl Network for MlpEncoder {
    fn parameters(&self) -> Vec<Tensor> {
        let mut params = self.lin1.parameters();
        params.extend(self.lin2.parameters());
        params.extend(self.lin_cat.parameters());
        params.extend(self.lin_gauss.parameters());
        params
    }
}

impl Encoder for MlpEncoder {
    fn forward(&self, x: &Tensor, batch_size: usize) -> (Tensor, Tensor) {
        assert_eq!(
            x.len(),
            batch_size * self.input_width,
            "encoder: input size mismatch"
        );

        let h = relu(&self.regularize(&self.lin1.forward(x, batch_size)));
        let h = relu(&self.regularize(&self.lin2.forward(&h, batch_size)));

        let cat = softmax_rows(&self.lin_cat.forward(&h, batch_size), batch_size, self.n_classes);
        let gauss = self.lin_gauss.forward(&h, batch_size);
        (cat, gauss)
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn input_width(&self) -> usize {
        self.input_width
    }
}
