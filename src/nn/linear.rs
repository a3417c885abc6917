//! Fully connected layer

use crate::autograd::{add_bias, matmul};
use crate::Tensor;
use ndarray::Array1;
use rand::Rng;

/// A fully connected layer: `y = x @ W + b`.
///
/// Weights are stored flattened row-major as `[in_features × out_features]`,
/// initialized with uniform Xavier bounds; biases start at zero.
#[derive(Debug)]
pub struct Linear {
    weight: Tensor,
    bias: Tensor,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Create a layer with Xavier-uniform weights drawn from `rng`.
    pub fn new<R: Rng>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
        assert!(in_features > 0, "linear: in_features must be positive");
        assert!(out_features > 0, "linear: out_features must be positive");

        let limit = (6.0 / (in_features + out_features) as f32).sqrt();
        let weight: Vec<f32> =
            (0..in_features * out_features).map(|_| rng.gen_range(-limit..limit)).collect();

        Self {
            weight: Tensor::new(Array1::from(weight), true),
            bias: Tensor::zeros(out_features, true),
            in_features,
            out_features,
        }
    }

    /// Apply the layer to a `[batch × in_features]` tensor.
    pub fn forward(&self, x: &Tensor, batch_size: usize) -> Tensor {
        let product = matmul(x, &self.weight, batch_size, self.in_features, self.out_features);
        add_bias(&product, &self.bias, batch_size, self.out_features)
    }

    /// Handles to the layer's weight and bias.
    pub fn parameters(&self) -> Vec<Tensor> {
        vec![self.weight.clone(), self.bias.clone()]
    }

    /// Input width.
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Output width.
    pub fn out_features(&self) -> usize {
        self.out_features
    }
}
