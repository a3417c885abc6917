//! Samplers for the target latent priors

use crate::error::{AdversarioError, Result};
use crate::Tensor;
use ndarray::Array1;
use rand::Rng;
use rand_distr::StandardNormal;

/// Draw `batch_size` one-hot rows from the uniform categorical prior.
///
/// Returns a `[batch_size × n_classes]` tensor with exactly one `1.0` per
/// row. Zero dimensions are rejected.
pub fn sample_categorical_prior<R: Rng>(
    batch_size: usize,
    n_classes: usize,
    rng: &mut R,
) -> Result<Tensor> {
    if batch_size == 0 {
        return Err(AdversarioError::InvalidDimension { name: "batch_size", value: batch_size });
    }
    if n_classes == 0 {
        return Err(AdversarioError::InvalidDimension { name: "n_classes", value: n_classes });
    }

    let mut data = Array1::zeros(batch_size * n_classes);
    for row in 0..batch_size {
        let class = rng.gen_range(0..n_classes);
        data[row * n_classes + class] = 1.0;
    }
    Ok(Tensor::new(data, false))
}

/// Draw a `[batch_size × z_dim]` tensor of standard-normal values.
pub fn sample_gaussian_prior<R: Rng>(
    batch_size: usize,
    z_dim: usize,
    rng: &mut R,
) -> Result<Tensor> {
    if batch_size == 0 {
        return Err(AdversarioError::InvalidDimension { name: "batch_size", value: batch_size });
    }
    if z_dim == 0 {
        return Err(AdversarioError::InvalidDimension { name: "z_dim", value: z_dim });
    }

    let data: Vec<f32> = (0..batch_size * z_dim).map(|_| rng.sample(StandardNormal)).collect();
    Ok(Tensor::from_vec(data, false))
}
