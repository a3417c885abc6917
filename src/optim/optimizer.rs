//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms
pub trait Optimizer {
    /// Perform a single optimization step on the given parameters.
    fn step(&mut self, params: &mut [Tensor]);

    /// Zero out all gradients.
    fn zero_grad(&mut self, params: &mut [Tensor]) {
        for param in params {
            param.zero_grad();
        }
    }

    /// Get learning rate.
    fn lr(&self) -> f32;

    /// Set learning rate.
    fn set_lr(&mut self, lr: f32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    struct PlainSgd {
        learning_rate: f32,
    }

    impl Optimizer for PlainSgd {
        fn step(&mut self, params: &mut [Tensor]) {
            for param in params {
                if let Some(grad) = param.grad() {
                    *param.data_mut() -= &(&grad * self.learning_rate);
                }
            }
        }

        fn lr(&self) -> f32 {
            self.learning_rate
        }

        fn set_lr(&mut self, lr: f32) {
            self.learning_rate = lr;
        }
    }

    #[test]
    fn step_applies_accumulated_gradient() {
        let mut opt = PlainSgd { learning_rate: 0.1 };
        let param = Tensor::from_vec(vec![1.0, 2.0], true);
        param.set_grad(arr1(&[0.5, 1.0]));

        opt.step(&mut [param.clone()]);

        assert!((param.data()[0] - 0.95).abs() < 1e-6);
        assert!((param.data()[1] - 1.9).abs() < 1e-6);
    }

    #[test]
    fn step_without_gradient_leaves_params_untouched() {
        let mut opt = PlainSgd { learning_rate: 0.1 };
        let param = Tensor::from_vec(vec![1.0, 2.0], true);

        opt.step(&mut [param.clone()]);

        assert_eq!(param.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn zero_grad_clears_accumulators() {
        let mut opt = PlainSgd { learning_rate: 0.1 };
        let param = Tensor::from_vec(vec![1.0], true);
        param.set_grad(arr1(&[0.5]));

        opt.zero_grad(&mut [param.clone()]);
        assert!(param.grad().is_none());
    }
}
