//! Property tests for autograd operations

use super::test_utils::finite_difference;
use crate::autograd::{add, backward, matmul, relu, sigmoid, softmax_rows, Tensor};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn matmul_output_has_expected_shape(
        m in 1..=6usize,
        k in 1..=6usize,
        n in 1..=6usize,
    ) {
        let a = Tensor::from_vec(vec![0.5; m * k], false);
        let b = Tensor::from_vec(vec![0.5; k * n], false);
        let c = matmul(&a, &b, m, k, n);
        prop_assert_eq!(c.len(), m * n);
    }

    #[test]
    fn add_is_commutative(
        values in proptest::collection::vec(-10.0_f32..10.0, 1..32),
    ) {
        let a = Tensor::from_vec(values.clone(), false);
        let b = Tensor::from_vec(values.iter().rev().copied().collect(), false);
        let ab = add(&a, &b);
        let ba = add(&b, &a);
        prop_assert_eq!(ab.to_vec(), ba.to_vec());
    }

    #[test]
    fn softmax_rows_sum_to_one(
        rows in 1..=4usize,
        cols in 1..=8usize,
        seed in 0..1000u32,
    ) {
        let values: Vec<f32> = (0..rows * cols)
            .map(|i| ((i as f32 + seed as f32) * 0.61).sin() * 3.0)
            .collect();
        let t = Tensor::from_vec(values, false);
        let y = softmax_rows(&t, rows, cols);
        let data = y.to_vec();
        for r in 0..rows {
            let sum: f32 = data[r * cols..(r + 1) * cols].iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-4, "row {} sums to {}", r, sum);
        }
        for &v in &data {
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn sigmoid_gradient_matches_finite_difference(
        values in proptest::collection::vec(-3.0_f32..3.0, 1..16),
    ) {
        let t = Tensor::from_vec(values.clone(), true);
        let mut y = sigmoid(&t);
        backward(&mut y, None);

        let numeric = finite_difference(
            |v| v.iter().map(|&x| 1.0 / (1.0 + (-x).exp())).sum(),
            &values,
            1e-3,
        );
        let analytic = t.grad().expect("gradient should be set");
        for (a, n) in analytic.iter().zip(numeric.iter()) {
            prop_assert!((a - n).abs() < 2e-3, "analytic {} vs numeric {}", a, n);
        }
    }

    #[test]
    fn relu_gradient_matches_finite_difference(
        values in proptest::collection::vec(-3.0_f32..3.0, 1..16),
    ) {
        // Stay away from the kink where finite differences are meaningless.
        let values: Vec<f32> = values
            .into_iter()
            .map(|v| if v.abs() < 0.05 { 0.1 } else { v })
            .collect();

        let t = Tensor::from_vec(values.clone(), true);
        let mut y = relu(&t);
        backward(&mut y, None);

        let numeric = finite_difference(|v| v.iter().map(|&x| x.max(0.0)).sum(), &values, 1e-3);
        let analytic = t.grad().expect("gradient should be set");
        for (a, n) in analytic.iter().zip(numeric.iter()) {
            prop_assert!((a - n).abs() < 2e-3, "analytic {} vs numeric {}", a, n);
        }
    }
}
