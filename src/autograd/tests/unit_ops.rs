//! Unit tests for autograd operations (forward and backward)

use super::test_utils::finite_difference;
use crate::autograd::{
    add, add_bias, backward, concat, dropout, relu, sigmoid, softmax_rows, Tensor,
};
use approx::assert_abs_diff_eq;
use ndarray::arr1;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn add_forward_backward() {
    let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
    let b = Tensor::from_vec(vec![4.0, 5.0, 6.0], true);
    let mut c = add(&a, &b);

    assert_eq!(c.to_vec(), vec![5.0, 7.0, 9.0]);

    backward(&mut c, Some(arr1(&[1.0, 2.0, 3.0])));
    assert_eq!(a.grad().expect("gradient should be set").to_vec(), vec![1.0, 2.0, 3.0]);
    assert_eq!(b.grad().expect("gradient should be set").to_vec(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn add_bias_broadcasts_rows() {
    let x = Tensor::from_vec(vec![0.0, 0.0, 1.0, 1.0], true);
    let bias = Tensor::from_vec(vec![10.0, 20.0], true);
    let mut y = add_bias(&x, &bias, 2, 2);

    assert_eq!(y.to_vec(), vec![10.0, 20.0, 11.0, 21.0]);

    backward(&mut y, Some(arr1(&[1.0, 2.0, 3.0, 4.0])));
    // Bias gradient sums over rows.
    assert_eq!(bias.grad().expect("gradient should be set").to_vec(), vec![4.0, 6.0]);
    assert_eq!(x.grad().expect("gradient should be set").to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn concat_splits_gradient() {
    let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], true); // 2×2
    let b = Tensor::from_vec(vec![5.0, 6.0], true); // 2×1
    let mut c = concat(&a, &b, 2, 2, 1);

    assert_eq!(c.to_vec(), vec![1.0, 2.0, 5.0, 3.0, 4.0, 6.0]);

    backward(&mut c, Some(arr1(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])));
    assert_eq!(a.grad().expect("gradient should be set").to_vec(), vec![1.0, 2.0, 4.0, 5.0]);
    assert_eq!(b.grad().expect("gradient should be set").to_vec(), vec![3.0, 6.0]);
}

#[test]
fn relu_masks_negatives() {
    let a = Tensor::from_vec(vec![-1.0, 0.0, 2.0], true);
    let mut c = relu(&a);

    assert_eq!(c.to_vec(), vec![0.0, 0.0, 2.0]);

    backward(&mut c, Some(arr1(&[1.0, 1.0, 1.0])));
    assert_eq!(a.grad().expect("gradient should be set").to_vec(), vec![0.0, 0.0, 1.0]);
}

#[test]
fn sigmoid_matches_finite_difference() {
    let x = vec![-2.0, -0.5, 0.0, 0.5, 2.0];
    let t = Tensor::from_vec(x.clone(), true);
    let mut y = sigmoid(&t);
    backward(&mut y, None);

    let numeric = finite_difference(
        |v| v.iter().map(|&x| 1.0 / (1.0 + (-x).exp())).sum(),
        &x,
        1e-3,
    );
    let analytic = t.grad().expect("gradient should be set");
    for (a, n) in analytic.iter().zip(numeric.iter()) {
        assert_abs_diff_eq!(a, n, epsilon = 1e-3);
    }
}

#[test]
fn softmax_rows_are_distributions() {
    let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, -1.0, 0.0, 1.0], false);
    let y = softmax_rows(&t, 2, 3);
    let data = y.to_vec();

    for r in 0..2 {
        let row_sum: f32 = data[r * 3..(r + 1) * 3].iter().sum();
        assert_abs_diff_eq!(row_sum, 1.0, epsilon = 1e-5);
    }
    // Rows with the same relative offsets produce the same distribution.
    for c in 0..3 {
        assert_abs_diff_eq!(data[c], data[3 + c], epsilon = 1e-5);
    }
}

#[test]
fn softmax_rows_backward_matches_finite_difference() {
    let x = vec![0.5, -1.0, 2.0, 1.0, 0.0, -0.5];
    let weights = [0.3, -0.2, 0.5, 0.1, 0.7, -0.4];

    let t = Tensor::from_vec(x.clone(), true);
    let mut y = softmax_rows(&t, 2, 3);
    backward(&mut y, Some(arr1(&weights)));

    let numeric = finite_difference(
        |v| {
            let mut total = 0.0;
            for r in 0..2 {
                let row = &v[r * 3..(r + 1) * 3];
                let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                let exps: Vec<f32> = row.iter().map(|&x| (x - max).exp()).collect();
                let sum: f32 = exps.iter().sum();
                for c in 0..3 {
                    total += weights[r * 3 + c] * exps[c] / sum;
                }
            }
            total
        },
        &x,
        1e-3,
    );
    let analytic = t.grad().expect("gradient should be set");
    for (a, n) in analytic.iter().zip(numeric.iter()) {
        assert_abs_diff_eq!(a, n, epsilon = 1e-3);
    }
}

#[test]
fn dropout_zeroes_and_rescales() {
    let mut rng = StdRng::seed_from_u64(7);
    let t = Tensor::from_vec(vec![1.0; 1000], true);
    let mut y = dropout(&t, 0.25, &mut rng);

    let kept = y.to_vec().iter().filter(|&&v| v != 0.0).count();
    // Survivors are rescaled by 1/(1-p).
    for v in y.to_vec() {
        assert!(v == 0.0 || (v - 1.0 / 0.75).abs() < 1e-6);
    }
    // ~75% kept; generous bounds for a 1000-sample draw.
    assert!((650..=850).contains(&kept), "kept {kept} of 1000");

    backward(&mut y, None);
    let grad = t.grad().expect("gradient should be set");
    let grad_nonzero = grad.iter().filter(|&&v| v != 0.0).count();
    assert_eq!(grad_nonzero, kept);
}

#[test]
fn dropout_p_zero_is_identity() {
    let mut rng = StdRng::seed_from_u64(7);
    let t = Tensor::from_vec(vec![1.0, -2.0, 3.0], false);
    let y = dropout(&t, 0.0, &mut rng);
    assert_eq!(y.to_vec(), vec![1.0, -2.0, 3.0]);
}

/// A tensor consumed by two heads must contribute the gradients of both
/// paths to upstream parameters exactly once each.
#[test]
fn shared_trunk_gradient_is_exact() {
    let x = vec![0.4, -0.3, 1.2];
    let w = Tensor::from_vec(x.clone(), true);

    let trunk = relu(&w);
    let head_a = sigmoid(&trunk);
    let head_b = relu(&trunk);
    let mut out = add(&head_a, &head_b);
    backward(&mut out, None);

    let numeric = finite_difference(
        |v| {
            v.iter()
                .map(|&x| {
                    let t = x.max(0.0);
                    1.0 / (1.0 + (-t).exp()) + t.max(0.0)
                })
                .sum()
        },
        &x,
        1e-3,
    );
    let analytic = w.grad().expect("gradient should be set");
    for (a, n) in analytic.iter().zip(numeric.iter()) {
        assert_abs_diff_eq!(a, n, epsilon = 1e-3);
    }
}
