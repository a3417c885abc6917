//! Matrix multiplication over flattened row-major matrices

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Transpose a row-major `rows × cols` matrix to `cols × rows`.
#[inline]
pub fn transpose(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut transposed = vec![0.0f32; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            transposed[c * rows + r] = data[r * cols + c];
        }
    }
    transposed
}

/// C = A @ B for row-major slices, A is `m×k`, B is `k×n`.
pub(crate) fn matmul_compute(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut c = vec![0.0f32; m * n];
    for i in 0..m {
        for p in 0..k {
            let a_ip = a[i * k + p];
            if a_ip == 0.0 {
                continue;
            }
            for j in 0..n {
                c[i * n + j] += a_ip * b[p * n + j];
            }
        }
    }
    c
}

/// Matrix multiplication.
///
/// Computes C = A @ B where A is `m×k`, B is `k×n` and C is `m×n`, all
/// flattened row-major.
pub fn matmul(a: &Tensor, b: &Tensor, m: usize, k: usize, n: usize) -> Tensor {
    assert_eq!(a.len(), m * k, "matmul: matrix A size mismatch");
    assert_eq!(b.len(), k * n, "matmul: matrix B size mismatch");

    let result_data = {
        let a_data = a.data();
        let b_data = b.data();
        matmul_compute(
            a_data.as_slice().expect("matrix A must be contiguous"),
            b_data.as_slice().expect("matrix B must be contiguous"),
            m,
            k,
            n,
        )
    };

    let requires_grad = a.requires_grad() || b.requires_grad();
    let mut result = Tensor::new(Array1::from(result_data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MatmulBackward {
            a: a.clone(),
            b: b.clone(),
            m,
            k,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    m: usize,
    k: usize,
    n: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self) {
        let grad = self.result_grad.borrow_mut().take();
        if let Some(grad_output) = grad {
            let grad_c = grad_output.as_slice().expect("gradient must be contiguous");

            if self.a.requires_grad() {
                // ∂L/∂A = ∂L/∂C @ Bᵀ : (m×n) @ (n×k)
                let grad_a = {
                    let b_data = self.b.data();
                    let b_t = transpose(
                        b_data.as_slice().expect("matrix B must be contiguous"),
                        self.k,
                        self.n,
                    );
                    matmul_compute(grad_c, &b_t, self.m, self.n, self.k)
                };
                self.a.accumulate_grad(Array1::from(grad_a));
            }

            if self.b.requires_grad() {
                // ∂L/∂B = Aᵀ @ ∂L/∂C : (k×m) @ (m×n)
                let grad_b = {
                    let a_data = self.a.data();
                    let a_t = transpose(
                        a_data.as_slice().expect("matrix A must be contiguous"),
                        self.m,
                        self.k,
                    );
                    matmul_compute(&a_t, grad_c, self.k, self.m, self.n)
                };
                self.b.accumulate_grad(Array1::from(grad_b));
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
            if let Some(op) = self.b.backward_op() {
                op.backward();
            }
        }
    }
}
