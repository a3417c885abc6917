//! Activation and regularization operations: relu, sigmoid, softmax_rows, dropout

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;

/// ReLU activation.
pub fn relu(a: &Tensor) -> Tensor {
    let data = a.data().mapv(|x| x.max(0.0));
    let requires_grad = a.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ReluBackward {
            a: a.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ReluBackward {
    a: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for ReluBackward {
    fn backward(&self) {
        let grad = self.result_grad.borrow_mut().take();
        if let Some(grad) = grad {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂out · [a > 0]
                let mask = self.a.data().mapv(|x| if x > 0.0 { 1.0 } else { 0.0 });
                self.a.accumulate_grad(&grad * &mask);
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
        }
    }
}

/// Logistic sigmoid activation.
pub fn sigmoid(a: &Tensor) -> Tensor {
    let data = a.data().mapv(|x| 1.0 / (1.0 + (-x).exp()));
    let requires_grad = a.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(SigmoidBackward {
            a: a.clone(),
            output: result.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SigmoidBackward {
    a: Tensor,
    output: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for SigmoidBackward {
    fn backward(&self) {
        let grad = self.result_grad.borrow_mut().take();
        if let Some(grad) = grad {
            if self.a.requires_grad() {
                // ∂σ/∂x = σ(x)(1 − σ(x))
                let local = self.output.data().mapv(|y| y * (1.0 - y));
                self.a.accumulate_grad(&grad * &local);
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
        }
    }
}

/// Row-wise softmax over a `rows × cols` matrix.
pub fn softmax_rows(a: &Tensor, rows: usize, cols: usize) -> Tensor {
    assert_eq!(a.len(), rows * cols, "softmax_rows: matrix size mismatch");

    let mut data = Array1::zeros(rows * cols);
    {
        let a_data = a.data();
        for r in 0..rows {
            let row = &a_data.as_slice().expect("input must be contiguous")[r * cols..(r + 1) * cols];
            let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let mut sum = 0.0;
            for c in 0..cols {
                let e = (row[c] - max).exp();
                data[r * cols + c] = e;
                sum += e;
            }
            for c in 0..cols {
                data[r * cols + c] /= sum;
            }
        }
    }

    let requires_grad = a.requires_grad();
    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(SoftmaxRowsBackward {
            a: a.clone(),
            output: result.clone(),
            rows,
            cols,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SoftmaxRowsBackward {
    a: Tensor,
    output: Tensor,
    rows: usize,
    cols: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for SoftmaxRowsBackward {
    fn backward(&self) {
        let grad = self.result_grad.borrow_mut().take();
        if let Some(grad) = grad {
            if self.a.requires_grad() {
                // Per row: ∂L/∂x = y ⊙ (∂L/∂y − (y · ∂L/∂y))
                let mut grad_a = Array1::zeros(self.rows * self.cols);
                let y = self.output.data();
                for r in 0..self.rows {
                    let base = r * self.cols;
                    let mut dot = 0.0;
                    for c in 0..self.cols {
                        dot += y[base + c] * grad[base + c];
                    }
                    for c in 0..self.cols {
                        grad_a[base + c] = y[base + c] * (grad[base + c] - dot);
                    }
                }
                self.a.accumulate_grad(grad_a);
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
        }
    }
}

/// Inverted dropout: zeroes each element with probability `p` and rescales
/// survivors by `1/(1−p)`. Callers gate this on train mode; it is never the
/// identity, so do not apply it during evaluation.
pub fn dropout<R: Rng>(a: &Tensor, p: f32, rng: &mut R) -> Tensor {
    assert!((0.0..1.0).contains(&p), "dropout: p must be in [0, 1)");

    let keep_scale = 1.0 / (1.0 - p);
    let mask: Array1<f32> = Array1::from(
        (0..a.len())
            .map(|_| if rng.gen::<f32>() < p { 0.0 } else { keep_scale })
            .collect::<Vec<f32>>(),
    );

    let data = &*a.data() * &mask;
    let requires_grad = a.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(DropoutBackward {
            a: a.clone(),
            mask,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct DropoutBackward {
    a: Tensor,
    mask: Array1<f32>,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for DropoutBackward {
    fn backward(&self) {
        let grad = self.result_grad.borrow_mut().take();
        if let Some(grad) = grad {
            if self.a.requires_grad() {
                self.a.accumulate_grad(&grad * &self.mask);
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
        }
    }
}
