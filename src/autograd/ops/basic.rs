//! Elementwise and shape operations: add, add_bias, concat

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Add two tensors elementwise.
pub fn add(a: &Tensor, b: &Tensor) -> Tensor {
    assert_eq!(a.len(), b.len(), "add: operand length mismatch");

    let data = &*a.data() + &*b.data();
    let requires_grad = a.requires_grad() || b.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBackward {
            a: a.clone(),
            b: b.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBackward {
    a: Tensor,
    b: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for AddBackward {
    fn backward(&self) {
        let grad = self.result_grad.borrow_mut().take();
        if let Some(grad) = grad {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad.clone());
            }
            if self.b.requires_grad() {
                self.b.accumulate_grad(grad);
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

/// Add a bias row vector to every row of a `rows × cols` matrix.
pub fn add_bias(x: &Tensor, bias: &Tensor, rows: usize, cols: usize) -> Tensor {
    assert_eq!(x.len(), rows * cols, "add_bias: matrix size mismatch");
    assert_eq!(bias.len(), cols, "add_bias: bias length mismatch");

    let mut data = x.data().clone();
    {
        let bias_data = bias.data();
        for r in 0..rows {
            for c in 0..cols {
                data[r * cols + c] += bias_data[c];
            }
        }
    }

    let requires_grad = x.requires_grad() || bias.requires_grad();
    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBiasBackward {
            x: x.clone(),
            bias: bias.clone(),
            rows,
            cols,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBiasBackward {
    x: Tensor,
    bias: Tensor,
    rows: usize,
    cols: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for AddBiasBackward {
    fn backward(&self) {
        let grad = self.result_grad.borrow_mut().take();
        if let Some(grad) = grad {
            if self.bias.requires_grad() {
                // ∂L/∂bias_c = Σ_r ∂L/∂out_{r,c}
                let mut grad_bias = Array1::zeros(self.cols);
                for r in 0..self.rows {
                    for c in 0..self.cols {
                        grad_bias[c] += grad[r * self.cols + c];
                    }
                }
                self.bias.accumulate_grad(grad_bias);
            }
            if self.x.requires_grad() {
                self.x.accumulate_grad(grad);
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
            if let Some(op) = self.bias.backward_op() {
                op.backward();
            }
        }
    }
}

/// Concatenate two matrices along columns: `[rows × a_cols] ++ [rows × b_cols]`.
pub fn concat(a: &Tensor, b: &Tensor, rows: usize, a_cols: usize, b_cols: usize) -> Tensor {
    assert_eq!(a.len(), rows * a_cols, "concat: left size mismatch");
    assert_eq!(b.len(), rows * b_cols, "concat: right size mismatch");

    let cols = a_cols + b_cols;
    let mut data = Array1::zeros(rows * cols);
    {
        let a_data = a.data();
        let b_data = b.data();
        for r in 0..rows {
            for c in 0..a_cols {
                data[r * cols + c] = a_data[r * a_cols + c];
            }
            for c in 0..b_cols {
                data[r * cols + a_cols + c] = b_data[r * b_cols + c];
            }
        }
    }

    let requires_grad = a.requires_grad() || b.requires_grad();
    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ConcatBackward {
            a: a.clone(),
            b: b.clone(),
            rows,
            a_cols,
            b_cols,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ConcatBackward {
    a: Tensor,
    b: Tensor,
    rows: usize,
    a_cols: usize,
    b_cols: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for ConcatBackward {
    fn backward(&self) {
        let grad = self.result_grad.borrow_mut().take();
        if let Some(grad) = grad {
            let cols = self.a_cols + self.b_cols;

            if self.a.requires_grad() {
                let mut grad_a = Array1::zeros(self.rows * self.a_cols);
                for r in 0..self.rows {
                    for c in 0..self.a_cols {
                        grad_a[r * self.a_cols + c] = grad[r * cols + c];
                    }
                }
                self.a.accumulate_grad(grad_a);
            }
            if self.b.requires_grad() {
                let mut grad_b = Array1::zeros(self.rows * self.b_cols);
                for r in 0..self.rows {
                    for c in 0..self.b_cols {
                        grad_b[r * self.b_cols + c] = grad[r * cols + self.a_cols + c];
                    }
                }
                self.b.accumulate_grad(grad_b);
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
