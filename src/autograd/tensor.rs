//! Flat f32 tensor with an explicit gradient accumulator

use ndarray::Array1;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use super::BackwardOp;

/// A flat `f32` tensor with shared storage and an explicit gradient cell.
///
/// Cloning a `Tensor` produces another handle to the same storage, so a
/// network and the optimizers bound to its parameters all observe the same
/// data and the same gradient accumulator. Shapes are carried by the call
/// sites (`matmul` and friends take explicit dimensions), matching the
/// flattened row-major layout used throughout the crate.
///
/// The gradient accumulator is written by `accumulate_grad` during a
/// backward pass and is only ever cleared by an explicit `zero_grad` call;
/// nothing clears it implicitly.
#[derive(Clone)]
pub struct Tensor {
    data: Rc<RefCell<Array1<f32>>>,
    grad: Rc<RefCell<Option<Array1<f32>>>>,
    requires_grad: bool,
    backward_op: Rc<RefCell<Option<Rc<dyn BackwardOp>>>>,
}

impl Tensor {
    /// Create a tensor from an ndarray.
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        Self {
            data: Rc::new(RefCell::new(data)),
            grad: Rc::new(RefCell::new(None)),
            requires_grad,
            backward_op: Rc::new(RefCell::new(None)),
        }
    }

    /// Create a tensor from a `Vec`.
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a zero-filled tensor of length `n`.
    pub fn zeros(n: usize, requires_grad: bool) -> Self {
        Self::new(Array1::zeros(n), requires_grad)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    /// True if the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether gradients are tracked for this tensor.
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Borrow the underlying data.
    pub fn data(&self) -> Ref<'_, Array1<f32>> {
        self.data.borrow()
    }

    /// Mutably borrow the underlying data.
    pub fn data_mut(&self) -> RefMut<'_, Array1<f32>> {
        self.data.borrow_mut()
    }

    /// Copy of the underlying data as a `Vec`.
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.borrow().to_vec()
    }

    /// Copy of the accumulated gradient, if any.
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Handle to the gradient cell, shared with backward ops.
    pub fn grad_cell(&self) -> Rc<RefCell<Option<Array1<f32>>>> {
        Rc::clone(&self.grad)
    }

    /// Replace the accumulated gradient.
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add `grad` into the accumulator, initializing it if empty.
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        let mut cell = self.grad.borrow_mut();
        match cell.as_mut() {
            Some(existing) => *existing += &grad,
            None => *cell = Some(grad),
        }
    }

    /// Clear the gradient accumulator.
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }

    /// True if the accumulator is empty or holds only zeros.
    pub fn grad_is_clear(&self) -> bool {
        match self.grad.borrow().as_ref() {
            None => true,
            Some(g) => g.iter().all(|v| *v == 0.0),
        }
    }

    /// The backward op that produced this tensor, if any.
    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.borrow().clone()
    }

    /// Install the backward op for this tensor.
    pub fn set_backward_op(&mut self, op: Rc<dyn BackwardOp>) {
        *self.backward_op.borrow_mut() = Some(op);
    }
}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("len", &self.len())
            .field("requires_grad", &self.requires_grad)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn clone_shares_storage() {
        let a = Tensor::from_vec(vec![1.0, 2.0], true);
        let b = a.clone();
        a.data_mut()[0] = 5.0;
        assert_eq!(b.data()[0], 5.0);
    }

    #[test]
    fn grad_accumulates_until_cleared() {
        let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
        assert!(t.grad_is_clear());

        t.accumulate_grad(arr1(&[1.0, 1.0, 1.0]));
        t.accumulate_grad(arr1(&[0.5, 0.5, 0.5]));
        let g = t.grad().expect("gradient should be set");
        assert_eq!(g[1], 1.5);
        assert!(!t.grad_is_clear());

        t.zero_grad();
        assert!(t.grad().is_none());
        assert!(t.grad_is_clear());
    }

    #[test]
    fn shared_grad_cell() {
        let t = Tensor::from_vec(vec![1.0], true);
        let cell = t.grad_cell();
        *cell.borrow_mut() = Some(arr1(&[2.0]));
        assert_eq!(t.grad().expect("gradient should be set")[0], 2.0);
    }
}
